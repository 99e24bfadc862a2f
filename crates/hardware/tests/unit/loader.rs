//! # Program Loader Tests
//!
//! Raw and hex-text images read from temporary files, and the errors reported
//! for unreadable or malformed input.

use std::io::Write;

use gatesim_core::SimError;
use gatesim_core::sim::loader::{load_program, parse_hex};
use tempfile::{Builder, NamedTempFile};

#[test]
fn raw_images_are_read_verbatim() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&[0x01, 0x05, 0x1E, 0x00, 0xFF]).unwrap();
    assert_eq!(
        load_program(file.path()).unwrap(),
        vec![0x01, 0x05, 0x1E, 0x00, 0xFF]
    );
}

#[test]
fn hex_images_are_parsed() {
    let mut file = Builder::new().suffix(".hex").tempfile().unwrap();
    writeln!(file, "# add two numbers").unwrap();
    writeln!(file, "01 05   ; LDA #5").unwrap();
    writeln!(file, "0x02,0x03").unwrap();
    writeln!(file, "10 18 1E").unwrap();
    assert_eq!(
        load_program(file.path()).unwrap(),
        vec![0x01, 0x05, 0x02, 0x03, 0x10, 0x18, 0x1E]
    );
}

#[test]
fn hex_extension_is_case_insensitive() {
    let mut file = Builder::new().suffix(".HEX").tempfile().unwrap();
    write!(file, "ff").unwrap();
    assert_eq!(load_program(file.path()).unwrap(), vec![0xFF]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_program(dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}

#[test]
fn bad_token_names_its_line() {
    let mut file = Builder::new().suffix(".hex").tempfile().unwrap();
    write!(file, "01 02\n03 zz 04\n").unwrap();
    let err = load_program(file.path()).unwrap_err();
    assert!(matches!(err, SimError::ProgramSyntax { line: 2, ref token } if token == "zz"));
}

#[test]
fn prefixes_and_separators_mix_freely() {
    assert_eq!(
        parse_hex("0XAB, 0xcd\tef,,01").unwrap(),
        vec![0xAB, 0xCD, 0xEF, 0x01]
    );
}

//! Program image loading.
//!
//! Two image formats are accepted:
//! 1. **Raw binary:** Any file not ending in `.hex`; its bytes are the image.
//! 2. **Hex text:** Files ending in `.hex` hold whitespace- or comma-separated bytes in
//!    hexadecimal, with an optional `0x` prefix. `#` and `;` start a comment that runs to the
//!    end of the line.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::{SimError, SimResult};

/// Loads a program image from disk.
///
/// # Arguments
///
/// * `path` - Path to a raw binary or `.hex` text image.
///
/// # Returns
///
/// The image bytes, in load order.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read and [`SimError::ProgramSyntax`] for
/// malformed hex text.
pub fn load_program(path: impl AsRef<Path>) -> SimResult<Vec<u8>> {
    let path = path.as_ref();
    let is_hex = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("hex"));
    let bytes = if is_hex {
        parse_hex(&fs::read_to_string(path)?)?
    } else {
        fs::read(path)?
    };
    debug!(path = %path.display(), bytes = bytes.len(), "loaded program image");
    Ok(bytes)
}

/// Parses hex text into bytes.
///
/// # Errors
///
/// Returns [`SimError::ProgramSyntax`] naming the first token that is not a byte.
///
/// # Examples
///
/// ```
/// use gatesim_core::sim::loader::parse_hex;
///
/// let image = parse_hex("01 05  ; LDA #5\n0x02,03\n# done\n1e").unwrap();
/// assert_eq!(image, vec![0x01, 0x05, 0x02, 0x03, 0x1e]);
/// ```
pub fn parse_hex(text: &str) -> SimResult<Vec<u8>> {
    let mut bytes = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let code = line.split(['#', ';']).next().unwrap_or_default();
        for token in code
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            let byte = u8::from_str_radix(digits, 16).map_err(|_| SimError::ProgramSyntax {
                line: index + 1,
                token: token.to_string(),
            })?;
            bytes.push(byte);
        }
    }
    Ok(bytes)
}

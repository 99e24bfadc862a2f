//! # Memory Tests
//!
//! The word store on its own, then RAM, bidirectional RAM and both ROM flavours
//! wired into a circuit.

use gatesim_core::{Memory, Signals, SimError};

use crate::common::harness::TestContext;

// ══════════════════════════════════════════════════════════
// 1. Word store
// ══════════════════════════════════════════════════════════

#[test]
fn memory_wraps_addresses_and_masks_values() {
    let mut mem = Memory::new(8, 8).unwrap();
    assert_eq!(mem.len(), 256);
    mem.write(0x105, 0x1AB);
    assert_eq!(mem.read(5), 0xAB);
    assert_eq!(mem.read(0x305), 0xAB);
}

#[test]
fn memory_rejects_bad_shapes() {
    assert!(matches!(Memory::new(4, 0), Err(SimError::MemoryWidth { width: 0 })));
    assert!(matches!(Memory::new(4, 65), Err(SimError::MemoryWidth { width: 65 })));
    assert!(matches!(
        Memory::new(25, 8),
        Err(SimError::DecoderTooWide { width: 25, max: 24 })
    ));
    assert!(matches!(
        Memory::from_words(2, 8, vec![0; 3]),
        Err(SimError::MemorySize {
            words: 3,
            address_bits: 2
        })
    ));
}

#[test]
fn from_words_masks_to_width() {
    let mem = Memory::from_words(1, 4, vec![0x1F, 0x3]).unwrap();
    assert_eq!(mem.words(), &[0xF, 0x3]);
}

#[test]
fn load_copies_bytes_or_rejects_overflow() {
    let mut mem = Memory::new(4, 8).unwrap();
    mem.load(14, &[0x34, 0x12]).unwrap();
    assert_eq!(mem.read_vector(14), 0x1234);

    let err = mem.load(15, &[1, 2]).unwrap_err();
    assert!(matches!(
        err,
        SimError::LoadOutOfRange {
            offset: 15,
            len: 2,
            size: 16
        }
    ));
    assert_eq!(mem.read(15), 0x12, "failed load leaves memory untouched");
}

#[test]
fn narrow_memory_truncates_loaded_bytes() {
    let mut mem = Memory::new(2, 4).unwrap();
    mem.load(0, &[0xAB]).unwrap();
    assert_eq!(mem.read(0), 0xB);
}

// ══════════════════════════════════════════════════════════
// 2. RAM
// ══════════════════════════════════════════════════════════

#[test]
fn ram_reads_before_it_writes() {
    let mut ctx = TestContext::new();
    let address = ctx.circuit.bus(4);
    let clk = ctx.circuit.wire();
    let data = ctx.circuit.bus(8);
    let we = ctx.circuit.wire();
    let oe = ctx.circuit.wire();
    let ram = ctx
        .circuit
        .ram(&address, clk, &data, Memory::new(4, 8).unwrap(), we, oe)
        .unwrap();

    ctx.circuit.write(&address, 3).unwrap();
    ctx.circuit.write(&data, 0x42).unwrap();
    ctx.drive(we, true);
    ctx.pulse(clk);
    assert_eq!(ctx.circuit.read(&ram.latch), 0, "latch holds the old word");
    assert_eq!(ctx.circuit.memory(ram.id).unwrap().read(3), 0x42);

    ctx.drive(we, false);
    ctx.pulse(clk);
    assert_eq!(ctx.circuit.read(&ram.latch), 0x42);
    assert_eq!(ctx.circuit.read(&ram.output), 0, "output waits for oe");
    ctx.drive(oe, true);
    assert_eq!(ctx.circuit.read(&ram.output), 0x42);

    let words = ctx.circuit.memory(ram.id).unwrap().words();
    assert_eq!(words.iter().filter(|&&w| w != 0).count(), 1);
}

#[test]
fn ram_ignores_data_without_a_clock_edge() {
    let mut ctx = TestContext::new();
    let address = ctx.circuit.bus(2);
    let clk = ctx.circuit.wire();
    let data = ctx.circuit.bus(8);
    let we = ctx.circuit.high();
    let oe = ctx.circuit.low();
    let ram = ctx
        .circuit
        .ram(&address, clk, &data, Memory::new(2, 8).unwrap(), we, oe)
        .unwrap();
    ctx.circuit.write(&data, 0x10).unwrap();
    ctx.circuit.write(&address, 1).unwrap();
    ctx.circuit.settle().unwrap();
    assert_eq!(ctx.circuit.memory(ram.id).unwrap().read(1), 0);
}

#[test]
fn ioram_shares_its_data_bus() {
    let mut ctx = TestContext::new();
    let address = ctx.circuit.bus(2);
    let clk = ctx.circuit.wire();
    let data = ctx.circuit.bus(8);
    let we = ctx.circuit.wire();
    let oe = ctx.circuit.wire();
    let ram = ctx
        .circuit
        .ioram(&address, clk, &data, Memory::new(2, 8).unwrap(), we, oe)
        .unwrap();
    ctx.circuit
        .memory_mut(ram.id)
        .unwrap()
        .load(0, &[0x11, 0x22, 0x33, 0x44])
        .unwrap();

    ctx.circuit.write(&address, 2).unwrap();
    ctx.pulse(clk);
    ctx.drive(oe, true);
    assert_eq!(ctx.circuit.read(&data), 0x33);

    ctx.drive(oe, false);
    ctx.circuit.write(&data, 0x99).unwrap();
    ctx.circuit.write(&address, 1).unwrap();
    ctx.drive(we, true);
    ctx.pulse(clk);
    let mem = ctx.circuit.memory(ram.id).unwrap();
    assert_eq!(mem.words(), &[0x11, 0x99, 0x33, 0x44]);
}

#[test]
fn ram_checks_bus_widths() {
    let mut ctx = TestContext::new();
    let address = ctx.circuit.bus(3);
    let clk = ctx.circuit.wire();
    let data = ctx.circuit.bus(8);
    let (we, oe) = (ctx.circuit.low(), ctx.circuit.low());
    let err = ctx
        .circuit
        .ram(&address, clk, &data, Memory::new(4, 8).unwrap(), we, oe)
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::WidthMismatch {
            context: "ram",
            expected: 4,
            actual: 3
        }
    ));
}

// ══════════════════════════════════════════════════════════
// 3. ROM
// ══════════════════════════════════════════════════════════

#[test]
fn rom_follows_the_address() {
    let mut ctx = TestContext::new();
    let address = ctx.circuit.bus(2);
    let data = ctx.circuit.bus(8);
    let table = Memory::from_words(2, 8, vec![5, 6, 7, 8]).unwrap();
    let _ = ctx.circuit.rom(&address, table, &data).unwrap();
    assert_eq!(ctx.circuit.read(&data), 5);
    ctx.circuit.write(&address, 3).unwrap();
    ctx.circuit.settle().unwrap();
    assert_eq!(ctx.circuit.read(&data), 8);
}

#[test]
fn clocked_rom_samples_on_the_rising_edge() {
    let mut ctx = TestContext::new();
    let address = ctx.circuit.bus(2);
    let clk = ctx.circuit.wire();
    let data = ctx.circuit.bus(8);
    let table = Memory::from_words(2, 8, vec![5, 6, 7, 8]).unwrap();
    let _ = ctx.circuit.clocked_rom(&address, clk, table, &data).unwrap();

    ctx.circuit.write(&address, 1).unwrap();
    ctx.circuit.settle().unwrap();
    assert_eq!(ctx.circuit.read(&data), 0);
    ctx.pulse(clk);
    assert_eq!(ctx.circuit.read(&data), 6);
}

#[test]
fn ram_stores_on_a_clock_pulse_that_ends_in_the_same_tick() {
    let mut ctx = TestContext::new();
    let address = ctx.circuit.bus_with(2, 2);
    let clk = ctx.circuit.wire();
    let data = ctx.circuit.bus_with(8, 0x3C);
    let we = ctx.circuit.high();
    let oe = ctx.circuit.low();
    let ram = ctx
        .circuit
        .ram(&address, clk, &data, Memory::new(2, 8).unwrap(), we, oe)
        .unwrap();
    let trigger = ctx.circuit.wire();
    let _ = ctx
        .circuit
        .on_posedge(trigger, move |s: &mut Signals<'_>| {
            s.set(clk, true);
            s.set(clk, false);
        })
        .unwrap();

    ctx.drive(trigger, true);
    assert_eq!(ctx.circuit.memory(ram.id).unwrap().read(2), 0x3C);
}

#[test]
fn components_without_memory_report_it() {
    let mut ctx = TestContext::new();
    let w = ctx.circuit.wire();
    let id = ctx.circuit.on_change(w, |_| {}).unwrap();
    assert!(matches!(ctx.circuit.memory(id), Err(SimError::NoMemory(_))));
    assert!(matches!(ctx.circuit.memory_mut(id), Err(SimError::NoMemory(_))));
}

//! # Gate Tests
//!
//! Truth tables for every gate kind, multi-input gates, bus-wide gates and
//! configurable propagation delay.

use gatesim_core::logic::GateKind;
use rstest::rstest;

use crate::common::harness::{TestContext, probe};

// ══════════════════════════════════════════════════════════
// 1. Truth tables
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::and(GateKind::And, [false, false, false, true])]
#[case::or(GateKind::Or, [false, true, true, true])]
#[case::nand(GateKind::Nand, [true, true, true, false])]
#[case::nor(GateKind::Nor, [true, false, false, false])]
#[case::xor(GateKind::Xor, [false, true, true, false])]
#[case::xnor(GateKind::Xnor, [true, false, false, true])]
fn two_input_truth_table(#[case] kind: GateKind, #[case] expected: [bool; 4]) {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.wire();
    let b = ctx.circuit.wire();
    let q = ctx.circuit.gate(kind, &[a, b]).unwrap();
    for (row, &want) in expected.iter().enumerate() {
        ctx.circuit.set(a, row & 1 == 1).unwrap();
        ctx.circuit.set(b, row & 2 == 2).unwrap();
        ctx.circuit.settle().unwrap();
        assert_eq!(ctx.circuit.get(q), want, "{kind:?} row {row}");
    }
}

#[test]
fn inverter_and_buffer() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.wire();
    let not_a = ctx.circuit.inverter(a).unwrap();
    let buf_a = ctx.circuit.gate(GateKind::Buf, &[a]).unwrap();
    ctx.circuit.settle().unwrap();
    assert!(ctx.circuit.get(not_a));
    assert!(!ctx.circuit.get(buf_a));
    ctx.drive(a, true);
    assert!(!ctx.circuit.get(not_a));
    assert!(ctx.circuit.get(buf_a));
}

#[test]
fn wide_and_needs_every_input() {
    let mut ctx = TestContext::new();
    let inputs = ctx.circuit.bus(5);
    let q = ctx.circuit.gate(GateKind::And, inputs.wires()).unwrap();
    ctx.circuit.write(&inputs, 0b1_1110).unwrap();
    ctx.circuit.settle().unwrap();
    assert!(!ctx.circuit.get(q));
    ctx.circuit.write(&inputs, 0b1_1111).unwrap();
    ctx.circuit.settle().unwrap();
    assert!(ctx.circuit.get(q));
}

#[test]
fn wide_xor_is_parity() {
    let mut ctx = TestContext::new();
    let inputs = ctx.circuit.bus(6);
    let q = ctx.circuit.gate(GateKind::Xor, inputs.wires()).unwrap();
    for value in 0..64u64 {
        ctx.circuit.write(&inputs, value).unwrap();
        ctx.circuit.settle().unwrap();
        assert_eq!(ctx.circuit.get(q), value.count_ones() % 2 == 1, "{value:#b}");
    }
}

// ══════════════════════════════════════════════════════════
// 2. Bus-wide gates
// ══════════════════════════════════════════════════════════

#[test]
fn bitwise_bus_gates() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.bus_with(8, 0b1100_1010);
    let b = ctx.circuit.bus_with(8, 0b1010_0110);
    let and = ctx.circuit.and_bus(&a, &b).unwrap();
    let or = ctx.circuit.or_bus(&a, &b).unwrap();
    let xor = ctx.circuit.xor_bus(&a, &b).unwrap();
    let not = ctx.circuit.not_bus(&a).unwrap();
    ctx.circuit.settle().unwrap();
    assert_eq!(ctx.circuit.read(&and), 0b1000_0010);
    assert_eq!(ctx.circuit.read(&or), 0b1110_1110);
    assert_eq!(ctx.circuit.read(&xor), 0b0110_1100);
    assert_eq!(ctx.circuit.read(&not), 0b0011_0101);
}

#[test]
fn bus_gates_reject_width_mismatch() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.bus(4);
    let b = ctx.circuit.bus(3);
    assert!(ctx.circuit.and_bus(&a, &b).is_err());
    assert!(ctx.circuit.xor_bus(&a, &b).is_err());
}

// ══════════════════════════════════════════════════════════
// 3. Propagation delay
// ══════════════════════════════════════════════════════════

#[test]
fn gate_delay_postpones_the_output() {
    let mut ctx = TestContext::with_gate_delay(3);
    let a = ctx.circuit.wire();
    let q = ctx.circuit.inverter(a).unwrap();
    assert_eq!(ctx.circuit.advance().unwrap(), 3);
    assert!(ctx.circuit.get(q));

    ctx.drive(a, true);
    assert!(ctx.circuit.get(q));
    assert_eq!(ctx.circuit.advance().unwrap(), 6);
    assert!(!ctx.circuit.get(q));
}

#[test]
fn delays_accumulate_along_a_chain() {
    let mut ctx = TestContext::with_gate_delay(2);
    let a = ctx.circuit.wire();
    let b = ctx.circuit.inverter(a).unwrap();
    let c = ctx.circuit.inverter(b).unwrap();
    let d = ctx.circuit.inverter(c).unwrap();
    let _ = ctx.circuit.run_for(100).unwrap();
    let start = ctx.circuit.tick();
    let wave = probe(&mut ctx.circuit, d);

    ctx.drive(a, true);
    let _ = ctx.circuit.run_for(100).unwrap();
    assert!(!ctx.circuit.get(d));
    assert_eq!(wave.borrow().last(), Some(&(start + 6, false)));
}

#[test]
fn explicit_delay_overrides_configuration() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.wire();
    let q = ctx.circuit.wire();
    ctx.circuit
        .gate_with_delay(GateKind::Buf, &[a], q, 4)
        .unwrap();
    ctx.drive(a, true);
    assert!(!ctx.circuit.get(q));
    assert_eq!(ctx.circuit.advance().unwrap(), 4);
    assert!(ctx.circuit.get(q));
}

#[test]
fn run_until_idle_stops_when_the_chain_settles() {
    let mut ctx = TestContext::with_gate_delay(5);
    let a = ctx.circuit.wire();
    let b = ctx.circuit.inverter(a).unwrap();
    let c = ctx.circuit.inverter(b).unwrap();
    assert_eq!(ctx.circuit.run_until_idle().unwrap(), 10);
    assert!(!ctx.circuit.has_pending());
    assert!(!ctx.circuit.get(c));
}

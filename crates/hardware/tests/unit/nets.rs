//! # Net Model Tests
//!
//! Verifies subscription semantics, identity merging of connected nets,
//! constant nets and bus handles through the public `Circuit` API.

use std::cell::RefCell;
use std::rc::Rc;

use gatesim_core::{Bus, Edge, Signals, SimError};

use crate::common::harness::{TestContext, probe};

// ══════════════════════════════════════════════════════════
// 1. Subscriptions
// ══════════════════════════════════════════════════════════

#[test]
fn change_subscriber_fires_on_attach_and_every_change() {
    let mut ctx = TestContext::new();
    let w = ctx.circuit.wire();
    let wave = probe(&mut ctx.circuit, w);
    ctx.drive(w, true);
    ctx.drive(w, true);
    ctx.drive(w, false);
    assert_eq!(*wave.borrow(), vec![(0, false), (0, true), (0, false)]);
}

#[test]
fn posedge_subscriber_ignores_falling_edges() {
    let mut ctx = TestContext::new();
    let w = ctx.circuit.wire();
    let count = std::rc::Rc::new(std::cell::Cell::new(0));
    let seen = std::rc::Rc::clone(&count);
    let _ = ctx
        .circuit
        .on_posedge(w, move |_| seen.set(seen.get() + 1))
        .unwrap();
    assert_eq!(count.get(), 0);
    ctx.pulse(w);
    ctx.pulse(w);
    assert_eq!(count.get(), 2);
}

#[test]
fn posedge_subscriber_on_high_net_fires_immediately() {
    let mut ctx = TestContext::new();
    let w = ctx.circuit.wire_with(true);
    let fired = std::rc::Rc::new(std::cell::Cell::new(false));
    let flag = std::rc::Rc::clone(&fired);
    let _ = ctx.circuit.on_posedge(w, move |_| flag.set(true)).unwrap();
    assert!(fired.get());
}

// ══════════════════════════════════════════════════════════
// 2. Merging
// ══════════════════════════════════════════════════════════

#[test]
fn connected_wires_share_one_value() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.wire();
    let b = ctx.circuit.wire();
    ctx.circuit.connect(a, b).unwrap();
    ctx.drive(b, true);
    assert!(ctx.circuit.get(a));
    ctx.drive(a, false);
    assert!(!ctx.circuit.get(b));
}

#[test]
fn merge_keeps_the_first_nets_value_and_notifies_the_other_side() {
    let mut ctx = TestContext::new();
    let keep = ctx.circuit.wire_with(true);
    let other = ctx.circuit.wire();
    let keep_wave = probe(&mut ctx.circuit, keep);
    let other_wave = probe(&mut ctx.circuit, other);
    ctx.circuit.connect(keep, other).unwrap();
    assert!(ctx.circuit.get(other));
    assert_eq!(keep_wave.borrow().len(), 1);
    assert_eq!(*other_wave.borrow(), vec![(0, false), (0, true)]);
}

#[test]
fn subscribers_of_both_sides_see_later_writes() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.wire();
    let b = ctx.circuit.wire();
    let c = ctx.circuit.wire();
    let wave_a = probe(&mut ctx.circuit, a);
    let wave_c = probe(&mut ctx.circuit, c);
    ctx.circuit.connect(b, c).unwrap();
    ctx.circuit.connect(a, b).unwrap();
    ctx.drive(c, true);
    assert_eq!(wave_a.borrow().last(), Some(&(0, true)));
    assert_eq!(wave_c.borrow().last(), Some(&(0, true)));
    assert_eq!(ctx.circuit.stats().merges, 2);
}

#[test]
fn gate_outputs_flow_through_merged_nets() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.wire();
    let q = ctx.circuit.inverter(a).unwrap();
    let out = ctx.circuit.wire();
    ctx.circuit.connect(out, q).unwrap();
    ctx.circuit.settle().unwrap();
    assert!(ctx.circuit.get(out));
    ctx.drive(a, true);
    assert!(!ctx.circuit.get(out));
}

#[test]
fn pending_writes_follow_the_merged_net() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.wire();
    let b = ctx.circuit.wire();
    ctx.circuit.schedule_set(b, true, 5);
    ctx.circuit.connect(a, b).unwrap();
    assert_eq!(ctx.circuit.advance().unwrap(), 5);
    assert!(ctx.circuit.get(a));
}

#[test]
fn connecting_to_a_constant_pins_the_net() {
    let mut ctx = TestContext::new();
    let w = ctx.circuit.wire();
    let high = ctx.circuit.high();
    ctx.circuit.connect(w, high).unwrap();
    assert!(ctx.circuit.get(w));
    ctx.drive(w, false);
    assert!(ctx.circuit.get(w));
}

#[test]
fn writes_to_constants_are_ignored() {
    let mut ctx = TestContext::new();
    let (high, low) = (ctx.circuit.high(), ctx.circuit.low());
    ctx.drive(high, false);
    ctx.drive(low, true);
    assert!(ctx.circuit.get(high));
    assert!(!ctx.circuit.get(low));
}

#[test]
fn connect_bus_rejects_width_mismatch() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.bus(4);
    let b = ctx.circuit.bus(5);
    let err = ctx.circuit.connect_bus(&a, &b).unwrap_err();
    assert!(matches!(
        err,
        SimError::WidthMismatch {
            expected: 4,
            actual: 5,
            ..
        }
    ));
}

#[test]
fn connect_bus_merges_bit_by_bit() {
    let mut ctx = TestContext::new();
    let a = ctx.circuit.bus(4);
    let b = ctx.circuit.bus(4);
    ctx.circuit.connect_bus(&a, &b).unwrap();
    ctx.circuit.write(&b, 0b1010).unwrap();
    assert_eq!(ctx.circuit.read(&a), 0b1010);
    let stats = ctx.circuit.stats();
    assert_eq!(stats.merges, 4);
    assert_eq!(stats.nets, stats.wires - 4);
}

// ══════════════════════════════════════════════════════════
// 3. Buses
// ══════════════════════════════════════════════════════════

#[test]
fn bus_slicing_and_concatenation() {
    let mut ctx = TestContext::new();
    let bus = ctx.circuit.bus_with(8, 0xA5);
    let low = bus.slice(..4);
    let high = bus.slice(4..);
    assert_eq!(ctx.circuit.read(&low), 0x5);
    assert_eq!(ctx.circuit.read(&high), 0xA);
    let swapped = high.concat(&low);
    assert_eq!(ctx.circuit.read(&swapped), 0x5A);
    assert_eq!(bus.msb(), Some(bus[7]));
}

#[test]
fn constant_bus_spells_its_value() {
    let ctx = TestContext::new();
    let bus = ctx.circuit.constant(6, 0b10_1101);
    assert_eq!(ctx.circuit.read(&bus), 0b10_1101);
    assert_eq!(ctx.circuit.hex(&bus), "0x2d");
    assert_eq!(ctx.circuit.bin(&bus), "0b101101");
    assert_eq!(ctx.circuit.dec(&bus), "45");
}

#[test]
fn wide_writes_use_the_low_bits() {
    let mut ctx = TestContext::new();
    let bus: Bus = ctx.circuit.bus(3);
    ctx.circuit.write(&bus, 0xFF).unwrap();
    assert_eq!(ctx.circuit.read(&bus), 0b111);
    ctx.circuit.write_bits(&bus, &[true, false, false]).unwrap();
    assert_eq!(ctx.circuit.read_bits(&bus), vec![true, false, false]);
    assert!(ctx.circuit.write_bits(&bus, &[true]).is_err());
}

#[test]
fn bus_writes_reach_multi_bit_subscribers_whole() {
    let mut ctx = TestContext::new();
    let bus = ctx.circuit.bus(2);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let watched = bus.clone();
    let inputs: Vec<_> = bus.iter().map(|w| (w, Edge::Any)).collect();
    let _ = ctx
        .circuit
        .add_component(
            move |s: &mut Signals<'_>| sink.borrow_mut().push(s.read(&watched)),
            &inputs,
        )
        .unwrap();
    ctx.circuit.settle().unwrap();

    ctx.circuit.write(&bus, 0b01).unwrap();
    ctx.circuit.write(&bus, 0b10).unwrap();
    assert_eq!(*seen.borrow(), vec![0, 1, 2]);

    ctx.circuit.schedule_write(&bus, 0b01, 4);
    assert_eq!(ctx.circuit.run_until_idle().unwrap(), 4);
    assert_eq!(*seen.borrow(), vec![0, 1, 2, 1]);
}

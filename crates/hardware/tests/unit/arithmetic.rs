//! # Arithmetic Tests
//!
//! Checks the ripple-carry adder against integer addition for random widths
//! and operands, and covers the incrementer and decrementer wrap-around cases.

use gatesim_core::SimError;
use gatesim_core::common::value::mask;
use proptest::prelude::*;

use crate::common::harness::TestContext;

fn add(width: usize, a: u64, b: u64, carry_in: bool) -> (u64, bool) {
    let mut ctx = TestContext::new();
    let x = ctx.circuit.bus(width);
    let y = ctx.circuit.bus(width);
    let cin = ctx.circuit.wire();
    let (sum, cout) = ctx.circuit.full_adder(&x, &y, cin).unwrap();
    ctx.circuit.write(&x, a).unwrap();
    ctx.circuit.write(&y, b).unwrap();
    ctx.circuit.set(cin, carry_in).unwrap();
    ctx.circuit.settle().unwrap();
    (ctx.circuit.read(&sum), ctx.circuit.get(cout))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn adder_matches_integer_addition(
        width in 1usize..=16,
        a in any::<u64>(),
        b in any::<u64>(),
        carry_in in any::<bool>(),
    ) {
        let m = mask(width);
        let (a, b) = (a & m, b & m);
        let total = a + b + u64::from(carry_in);
        let (sum, carry) = add(width, a, b, carry_in);
        prop_assert_eq!(sum, total & m);
        prop_assert_eq!(carry, total >> width == 1);
    }
}

#[test]
fn adder_follows_operand_changes() {
    let mut ctx = TestContext::new();
    let x = ctx.circuit.bus(8);
    let y = ctx.circuit.bus(8);
    let zero = ctx.circuit.low();
    let (sum, carry) = ctx.circuit.full_adder(&x, &y, zero).unwrap();
    for (a, b) in [(1, 2), (200, 100), (255, 1), (0, 0)] {
        ctx.circuit.write(&x, a).unwrap();
        ctx.circuit.write(&y, b).unwrap();
        ctx.circuit.settle().unwrap();
        assert_eq!(ctx.circuit.read(&sum), (a + b) & 0xFF, "{a} + {b}");
        assert_eq!(ctx.circuit.get(carry), a + b > 0xFF, "{a} + {b}");
    }
}

#[test]
fn adder_rejects_width_mismatch() {
    let mut ctx = TestContext::new();
    let x = ctx.circuit.bus(8);
    let y = ctx.circuit.bus(7);
    let cin = ctx.circuit.low();
    let err = ctx.circuit.full_adder(&x, &y, cin).unwrap_err();
    assert!(matches!(err, SimError::WidthMismatch { context: "full_adder", .. }));
}

#[test]
fn incrementer_wraps_with_carry() {
    let mut ctx = TestContext::new();
    let x = ctx.circuit.bus(4);
    let (next, carry) = ctx.circuit.incrementer(&x).unwrap();
    ctx.circuit.write(&x, 7).unwrap();
    ctx.circuit.settle().unwrap();
    assert_eq!(ctx.circuit.read(&next), 8);
    assert!(!ctx.circuit.get(carry));
    ctx.circuit.write(&x, 15).unwrap();
    ctx.circuit.settle().unwrap();
    assert_eq!(ctx.circuit.read(&next), 0);
    assert!(ctx.circuit.get(carry));
}

#[test]
fn decrementer_wraps_and_reports_borrow() {
    let mut ctx = TestContext::new();
    let x = ctx.circuit.bus(4);
    let (prev, carry) = ctx.circuit.decrementer(&x).unwrap();
    ctx.circuit.settle().unwrap();
    assert_eq!(ctx.circuit.read(&prev), 15);
    assert!(!ctx.circuit.get(carry));
    ctx.circuit.write(&x, 9).unwrap();
    ctx.circuit.settle().unwrap();
    assert_eq!(ctx.circuit.read(&prev), 8);
    assert!(ctx.circuit.get(carry));
}

//! Ripple-carry arithmetic.
//!
//! Each bit is a textbook full adder: `sum = a ^ b ^ c`, `carry = (a & b) | (c & (a ^ b))`.
//! The incrementer and decrementer reuse it with constant operands.

use crate::circuit::{Circuit, check_width};
use crate::common::SimResult;
use crate::logic::gates::GateKind;
use crate::net::{Bus, Wire};

impl Circuit {
    /// Adds two equal-width buses plus a carry-in.
    ///
    /// # Arguments
    ///
    /// * `a`, `b` - Operands, least-significant bit first.
    /// * `carry_in` - Carry into bit 0.
    ///
    /// # Returns
    ///
    /// `(sum, carry_out)` with `sum = (a + b + carry_in) mod 2^w`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::WidthMismatch`] if the operand widths differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use gatesim_core::Circuit;
    ///
    /// let mut c = Circuit::default();
    /// let a = c.bus_with(4, 9);
    /// let b = c.bus_with(4, 8);
    /// let cin = c.wire();
    /// let (sum, carry) = c.full_adder(&a, &b, cin).unwrap();
    /// c.settle().unwrap();
    /// assert_eq!(c.read(&sum), 1);
    /// assert!(c.get(carry));
    /// ```
    pub fn full_adder(&mut self, a: &Bus, b: &Bus, carry_in: Wire) -> SimResult<(Bus, Wire)> {
        let sum = self.bus(a.width());
        let carry = self.full_adder_into(a, b, carry_in, &sum)?;
        Ok((sum, carry))
    }

    /// As [`Circuit::full_adder`], driving an existing sum bus.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::WidthMismatch`] if any width differs.
    pub fn full_adder_into(
        &mut self,
        a: &Bus,
        b: &Bus,
        carry_in: Wire,
        sum: &Bus,
    ) -> SimResult<Wire> {
        check_width("full_adder", a, b)?;
        check_width("full_adder", a, sum)?;
        let mut carry = carry_in;
        for i in 0..a.width() {
            let half = self.xor(a[i], b[i])?;
            self.gate_into(GateKind::Xor, &[half, carry], sum[i])?;
            let generate = self.and(a[i], b[i])?;
            let propagate = self.and(half, carry)?;
            carry = self.or(generate, propagate)?;
        }
        Ok(carry)
    }

    /// `(a + 1) mod 2^w`, with carry-out set iff `a` was all ones.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from construction.
    pub fn incrementer(&mut self, a: &Bus) -> SimResult<(Bus, Wire)> {
        let zero = Bus::repeat(self.low(), a.width());
        let one = self.high();
        self.full_adder(a, &zero, one)
    }

    /// `(a - 1) mod 2^w`, with carry-out set iff `a` was non-zero.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from construction.
    pub fn decrementer(&mut self, a: &Bus) -> SimResult<(Bus, Wire)> {
        let ones = Bus::repeat(self.high(), a.width());
        let zero = self.low();
        self.full_adder(a, &ones, zero)
    }
}

//! Wire and bus handles.
//!
//! A [`Wire`] is a copyable handle naming one net in a circuit's net table. A [`Bus`] is an
//! ordered list of wires, least-significant bit first. Slicing and concatenation produce new
//! handles over the same nets; no signal state is copied.

use std::fmt;
use std::ops::{Index, RangeBounds};

/// Handle to a single net.
///
/// Handles stay valid for the lifetime of the circuit that created them. After a merge,
/// every handle to either side reads and writes the merged net.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wire(pub(crate) u32);

impl Wire {
    /// Index of this handle in the net table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Ordered group of wires read as an unsigned little-endian number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bus {
    wires: Vec<Wire>,
}

impl Bus {
    /// Wraps an existing list of wires; element 0 is the least-significant bit.
    pub const fn new(wires: Vec<Wire>) -> Self {
        Self { wires }
    }

    /// A bus of `width` copies of the same wire, e.g. a constant or a broadcast select line.
    pub fn repeat(wire: Wire, width: usize) -> Self {
        Self {
            wires: vec![wire; width],
        }
    }

    /// Number of bits.
    pub fn width(&self) -> usize {
        self.wires.len()
    }

    /// Whether the bus has no bits.
    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    /// Wire carrying bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.width()`.
    pub fn bit(&self, i: usize) -> Wire {
        self.wires[i]
    }

    /// Most-significant wire, if any.
    pub fn msb(&self) -> Option<Wire> {
        self.wires.last().copied()
    }

    /// Sub-bus aliasing the selected bits.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let start = match range.start_bound() {
            std::ops::Bound::Included(&s) => s,
            std::ops::Bound::Excluded(&s) => s + 1,
            std::ops::Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            std::ops::Bound::Included(&e) => e + 1,
            std::ops::Bound::Excluded(&e) => e,
            std::ops::Bound::Unbounded => self.wires.len(),
        };
        Self {
            wires: self.wires[start..end].to_vec(),
        }
    }

    /// `self` in the low bits followed by `high` in the high bits.
    pub fn concat(&self, high: &Self) -> Self {
        let mut wires = Vec::with_capacity(self.width() + high.width());
        wires.extend_from_slice(&self.wires);
        wires.extend_from_slice(&high.wires);
        Self { wires }
    }

    /// The underlying wires.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Iterates the wires from least to most significant.
    pub fn iter(&self) -> impl Iterator<Item = Wire> + '_ {
        self.wires.iter().copied()
    }
}

impl Index<usize> for Bus {
    type Output = Wire;

    fn index(&self, i: usize) -> &Wire {
        &self.wires[i]
    }
}

impl From<Wire> for Bus {
    fn from(wire: Wire) -> Self {
        Self { wires: vec![wire] }
    }
}

impl From<Vec<Wire>> for Bus {
    fn from(wires: Vec<Wire>) -> Self {
        Self { wires }
    }
}

impl FromIterator<Wire> for Bus {
    fn from_iter<I: IntoIterator<Item = Wire>>(iter: I) -> Self {
        Self {
            wires: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Bus {
    type Item = Wire;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Wire>>;

    fn into_iter(self) -> Self::IntoIter {
        self.wires.iter().copied()
    }
}

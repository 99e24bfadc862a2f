//! Component trait and identifiers.
//!
//! A component is anything that reacts to net changes: a gate, a register, a memory, a
//! control unit or a plain closure. Components never hold references into the circuit;
//! they keep wire handles and reach signal state only through the [`Signals`] context
//! passed to [`Component::evaluate`].

use std::fmt;

use super::signals::Signals;
use crate::logic::memory::Memory;

/// Identifier of a component registered with a circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    /// Position of the component in registration order.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behaviour attached to a set of nets.
///
/// `evaluate` runs whenever a subscribed net changes (or rises, for edge subscriptions),
/// whenever a wake-up scheduled by the component fires, and once at registration.
pub trait Component {
    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "component"
    }

    /// Reads inputs and schedules or writes outputs.
    fn evaluate(&mut self, signals: &mut Signals<'_>);

    /// Backing memory, for components that own one.
    fn memory(&self) -> Option<&Memory> {
        None
    }

    /// Mutable backing memory, for components that own one.
    fn memory_mut(&mut self) -> Option<&mut Memory> {
        None
    }
}

impl<F> Component for F
where
    F: FnMut(&mut Signals<'_>),
{
    fn name(&self) -> &'static str {
        "closure"
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        self(signals);
    }
}

//! Scheduled circuit actions.

use super::component::ComponentId;
use crate::net::{NetTable, Wire};

/// Payload queued on the circuit's scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Write one net.
    Drive {
        /// Target net.
        wire: Wire,
        /// Value to store.
        value: bool,
    },
    /// Write several nets as one step; dependents see the fully updated bus.
    DriveBus {
        /// Target nets and values, least-significant bit first.
        bits: Vec<(Wire, bool)>,
    },
    /// Re-run a component's `evaluate`.
    Wake(ComponentId),
}

impl Action {
    /// Rewrites every wire that now belongs to `survivor`'s net onto the survivor handle.
    pub(crate) fn retarget(&mut self, nets: &NetTable, survivor: Wire) {
        match self {
            Self::Drive { wire, .. } => {
                if nets.resolve(*wire) == survivor {
                    *wire = survivor;
                }
            }
            Self::DriveBus { bits } => {
                for (wire, _) in bits {
                    if nets.resolve(*wire) == survivor {
                        *wire = survivor;
                    }
                }
            }
            Self::Wake(_) => {}
        }
    }
}

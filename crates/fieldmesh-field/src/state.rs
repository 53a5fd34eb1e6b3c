//! Device round state: per-site slots that survive from round to round.

use std::any::{type_name, Any};
use std::collections::HashMap;

use tracing::warn;

use crate::{SiteKey, Value};

type Slot = Box<dyn Any + Send + Sync>;

/// Persistent storage of one device, indexed by call site.
///
/// A slot is created on the first round that reaches its site and lives as
/// long as the device. It is never shared with another device.
#[derive(Default)]
pub struct RoundState {
    slots: HashMap<SiteKey, Slot>,
}

impl RoundState {
    /// Empty state (a device that has not run yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Value last written at `site`, if any.
    ///
    /// A slot holding a different type is reported and treated as empty.
    pub fn read<T: Value>(&self, site: SiteKey) -> Option<T> {
        let slot = self.slots.get(&site)?;
        match slot.downcast_ref::<T>() {
            Some(value) => Some(value.clone()),
            None => {
                warn!(%site, expected = type_name::<T>(), "slot holds another type, ignoring it");
                None
            }
        }
    }

    /// Overwrite the slot at `site`.
    pub fn write<T: Value>(&mut self, site: SiteKey, value: T) {
        self.slots.insert(site, Box::new(value));
    }

    /// Whether a slot exists at `site`.
    pub fn contains(&self, site: SiteKey) -> bool {
        self.slots.contains_key(&site)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundState")
            .field("slots", &self.slots.len())
            .finish()
    }
}

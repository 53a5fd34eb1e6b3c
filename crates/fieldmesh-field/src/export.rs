//! What devices publish and what they receive.
//!
//! An [`Export`] holds one value per site a device visited in a round. The
//! delivery layer hands each device an [`Inbox`]: the freshest export it
//! holds from every other device, plus the physical distance to it. Rounds
//! only ever read an inbox.

use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use fieldmesh_topology::DeviceId;
use tracing::warn;

use crate::{Real, SiteKey, Time, Value};

/// Values one device exported in one round, keyed by site.
#[derive(Clone, Default)]
pub struct Export {
    values: HashMap<SiteKey, Arc<dyn Any + Send + Sync>>,
}

impl Export {
    /// Empty export.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `value` at `site`, replacing any previous value there.
    pub fn insert<T: Value>(&mut self, site: SiteKey, value: T) {
        self.values.insert(site, Arc::new(value));
    }

    /// The value at `site`, if present with type `T`.
    pub fn get<T: Value>(&self, site: SiteKey) -> Option<&T> {
        let value = self.values.get(&site)?;
        let typed = value.downcast_ref::<T>();
        if typed.is_none() {
            warn!(%site, expected = type_name::<T>(), "export holds another type, ignoring it");
        }
        typed
    }

    /// Number of exported values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Export {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Export")
            .field("sites", &self.values.len())
            .finish()
    }
}

/// A received export, stamped with the sender's round time.
#[derive(Debug, Clone)]
pub struct Message {
    /// Sender's round time when the export was produced
    pub sent_at: Time,
    /// The export itself, shared by every receiver
    pub export: Arc<Export>,
}

impl Message {
    /// Create a message.
    pub fn new(sent_at: Time, export: Arc<Export>) -> Self {
        Self { sent_at, export }
    }
}

/// The delivery layer's current view for one device.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    messages: BTreeMap<DeviceId, Message>,
    distances: BTreeMap<DeviceId, Real>,
}

impl Inbox {
    /// Empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message, keeping only the freshest per sender.
    ///
    /// Returns whether the message was stored.
    pub fn deliver(&mut self, from: DeviceId, message: Message) -> bool {
        match self.messages.get(&from) {
            Some(existing) if existing.sent_at > message.sent_at => false,
            _ => {
                self.messages.insert(from, message);
                true
            }
        }
    }

    /// Drop every message sent strictly before `horizon`.
    /// Returns number of messages dropped.
    pub fn prune(&mut self, horizon: Time) -> usize {
        let before = self.messages.len();
        self.messages.retain(|_, m| m.sent_at >= horizon);
        let dropped = before - self.messages.len();
        if dropped > 0 {
            self.distances.retain(|id, _| self.messages.contains_key(id));
        }
        dropped
    }

    /// Record the physical distance to a sender.
    pub fn set_distance(&mut self, to: DeviceId, distance: Real) {
        self.distances.insert(to, distance);
    }

    /// Physical distance to a sender, if known.
    pub fn distance(&self, to: DeviceId) -> Option<Real> {
        self.distances.get(&to).copied()
    }

    /// The freshest message from a sender.
    pub fn get(&self, from: DeviceId) -> Option<&Message> {
        self.messages.get(&from)
    }

    /// All held messages, in sender order.
    pub fn messages(&self) -> impl Iterator<Item = (DeviceId, &Message)> + '_ {
        self.messages.iter().map(|(&id, m)| (id, m))
    }

    /// Senders currently held.
    pub fn senders(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.messages.keys().copied()
    }

    /// Number of senders.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

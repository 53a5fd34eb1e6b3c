//! Fieldmesh Round Execution Model
//!
//! Every device repeatedly runs the same local program. There is no global
//! clock and no coordinator: a device only ever sees its own previous state
//! and whatever its neighbors most recently exported.
//!
//! # Primitives
//!
//! - [`Round::retain`]: read the value this call site produced in the
//!   device's previous round, update it, store it back.
//! - [`Round::neighbor`]: export a value for this call site and get back a
//!   [`NeighborField`] of every reachable device's latest export there.
//! - [`Round::share`]: both at once, the stabilizing update pattern
//!   `retain(default, v -> combine(v, neighbor(v)))`.
//!
//! Call sites are identified by [`SiteKey`]s derived from the scope path
//! ([`Round::call`] opens a scope) and the source location of each call, so
//! the same program position maps to the same slot on every round and every
//! device, whichever branches ran before it.
//!
//! # Reductions and gossip
//!
//! [`aggregate`] folds neighbor fields with an explicit identity element, so
//! an isolated device still gets a defined result. [`gossip`] provides the
//! timestamp-preferring merge and expiry of per-device records that
//! network-wide maxima are built from.
//!
//! # Execution
//!
//! A [`Device`] owns its [`RoundState`] and runs rounds against an [`Inbox`]
//! supplied by a delivery layer. [`Lockstep`] is the simplest such layer:
//! synchronous steps over an explicit link graph.

pub mod aggregate;
mod device;
mod export;
mod field;
pub mod gossip;
mod lockstep;
mod round;
mod state;
mod time;
mod trace;

pub use device::Device;
pub use export::{Export, Inbox, Message};
pub use field::NeighborField;
pub use lockstep::Lockstep;
pub use round::Round;
pub use state::RoundState;
pub use time::{RoundClock, Time};
pub use trace::{SiteKey, Trace};

pub use fieldmesh_topology::DeviceId;

/// Real-valued quantities (distances, gossiped payloads).
pub type Real = f64;

/// Anything that can live in a round-state slot or travel in an export.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Value for T {}

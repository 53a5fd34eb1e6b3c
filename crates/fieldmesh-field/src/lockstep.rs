//! Synchronous lock-step execution over an explicit link graph.
//!
//! Every device runs once per step, seeing the exports its linked neighbors
//! produced in the previous step. No message loss, no jitter: the easiest
//! schedule to reason about, and the one the algorithm tests use.

use std::collections::BTreeMap;
use std::sync::Arc;

use fieldmesh_topology::{DeviceId, LinkGraph};
use tracing::debug;

use crate::{Device, Export, Inbox, Message, Round, Time};

/// Lock-step network of devices.
#[derive(Debug)]
pub struct Lockstep {
    graph: LinkGraph,
    devices: BTreeMap<DeviceId, Device>,
    exports: BTreeMap<DeviceId, (Time, Arc<Export>)>,
    time: Time,
    period: Time,
}

impl Lockstep {
    /// One device per graph node, unit step period, time 0.
    pub fn new(graph: LinkGraph) -> Self {
        let devices = graph.devices().map(|id| (id, Device::new(id))).collect();
        Self {
            graph,
            devices,
            exports: BTreeMap::new(),
            time: 0.0,
            period: 1.0,
        }
    }

    /// Set the time between steps.
    #[must_use]
    pub fn with_period(mut self, period: Time) -> Self {
        self.period = period;
        self
    }

    /// Current time (the time the next step will run at).
    pub fn time(&self) -> Time {
        self.time
    }

    /// The link graph.
    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    /// Mutable link graph, for topology changes between steps.
    pub fn graph_mut(&mut self) -> &mut LinkGraph {
        &mut self.graph
    }

    /// A device by id.
    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(&id)
    }

    /// Add a device with no links (no-op if present).
    pub fn add_device(&mut self, id: DeviceId) {
        self.graph.add_device(id);
        self.devices.entry(id).or_insert_with(|| Device::new(id));
    }

    /// Remove a device: it stops running and its exports vanish.
    pub fn remove_device(&mut self, id: DeviceId) -> bool {
        self.graph.remove_device(id);
        self.exports.remove(&id);
        let removed = self.devices.remove(&id).is_some();
        if removed {
            debug!(device = %id, "device removed from lock-step network");
        }
        removed
    }

    /// Run one step of every device; returns each device's output.
    pub fn step<R, F>(&mut self, mut program: F) -> BTreeMap<DeviceId, R>
    where
        F: FnMut(&mut Round<'_>) -> R,
    {
        let mut outputs = BTreeMap::new();
        let mut next = BTreeMap::new();

        for (&id, device) in self.devices.iter_mut() {
            let mut inbox = Inbox::new();
            for (other, length) in self.graph.neighbors(id) {
                if let Some((sent_at, export)) = self.exports.get(&other) {
                    inbox.deliver(other, Message::new(*sent_at, Arc::clone(export)));
                    inbox.set_distance(other, length);
                }
            }

            let (output, export) = device.run(self.time, &inbox, &mut program);
            outputs.insert(id, output);
            next.insert(id, (self.time, Arc::new(export)));
        }

        self.exports = next;
        self.time += self.period;
        outputs
    }

    /// Run `steps` steps; returns the outputs of the last one.
    pub fn run<R, F>(&mut self, steps: usize, mut program: F) -> BTreeMap<DeviceId, R>
    where
        F: FnMut(&mut Round<'_>) -> R,
    {
        let mut outputs = BTreeMap::new();
        for _ in 0..steps {
            outputs = self.step(&mut program);
        }
        outputs
    }
}

//! Asynchronous network simulation with event recording.
//!
//! Each device runs on its own schedule: a random phase in the first
//! period, then intervals spread around the configured period. When a round
//! runs, the device's inbox is pruned of messages older than the retention
//! time, neighbor distances are refreshed from current positions, the program
//! runs, and the resulting export is delivered to every running device in
//! range at that moment.

use std::collections::BTreeMap;
use std::sync::Arc;

use fieldmesh_field::{Device, DeviceId, Inbox, Message, Real, Time};
use fieldmesh_topology::{Connector, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::schedule::{Action, Schedule};
use crate::storage::DeviceReading;
use crate::{Error, LogRow, Program, Result, SimEvent, SimulationConfig, Snapshot, Storage, Summary};

/// A device together with what the simulator tracks about it.
#[derive(Debug)]
struct Node {
    device: Device,
    position: Position,
    inbox: Inbox,
    storage: Storage,
    running: bool,
}

/// Simulates a network of devices running `P`, and records events.
pub struct Simulation<P> {
    config: SimulationConfig,
    connector: Connector,
    program: P,
    nodes: BTreeMap<DeviceId, Node>,
    schedule: Schedule,
    rng: StdRng,
    events: Vec<SimEvent>,
    time: Time,
}

impl<P: Program> Simulation<P> {
    /// Create an empty simulation at time 0.
    pub fn new(config: SimulationConfig, connector: Connector, program: P) -> Result<Self> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            connector,
            program,
            nodes: BTreeMap::new(),
            schedule: Schedule::new(),
            rng,
            events: Vec::new(),
            time: 0.0,
        })
    }

    /// Add a device at `position`; its first round falls within one period.
    pub fn spawn(&mut self, id: DeviceId, position: Position) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateDevice(id));
        }
        if !position.is_finite() {
            return Err(Error::InvalidConfig(format!("position of {id} is not finite: {position}")));
        }
        if let Some(graph) = self.connector.links_mut() {
            graph.add_device(id);
        }

        self.nodes.insert(
            id,
            Node {
                device: Device::new(id),
                position,
                inbox: Inbox::new(),
                storage: Storage::new(),
                running: true,
            },
        );
        let phase = self.rng.gen_range(0.0..self.config.round_period);
        self.schedule.push(self.time + phase, Action::Round(id));
        self.events.push(SimEvent::DeviceSpawned {
            device: id,
            position,
            time: self.time,
        });
        trace!(device = %id, %position, "device spawned");
        Ok(())
    }

    /// Spawn `count` devices at uniformly random positions in the area.
    ///
    /// Identities continue after the largest one in use.
    pub fn spawn_random(&mut self, count: usize) -> Result<Vec<DeviceId>> {
        let first = self.nodes.keys().next_back().map_or(0, |id| id.value() + 1);
        let size = self.config.area_size;
        let mut spawned = Vec::with_capacity(count);
        for value in first..first + count as u64 {
            let position = Position::new(self.rng.gen_range(0.0..size), self.rng.gen_range(0.0..size));
            let id = DeviceId(value);
            self.spawn(id, position)?;
            spawned.push(id);
        }
        Ok(spawned)
    }

    /// Stop a device now: it runs no more rounds and sends nothing more.
    pub fn halt(&mut self, id: DeviceId) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(Error::UnknownDevice(id))?;
        if node.running {
            node.running = false;
            self.events.push(SimEvent::DeviceHalted { device: id, time: self.time });
            debug!(device = %id, time = self.time, "device halted");
        }
        Ok(())
    }

    /// Stop a device once the simulation reaches `time`.
    pub fn halt_at(&mut self, id: DeviceId, time: Time) -> Result<()> {
        if !self.nodes.contains_key(&id) {
            return Err(Error::UnknownDevice(id));
        }
        self.schedule.push(time.max(self.time), Action::Halt(id));
        Ok(())
    }

    /// Move a device. Takes effect for messages sent from now on.
    pub fn move_device(&mut self, id: DeviceId, to: Position) -> Result<()> {
        if !to.is_finite() {
            return Err(Error::InvalidConfig(format!("position of {id} is not finite: {to}")));
        }
        let node = self.nodes.get_mut(&id).ok_or(Error::UnknownDevice(id))?;
        let from = std::mem::replace(&mut node.position, to);
        self.events.push(SimEvent::DeviceMoved {
            device: id,
            from,
            to,
            time: self.time,
        });
        Ok(())
    }

    /// Add an explicit link of the given length.
    pub fn link(&mut self, a: DeviceId, b: DeviceId, length: f64) -> Result<()> {
        for id in [a, b] {
            if !self.nodes.contains_key(&id) {
                return Err(Error::UnknownDevice(id));
            }
        }
        let graph = self.connector.links_mut().ok_or(Error::FixedTopology)?;
        graph.link_with_length(a, b, length)?;
        self.events.push(SimEvent::LinkAdded {
            a,
            b,
            length,
            time: self.time,
        });
        debug!(%a, %b, length, "link added");
        Ok(())
    }

    /// Remove an explicit link. Messages already delivered age out as usual.
    pub fn unlink(&mut self, a: DeviceId, b: DeviceId) -> Result<bool> {
        let graph = self.connector.links_mut().ok_or(Error::FixedTopology)?;
        let removed = graph.unlink(a, b);
        if removed {
            self.events.push(SimEvent::LinkRemoved { a, b, time: self.time });
            debug!(%a, %b, "link removed");
        }
        Ok(removed)
    }

    /// Execute every action due at or before `until`, then set the clock to it.
    pub fn run_until(&mut self, until: Time) {
        while let Some((time, action)) = self.schedule.pop_due(until) {
            self.time = self.time.max(time);
            match action {
                Action::Round(id) => self.execute_round(id),
                Action::Halt(id) => {
                    // Only scheduled for devices that exist
                    let _ = self.halt(id);
                }
            }
        }
        self.time = self.time.max(until);
    }

    /// Run to the configured end time, snapshotting every log period.
    ///
    /// `on_log` receives one row per log instant with `slots` summarized.
    pub fn run(&mut self, slots: &[&str], mut on_log: impl FnMut(&LogRow)) {
        let end = self.config.end_time;
        let period = self.config.log_period;
        let mut index = (self.time / period).ceil() as u64;
        loop {
            let at = index as Time * period;
            if at > end {
                break;
            }
            self.run_until(at);
            on_log(&LogRow::from_snapshot(&self.snapshot(), slots));
            index += 1;
        }
        self.run_until(end);
        info!(time = self.time, rounds = self.total_rounds(), events = self.events.len(), "simulation finished");
    }

    fn execute_round(&mut self, id: DeviceId) {
        let retain_time = self.config.retain_time;
        let time = self.time;

        let Some(node) = self.nodes.get(&id) else { return };
        if !node.running {
            return;
        }
        let position = node.position;
        let distances: Vec<(DeviceId, Real)> = node
            .inbox
            .senders()
            .filter_map(|other| {
                // Unlinked senders keep their last known distance until they age out
                let other_position = self.nodes.get(&other)?.position;
                Some((other, self.connector.distance(id, &position, other, &other_position)?))
            })
            .collect();

        let program = &mut self.program;
        let Some(node) = self.nodes.get_mut(&id) else { return };
        let Node {
            device,
            inbox,
            storage,
            ..
        } = node;

        let dropped = inbox.prune(time - retain_time);
        if dropped > 0 {
            trace!(device = %id, dropped, "expired messages");
        }
        for (other, distance) in distances {
            inbox.set_distance(other, distance);
        }

        let ((), export) = device.run(time, inbox, |round| program.round(round, storage));
        let export = Arc::new(export);

        let mut delivered = 0usize;
        for (&other, receiver) in self.nodes.iter_mut() {
            if receiver.running && self.connector.connected(id, &position, other, &receiver.position) {
                receiver.inbox.deliver(id, Message::new(time, Arc::clone(&export)));
                delivered += 1;
            }
        }
        trace!(device = %id, time, delivered, "export delivered");

        let next = time + self.next_interval();
        self.schedule.push(next, Action::Round(id));
    }

    /// Round interval: uniform around the period with the configured deviation.
    fn next_interval(&mut self) -> Time {
        let period = self.config.round_period;
        let spread = self.config.round_jitter * 3f64.sqrt();
        if spread > 0.0 {
            period * (1.0 + self.rng.gen_range(-spread..spread))
        } else {
            period
        }
    }

    /// Current simulation time.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Every event recorded so far.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Identities of every device ever spawned.
    pub fn device_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of devices still running.
    pub fn running_count(&self) -> usize {
        self.nodes.values().filter(|n| n.running).count()
    }

    /// Whether a device exists and has not been halted.
    pub fn is_running(&self, id: DeviceId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.running)
    }

    /// Current position of a device.
    pub fn position(&self, id: DeviceId) -> Option<Position> {
        self.nodes.get(&id).map(|n| n.position)
    }

    /// Display storage of a device.
    pub fn storage(&self, id: DeviceId) -> Option<&Storage> {
        self.nodes.get(&id).map(|n| &n.storage)
    }

    /// Rounds a device has completed.
    pub fn rounds(&self, id: DeviceId) -> Option<u64> {
        self.nodes.get(&id).map(|n| n.device.rounds())
    }

    /// Rounds completed by all devices together.
    pub fn total_rounds(&self) -> u64 {
        self.nodes.values().map(|n| n.device.rounds()).sum()
    }

    /// Actions still waiting in the schedule.
    pub fn pending_actions(&self) -> usize {
        self.schedule.len()
    }

    /// Readings of every device at the current time.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.time,
            devices: self
                .nodes
                .iter()
                .map(|(&id, node)| DeviceReading {
                    id,
                    position: node.position,
                    running: node.running,
                    rounds: node.device.rounds(),
                    storage: node.storage.clone(),
                })
                .collect(),
        }
    }

    /// Aggregate one storage slot over the running devices.
    pub fn summary(&self, slot: &str) -> Option<Summary> {
        self.snapshot().summary(slot)
    }
}

impl<P> std::fmt::Debug for Simulation<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("time", &self.time)
            .field("devices", &self.nodes.len())
            .field("pending", &self.schedule.len())
            .field("events", &self.events.len())
            .finish()
    }
}

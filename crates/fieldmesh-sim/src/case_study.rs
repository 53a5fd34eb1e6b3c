//! The diameter case study.
//!
//! Every device runs both diameter estimators side by side:
//!
//! - the pulse estimator (`hop_dist`, `hop_diam`) follows an elected leader,
//!   with hop counts scaled by the communication range so both estimators
//!   read as lengths;
//! - the continuous estimator (`stable_dist`, `stable_diam`) measures from
//!   device 100 for the first quarter of the run and from device 200 after.
//!
//! Device 0 (the initial leader) is halted at a quarter of the run, so the
//! pulse estimator has to re-elect and reconverge while the continuous one
//! switches source.

use fieldmesh_algorithms::{hop_diameter, stable_diameter, GossipElection};
use fieldmesh_field::{DeviceId, Real, Round, Time};
use fieldmesh_topology::Connector;

use crate::{Program, Result, Simulation, SimulationConfig, Storage};

/// Storage slots written by [`CaseStudy`].
pub const SLOTS: [&str; 4] = ["hop_dist", "hop_diam", "stable_dist", "stable_diam"];

const FIRST_SOURCE: DeviceId = DeviceId(100);
const SECOND_SOURCE: DeviceId = DeviceId(200);
const HALTED: DeviceId = DeviceId(0);

/// Program computing both diameter estimates.
#[derive(Debug, Clone)]
pub struct CaseStudy {
    comm_range: Real,
    switch_time: Time,
    discard_time: Time,
    election: GossipElection,
}

impl CaseStudy {
    /// Program parameters derived from `config`.
    pub fn new(config: &SimulationConfig) -> Self {
        let discard_time = config.discard_threshold();
        Self {
            comm_range: config.comm_range,
            switch_time: config.end_time / 4.0,
            discard_time,
            election: GossipElection::new(discard_time),
        }
    }

    /// Source of the continuous estimator at `time`.
    pub fn stable_source(&self, time: Time) -> DeviceId {
        if time > self.switch_time {
            SECOND_SOURCE
        } else {
            FIRST_SOURCE
        }
    }
}

impl Program for CaseStudy {
    fn round(&mut self, round: &mut Round<'_>, storage: &mut Storage) {
        let stable_source = self.stable_source(round.current_time());

        let hop = hop_diameter(round, &self.election, self.discard_time);
        let is_stable_source = round.uid() == stable_source;
        let stable = stable_diameter(round, is_stable_source);

        storage.set("hop_dist", hop.distance * self.comm_range);
        storage.set("hop_diam", hop.diameter * self.comm_range);
        storage.set("stable_dist", stable.distance);
        storage.set("stable_diam", stable.diameter);
        storage.set("source", if hop.source || stable.source { 1.0 } else { 0.0 });
    }
}

/// A ready-to-run case study: random deployment in range-based topology,
/// with the initial leader's halt scheduled.
pub fn simulation(config: SimulationConfig) -> Result<Simulation<CaseStudy>> {
    let program = CaseStudy::new(&config);
    let connector = Connector::fixed_range(config.comm_range)?;
    let count = config.device_count;
    let halt_time = config.end_time / 4.0;

    let mut sim = Simulation::new(config, connector, program)?;
    sim.spawn_random(count)?;
    if sim.device_ids().any(|id| id == HALTED) {
        sim.halt_at(HALTED, halt_time)?;
    }
    Ok(sim)
}

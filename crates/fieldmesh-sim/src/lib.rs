//! Fieldmesh Network Simulator
//!
//! The delivery layer the core crates leave out: devices on independent,
//! jittered round schedules exchanging exports over a changing topology.
//!
//! # Architecture
//!
//! - **Simulation**: owns devices, their inboxes and a time-ordered schedule
//!   of rounds; delivers each export to the devices in range when it is sent
//! - **Storage**: per-device named slots the program writes results into
//! - **Snapshot / Summary**: serializable readings of the whole network and
//!   min/max/mean aggregates of one slot
//! - **Events**: spawns, halts, moves and link changes, in a tagged log
//! - **Case study**: both diameter estimators over a random deployment
//!
//! # Usage
//!
//! ```ignore
//! let config = SimulationConfig::default().with_device_count(100);
//! let mut sim = case_study::simulation(config)?;
//! sim.run(&case_study::SLOTS, |row| println!("{}", serde_json::to_string(row).unwrap()));
//! ```

pub mod case_study;
mod config;
mod error;
mod events;
mod program;
mod schedule;
mod simulation;
mod storage;

pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use events::SimEvent;
pub use program::Program;
pub use simulation::Simulation;
pub use storage::{DeviceReading, LogRow, Snapshot, Storage, Summary};

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmesh_field::{DeviceId, Round};
    use fieldmesh_topology::{Connector, LinkGraph, Position};

    fn uptime(r: &mut Round<'_>, s: &mut Storage) {
        s.set("uptime", fieldmesh_algorithms::accumulate(r, 1.0));
    }

    #[test]
    fn simulation_records_events() {
        let graph = LinkGraph::complete((1..=3).map(DeviceId));
        let mut sim = Simulation::new(SimulationConfig::default(), Connector::explicit(graph), uptime).unwrap();
        for id in 1..=3 {
            sim.spawn(DeviceId(id), Position::ORIGIN).unwrap();
        }
        sim.halt(DeviceId(3)).unwrap();

        assert_eq!(sim.events().len(), 4);
        assert!(matches!(sim.events()[3], SimEvent::DeviceHalted { .. }));
    }

    #[test]
    fn summary_tracks_running_devices() {
        let config = SimulationConfig::default().with_rounds(1.0, 0.0);
        let mut sim = Simulation::new(config, Connector::fixed_range(10.0).unwrap(), uptime).unwrap();
        sim.spawn(DeviceId(1), Position::ORIGIN).unwrap();
        sim.spawn(DeviceId(2), Position::new(1.0, 0.0)).unwrap();
        sim.run_until(10.5);

        let summary = sim.summary("uptime").unwrap();
        assert_eq!(summary.count, 2);
        assert!(summary.min >= 10.0 && summary.max <= 11.0);
        assert_eq!(sim.summary("nothing"), None);
    }
}

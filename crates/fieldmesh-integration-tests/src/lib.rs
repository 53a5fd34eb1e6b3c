//! Shared fixtures for the end-to-end scenarios in `tests/`.

use std::sync::Once;

use fieldmesh_field::{DeviceId, Real, Time};
use fieldmesh_sim::{Program, Result, Simulation, SimulationConfig};
use fieldmesh_topology::{Connector, LinkGraph, Position};

/// Round period 1, jitter 0.1, retention 3: the evaluation defaults.
pub fn config() -> SimulationConfig {
    SimulationConfig::default()
}

/// A simulation over an explicit graph, every node spawned at time 0.
pub fn explicit<P: Program>(graph: LinkGraph, config: SimulationConfig, program: P) -> Result<Simulation<P>> {
    let ids: Vec<DeviceId> = graph.devices().collect();
    let mut sim = Simulation::new(config, Connector::explicit(graph), program)?;
    for id in ids {
        sim.spawn(id, Position::ORIGIN)?;
    }
    Ok(sim)
}

/// Read one slot of every running device.
pub fn readings<P: Program>(sim: &Simulation<P>, slot: &str) -> Vec<(DeviceId, Real)> {
    sim.device_ids()
        .filter(|&id| sim.is_running(id))
        .filter_map(|id| Some((id, sim.storage(id)?.get(slot)?)))
        .collect()
}

/// One device's slot.
pub fn reading<P: Program>(sim: &Simulation<P>, id: DeviceId, slot: &str) -> Option<Real> {
    sim.storage(id)?.get(slot)
}

/// Advance in unit steps, checking `check` after each one.
pub fn run_checked<P: Program>(sim: &mut Simulation<P>, until: Time, mut check: impl FnMut(&Simulation<P>)) {
    let mut t = sim.time().floor() + 1.0;
    while t <= until {
        sim.run_until(t);
        check(sim);
        t += 1.0;
    }
}

/// Connectivity of a range-based deployment, as an explicit graph.
pub fn range_graph<P: Program>(sim: &Simulation<P>, range: f64) -> LinkGraph {
    let placed: Vec<(DeviceId, Position)> = sim
        .device_ids()
        .filter(|&id| sim.is_running(id))
        .filter_map(|id| Some((id, sim.position(id)?)))
        .collect();
    let mut graph = LinkGraph::new();
    for (i, &(a, pa)) in placed.iter().enumerate() {
        graph.add_device(a);
        for &(b, pb) in &placed[i + 1..] {
            if pa.distance(&pb) <= range {
                // Both ids are distinct and the length is finite
                let _ = graph.link_with_length(a, b, pa.distance(&pb));
            }
        }
    }
    graph
}

/// Install a test log subscriber once; `RUST_LOG` selects verbosity.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

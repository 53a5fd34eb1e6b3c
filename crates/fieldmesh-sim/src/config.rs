//! Simulation configuration.

use std::path::Path;

use fieldmesh_field::Time;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for a simulation run.
///
/// Missing fields in a JSON config take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for positions and round scheduling
    pub seed: u64,
    /// Devices spawned at time 0
    pub device_count: usize,
    /// Side of the square deployment area
    pub area_size: f64,
    /// Fixed communication range
    pub comm_range: f64,
    /// How long a received message stays in an inbox
    pub retain_time: Time,
    /// Mean interval between two rounds of a device
    pub round_period: Time,
    /// Relative standard deviation of the round interval (uniformly distributed)
    pub round_jitter: f64,
    /// Simulation horizon
    pub end_time: Time,
    /// Gossip expiry threshold; derived from area and range when unset
    pub discard_time: Option<Time>,
    /// Interval between logged snapshots
    pub log_period: Time,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            device_count: 400,
            area_size: 1000.0,
            comm_range: 100.0,
            retain_time: 3.0,
            round_period: 1.0,
            round_jitter: 0.1,
            end_time: 200.0,
            discard_time: None,
            log_period: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Read a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set how many devices the case study spawns.
    #[must_use]
    pub fn with_device_count(mut self, count: usize) -> Self {
        self.device_count = count;
        self
    }

    /// Set the deployment area side and the communication range.
    #[must_use]
    pub fn with_area(mut self, size: f64, comm_range: f64) -> Self {
        self.area_size = size;
        self.comm_range = comm_range;
        self
    }

    /// Set how long received messages stay in an inbox.
    #[must_use]
    pub fn with_retain_time(mut self, retain_time: Time) -> Self {
        self.retain_time = retain_time;
        self
    }

    /// Set the mean round period and its relative jitter.
    #[must_use]
    pub fn with_rounds(mut self, period: Time, jitter: f64) -> Self {
        self.round_period = period;
        self.round_jitter = jitter;
        self
    }

    /// Set the simulation horizon.
    #[must_use]
    pub fn with_end_time(mut self, end_time: Time) -> Self {
        self.end_time = end_time;
        self
    }

    /// Override the gossip expiry threshold.
    #[must_use]
    pub fn with_discard_time(mut self, discard_time: Time) -> Self {
        self.discard_time = Some(discard_time);
        self
    }

    /// Set the interval between logged snapshots.
    #[must_use]
    pub fn with_log_period(mut self, log_period: Time) -> Self {
        self.log_period = log_period;
        self
    }

    /// Gossip expiry threshold: long enough for a value to cross the area.
    pub fn discard_threshold(&self) -> Time {
        self.discard_time
            .unwrap_or(self.area_size * 1.5 / self.comm_range)
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be positive, got {value}")))
            }
        }
        fn non_negative(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be non-negative, got {value}")))
            }
        }

        positive("area_size", self.area_size)?;
        positive("comm_range", self.comm_range)?;
        positive("round_period", self.round_period)?;
        positive("log_period", self.log_period)?;
        non_negative("retain_time", self.retain_time)?;
        non_negative("end_time", self.end_time)?;
        non_negative("discard_time", self.discard_threshold())?;

        // Uniform spread with this deviation reaches period * (1 ± jitter·√3).
        let spread = self.round_jitter * 3f64.sqrt();
        if !(self.round_jitter >= 0.0 && spread < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "round_jitter must be in [0, 1/√3), got {}",
                self.round_jitter
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.discard_threshold(), 15.0);
    }

    #[test]
    fn explicit_discard_time_wins() {
        let config = SimulationConfig::default().with_discard_time(4.0);
        assert_eq!(config.discard_threshold(), 4.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad = [
            SimulationConfig::default().with_rounds(0.0, 0.1),
            SimulationConfig::default().with_rounds(1.0, 0.6),
            SimulationConfig::default().with_rounds(1.0, -0.1),
            SimulationConfig::default().with_retain_time(-1.0),
            SimulationConfig::default().with_area(1000.0, f64::NAN),
            SimulationConfig::default().with_end_time(f64::INFINITY),
            SimulationConfig::default().with_log_period(0.0),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfig(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"device_count": 10, "end_time": 50}"#).unwrap();
        assert_eq!(config.device_count, 10);
        assert_eq!(config.end_time, 50.0);
        assert_eq!(config.seed, 42);
        assert_eq!(config.discard_time, None);
    }

    #[test]
    fn json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("fieldmesh-config-{}.json", std::process::id()));
        let config = SimulationConfig::default().with_seed(7).with_discard_time(9.0);
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = SimulationConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimulationConfig::from_json_file("/nonexistent/fieldmesh.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

//! Simulation configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

fn default_target_fps() -> u32 {
    60
}

fn default_snapshot_dir() -> String {
    "snapshots".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// 0 disables snapshots.
    pub every_ticks: u64,
    #[serde(default = "default_snapshot_dir")]
    pub dir: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            every_ticks: 0,
            dir: default_snapshot_dir(),
        }
    }
}

/// Parameters of a particle-life run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    pub seed: u64,
    pub particles: usize,
    /// Number of particle colors; also the interaction-matrix dimension.
    pub colors: usize,
    pub ticks: u64,
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    pub dt: f64,
    pub r_max: f64,
    pub beta: f64,
    pub friction_half_life: f64,
    pub force_factor: f64,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// The built-in particle-life scenario.
    pub fn particle_life() -> Self {
        Self {
            name: "particle_life".to_string(),
            seed: 7,
            particles: 1000,
            colors: 6,
            ticks: 600,
            target_fps: default_target_fps(),
            dt: 0.02,
            r_max: 0.1,
            beta: 0.3,
            friction_half_life: 0.04,
            force_factor: 10.0,
            snapshot: SnapshotConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Per-tick velocity retention derived from the friction half-life.
    pub fn friction_factor(&self) -> f64 {
        0.5f64.powf(self.dt / self.friction_half_life)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_life_defaults() {
        let config = SimulationConfig::particle_life();
        assert_eq!(config.particles, 1000);
        assert_eq!(config.colors, 6);
        assert!(config.friction_factor() < 1.0);
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.yaml");

        let config = SimulationConfig::particle_life();
        config.to_yaml(&path).unwrap();
        let loaded = SimulationConfig::from_yaml(&path).unwrap();

        assert_eq!(loaded.name, config.name);
        assert_eq!(loaded.seed, config.seed);
        assert_eq!(loaded.dt, config.dt);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "\
name: mini
seed: 1
particles: 10
colors: 3
ticks: 5
dt: 0.02
r_max: 0.1
beta: 0.3
friction_half_life: 0.04
force_factor: 10.0
";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.snapshot.every_ticks, 0);
        assert_eq!(config.snapshot.dir, "snapshots");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_logging_level_from_yaml() {
        let yaml = "\
name: mini
seed: 1
particles: 10
colors: 3
ticks: 5
dt: 0.02
r_max: 0.1
beta: 0.3
friction_half_life: 0.04
force_factor: 10.0
logging:
  level: debug
";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimulationConfig::from_yaml("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

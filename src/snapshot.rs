//! Periodic JSON snapshots of engine state

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ecs::{Engine, EntityId, Value};

/// One entity's state at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub components: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Full engine population at one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub tick: u64,
    pub entity_count: usize,
    pub entities: Vec<EntitySnapshot>,
}

impl Snapshot {
    /// Capture the current entity population.
    pub fn capture(engine: &Engine, name: &str, tick: u64) -> Self {
        let entities = engine
            .entities()
            .map(|entity| EntitySnapshot {
                id: entity.id(),
                components: entity
                    .components()
                    .map(|(component, instance)| {
                        let fields = instance
                            .fields()
                            .map(|(field, value)| (field.to_string(), value.clone()))
                            .collect();
                        (component.to_string(), fields)
                    })
                    .collect(),
            })
            .collect();

        Self {
            name: name.to_string(),
            tick,
            entity_count: engine.entity_count(),
            entities,
        }
    }

    /// Read a snapshot back from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parsing snapshot {}", path.display()))
    }
}

/// Writes the entity population to `dir/<name>/tick_NNNNNN.json` every
/// `interval_ticks` ticks. An interval of 0 disables writing.
#[derive(Debug)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, interval_ticks: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    fn should_write(&self, tick: u64) -> bool {
        self.interval_ticks != 0 && tick > 0 && tick % self.interval_ticks == 0
    }

    /// Write a snapshot if this tick falls on the interval.
    pub fn maybe_write(&self, engine: &Engine, name: &str, tick: u64) -> Result<Option<PathBuf>> {
        if !self.should_write(tick) {
            return Ok(None);
        }
        self.write(engine, name, tick).map(Some)
    }

    /// Write a snapshot unconditionally.
    pub fn write(&self, engine: &Engine, name: &str, tick: u64) -> Result<PathBuf> {
        let dir = self.output_dir.join(name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating snapshot dir {}", dir.display()))?;

        let snapshot = Snapshot::capture(engine, name, tick);
        let path = dir.join(format!("tick_{tick:06}.json"));
        fs::write(&path, serde_json::to_string_pretty(&snapshot)?)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        debug!(path = %path.display(), tick, "wrote snapshot");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::ComponentTemplate;

    fn small_engine() -> Engine {
        let mut engine = Engine::new();
        engine.register_component(
            "particle",
            ComponentTemplate::new()
                .field("px", 0.25)
                .field("color", 2)
                .field("alive", true)
                .field("label", "dot"),
        );
        engine.create_entities(2, &["particle"]);
        engine
    }

    #[test]
    fn test_interval_gating() {
        let writer = SnapshotWriter::new("unused", 10);
        assert!(!writer.should_write(0));
        assert!(!writer.should_write(5));
        assert!(writer.should_write(10));
        assert!(writer.should_write(20));

        let disabled = SnapshotWriter::new("unused", 0);
        assert!(!disabled.should_write(10));
    }

    #[test]
    fn test_writes_entity_state() {
        let dir = tempfile::tempdir().unwrap();
        let engine = small_engine();
        let writer = SnapshotWriter::new(dir.path(), 10);

        let path = writer
            .maybe_write(&engine, "demo", 10)
            .unwrap()
            .expect("tick 10 should snapshot");
        assert_eq!(path, dir.path().join("demo").join("tick_000010.json"));

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["tick"], 10);
        assert_eq!(parsed["entity_count"], 2);
        assert_eq!(parsed["entities"][0]["components"]["particle"]["px"], 0.25);
        assert_eq!(parsed["entities"][1]["components"]["particle"]["color"], 2);
    }

    #[test]
    fn test_load_round_trips_every_value_variant() {
        let dir = tempfile::tempdir().unwrap();
        let engine = small_engine();
        let writer = SnapshotWriter::new(dir.path(), 1);

        let path = writer.write(&engine, "demo", 3).unwrap();
        let loaded = Snapshot::load(&path).unwrap();

        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.tick, 3);
        assert_eq!(loaded.entity_count, 2);

        let particle = &loaded.entities[0].components["particle"];
        assert_eq!(particle["px"], Value::Float(0.25));
        assert_eq!(particle["color"], Value::Int(2));
        assert_eq!(particle["alive"], Value::Bool(true));
        assert_eq!(particle["label"], Value::from("dot"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Snapshot::load(dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_off_interval_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = small_engine();
        let writer = SnapshotWriter::new(dir.path(), 10);

        assert!(writer.maybe_write(&engine, "demo", 7).unwrap().is_none());
        assert!(!dir.path().join("demo").exists());
    }
}

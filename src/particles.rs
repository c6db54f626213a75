//! Particle-life simulation wired through the ECS engine
//!
//! The engine knows nothing about physics; everything here is user code
//! registered as component templates and system callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use tracing::info;

use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::ecs::{ComponentTemplate, Engine, Value};
use crate::rng::SimRng;
use crate::snapshot::SnapshotWriter;

/// Pairwise attraction/repulsion coefficients between colors, in [-1, 1).
pub fn interaction_matrix(rng: &mut SimRng, colors: usize) -> Vec<Vec<f64>> {
    (0..colors)
        .map(|_| (0..colors).map(|_| rng.next_range(-1.0, 1.0)).collect())
        .collect()
}

/// Build an engine holding the `particle` template and the `velocities` and
/// `positions` systems. Registration order matters: velocities must integrate
/// forces before positions integrates velocities.
pub fn build_engine(config: &SimulationConfig) -> Engine {
    let root = SimRng::new(config.seed);
    let matrix = interaction_matrix(&mut root.fork("matrix"), config.colors);
    let factory_rng = Rc::new(RefCell::new(root.fork("particles")));

    let mut engine = Engine::new();

    let colors = config.colors;
    let px_rng = Rc::clone(&factory_rng);
    let py_rng = Rc::clone(&factory_rng);
    let color_rng = Rc::clone(&factory_rng);
    engine.register_component(
        "particle",
        ComponentTemplate::new()
            .factory("px", move || Value::Float(px_rng.borrow_mut().next_f64()))
            .factory("py", move || Value::Float(py_rng.borrow_mut().next_f64()))
            .field("vx", 0.0)
            .field("vy", 0.0)
            .factory("color", move || {
                Value::Int(color_rng.borrow_mut().next_index(colors) as i64)
            }),
    );

    let dt = config.dt;
    let r_max = config.r_max;
    let beta = config.beta;
    let force_factor = config.force_factor;
    let friction = config.friction_factor();

    engine.register_system("velocities", &["particle"], move |entities| {
        // positions and colors are read for the whole batch before any
        // velocity is written
        let state: Vec<(f64, f64, usize)> = entities
            .iter()
            .map(|entity| {
                let p = entity.component("particle");
                (
                    p.and_then(|c| c.number("px")).unwrap_or(0.0),
                    p.and_then(|c| c.number("py")).unwrap_or(0.0),
                    p.and_then(|c| c.get("color"))
                        .and_then(Value::as_i64)
                        .unwrap_or(0) as usize,
                )
            })
            .collect();

        for (i, entity) in entities.iter_mut().enumerate() {
            let (px, py, color) = state[i];
            let mut total_fx = 0.0;
            let mut total_fy = 0.0;

            for (j, &(other_px, other_py, other_color)) in state.iter().enumerate() {
                if i == j {
                    continue;
                }

                // shortest displacement on the unit torus
                let mut rx = other_px - px;
                let mut ry = other_py - py;
                if rx.abs() > 0.5 {
                    rx -= rx.signum();
                }
                if ry.abs() > 0.5 {
                    ry -= ry.signum();
                }

                let r = rx.hypot(ry);
                if r <= 0.0 || r >= r_max {
                    continue;
                }

                let d = r / r_max;
                let force = if d < beta {
                    d / beta - 1.0
                } else {
                    matrix[color][other_color] * (1.0 - (2.0 * d - 1.0 - beta).abs() / (1.0 - beta))
                };

                total_fx += rx / r * force;
                total_fy += ry / r * force;
            }

            total_fx *= r_max * force_factor;
            total_fy *= r_max * force_factor;

            let Some(p) = entity.component_mut("particle") else {
                continue;
            };
            let vx = p.number("vx").unwrap_or(0.0) * friction + total_fx * dt;
            let vy = p.number("vy").unwrap_or(0.0) * friction + total_fy * dt;
            p.set_number("vx", vx);
            p.set_number("vy", vy);
        }
    });

    engine.register_system("positions", &["particle"], move |entities| {
        for entity in entities.iter_mut() {
            let Some(p) = entity.component_mut("particle") else {
                continue;
            };
            let px = (p.number("px").unwrap_or(0.0) + p.number("vx").unwrap_or(0.0) * dt)
                .rem_euclid(1.0);
            let py = (p.number("py").unwrap_or(0.0) + p.number("vy").unwrap_or(0.0) * dt)
                .rem_euclid(1.0);
            p.set_number("px", px);
            p.set_number("py", py);
        }
    });

    engine
}

/// End-of-run report.
#[derive(Debug)]
pub struct RunSummary {
    pub name: String,
    pub ticks: u64,
    pub entities: usize,
    pub average_delta_ms: f64,
}

/// Run the configured simulation under the frame clock, snapshotting per the
/// config interval.
pub fn run(config: &SimulationConfig) -> Result<RunSummary> {
    let mut engine = build_engine(config);
    engine.create_entities(config.particles, &["particle"]);

    let writer = SnapshotWriter::new(&config.snapshot.dir, config.snapshot.every_ticks);
    let mut clock = Clock::new(config.target_fps);

    let mut tick: u64 = 0;
    clock.try_run(config.ticks, |_| {
        engine.tick();
        tick += 1;
        writer.maybe_write(&engine, &config.name, tick).map(|_| ())
    })?;

    info!(name = %config.name, ticks = tick, entities = engine.entity_count(), "simulation complete");
    Ok(RunSummary {
        name: config.name.clone(),
        ticks: tick,
        entities: engine.entity_count(),
        average_delta_ms: clock.average_delta_ms(),
    })
}

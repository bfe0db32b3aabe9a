//! Headless dam break
//!
//! Packs the fluid into the left third of the box and lets it collapse.
//! Prints a short summary every 25 ticks.
//!
//! Run with: RUST_LOG=info cargo run --release --example dam_break [config.json] [--realtime]

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sph::{DensityCutoff, ExecutionModel, Frame, Interaction, Particle, Renderer, SimConfig, SimError, Simulation, Vec2};

const TICKS: u64 = 500;
const REPORT_EVERY: u64 = 25;

/// Renderer that only reports statistics.
struct ConsoleRenderer {
    started: Instant,
}

impl Renderer for ConsoleRenderer {
    fn present(&mut self, frame: &Frame<'_>) {
        if frame.tick() % REPORT_EVERY != 0 {
            return;
        }
        let n = frame.len().max(1) as f32;
        let centroid = frame.positions().fold(Vec2::ZERO, |acc, p| acc + p) / n;
        let mean_color = frame.colors().sum::<f32>() / n;
        let hot = frame.colors().filter(|&c| c >= 1.0).count();
        println!(
            "tick {:4} | {:7.1?} | centroid ({:6.3}, {:6.3}) | mean speed color {:.3} | saturated {}",
            frame.tick(),
            self.started.elapsed(),
            centroid.x,
            centroid.y,
            mean_color,
            hot
        );
    }
}

fn dam_column(config: &SimConfig) -> Vec<Particle> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or(0));
    let width = (config.box_max.x - config.box_min.x) / 3.0;
    let max = Vec2::new(config.box_min.x + width, config.box_max.y);
    (0..config.particle_count)
        .map(|_| {
            Particle::at(Vec2::new(
                rng.gen_range(config.box_min.x..max.x),
                rng.gen_range(config.box_min.y..max.y),
            ))
        })
        .collect()
}

fn main() -> Result<(), SimError> {
    env_logger::init();

    let mut config_path = None;
    let mut realtime = false;
    for arg in std::env::args().skip(1) {
        if arg == "--realtime" {
            realtime = true;
        } else {
            config_path = Some(arg);
        }
    }

    let config = match config_path {
        Some(path) => SimConfig::load_json(path)?,
        None => SimConfig {
            particle_count: 2000,
            kernel_radius: 0.35,
            density_cutoff: DensityCutoff::Consistent,
            mass: 1.0,
            stiffness: 400.0,
            rest_density: 25.0,
            viscosity: 2.0,
            time_step: 0.002,
            interaction_pressure: 20.0,
            interaction_radius: 1.0,
            execution: ExecutionModel::Parallel,
            seed: Some(7),
            ..SimConfig::default()
        },
    };

    println!("=== SPH dam break ===");
    println!(
        "{} particles, h = {}, dt = {}, {:?}",
        config.particle_count, config.kernel_radius, config.time_step, config.execution
    );

    let interval = config.tick_interval();
    let mut sim = Simulation::with_particles(config.clone(), dam_column(&config))?;
    let mut renderer = ConsoleRenderer {
        started: Instant::now(),
    };

    for tick in 0..TICKS {
        let tick_start = Instant::now();
        // Stir the surge halfway through.
        let pointer = (TICKS / 2..TICKS / 2 + 50)
            .contains(&tick)
            .then(|| Interaction::push(Vec2::new(0.0, config.box_min.y + 0.5)));
        sim.step(pointer)?;
        sim.publish(&mut renderer);

        if realtime {
            let spent = tick_start.elapsed();
            if spent < interval {
                std::thread::sleep(interval - spent);
            }
        }
    }

    let particles = sim.teardown();
    let escaped = particles.iter().filter(|p| !p.is_finite()).count();
    println!("done: {} particles, {} non-finite", particles.len(), escaped);
    if escaped > 0 {
        println!("warning: reduce time_step or stiffness");
    }
    Ok(())
}

// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Runs a reference configuration for a fixed number of ticks and prints
//! energy and collision diagnostics, the way a driver binary assembling a
//! real run would.
//!
//! Particle placement here is a simple grid-plus-jitter layout generated
//! with a small linear congruential generator, not a production initial
//! -condition policy — that, and CLI argument parsing, are left to
//! whatever binary actually ships this core.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use sphere_sim::particle::Particle;
use sphere_sim::settings::Settings;
use sphere_sim::sim::{LoopCommand, SimulationLoop};
use sphere_sim::vector::Vector3;

/// A minimal linear congruential generator, good enough for scattering
/// initial positions and velocities without pulling in a dependency.
struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng(seed)
    }

    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) as f64) / (u32::MAX as f64)
    }

    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

fn build_particles(settings: &Settings<f64>, rng: &mut SimpleRng) -> Vec<Particle<f64>> {
    let half = settings.box_width.x() * 0.4;
    (0..settings.particle_count)
        .map(|i| {
            let position = Vector3::new(
                rng.range(-half, half),
                rng.range(-half, half),
                rng.range(-half, half),
            );
            let speed = rng.range(settings.v_min, settings.v_max);
            let angle = rng.range(0.0, std::f64::consts::TAU);
            let velocity = Vector3::new(speed * angle.cos(), speed * angle.sin(), 0.0);
            let radius = rng.range(settings.radius_min, settings.radius_max);
            let mass = rng.range(settings.mass_min, settings.mass_max);
            let mut p = Particle::new(position, velocity, radius, mass);
            p.set_uid(i as u64 + 1);
            p
        })
        .collect()
}

fn total_kinetic_energy(particles: &[Particle<f64>]) -> f64 {
    particles.iter().map(|p| p.kinetic_energy()).sum()
}

fn main() {
    tracing_subscriber_init();

    let mut settings = Settings::<f64>::reference();
    settings.particle_count = 40;
    settings.validate().expect("reference configuration must validate");

    let mut rng = SimpleRng::new(0xC0FFEE);
    let particles = build_particles(&settings, &mut rng);
    let initial_energy = total_kinetic_energy(&particles);

    let (tx, rx) = mpsc::channel();
    let mut sim = SimulationLoop::new(&settings, particles, true, Some(rx));
    let ring = sim.ring();

    let publisher_should_stop = Arc::new(AtomicBool::new(false));
    let publisher = {
        let ring = ring.clone();
        let should_stop = Arc::clone(&publisher_should_stop);
        thread::Builder::new()
            .name("sphere-sim-publisher".into())
            .spawn(move || sphere_sim::ring::run_publisher(&ring, || should_stop.load(Ordering::Relaxed)))
            .expect("failed to spawn publisher thread")
    };

    const TICKS: u64 = 500;
    for _ in 0..TICKS {
        tx.send(LoopCommand::SingleStep).ok();
    }
    tx.send(LoopCommand::Shutdown).ok();
    sim.run();

    publisher_should_stop.store(true, Ordering::Relaxed);
    publisher.join().expect("publisher thread panicked");

    let final_energy = total_kinetic_energy(&ring.latest());
    let counters = sim.counters();

    println!("ticks run:            {}", counters.ticks);
    println!("collisions resolved:  {}", counters.collisions_resolved);
    println!("collisions corrected: {}", counters.collisions_corrected);
    println!("collisions orphaned:  {}", counters.collisions_inconsistent);
    println!("wall bounces:         {}", counters.bounces);
    println!("initial energy:       {initial_energy:.4}");
    println!("final energy:         {final_energy:.4}");
}

fn tracing_subscriber_init() {
    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    );
}

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
//! The per-tick simulation loop: gravity, integration, pairwise collision,
//! wall bounce, and publication, in that order, once per tick.
//!
//! Pause and single-step are driven by a command channel rather than
//! shared boolean flags the original toggled from outside the simulator
//! thread — a channel makes the handoff an explicit, ordered message
//! rather than a racy flag read, and needs no `unsafe` or atomics beyond
//! what `std::sync::mpsc` already provides.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::particle::Particle;
use crate::physics::{self, BounceStatus, CollisionStatus, PhysicsContext};
use crate::ring::SnapshotRing;
use crate::scalar::Scalar;
use crate::settings::Settings;
use crate::vector::Vector3;
use crate::wall::Wall;

/// A command sent to a running [`SimulationLoop`] from another thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCommand {
    /// Stop stepping automatically until `Resume` or `SingleStep`.
    Pause,
    /// Resume automatic stepping.
    Resume,
    /// Execute exactly one tick and remain paused.
    SingleStep,
    /// Stop the loop entirely.
    Shutdown,
}

/// Running counters a driver can use for diagnostics, matching the
/// original's end-of-run summary counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationCounters {
    pub ticks: u64,
    pub collisions_resolved: u64,
    pub collisions_corrected: u64,
    pub collisions_inconsistent: u64,
    pub bounces: u64,
}

/// Owns the particle set, the boundary walls, the physics parameters, and
/// the snapshot ring, and drives one tick at a time.
pub struct SimulationLoop<S: Scalar> {
    particles: Vec<Particle<S>>,
    physics: PhysicsContext<S, Arc<SnapshotRing<S>>>,
    ring: Arc<SnapshotRing<S>>,
    tick: S,
    free_run: bool,
    counters: SimulationCounters,
    paused: bool,
    commands: Option<Receiver<LoopCommand>>,
}

impl<S: Scalar> SimulationLoop<S> {
    /// Builds a simulation loop from a validated configuration and an
    /// initial particle set (each particle expected to already carry a
    /// latched, nonzero UID). Shares ownership of the snapshot ring with
    /// the caller, who is expected to spawn
    /// [`crate::ring::run_publisher`] against the same `Arc`.
    pub fn new(
        settings: &Settings<S>,
        particles: Vec<Particle<S>>,
        free_run: bool,
        commands: Option<Receiver<LoopCommand>>,
    ) -> Self {
        let half_extents = settings.box_width.clone() * S::from_f64(0.5);
        let boundaries = Wall::box_from_half_extents(&half_extents).to_vec();

        let ring = Arc::new(SnapshotRing::new());
        ring.seed(particles.clone());

        let physics = PhysicsContext::new(
            settings.gravity_magnitude,
            settings.gravity_angle,
            settings.tick,
            settings.tau,
            boundaries,
            Arc::clone(&ring),
        );

        SimulationLoop {
            particles,
            physics,
            ring,
            tick: settings.tick,
            free_run,
            counters: SimulationCounters::default(),
            paused: false,
            commands,
        }
    }

    /// The shared snapshot ring. Clone this `Arc` to spawn a publisher
    /// thread or to read frames from a renderer.
    pub fn ring(&self) -> Arc<SnapshotRing<S>> {
        Arc::clone(&self.ring)
    }

    /// Current diagnostic counters.
    pub fn counters(&self) -> SimulationCounters {
        self.counters
    }

    /// Runs one tick: gravity, integration, pairwise collision, wall
    /// bounce, and publication.
    #[instrument(skip(self), fields(tick = self.counters.ticks))]
    pub fn step_once(&mut self) {
        self.integrate_all();

        let n = self.particles.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (left, right) = self.particles.split_at_mut(j);
                let status = self.physics.collide(&mut left[i], &mut right[0]);
                match status {
                    CollisionStatus::Success => self.counters.collisions_resolved += 1,
                    CollisionStatus::Corrected => self.counters.collisions_corrected += 1,
                    CollisionStatus::Inconsistent => self.counters.collisions_inconsistent += 1,
                    CollisionStatus::NoCollision => {}
                }
            }
        }

        for particle in &mut self.particles {
            if self.physics.bounce_all(particle) == BounceStatus::Success {
                self.counters.bounces += 1;
            }
        }

        loop {
            match self.ring.get_writeable() {
                Ok(mut frame) => {
                    frame.clear();
                    frame.extend(self.particles.iter().cloned());
                    break;
                }
                Err(_) => std::thread::yield_now(),
            }
        }
        self.ring.put();

        self.counters.ticks += 1;
        debug!(
            ticks = self.counters.ticks,
            collisions = self.counters.collisions_resolved,
            corrected = self.counters.collisions_corrected,
            inconsistent = self.counters.collisions_inconsistent,
            bounces = self.counters.bounces,
            "tick complete"
        );
    }

    /// Applies gravity and integrates position for every particle. Gravity
    /// and integration only ever touch the particle they're given, so this
    /// is embarrassingly parallel — unlike the pairwise collision pass,
    /// which mutates two particles at once and stays sequential.
    ///
    /// Gravity's components are copied out as plain scalars rather than
    /// capturing `&PhysicsContext` in the worker closure: `Vector3`'s
    /// magnitude cache is a `Cell`, so a `Vector3` reference shared across
    /// rayon's worker threads would not be `Sync`. Each worker builds its
    /// own local `Vector3` from the copied components instead.
    #[cfg(feature = "parallel")]
    fn integrate_all(&mut self) {
        use rayon::prelude::*;
        let (gx, gy, gz) = self.physics.gravity_components();
        let dt = self.tick;
        self.particles.par_iter_mut().for_each(move |particle| {
            let g = Vector3::new(gx, gy, gz);
            physics::gravity(particle, dt, &g);
            physics::step(particle, dt);
        });
    }

    #[cfg(not(feature = "parallel"))]
    fn integrate_all(&mut self) {
        for particle in &mut self.particles {
            self.physics.apply_gravity(particle);
            self.physics.integrate(particle);
        }
    }

    /// Drains pending commands without blocking, updating pause state and
    /// returning `true` if a shutdown was requested.
    fn drain_commands(&mut self) -> bool {
        let Some(rx) = &self.commands else {
            return false;
        };
        loop {
            match rx.try_recv() {
                Ok(LoopCommand::Pause) => self.paused = true,
                Ok(LoopCommand::Resume) => self.paused = false,
                Ok(LoopCommand::SingleStep) => {
                    self.paused = true;
                    self.step_once();
                }
                Ok(LoopCommand::Shutdown) => return true,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }

    /// Runs ticks until a `Shutdown` command arrives (or the channel is
    /// dropped), pacing itself to the configured tick duration unless
    /// `free_run` was set at construction, in which case it steps as fast
    /// as it can.
    pub fn run(&mut self) {
        info!(free_run = self.free_run, "simulation loop starting");
        let tick_duration = Duration::from_secs_f64(self.tick.to_f64().max(0.0));

        loop {
            if self.drain_commands() {
                break;
            }
            if self.paused {
                std::thread::sleep(Duration::from_millis(1));
                continue;
            }

            let tick_start = Instant::now();
            self.step_once();

            if !self.free_run {
                let elapsed = tick_start.elapsed();
                if elapsed < tick_duration {
                    std::thread::sleep(tick_duration - elapsed);
                }
            }
        }
        info!(ticks = self.counters.ticks, "simulation loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector3;
    use std::sync::mpsc;

    fn two_particles() -> Vec<Particle<f64>> {
        let mut a = Particle::new(
            Vector3::new(-5.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        let mut b = Particle::new(
            Vector3::new(5.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        a.set_uid(1);
        b.set_uid(2);
        vec![a, b]
    }

    #[test]
    fn step_once_publishes_a_frame() {
        let settings = Settings::<f64>::reference();
        let mut sim = SimulationLoop::new(&settings, two_particles(), true, None);
        sim.step_once();
        assert_eq!(sim.ring().latest().len(), 2);
        assert_eq!(sim.counters().ticks, 1);
    }

    #[test]
    fn shutdown_command_stops_the_loop() {
        let settings = Settings::<f64>::reference();
        let (tx, rx) = mpsc::channel();
        let mut sim = SimulationLoop::new(&settings, two_particles(), true, Some(rx));
        tx.send(LoopCommand::Shutdown).unwrap();
        sim.run();
        assert_eq!(sim.counters().ticks, 0);
    }

    #[test]
    fn single_step_advances_exactly_one_tick_while_paused() {
        let settings = Settings::<f64>::reference();
        let (tx, rx) = mpsc::channel();
        let mut sim = SimulationLoop::new(&settings, two_particles(), true, Some(rx));
        tx.send(LoopCommand::SingleStep).unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();
        sim.run();
        assert_eq!(sim.counters().ticks, 1);
    }
}

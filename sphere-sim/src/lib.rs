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
//! # sphere-sim
//!
//! A rigid-sphere physics core: gravity, Euler-ish integration, pairwise
//! elastic collision resolution with sub-step repair, and axis-aligned
//! wall bounce, all generic over a pluggable [`scalar::Scalar`] numeric
//! substrate (`f32`, `f64`, or a deterministic fixed-point type).
//!
//! ## Features
//!
//! - **Pluggable precision**: run the same physics on `f32`, `f64`, or
//!   [`scalar::Fixed`] deterministic fixed-point, chosen at compile time.
//! - **Lazy caching**: vector magnitude, particle kinetic energy, and
//!   inverse mass are computed once and cached until a mutation
//!   invalidates them.
//! - **Sub-step repair**: a collision whose direct impulse fails an
//!   energy-conservation check is replayed from the last published
//!   snapshot at finer time resolutions before being given up on.
//! - **Lock-light publication**: the simulation loop publishes each
//!   tick's particle state into a depth-10 ring a renderer thread can read
//!   independently of the simulator's cadence.
//!
//! ## Example
//!
//! ```rust
//! use sphere_sim::particle::Particle;
//! use sphere_sim::settings::Settings;
//! use sphere_sim::sim::SimulationLoop;
//! use sphere_sim::vector::Vector3;
//!
//! let settings = Settings::<f64>::reference();
//! let mut a = Particle::new(Vector3::new(-5.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 1.0, 1.0);
//! let mut b = Particle::new(Vector3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0), 1.0, 1.0);
//! a.set_uid(1);
//! b.set_uid(2);
//!
//! let mut sim = SimulationLoop::new(&settings, vec![a, b], true, None);
//! sim.step_once();
//! assert_eq!(sim.ring().latest().len(), 2);
//! ```

#![warn(missing_docs)]

/// Typed error kinds for the scalar substrate and configuration
/// validation.
pub mod error;

/// A rigid sphere: position, velocity, radius, mass, and write-once UID.
pub mod particle;

/// Gravity, integration, collision resolution, and wall bounce.
pub mod physics;

/// The depth-10 snapshot ring a renderer thread reads from.
pub mod ring;

/// The numeric substrate (`f32`, `f64`, or deterministic fixed-point).
pub mod scalar;

/// Simulation configuration.
pub mod settings;

/// The per-tick simulation loop.
pub mod sim;

/// A three-component vector with lazily cached magnitude.
pub mod vector;

/// Axis-aligned boundary planes of the simulation box.
pub mod wall;

pub use error::{ConfigError, ScalarError};
pub use particle::Particle;
pub use scalar::{Fixed, Scalar};
pub use vector::Vector3;
pub use wall::Wall;

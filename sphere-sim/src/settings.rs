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
//! Simulation configuration.
//!
//! `Settings` holds every knob the original `sim_settings.h` exposed, plus
//! the tick duration and energy tolerance the original hard-coded as
//! constants. It is immutable once built: a driver constructs one,
//! validates it, and hands it to the initial-condition builder and the
//! simulation loop. Nothing in this crate ever reloads or mutates a live
//! `Settings`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scalar::Scalar;
use crate::vector::Vector3;

/// Simulation configuration, generic over the scalar backing the values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings<S: Scalar> {
    /// Number of particles to generate.
    pub particle_count: usize,
    /// Minimum initial speed.
    pub v_min: S,
    /// Maximum initial speed.
    pub v_max: S,
    /// If set, every particle is given exactly this speed instead of one
    /// drawn from `[v_min, v_max]`.
    pub v_all: Option<S>,
    /// Fixed launch angle in degrees. Ignored when `random_angle` is set.
    pub start_angle: S,
    /// Whether each particle's launch angle should be drawn uniformly at
    /// random rather than fixed to `start_angle`.
    pub random_angle: bool,
    /// Minimum radius.
    pub radius_min: S,
    /// Maximum radius.
    pub radius_max: S,
    /// If set, every particle uses exactly this radius.
    pub radius_all: Option<S>,
    /// Minimum mass.
    pub mass_min: S,
    /// Maximum mass.
    pub mass_max: S,
    /// If set, every particle uses exactly this mass.
    pub mass_all: Option<S>,
    /// Gravitational acceleration magnitude. Zero disables gravity.
    pub gravity_magnitude: S,
    /// Gravity direction in degrees, measured the same way `start_angle`
    /// is.
    pub gravity_angle: S,
    /// Full box width along x, y, z. The box is centered on the origin, so
    /// each wall sits at `+/- width / 2`.
    pub box_width: Vector3<S>,
    /// Fraction of summed radii an initial-condition generator should treat
    /// as the minimum separation when placing particles, in `(0, 1]`. Not
    /// consumed by the physics core's collision gates themselves.
    pub overlap_detection: S,
    /// Whether a driver should render frames as they're produced.
    pub display_mode: bool,
    /// Delay between rendered frames, in seconds, when `display_mode` is
    /// set.
    pub delay_seconds: S,
    /// UIDs a driver should log detailed per-event traces for.
    pub trace_uids: Vec<u64>,
    /// Whether a driver should print summary diagnostics.
    pub info: bool,
    /// Nominal tick duration, in seconds.
    pub tick: S,
    /// Energy-conservation tolerance used by the collision resolver's
    /// consistency check.
    pub tau: S,
    /// Number of slots in the snapshot ring.
    pub ring_depth: usize,
}

impl<S: Scalar> Settings<S> {
    /// A reference configuration matching the original simulator's
    /// defaults: 400 particles, radius 10-20, mass 1-10, speed 0-100, a
    /// 1000x1000x1000 box, gravity off, 10ms ticks, tau 0.1.
    pub fn reference() -> Self {
        Settings {
            particle_count: 400,
            v_min: S::zero(),
            v_max: S::from_f64(100.0),
            v_all: None,
            start_angle: S::zero(),
            random_angle: true,
            radius_min: S::from_f64(10.0),
            radius_max: S::from_f64(20.0),
            radius_all: None,
            mass_min: S::from_f64(1.0),
            mass_max: S::from_f64(10.0),
            mass_all: None,
            gravity_magnitude: S::zero(),
            gravity_angle: S::from_f64(270.0),
            box_width: Vector3::new(
                S::from_f64(1000.0),
                S::from_f64(1000.0),
                S::from_f64(1000.0),
            ),
            overlap_detection: S::from_f64(0.95),
            display_mode: false,
            delay_seconds: S::zero(),
            trace_uids: Vec::new(),
            info: false,
            tick: S::from_f64(0.01),
            tau: S::from_f64(0.1),
            ring_depth: crate::ring::DEPTH,
        }
    }

    /// Checks that this configuration describes a runnable simulation.
    /// Called by a driver before starting the simulation loop; failures
    /// map to a non-zero process exit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ConfigurationInvalid(
                "particle_count must be greater than zero".into(),
            ));
        }
        if self.radius_min > self.radius_max || self.radius_min <= S::zero() {
            return Err(ConfigError::ConfigurationInvalid(
                "radius_min must be positive and not exceed radius_max".into(),
            ));
        }
        if self.mass_min > self.mass_max || self.mass_min <= S::zero() {
            return Err(ConfigError::ConfigurationInvalid(
                "mass_min must be positive and not exceed mass_max".into(),
            ));
        }
        if self.v_min > self.v_max || self.v_min < S::zero() {
            return Err(ConfigError::ConfigurationInvalid(
                "v_min must be non-negative and not exceed v_max".into(),
            ));
        }
        if self.box_width.x() <= S::zero()
            || self.box_width.y() <= S::zero()
            || self.box_width.z() <= S::zero()
        {
            return Err(ConfigError::ConfigurationInvalid(
                "box_width components must all be positive".into(),
            ));
        }
        if self.overlap_detection <= S::zero() || self.overlap_detection > S::one() {
            return Err(ConfigError::ConfigurationInvalid(
                "overlap_detection must be in (0, 1]".into(),
            ));
        }
        if self.tick <= S::zero() {
            return Err(ConfigError::ConfigurationInvalid(
                "tick duration must be positive".into(),
            ));
        }
        if self.tau <= S::zero() {
            return Err(ConfigError::ConfigurationInvalid(
                "tau must be positive".into(),
            ));
        }
        if self.ring_depth == 0 {
            return Err(ConfigError::ConfigurationInvalid(
                "ring_depth must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

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
//! A rigid sphere: position, velocity, radius, mass, and a write-once
//! identity, with lazily cached derived quantities.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;
use crate::vector::Vector3;

/// A write-once cell. May be set exactly once; every later `latch` call is
/// a silent no-op. Used for [`Particle::uid`], which is assigned once by
/// whatever assembles the initial particle set and must never change for
/// the rest of that particle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latch<T> {
    value: T,
    latched: bool,
}

impl<T: Default> Default for Latch<T> {
    fn default() -> Self {
        Latch {
            value: T::default(),
            latched: false,
        }
    }
}

impl<T: Copy> Latch<T> {
    /// Returns the current value (the default if never latched).
    pub fn get(&self) -> T {
        self.value
    }

    /// Returns whether a value has been latched.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Attempts to latch `value`. Returns `true` if this call set it,
    /// `false` if the cell was already latched and the call was a no-op.
    pub fn latch(&mut self, value: T) -> bool {
        if self.latched {
            return false;
        }
        self.value = value;
        self.latched = true;
        true
    }
}

/// Whether setting a particle's velocity should clear its cached kinetic
/// energy.
///
/// `Invalidate` is the default for any physics update that changes speed
/// (gravity, collision impulses); `Keep` exists for the one case where a
/// caller already knows the cached energy is still valid — there isn't one
/// in this crate today, but the distinction is part of the documented
/// contract and kept explicit rather than collapsed into "always
/// invalidate".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityUpdate {
    /// Clear the cached kinetic energy; it will be recomputed on next read.
    Invalidate,
    /// Leave the cached kinetic energy as-is.
    Keep,
}

/// A rigid sphere participating in the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle<S: Scalar> {
    position: Vector3<S>,
    velocity: Vector3<S>,
    radius: S,
    mass: S,
    #[serde(skip, default)]
    inverse_mass: Cell<Option<S>>,
    #[serde(skip, default)]
    kinetic_energy: Cell<Option<S>>,
    uid: Latch<u64>,
}

impl<S: Scalar> Particle<S> {
    /// Constructs a particle. `radius` and `mass` must be strictly
    /// positive; this is a precondition of the type, not a recoverable
    /// runtime error, so it panics rather than returning `Result` — the
    /// caller (an initial-condition builder validated against
    /// [`crate::settings::Settings`]) is expected to never violate it.
    pub fn new(position: Vector3<S>, velocity: Vector3<S>, radius: S, mass: S) -> Self {
        assert!(radius > S::zero(), "particle radius must be positive");
        assert!(mass > S::zero(), "particle mass must be positive");
        Particle {
            position,
            velocity,
            radius,
            mass,
            inverse_mass: Cell::new(None),
            kinetic_energy: Cell::new(None),
            uid: Latch::default(),
        }
    }

    /// Current position.
    pub fn position(&self) -> &Vector3<S> {
        &self.position
    }

    /// Current velocity.
    pub fn velocity(&self) -> &Vector3<S> {
        &self.velocity
    }

    /// Sphere radius.
    pub fn radius(&self) -> S {
        self.radius
    }

    /// Mass.
    pub fn mass(&self) -> S {
        self.mass
    }

    /// Sets position. Position has no derived cache, so this never
    /// invalidates anything.
    pub fn set_position(&mut self, position: Vector3<S>) {
        self.position = position;
    }

    /// Sets velocity, optionally invalidating the cached kinetic energy.
    pub fn set_velocity(&mut self, velocity: Vector3<S>, update: VelocityUpdate) {
        self.velocity = velocity;
        if update == VelocityUpdate::Invalidate {
            self.kinetic_energy.set(None);
        }
    }

    /// `1 / mass`, computed once and cached — mass never changes after
    /// construction, so this cache never needs invalidation.
    pub fn inverse_mass(&self) -> S {
        if let Some(cached) = self.inverse_mass.get() {
            return cached;
        }
        let inv = S::one().checked_div(self.mass).expect("mass is nonzero by construction");
        self.inverse_mass.set(Some(inv));
        inv
    }

    /// `0.5 * mass * |velocity|^2`, lazily cached and invalidated whenever
    /// velocity is set with [`VelocityUpdate::Invalidate`].
    pub fn kinetic_energy(&self) -> S {
        if let Some(cached) = self.kinetic_energy.get() {
            return cached;
        }
        let half = S::from_f64(0.5);
        let speed_sq = self.velocity.magnitude().powi(2);
        let energy = half * self.mass * speed_sq;
        self.kinetic_energy.set(Some(energy));
        energy
    }

    /// The particle's identity, if latched.
    pub fn uid(&self) -> Option<u64> {
        if self.uid.is_latched() {
            Some(self.uid.get())
        } else {
            None
        }
    }

    /// Latches the particle's identity. `0` is reserved to mean "never
    /// assigned" and is silently rejected rather than latched; every other
    /// value latches at most once.
    pub fn set_uid(&mut self, uid: u64) {
        if uid > 0 {
            self.uid.latch(uid);
        }
    }
}

impl<S: Scalar> PartialEq for Particle<S> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.velocity == other.velocity
            && self.radius == other.radius
            && self.mass == other.mass
            && self.uid.get() == other.uid.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(mass: f64, vx: f64, vy: f64) -> Particle<f64> {
        Particle::new(Vector3::zero(), Vector3::new(vx, vy, 0.0), 1.0, mass)
    }

    #[test]
    #[should_panic(expected = "radius must be positive")]
    fn zero_radius_panics() {
        Particle::new(Vector3::<f64>::zero(), Vector3::zero(), 0.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "mass must be positive")]
    fn zero_mass_panics() {
        Particle::new(Vector3::<f64>::zero(), Vector3::zero(), 1.0, 0.0);
    }

    #[test]
    fn kinetic_energy_matches_formula() {
        let p = particle(2.0, 3.0, 4.0);
        assert!((p.kinetic_energy() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn invalidate_policy_recomputes_energy() {
        let mut p = particle(2.0, 3.0, 4.0);
        let _ = p.kinetic_energy();
        p.set_velocity(Vector3::new(0.0, 0.0, 0.0), VelocityUpdate::Invalidate);
        assert_eq!(p.kinetic_energy(), 0.0);
    }

    #[test]
    fn keep_policy_preserves_stale_energy() {
        let mut p = particle(2.0, 3.0, 4.0);
        let original = p.kinetic_energy();
        p.set_velocity(Vector3::new(0.0, 0.0, 0.0), VelocityUpdate::Keep);
        assert_eq!(p.kinetic_energy(), original);
    }

    #[test]
    fn inverse_mass_matches_formula() {
        let p = particle(4.0, 0.0, 0.0);
        assert!((p.inverse_mass() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn uid_latches_once() {
        let mut p = particle(1.0, 0.0, 0.0);
        assert_eq!(p.uid(), None);
        p.set_uid(7);
        assert_eq!(p.uid(), Some(7));
        p.set_uid(9);
        assert_eq!(p.uid(), Some(7));
    }

    #[test]
    fn uid_zero_is_rejected() {
        let mut p = particle(1.0, 0.0, 0.0);
        p.set_uid(0);
        assert_eq!(p.uid(), None);
    }
}

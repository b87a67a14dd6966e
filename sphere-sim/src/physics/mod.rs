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
//! Gravity, integration, elastic collision resolution, and wall bounce.
//!
//! This is a close port of the original simulator's `physics.cpp`: the
//! Manhattan-distance early-out gate before the expensive exact-distance
//! check, the impulse formula's retained absolute-value dot product (a
//! known quirk of the original kept intentionally rather than "corrected"
//! — changing it would change what this simulation *is*), the energy
//! tolerance check, and the one-level sub-step repair schedule.

use tracing::{debug, error, trace, warn};

use crate::particle::{Particle, VelocityUpdate};
use crate::ring::SnapshotView;
use crate::scalar::Scalar;
use crate::vector::Vector3;
use crate::wall::Wall;

/// Outcome of a pairwise collision check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionStatus {
    /// The pair was not close enough to collide.
    NoCollision,
    /// An impulse was applied and the post-collision energy check passed.
    Success,
    /// The direct impulse failed the energy check but a sub-step repair
    /// recovered a consistent state.
    Corrected,
    /// The direct impulse failed the energy check and no repair
    /// resolution recovered one.
    Inconsistent,
}

/// Outcome of a wall-bounce check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceStatus {
    /// The particle was not moving into the wall, or not close enough.
    NoBounce,
    /// The particle's perpendicular velocity component was reflected.
    Success,
}

/// The sub-step resolutions attempted by [`PhysicsContext::correct`], in
/// order: halved, quartered, tenthed, and hundredthed tick, each capped at
/// a maximum replay step count so a persistently inconsistent pair can't
/// spin the repair loop forever.
const CORRECTION_SCHEDULE_DIVISORS: [f64; 4] = [2.0, 4.0, 10.0, 100.0];
const CORRECTION_SCHEDULE_MAX_STEPS: [u32; 4] = [2, 4, 10, 100];

/// Builds the uniform gravitational acceleration vector from a magnitude
/// and an angle in degrees, measured counterclockwise from the positive
/// x-axis in the x-y plane (the original simulator applies gravity only in
/// two dimensions; z is unaffected).
pub fn gravity_vector<S: Scalar>(magnitude: S, angle_degrees: S) -> Vector3<S> {
    let radians = angle_degrees * S::from_f64(std::f64::consts::PI / 180.0);
    Vector3::new(magnitude * radians.cos(), magnitude * radians.sin(), S::zero())
}

/// Applies one tick's worth of gravitational acceleration to a particle's
/// velocity.
pub fn gravity<S: Scalar>(particle: &mut Particle<S>, dt: S, gravity: &Vector3<S>) {
    let delta_v = gravity.clone() * dt;
    let updated = particle.velocity().clone() + delta_v;
    particle.set_velocity(updated, VelocityUpdate::Invalidate);
}

/// Integrates a particle's position forward by one tick at its current
/// velocity (applied after [`gravity`], so the velocity used already
/// reflects this tick's gravitational update).
pub fn step<S: Scalar>(particle: &mut Particle<S>, dt: S) {
    let displacement = particle.velocity().clone() * dt;
    let updated = particle.position().clone() + displacement;
    particle.set_position(updated);
}

/// Checks a particle against one wall and reflects its perpendicular
/// velocity component if it has reached the wall and is moving into it.
pub fn bounce<S: Scalar>(particle: &mut Particle<S>, wall: &Wall<S>) -> BounceStatus {
    let relative = particle.velocity().componentwise_mul(&wall.normal().abs());
    let moving_toward_wall = (relative.sum() < S::zero()) != (wall.normal().sum() < S::zero());
    if !moving_toward_wall {
        return BounceStatus::NoBounce;
    }

    let projected = particle
        .position()
        .componentwise_mul(&wall.normal().abs())
        .sum();
    let distance = (projected - wall.position()).abs();

    if distance > particle.radius() {
        return BounceStatus::NoBounce;
    }

    let reflected = particle.velocity().componentwise_mul(wall.inverse());
    particle.set_velocity(reflected, VelocityUpdate::Keep);
    debug!(wall = ?wall.id(), "bounce");
    BounceStatus::Success
}

/// The Manhattan-distance early-out gate: cheap to compute, used to reject
/// the overwhelming majority of non-colliding pairs before paying for the
/// exact (`sqrt`-based) distance check. Checks only the x and y separation
/// against the combined radius, matching the original exactly — the z axis
/// is left to the exact gate. `overlap_detection` is an initial-placement
/// concern (how tightly particles may be seeded), not a physics-gate
/// threshold, so it plays no part here.
fn manhattan_gate<S: Scalar>(a: &Particle<S>, b: &Particle<S>) -> bool {
    let delta = a.position().clone() - b.position().clone();
    let combined_radius = a.radius() + b.radius();
    delta.x().abs() <= combined_radius && delta.y().abs() <= combined_radius
}

/// The exact gate: true Euclidean distance between centers against the sum
/// of radii.
fn exact_gate<S: Scalar>(a: &Particle<S>, b: &Particle<S>) -> bool {
    let delta = a.position().clone() - b.position().clone();
    delta.magnitude() <= a.radius() + b.radius()
}

/// Applies the elastic collision impulse to a pair already known to be
/// touching, and checks that total kinetic energy was conserved within
/// `tau`.
///
/// The impulse magnitude is the *absolute value* of the contact-normal dot
/// product (`|û·Δv|`), not `max(0, û·Δv)` as a textbook elastic collision
/// would use, matching the original exactly. This is a known quirk
/// preserved intentionally: it guarantees the impulse always separates the
/// pair regardless of the sign convention of Δ, and it is part of what
/// this simulation computes, not a bug to silently fix.
fn apply_impulse<S: Scalar>(a: &mut Particle<S>, b: &mut Particle<S>) {
    let relative_position = a.position().clone() - b.position().clone();
    if relative_position.magnitude() == S::zero() {
        return;
    }
    let unit_normal = relative_position.unit();
    let relative_velocity = a.velocity().clone() - b.velocity().clone();
    let j = unit_normal.dot(&relative_velocity).abs();

    let total_inverse_mass = a.inverse_mass() + b.inverse_mass();
    let impulse_scalar = (S::from_f64(2.0) * j)
        .checked_div(total_inverse_mass)
        .unwrap_or(S::zero());
    let impulse = unit_normal * impulse_scalar;

    let a_velocity = a.velocity().clone() + impulse.clone() * a.inverse_mass();
    let b_velocity = b.velocity().clone() - impulse * b.inverse_mass();

    a.set_velocity(a_velocity, VelocityUpdate::Invalidate);
    b.set_velocity(b_velocity, VelocityUpdate::Invalidate);
}

/// Checks whether a pair's combined kinetic energy before and after an
/// impulse differ by no more than the absolute tolerance `tau`.
fn energy_conserved<S: Scalar>(before: S, after: S, tau: S) -> bool {
    (after - before).abs() <= tau
}

/// The gated, impulse-applying, energy-checked collision core. Used both
/// by [`PhysicsContext::collide`] directly and, at finer sub-step
/// resolutions, inside [`PhysicsContext::correct`] — the latter never
/// calls back into `collide`, so this function itself has no path to a
/// second level of repair.
pub fn collide_internal<S: Scalar>(
    a: &mut Particle<S>,
    b: &mut Particle<S>,
    tau: S,
) -> CollisionStatus {
    if !manhattan_gate(a, b) {
        return CollisionStatus::NoCollision;
    }
    if !exact_gate(a, b) {
        trace!("manhattan gate passed but exact gate rejected pair");
        return CollisionStatus::NoCollision;
    }

    let energy_before = a.kinetic_energy() + b.kinetic_energy();
    apply_impulse(a, b);
    let energy_after = a.kinetic_energy() + b.kinetic_energy();

    if energy_conserved(energy_before, energy_after, tau) {
        debug!("collision resolved");
        CollisionStatus::Success
    } else {
        warn!("collision failed energy tolerance check");
        CollisionStatus::Inconsistent
    }
}

/// Physics parameters and the narrow read-only capability the repair path
/// needs into the simulation's last published snapshot.
///
/// `View` is a type parameter rather than a trait object: this keeps the
/// whole call graph monomorphized at compile time, with no vtable on a
/// path that can run once per colliding pair per tick.
pub struct PhysicsContext<S: Scalar, View: SnapshotView<S>> {
    gravity_vector: Vector3<S>,
    tick: S,
    tau: S,
    boundaries: Vec<Wall<S>>,
    view: View,
    _marker: std::marker::PhantomData<S>,
}

impl<S: Scalar, View: SnapshotView<S>> PhysicsContext<S, View> {
    /// Builds a physics context for one simulation run. `view` is the
    /// capability used only by [`PhysicsContext::correct`] to retrieve the
    /// pair's pre-tick state.
    pub fn new(
        gravity_magnitude: S,
        gravity_angle: S,
        tick: S,
        tau: S,
        boundaries: Vec<Wall<S>>,
        view: View,
    ) -> Self {
        PhysicsContext {
            gravity_vector: gravity_vector(gravity_magnitude, gravity_angle),
            tick,
            tau,
            boundaries,
            view,
            _marker: std::marker::PhantomData,
        }
    }

    /// The gravitational acceleration vector's components. Exposed as
    /// plain scalars (rather than `&Vector3<S>`) so a parallel integration
    /// pass can copy them into each worker closure without sharing a
    /// `Vector3`'s cache across threads.
    pub fn gravity_components(&self) -> (S, S, S) {
        (
            self.gravity_vector.x(),
            self.gravity_vector.y(),
            self.gravity_vector.z(),
        )
    }

    /// The configured tick duration.
    pub fn tick(&self) -> S {
        self.tick
    }

    /// The configured boundary planes.
    pub fn boundaries(&self) -> &[Wall<S>] {
        &self.boundaries
    }

    /// Applies gravity to a particle for one tick.
    pub fn apply_gravity(&self, particle: &mut Particle<S>) {
        gravity(particle, self.tick, &self.gravity_vector);
    }

    /// Integrates a particle's position for one tick.
    pub fn integrate(&self, particle: &mut Particle<S>) {
        step(particle, self.tick);
    }

    /// Checks a particle against every boundary wall, reflecting velocity
    /// on whichever wall (if any) it has reached.
    pub fn bounce_all(&self, particle: &mut Particle<S>) -> BounceStatus {
        let mut status = BounceStatus::NoBounce;
        for wall in &self.boundaries {
            if bounce(particle, wall) == BounceStatus::Success {
                status = BounceStatus::Success;
            }
        }
        status
    }

    /// The top-level collision entry point: applies the gated impulse and,
    /// if the direct result is [`CollisionStatus::Inconsistent`], attempts
    /// one level of sub-step repair via [`PhysicsContext::correct`].
    pub fn collide(&self, a: &mut Particle<S>, b: &mut Particle<S>) -> CollisionStatus {
        let a_velocity_before = a.velocity().clone();
        let b_velocity_before = b.velocity().clone();

        let status = collide_internal(a, b, self.tau);
        if status != CollisionStatus::Inconsistent {
            return status;
        }

        match self.correct(a, b) {
            Some((a_fixed, b_fixed)) => {
                *a = a_fixed;
                *b = b_fixed;
                debug!("collision repaired by sub-step correction");
                CollisionStatus::Corrected
            }
            None => {
                a.set_velocity(a_velocity_before, VelocityUpdate::Keep);
                b.set_velocity(b_velocity_before, VelocityUpdate::Keep);
                error!("collision could not be repaired; reverting to pre-impulse state");
                CollisionStatus::Inconsistent
            }
        }
    }

    /// Attempts to resolve an inconsistent collision by replaying the pair
    /// from the simulation's last published snapshot at progressively
    /// finer sub-steps, stopping at the first resolution that reaches
    /// [`CollisionStatus::Success`].
    ///
    /// Looks the pair up in the last published snapshot by UID; if either
    /// particle has no UID or isn't found there, no repair is attempted.
    fn correct(&self, a: &Particle<S>, b: &Particle<S>) -> Option<(Particle<S>, Particle<S>)> {
        let published = self.view.last_published();
        let a_uid = a.uid()?;
        let b_uid = b.uid()?;
        let a_prior = published.iter().find(|p| p.uid() == Some(a_uid))?.clone();
        let b_prior = published.iter().find(|p| p.uid() == Some(b_uid))?.clone();

        for (divisor, max_steps) in CORRECTION_SCHEDULE_DIVISORS
            .iter()
            .zip(CORRECTION_SCHEDULE_MAX_STEPS.iter())
        {
            let sub_dt = self.tick.checked_div(S::from_f64(*divisor)).ok()?;
            let mut a_working = a_prior.clone();
            let mut b_working = b_prior.clone();
            let mut status = CollisionStatus::NoCollision;

            for _ in 0..*max_steps {
                gravity(&mut a_working, sub_dt, &self.gravity_vector);
                gravity(&mut b_working, sub_dt, &self.gravity_vector);
                step(&mut a_working, sub_dt);
                step(&mut b_working, sub_dt);

                status = collide_internal(&mut a_working, &mut b_working, self.tau);

                for wall in &self.boundaries {
                    bounce(&mut a_working, wall);
                    bounce(&mut b_working, wall);
                }

                if status != CollisionStatus::NoCollision {
                    break;
                }
            }

            if status == CollisionStatus::Success {
                return Some((a_working, b_working));
            }
            trace!(divisor, "correction resolution did not converge, trying next");
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::SnapshotRing;

    fn head_on_pair() -> (Particle<f64>, Particle<f64>) {
        let mut a = Particle::new(
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        let mut b = Particle::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        a.set_uid(1);
        b.set_uid(2);
        (a, b)
    }

    #[test]
    fn distant_particles_do_not_collide() {
        let mut a = Particle::new(Vector3::new(-100.0, 0.0, 0.0), Vector3::zero(), 1.0, 1.0);
        let mut b = Particle::new(Vector3::new(100.0, 0.0, 0.0), Vector3::zero(), 1.0, 1.0);
        assert_eq!(
            collide_internal(&mut a, &mut b, 0.1),
            CollisionStatus::NoCollision
        );
    }

    #[test]
    fn head_on_collision_conserves_energy() {
        let (mut a, mut b) = head_on_pair();
        let before = a.kinetic_energy() + b.kinetic_energy();
        let status = collide_internal(&mut a, &mut b, 0.1);
        assert_eq!(status, CollisionStatus::Success);
        let after = a.kinetic_energy() + b.kinetic_energy();
        assert!((before - after).abs() <= 0.1);
    }

    #[test]
    fn equal_mass_head_on_collision_swaps_velocities() {
        let (mut a, mut b) = head_on_pair();
        let status = collide_internal(&mut a, &mut b, 0.1);
        assert_eq!(status, CollisionStatus::Success);
        assert!((a.velocity().x() - (-1.0)).abs() < 1e-9);
        assert!((b.velocity().x() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gravity_is_applied_before_position_integration() {
        let mut p = Particle::new(Vector3::zero(), Vector3::zero(), 1.0, 1.0);
        let g = Vector3::new(0.0, -10.0, 0.0);
        gravity(&mut p, 1.0, &g);
        step(&mut p, 1.0);
        assert_eq!(p.velocity().y(), -10.0);
        assert_eq!(p.position().y(), -10.0);
    }

    #[test]
    fn bounce_reflects_only_perpendicular_component() {
        let walls = Wall::box_from_half_extents(&Vector3::new(10.0, 10.0, 10.0));
        let right = walls
            .iter()
            .find(|w| w.id() == crate::wall::WallId::Right)
            .unwrap();
        let mut p = Particle::new(
            Vector3::new(9.5, 0.0, 0.0),
            Vector3::new(5.0, 3.0, 0.0),
            1.0,
            1.0,
        );
        let status = bounce(&mut p, right);
        assert_eq!(status, BounceStatus::Success);
        assert_eq!(p.velocity().x(), -5.0);
        assert_eq!(p.velocity().y(), 3.0);
    }

    #[test]
    fn bounce_ignores_particle_moving_away_from_wall() {
        let walls = Wall::box_from_half_extents(&Vector3::new(10.0, 10.0, 10.0));
        let right = walls
            .iter()
            .find(|w| w.id() == crate::wall::WallId::Right)
            .unwrap();
        let mut p = Particle::new(
            Vector3::new(9.5, 0.0, 0.0),
            Vector3::new(-5.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        assert_eq!(bounce(&mut p, right), BounceStatus::NoBounce);
    }

    #[test]
    fn collide_falls_back_to_correction_capability() {
        let ring = SnapshotRing::<f64>::new();
        let (a0, b0) = head_on_pair();
        ring.seed(vec![a0.clone(), b0.clone()]);
        let ctx = PhysicsContext::new(
            0.0,
            0.0,
            0.01,
            0.1,
            Wall::box_from_half_extents(&Vector3::new(1000.0, 1000.0, 1000.0)).to_vec(),
            ring,
        );
        let (mut a, mut b) = head_on_pair();
        let status = ctx.collide(&mut a, &mut b);
        assert!(matches!(
            status,
            CollisionStatus::Success | CollisionStatus::Corrected | CollisionStatus::Inconsistent
        ));
    }
}

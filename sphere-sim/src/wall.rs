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
//! Axis-aligned boundary planes of the simulation box.

use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;
use crate::vector::Vector3;

/// Which of the six faces of the box a [`Wall`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallId {
    Left,
    Right,
    Bottom,
    Top,
    Back,
    Front,
}

/// A single axis-aligned boundary plane.
///
/// A wall is a pure value: a signed offset along one axis, a normal vector
/// masking that axis, and an inverse vector (the normal's complement) used
/// to flip exactly the velocity component perpendicular to the wall on
/// bounce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall<S: Scalar> {
    id: WallId,
    position: S,
    normal: Vector3<S>,
    inverse: Vector3<S>,
}

impl<S: Scalar> Wall<S> {
    /// Constructs a wall directly. Prefer [`Wall::box_from_half_extents`]
    /// for the common case of building all six walls of a centered box.
    pub fn new(id: WallId, position: S, normal: Vector3<S>, inverse: Vector3<S>) -> Self {
        Wall {
            id,
            position,
            normal,
            inverse,
        }
    }

    /// Which face this wall represents.
    pub fn id(&self) -> WallId {
        self.id
    }

    /// The signed offset of this wall along its axis.
    pub fn position(&self) -> S {
        self.position
    }

    /// The inward unit normal: `+/-1` on the axis this wall is
    /// perpendicular to (pointing back toward the box's interior), `0` on
    /// the other two. Opposite walls of the same axis pair have opposite
    /// signs here even though they share the same `inverse` mask.
    pub fn normal(&self) -> &Vector3<S> {
        &self.normal
    }

    /// The complement of `normal`: `-1` on this wall's axis, `1` elsewhere.
    /// Componentwise-multiplying a velocity by this flips only the
    /// perpendicular component, leaving the other two untouched.
    pub fn inverse(&self) -> &Vector3<S> {
        &self.inverse
    }

    /// Builds the six walls of a rectangular box centered on the origin,
    /// given its half-extents along each axis.
    pub fn box_from_half_extents(half_extents: &Vector3<S>) -> [Wall<S>; 6] {
        let zero = S::zero();
        let one = S::one();
        let neg_one = -one;

        [
            Wall::new(
                WallId::Left,
                -half_extents.x(),
                Vector3::new(one, zero, zero),
                Vector3::new(neg_one, one, one),
            ),
            Wall::new(
                WallId::Right,
                half_extents.x(),
                Vector3::new(neg_one, zero, zero),
                Vector3::new(neg_one, one, one),
            ),
            Wall::new(
                WallId::Bottom,
                -half_extents.y(),
                Vector3::new(zero, one, zero),
                Vector3::new(one, neg_one, one),
            ),
            Wall::new(
                WallId::Top,
                half_extents.y(),
                Vector3::new(zero, neg_one, zero),
                Vector3::new(one, neg_one, one),
            ),
            Wall::new(
                WallId::Back,
                -half_extents.z(),
                Vector3::new(zero, zero, one),
                Vector3::new(one, one, neg_one),
            ),
            Wall::new(
                WallId::Front,
                half_extents.z(),
                Vector3::new(zero, zero, neg_one),
                Vector3::new(one, one, neg_one),
            ),
        ]
    }
}

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
//! A three-component vector over any [`Scalar`], with a lazily computed
//! and cached magnitude.
//!
//! The magnitude is the one property here expensive enough (a `sqrt`) to be
//! worth caching, and cheap enough to invalidate conservatively: every
//! mutating method clears the cache rather than trying to prove the
//! magnitude is unaffected.

use std::cell::Cell;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

/// A vector in three dimensions, generic over the scalar backing it.
///
/// `Clone`, not `Copy`: the magnitude cache is a [`Cell`], and `Cell` does
/// not implement `Copy` even when its contents do, so this type can't be
/// either. Two clones start out sharing the same cached value but evolve
/// independently afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vector3<S: Scalar> {
    x: S,
    y: S,
    z: S,
    #[serde(skip, default)]
    magnitude: Cell<Option<S>>,
}

impl<S: Scalar> Vector3<S> {
    /// Constructs a vector from its three components. The magnitude cache
    /// starts empty; it is computed on first read.
    pub fn new(x: S, y: S, z: S) -> Self {
        Vector3 {
            x,
            y,
            z,
            magnitude: Cell::new(None),
        }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Vector3::new(S::zero(), S::zero(), S::zero())
    }

    /// First component.
    pub fn x(&self) -> S {
        self.x
    }

    /// Second component.
    pub fn y(&self) -> S {
        self.y
    }

    /// Third component.
    pub fn z(&self) -> S {
        self.z
    }

    /// Sets the first component and invalidates the magnitude cache.
    pub fn set_x(&mut self, x: S) {
        self.x = x;
        self.invalidate();
    }

    /// Sets the second component and invalidates the magnitude cache.
    pub fn set_y(&mut self, y: S) {
        self.y = y;
        self.invalidate();
    }

    /// Sets the third component and invalidates the magnitude cache.
    pub fn set_z(&mut self, z: S) {
        self.z = z;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.magnitude.set(None);
    }

    /// Euclidean magnitude. Computed and cached on first call; subsequent
    /// calls return the cached value until a mutation invalidates it.
    pub fn magnitude(&self) -> S {
        if let Some(cached) = self.magnitude.get() {
            return cached;
        }
        let sum_sq = self.x * self.x + self.y * self.y + self.z * self.z;
        let mag = sum_sq.sqrt();
        self.magnitude.set(Some(mag));
        mag
    }

    /// The sum of the three components. Used by the collision gates, not a
    /// geometric quantity.
    pub fn sum(&self) -> S {
        self.x + self.y + self.z
    }

    /// The componentwise absolute value.
    pub fn abs(&self) -> Self {
        Vector3::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Dot product.
    pub fn dot(&self, other: &Self) -> S {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    pub fn cross(&self, other: &Self) -> Self {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Componentwise product. Used for axis masks (e.g. a wall's inverse
    /// vector flipping one component of a velocity) — this is not the dot
    /// or cross product and is deliberately not spelled `*`.
    pub fn componentwise_mul(&self, other: &Self) -> Self {
        Vector3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// A unit vector in the same direction as `self`.
    pub fn unit(&self) -> Self {
        let mag = self.magnitude();
        if mag == S::zero() {
            return Vector3::zero();
        }
        Vector3::new(
            self.x.checked_div(mag).unwrap_or(S::zero()),
            self.y.checked_div(mag).unwrap_or(S::zero()),
            self.z.checked_div(mag).unwrap_or(S::zero()),
        )
    }

    /// A vector collinear with `self`, scaled to have magnitude
    /// `target_magnitude`.
    pub fn with_magnitude(&self, target_magnitude: S) -> Self {
        self.unit() * target_magnitude
    }
}

impl<S: Scalar> PartialEq for Vector3<S> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

impl<S: Scalar> Add for Vector3<S> {
    type Output = Vector3<S>;
    fn add(self, rhs: Self) -> Self::Output {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<S: Scalar> Sub for Vector3<S> {
    type Output = Vector3<S>;
    fn sub(self, rhs: Self) -> Self::Output {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<S: Scalar> Mul<S> for Vector3<S> {
    type Output = Vector3<S>;
    fn mul(self, rhs: S) -> Self::Output {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<S: Scalar> Neg for Vector3<S> {
    type Output = Vector3<S>;
    fn neg(self) -> Self::Output {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

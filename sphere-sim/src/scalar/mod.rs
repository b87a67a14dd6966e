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
//! The numeric substrate every other module is generic over.
//!
//! [`Scalar`] is implemented for `f32`, `f64`, and [`Fixed`], and is the one
//! type parameter threaded through [`crate::vector`], [`crate::particle`],
//! [`crate::wall`], and [`crate::physics`]. Picking the instantiation is a
//! compile-time decision made by whatever binary assembles a simulation —
//! the core never boxes or dynamically dispatches over it.

mod fixed;
mod roots;

pub use fixed::{Fixed, SCALING_FACTOR};

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::ScalarError;

/// The arithmetic contract shared by every numeric backing this simulation
/// can run on.
///
/// Implementors provide both infallible operators (`+ - * /`, used
/// throughout the hot per-tick path) and `checked_*` equivalents that
/// surface [`ScalarError`] explicitly. The infallible operators panic on the
/// same conditions the checked methods report as errors: per the error
/// handling design, an overflow or a division by zero here means the scalar
/// range was sized wrong, not a condition the simulation can recover from
/// mid-tick.
pub trait Scalar:
    Copy
    + Clone
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// The additive identity.
    fn zero() -> Self;
    /// The multiplicative identity.
    fn one() -> Self;
    /// Constructs a scalar from a lossy `f64` literal. Used for constants
    /// (angles, gravity magnitudes) rather than on the hot path.
    fn from_f64(value: f64) -> Self;
    /// Converts to `f64` for interop with transcendental functions and
    /// display/logging.
    fn to_f64(self) -> f64;
    /// Absolute value.
    fn abs(self) -> Self;
    /// Square root. Negative inputs return zero rather than panicking or
    /// producing NaN, matching the original simulator's `sqrt` (which never
    /// expects a negative operand since it only ever roots a squared
    /// magnitude).
    fn sqrt(self) -> Self;
    /// Sine, argument in radians.
    fn sin(self) -> Self;
    /// Cosine, argument in radians.
    fn cos(self) -> Self;
    /// Integer power. Only `-1` and `2` are exercised by this crate's own
    /// physics, but the method accepts any exponent.
    fn powi(self, n: i32) -> Self;
    /// Fallible division, used where a zero divisor is a real possibility
    /// rather than a programming error (e.g. normalizing a vector that
    /// might be zero-length).
    fn checked_div(self, other: Self) -> Result<Self, ScalarError>;
    /// Fallible multiplication, exposed alongside `checked_div` for
    /// callers that want the error explicitly rather than a panic.
    fn checked_mul(self, other: Self) -> Result<Self, ScalarError>;
    /// The smallest representable positive difference, used as a
    /// convergence/comparison tolerance.
    fn epsilon() -> Self;
}

macro_rules! impl_float_scalar {
    ($ty:ty) => {
        impl Scalar for $ty {
            fn zero() -> Self {
                0.0
            }

            fn one() -> Self {
                1.0
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn abs(self) -> Self {
                <$ty>::abs(self)
            }

            fn sqrt(self) -> Self {
                if self <= 0.0 {
                    0.0
                } else {
                    <$ty>::sqrt(self)
                }
            }

            fn sin(self) -> Self {
                <$ty>::sin(self)
            }

            fn cos(self) -> Self {
                <$ty>::cos(self)
            }

            fn powi(self, n: i32) -> Self {
                <$ty>::powi(self, n)
            }

            fn checked_div(self, other: Self) -> Result<Self, ScalarError> {
                if other == 0.0 {
                    return Err(ScalarError::DivisionByZero);
                }
                let result = self / other;
                if result.is_finite() {
                    Ok(result)
                } else {
                    Err(ScalarError::ArithmeticOverflow)
                }
            }

            fn checked_mul(self, other: Self) -> Result<Self, ScalarError> {
                let result = self * other;
                if result.is_finite() || !(self.is_finite() && other.is_finite()) {
                    Ok(result)
                } else {
                    Err(ScalarError::ArithmeticOverflow)
                }
            }

            fn epsilon() -> Self {
                <$ty>::EPSILON
            }
        }
    };
}

impl_float_scalar!(f32);
impl_float_scalar!(f64);

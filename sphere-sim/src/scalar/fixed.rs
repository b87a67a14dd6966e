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
//! Deterministic fixed-point [`Scalar`] implementation.
//!
//! `Fixed` stores a value scaled by [`SCALING_FACTOR`] in an `i128`, so
//! `Fixed(v)` denotes `v as f64 / SCALING_FACTOR`. This is a straight port of
//! the original simulator's `util::FixedPoint` (itself `__int128_t`-backed),
//! chosen so that two runs fed the same inputs produce bit-identical
//! trajectories regardless of host FPU — the property `f32`/`f64` cannot
//! offer.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScalarError;

use super::roots::locate_root;
use super::Scalar;

/// Fixed-point scaling factor. One whole unit is represented as `K`.
pub const SCALING_FACTOR: i128 = 10_000_000;

const NEWTON_TOLERANCE: f64 = 1.0 / SCALING_FACTOR as f64;

/// A deterministic fixed-point number, `raw / SCALING_FACTOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fixed(i128);

impl Fixed {
    /// Constructs a `Fixed` directly from a pre-scaled raw value, skipping
    /// the float round-trip. Used by tests that need exact raw values.
    pub const fn from_raw(raw: i128) -> Self {
        Fixed(raw)
    }

    /// Returns the underlying scaled integer.
    pub const fn raw(self) -> i128 {
        self.0
    }
}

impl Scalar for Fixed {
    fn zero() -> Self {
        Fixed(0)
    }

    fn one() -> Self {
        Fixed(SCALING_FACTOR)
    }

    fn from_f64(value: f64) -> Self {
        Fixed((value * SCALING_FACTOR as f64).round() as i128)
    }

    fn to_f64(self) -> f64 {
        self.0 as f64 / SCALING_FACTOR as f64
    }

    fn abs(self) -> Self {
        Fixed(self.0.abs())
    }

    fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Fixed(0);
        }
        let whole_part = self.0 / SCALING_FACTOR;
        let x = self.to_f64();
        let mut guess = locate_root(whole_part).max(1.0);
        loop {
            let next = 0.5 * (guess + x / guess);
            if (next - guess).abs() < NEWTON_TOLERANCE {
                guess = next;
                break;
            }
            guess = next;
        }
        Fixed::from_f64(guess)
    }

    fn sin(self) -> Self {
        Fixed::from_f64(self.to_f64().sin())
    }

    fn cos(self) -> Self {
        Fixed::from_f64(self.to_f64().cos())
    }

    fn powi(self, n: i32) -> Self {
        match n {
            0 => Fixed::one(),
            1 => self,
            -1 => Fixed::one().checked_div(self).expect("powi(-1) of zero"),
            n if n > 0 => {
                let mut acc = Fixed::one();
                for _ in 0..n {
                    acc = acc.checked_mul(self).expect("powi overflow");
                }
                acc
            }
            n => Fixed::from_f64(self.to_f64().powi(n)),
        }
    }

    fn checked_div(self, other: Self) -> Result<Self, ScalarError> {
        if other.0 == 0 {
            return Err(ScalarError::DivisionByZero);
        }
        let scaled_dividend = self
            .0
            .checked_mul(SCALING_FACTOR)
            .ok_or(ScalarError::ArithmeticOverflow)?;
        Ok(Fixed(scaled_dividend / other.0))
    }

    fn checked_mul(self, other: Self) -> Result<Self, ScalarError> {
        let product = self
            .0
            .checked_mul(other.0)
            .ok_or(ScalarError::ArithmeticOverflow)?;
        Ok(Fixed(product / SCALING_FACTOR))
    }

    fn epsilon() -> Self {
        Fixed(1)
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Self) -> Self::Output {
        Fixed(
            self.0
                .checked_add(rhs.0)
                .unwrap_or_else(|| panic!("{}", ScalarError::ArithmeticOverflow)),
        )
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Self) -> Self::Output {
        Fixed(
            self.0
                .checked_sub(rhs.0)
                .unwrap_or_else(|| panic!("{}", ScalarError::ArithmeticOverflow)),
        )
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    fn mul(self, rhs: Self) -> Self::Output {
        self.checked_mul(rhs)
            .unwrap_or_else(|e| panic!("{e}"))
    }
}

impl Div for Fixed {
    type Output = Fixed;
    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(rhs).unwrap_or_else(|e| panic!("{e}"))
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Self::Output {
        Fixed(-self.0)
    }
}

impl PartialOrd for Fixed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl fmt::Display for Fixed {
    /// Prints an exact decimal expansion at `SCALING_FACTOR`'s precision,
    /// mirroring the original's `operator<<` (whole part, then a
    /// zero-padded mantissa digit string).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / SCALING_FACTOR as u128;
        let mantissa = magnitude % SCALING_FACTOR as u128;
        let digits = SCALING_FACTOR.to_string().len() - 1;
        write!(f, "{sign}{whole}.{mantissa:0width$}", width = digits)
    }
}

impl Serialize for Fixed {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Fixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<i128>()
            .map(Fixed)
            .map_err(|e| D::Error::custom(format!("invalid fixed-point raw value: {e}")))
    }
}

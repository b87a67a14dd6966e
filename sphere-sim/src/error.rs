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
//! Error types for the simulation core.
//!
//! [`ScalarError`] covers the two ways the numeric substrate can fail:
//! overflowing its representable range, or dividing by the additive
//! identity. Both are program-fatal per the simulation's error handling
//! design — a correctly sized [`crate::scalar::Fixed`] should never raise
//! them, so their appearance indicates a bug in scalar range sizing rather
//! than a recoverable runtime condition.
//!
//! [`ConfigError`] is raised by [`crate::settings::Settings::validate`]
//! before the simulation loop starts; a driver binary maps it to exit code 1.

use thiserror::Error;

/// Errors raised by the [`crate::scalar::Scalar`] arithmetic substrate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScalarError {
    /// An arithmetic operation would overflow the scalar's representable
    /// range (the 128-bit intermediate for fixed-point multiply/divide, or
    /// the underlying float's finite range).
    #[error("arithmetic overflow in scalar operation")]
    ArithmeticOverflow,
    /// A division was attempted with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
}

/// Errors raised while validating a [`crate::settings::Settings`] value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration cannot describe a runnable simulation.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

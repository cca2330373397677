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
//! Status-carrying results for recoverable edge cases
//!
//! Every analysis routine returns a [`Measured`] value: the number (or
//! array) that was computed together with a [`Status`] telling the caller
//! whether the value is a genuine measurement, a neutral stand-in for a
//! degenerate input, or a measurement that needed to skip some data.
//!
//! This lets a caller distinguish "the cluster is empty" from "the virial
//! radius happens to be zero", and lets tests assert on edge-case behaviour
//! without scraping console output.
//!
//! # Example
//!
//! ```
//! use cluster_dynamics::diagnostics::{Measured, Status, DegenerateReason};
//!
//! let empty: Measured<f64> = Measured::degenerate(0.0, DegenerateReason::NoParticles);
//! assert!(empty.is_degenerate());
//! assert_eq!(*empty.value(), 0.0);
//! ```

use std::fmt;

/// Why a result fell back to a neutral value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// The input holds no particles
    NoParticles,
    /// A pairwise quantity was requested for a single particle
    SingleParticle,
    /// All selected particles are massless
    NoMass,
    /// The centre-of-density search sphere enclosed no mass
    EmptySphere,
    /// Fewer particles than the statistic needs (for example, than bins)
    InsufficientPopulation {
        /// Particles that were available
        available: usize,
        /// Particles that were needed
        required: usize,
    },
    /// `ln(coulomb * N)` is zero or negative, so no relaxation time exists
    NonPositiveCoulombLog,
    /// The host potential returned a zero tidal radius
    ZeroTidalRadius,
    /// Every selected particle sits at the frame centre
    ZeroExtent,
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateReason::NoParticles => write!(f, "no particles"),
            DegenerateReason::SingleParticle => write!(f, "only one particle"),
            DegenerateReason::NoMass => write!(f, "zero total mass"),
            DegenerateReason::EmptySphere => write!(f, "search sphere enclosed no mass"),
            DegenerateReason::InsufficientPopulation { available, required } => write!(
                f,
                "{available} particles available, {required} required"
            ),
            DegenerateReason::NonPositiveCoulombLog => write!(f, "Coulomb logarithm <= 0"),
            DegenerateReason::ZeroTidalRadius => write!(f, "tidal radius collapsed to zero"),
            DegenerateReason::ZeroExtent => write!(f, "particles have zero radial extent"),
        }
    }
}

/// A warning-class event observed while computing a result
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Two particles share a position, so their pair was skipped
    CoincidentPair {
        /// Id of the lower-index particle
        first_id: i64,
        /// Id of the higher-index particle
        second_id: i64,
        /// Separation that triggered the guard (zero)
        distance: f64,
    },
    /// A density-profile bin has zero volume, so its density is reported as 0
    ZeroVolumeShell {
        /// Index of the offending bin
        bin: usize,
        /// Radius shared by the bin edges
        radius: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CoincidentPair {
                first_id,
                second_id,
                distance,
            } => write!(
                f,
                "particles {first_id} and {second_id} are coincident (r = {distance:e})"
            ),
            Diagnostic::ZeroVolumeShell { bin, radius } => {
                write!(f, "profile bin {bin} has zero volume at r = {radius:e}")
            }
        }
    }
}

/// Outcome classification attached to every [`Measured`] value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status {
    /// The value is a regular measurement
    #[default]
    Ok,
    /// The input was degenerate and the value is a neutral stand-in
    Degenerate(DegenerateReason),
    /// The value was computed but some data had to be skipped
    Warning(Vec<Diagnostic>),
}

impl Status {
    /// Build a status from collected diagnostics: `Ok` when there are none
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        if diagnostics.is_empty() {
            Status::Ok
        } else {
            Status::Warning(diagnostics)
        }
    }

    /// Combine the status of a dependent computation into this one
    ///
    /// A degenerate status wins over warnings (the first degenerate reason is
    /// kept); warnings from both sides are concatenated.
    pub fn merge(self, other: Status) -> Status {
        match (self, other) {
            (Status::Degenerate(reason), _) => Status::Degenerate(reason),
            (_, Status::Degenerate(reason)) => Status::Degenerate(reason),
            (Status::Warning(mut ours), Status::Warning(theirs)) => {
                ours.extend(theirs);
                Status::Warning(ours)
            }
            (Status::Warning(ours), Status::Ok) => Status::Warning(ours),
            (Status::Ok, other) => other,
        }
    }

    /// The degenerate reason, if any
    pub fn degenerate_reason(&self) -> Option<DegenerateReason> {
        match self {
            Status::Degenerate(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Warning diagnostics (empty unless the status is `Warning`)
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Status::Warning(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

/// A computed value paired with its [`Status`]
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<T> {
    value: T,
    status: Status,
}

impl<T> Measured<T> {
    /// A regular measurement
    pub fn ok(value: T) -> Self {
        Measured {
            value,
            status: Status::Ok,
        }
    }

    /// A neutral value standing in for a degenerate input
    pub fn degenerate(value: T, reason: DegenerateReason) -> Self {
        Measured {
            value,
            status: Status::Degenerate(reason),
        }
    }

    /// A value with an explicit status
    pub fn with_status(value: T, status: Status) -> Self {
        Measured { value, status }
    }

    /// Get the value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Take the value, dropping the status
    pub fn into_value(self) -> T {
        self.value
    }

    /// Split into value and status
    pub fn into_parts(self) -> (T, Status) {
        (self.value, self.status)
    }

    /// Get the status
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// True for a regular measurement without warnings
    pub fn is_ok(&self) -> bool {
        matches!(self.status, Status::Ok)
    }

    /// True if the value is a neutral stand-in
    pub fn is_degenerate(&self) -> bool {
        matches!(self.status, Status::Degenerate(_))
    }

    /// True if warnings were raised
    pub fn is_warning(&self) -> bool {
        matches!(self.status, Status::Warning(_))
    }

    /// Transform the value, keeping the status
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Measured<U> {
        Measured {
            value: f(self.value),
            status: self.status,
        }
    }
}

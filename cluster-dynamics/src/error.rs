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
//! Fatal errors rejected at the API boundary
//!
//! Only malformed input and invalid configuration end up here. Empty
//! clusters, coincident particles and other recoverable situations are
//! reported through [`crate::diagnostics::Status`] instead, so that a long
//! post-processing pipeline never aborts on a single odd snapshot.

use std::fmt;

/// Error returned when input arrays or configuration cannot be used
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying error category
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
enum ErrorKind {
    /// A per-particle array does not have the particle count
    LengthMismatch(LengthMismatchError),
    /// A mass is below zero
    NegativeMass(NegativeMassError),
    /// A coordinate, velocity or mass is NaN or infinite
    NonFinite(NonFiniteError),
    /// A configuration value lies outside its admissible range
    InvalidParameter(InvalidParameterError),
    /// A particle id was requested that is not in the set
    UnknownParticle(i64),
}

impl Error {
    pub(crate) fn length_mismatch(field: &'static str, expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::LengthMismatch(LengthMismatchError {
                field,
                expected,
                actual,
            }),
        }
    }

    pub(crate) fn negative_mass(index: usize, value: f64) -> Self {
        Error {
            kind: ErrorKind::NegativeMass(NegativeMassError { index, value }),
        }
    }

    pub(crate) fn non_finite(field: &'static str, index: usize) -> Self {
        Error {
            kind: ErrorKind::NonFinite(NonFiniteError { field, index }),
        }
    }

    pub(crate) fn invalid_parameter(name: &'static str, reason: String) -> Self {
        Error {
            kind: ErrorKind::InvalidParameter(InvalidParameterError { name, reason }),
        }
    }

    pub(crate) fn unknown_particle(id: i64) -> Self {
        Error {
            kind: ErrorKind::UnknownParticle(id),
        }
    }

    /// True if the error comes from particle arrays of unequal length
    pub fn is_length_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::LengthMismatch(_))
    }

    /// True if the error comes from a negative mass
    pub fn is_negative_mass(&self) -> bool {
        matches!(self.kind, ErrorKind::NegativeMass(_))
    }

    /// True if the error comes from a NaN or infinite input value
    pub fn is_non_finite(&self) -> bool {
        matches!(self.kind, ErrorKind::NonFinite(_))
    }

    /// True if the error comes from a rejected configuration value
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidParameter(_))
    }

    /// True if the error comes from a lookup of a missing particle id
    pub fn is_unknown_particle(&self) -> bool {
        matches!(self.kind, ErrorKind::UnknownParticle(_))
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::LengthMismatch(err) => err.fmt(f),
            ErrorKind::NegativeMass(err) => err.fmt(f),
            ErrorKind::NonFinite(err) => err.fmt(f),
            ErrorKind::InvalidParameter(err) => err.fmt(f),
            ErrorKind::UnknownParticle(id) => write!(f, "no particle with id {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LengthMismatchError {
    field: &'static str,
    expected: usize,
    actual: usize,
}

impl fmt::Display for LengthMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` holds {} values but the particle count is {}",
            self.field, self.actual, self.expected
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NegativeMassError {
    index: usize,
    value: f64,
}

impl fmt::Display for NegativeMassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "particle {} has negative mass {:e}",
            self.index, self.value
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NonFiniteError {
    field: &'static str,
    index: usize,
}

impl fmt::Display for NonFiniteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` of particle {} is NaN or infinite",
            self.field, self.index
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct InvalidParameterError {
    name: &'static str,
    reason: String,
}

impl fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid `{}`: {}", self.name, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = Error::length_mismatch("vx", 10, 9);
        assert!(err.is_length_mismatch());
        assert_eq!(err.to_string(), "`vx` holds 9 values but the particle count is 10");

        let err = Error::negative_mass(3, -1.0);
        assert!(err.is_negative_mass());
        assert!(err.to_string().contains("particle 3"));

        let err = Error::unknown_particle(42);
        assert!(err.is_unknown_particle());
        assert_eq!(err.to_string(), "no particle with id 42");
    }

    #[test]
    fn test_kinds_are_exclusive() {
        let err = Error::non_finite("z", 0);
        assert!(err.is_non_finite());
        assert!(!err.is_negative_mass());
        assert!(!err.is_invalid_parameter());
    }
}

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
//! # Cluster Dynamics
//!
//! Post-processing analysis of self-gravitating N-body star clusters:
//! energies, characteristic radii, relaxation times, density profiles and a
//! robust dynamical centre, computed from an in-memory snapshot.
//!
//! ## Features
//!
//! - **Pairwise Summation**: direct O(N²) potential, inverse-distance and
//!   nearest-neighbour sums with coincident-pair guards
//! - **Parallelization**: Optional Rayon integration with lock-free,
//!   deterministic reduction of per-worker partial sums
//! - **Centre Finding**: shrinking-sphere centre of density and
//!   sigma-clipped centre of mass
//! - **Cluster Properties**: virial, Lagrange, tidal and limiting radii,
//!   relaxation times and density profiles
//! - **Explicit Status**: every result carries a [`diagnostics::Status`]
//!   instead of printing to the console
//!
//! ## Example
//!
//! ```rust
//! use cluster_dynamics::centre::{find_centre_of_density, Centre, DensityCentreConfig};
//! use cluster_dynamics::pairwise::SummationConfig;
//! use cluster_dynamics::particles::{Particle, ParticleSet, Projection};
//! use cluster_dynamics::properties::{half_mass_radius, virial_radius};
//!
//! let set = ParticleSet::from_particles((0..500).map(|i| {
//!     let t = i as f64 * 0.1;
//!     Particle::new([t.cos() * t, t.sin() * t, 0.1 * t], [0.0; 3], 1.0, i)
//! }))?;
//! let view = set.view();
//!
//! let centre = find_centre_of_density(&view, Centre::origin(), &DensityCentreConfig::default())?;
//! let frame = centre.value().centre;
//!
//! let r_h = half_mass_radius(&view, &frame, Projection::Full);
//! let r_v = virial_radius(&view, Projection::Full, &SummationConfig::default());
//! assert!(*r_h.value() > 0.0 && *r_v.value() > 0.0);
//! # Ok::<(), cluster_dynamics::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: coincident particles and
//! empty profile shells at `warn`, iteration traces at `debug`. No logger is
//! installed; applications choose their own.

#![warn(missing_docs)]

/// Centre-of-density and sigma-clipped centre finders
pub mod centre;

/// Status-carrying results for degenerate input and warnings
pub mod diagnostics;

/// Fatal input and configuration errors
pub mod error;

/// All-pairs summation engine
pub mod pairwise;

/// Particle arrays and read-only views
pub mod particles;

/// Energies, radii, relaxation times, profiles and tidal limits
pub mod properties;

pub use centre::{Centre, CentreEstimate, CentreStrategy, Termination};
pub use diagnostics::{Measured, Status};
pub use error::Error;
pub use particles::{Particle, ParticleSet, ParticleView, Projection};

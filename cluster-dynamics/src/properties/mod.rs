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
//! Structural and dynamical properties of a cluster snapshot
//!
//! Every function here takes the reference frame explicitly as a
//! [`Centre`](crate::centre::Centre): radii are measured from its position
//! and speeds relative to its velocity. Nothing is converted between unit
//! systems; the gravitational constant is supplied by the caller in the
//! units of the snapshot.
//!
//! O(N²) quantities (energies, the inverse-distance virial radius) go
//! through the [`pairwise`](crate::pairwise) engine; the rest sort particles
//! by radius once and work on cumulative mass.

mod energy;
mod profile;
mod radii;
mod relaxation;
mod tidal;

pub use energy::{energies, particle_energy, Energies, EnergyConfig, ParticleEnergy};
pub use profile::{density_profile, DensityProfile, ProfileBin, ProfileConfig};
pub use radii::{
    half_mass_radius, lagrange_radii, mass_fraction_radius, virial_radius,
    virial_radius_critical_density, CriticalDensity,
};
pub use relaxation::{
    core_relaxation_time, half_mass_relaxation_time, relaxation_time, RelaxationConfig,
};
pub use tidal::{
    limiting_radius, tidal_radius, GalacticPotential, IsothermalHalo, LimitingConfig,
    PointMassHost, TidalConfig, TidalRadius,
};

/// Abscissa where the line through `(x1, y1)` and `(x2, y2)` reaches `y`
///
/// Returns `x1` for a horizontal segment.
pub(crate) fn interpolate_x(x1: f64, y1: f64, x2: f64, y2: f64, y: f64) -> f64 {
    if y2 == y1 {
        return x1;
    }
    x1 + (y - y1) * (x2 - x1) / (y2 - y1)
}

pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), crate::error::Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(crate::error::Error::invalid_parameter(
            name,
            format!("must be finite and positive, got {}", value),
        ))
    }
}

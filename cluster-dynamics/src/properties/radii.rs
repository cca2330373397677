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
//! Characteristic radii: virial, Lagrange and half-mass
//!
//! # References
//!
//! - Portegies Zwart, S. & McMillan, S. (2018). "Astrophysical Recipes: The
//!   art of AMUSE" (inverse-distance virial radius)

use std::f64::consts::PI;

use super::{check_positive, interpolate_x};
use crate::centre::Centre;
use crate::diagnostics::{DegenerateReason, Measured, Status};
use crate::error::Error;
use crate::pairwise::{sum_pairs, InverseDistanceKernel, SummationConfig};
use crate::particles::{ParticleView, Projection};

/// Particles ordered by radius with their cumulative mass
pub(crate) struct MassOrder {
    /// Radii in ascending order
    pub radii: Vec<f64>,
    /// Mass enclosed up to and including each sorted particle
    pub cumulative: Vec<f64>,
}

impl MassOrder {
    pub fn new(view: &ParticleView<'_>, frame: &Centre, projection: Projection) -> Self {
        let mut order: Vec<(f64, f64)> = (0..view.len())
            .map(|i| (view.radius(i, frame, projection), view.mass(i)))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut running = 0.0;
        let (radii, cumulative) = order
            .into_iter()
            .map(|(r, m)| {
                running += m;
                (r, running)
            })
            .unzip();
        MassOrder { radii, cumulative }
    }

    pub fn total_mass(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn max_radius(&self) -> f64 {
        self.radii.last().copied().unwrap_or(0.0)
    }

    /// Radius of the first particle at which the enclosed mass reaches `mass`
    pub fn radius_enclosing(&self, mass: f64) -> f64 {
        let index = self.cumulative.partition_point(|&m| m < mass);
        self.radii
            .get(index)
            .copied()
            .unwrap_or_else(|| self.max_radius())
    }

    /// Neutral-value status for empty or massless input
    pub fn degenerate_reason(&self) -> Option<DegenerateReason> {
        if self.radii.is_empty() {
            Some(DegenerateReason::NoParticles)
        } else if self.total_mass() <= 0.0 {
            Some(DegenerateReason::NoMass)
        } else {
            None
        }
    }
}

/// Virial radius from the mass-weighted mean inverse distance
///
/// **r_v = M² / (2 Σ_{i<j} m_i m_j / r_ij)**
///
/// Returns 0 with a `Degenerate` status for fewer than two particles, when
/// fewer than two particles carry mass, or when every massive pair is
/// coincident (`ZeroExtent`).
pub fn virial_radius(
    view: &ParticleView<'_>,
    projection: Projection,
    summation: &SummationConfig,
) -> Measured<f64> {
    let (sum, status) = sum_pairs(view, &InverseDistanceKernel, projection, summation).into_parts();
    if status.degenerate_reason().is_some() {
        return Measured::with_status(0.0, status);
    }
    if sum.total <= 0.0 {
        let massive = view.masses().iter().filter(|&&m| m > 0.0).count();
        let reason = match massive {
            0 => DegenerateReason::NoMass,
            1 => DegenerateReason::SingleParticle,
            // every massive pair was coincident and skipped
            _ => DegenerateReason::ZeroExtent,
        };
        return Measured::with_status(0.0, status.merge(Status::Degenerate(reason)));
    }
    let mass = view.total_mass();
    Measured::with_status(mass * mass / (2.0 * sum.total), status)
}

/// Cosmological parameters for [`virial_radius_critical_density`]
///
/// The defaults are in parsecs, km/s and solar masses:
/// H = 70 km/s/Mpc, G = 4.302e-3 pc (km/s)² / M☉ and an overdensity of 200.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalDensity {
    /// Hubble constant in velocity per length units of the snapshot
    pub hubble: f64,
    /// Gravitational constant in snapshot units
    pub grav: f64,
    /// Multiple of the critical density that defines the virial radius
    pub overdensity: f64,
}

impl Default for CriticalDensity {
    fn default() -> Self {
        CriticalDensity {
            hubble: 70.0e-6,
            grav: 4.302e-3,
            overdensity: 200.0,
        }
    }
}

impl CriticalDensity {
    /// Set the Hubble constant
    pub fn with_hubble(mut self, hubble: f64) -> Self {
        self.hubble = hubble;
        self
    }

    /// Set the gravitational constant
    pub fn with_grav(mut self, grav: f64) -> Self {
        self.grav = grav;
        self
    }

    /// Set the overdensity
    pub fn with_overdensity(mut self, overdensity: f64) -> Self {
        self.overdensity = overdensity;
        self
    }

    /// Critical density of the universe, 3H² / (8πG)
    pub fn rho_crit(&self) -> f64 {
        3.0 * self.hubble * self.hubble / (8.0 * PI * self.grav)
    }

    /// Density at which the virial radius is placed
    pub fn threshold(&self) -> f64 {
        self.rho_crit() * self.overdensity
    }

    /// Check the parameters
    ///
    /// # Errors
    ///
    /// Returns an error unless every parameter is positive and finite.
    pub fn validate(&self) -> Result<(), Error> {
        check_positive("hubble", self.hubble)?;
        check_positive("grav", self.grav)?;
        check_positive("overdensity", self.overdensity)
    }
}

/// Radius at which the mean enclosed density falls to the overdensity threshold
///
/// The enclosed density profile **ρ(<r) = M(<r) / (4/3 π r³)** is sampled at
/// every particle. The sample closest to the threshold is found; if it is
/// the innermost or outermost one its radius is returned as is, otherwise
/// the crossing is linearly interpolated with its neighbour on the other
/// side of the threshold. Particles at the frame centre are excluded from
/// the samples but their mass still counts.
///
/// # Errors
///
/// Returns an error if `params` fails [`CriticalDensity::validate`].
pub fn virial_radius_critical_density(
    view: &ParticleView<'_>,
    frame: &Centre,
    params: &CriticalDensity,
    projection: Projection,
) -> Result<Measured<f64>, Error> {
    params.validate()?;
    let order = MassOrder::new(view, frame, projection);
    if let Some(reason) = order.degenerate_reason() {
        return Ok(Measured::degenerate(0.0, reason));
    }

    let (radii, density): (Vec<f64>, Vec<f64>) = order
        .radii
        .iter()
        .zip(&order.cumulative)
        .filter(|&(&r, _)| r > 0.0)
        .map(|(&r, &m)| (r, m / (4.0 / 3.0 * PI * r * r * r)))
        .unzip();
    if radii.is_empty() {
        return Ok(Measured::degenerate(0.0, DegenerateReason::ZeroExtent));
    }

    let target = params.threshold();
    let closest = density
        .iter()
        .enumerate()
        .fold(0, |best, (i, rho)| {
            if (rho - target).abs() < (density[best] - target).abs() {
                i
            } else {
                best
            }
        });

    let last = radii.len() - 1;
    let r_v = if closest == 0 || closest == last || density[closest] == target {
        radii[closest]
    } else {
        let (lo, hi) = if density[closest] < target {
            (closest - 1, closest)
        } else {
            (closest, closest + 1)
        };
        if radii[hi] == radii[lo] {
            radii[closest]
        } else {
            interpolate_x(radii[lo], density[lo], radii[hi], density[hi], target)
        }
    };
    Ok(Measured::ok(r_v))
}

/// Radii enclosing 1/n, 2/n, ... of the total mass
///
/// The first `n - 1` entries are the radii of the first particle at which
/// the enclosed mass reaches `i/n` of the total; the list is padded to
/// length `n` with the outermost radius.
///
/// # Errors
///
/// Returns an error if `n` is zero.
pub fn lagrange_radii(
    view: &ParticleView<'_>,
    frame: &Centre,
    n: usize,
    projection: Projection,
) -> Result<Measured<Vec<f64>>, Error> {
    if n == 0 {
        return Err(Error::invalid_parameter(
            "n",
            "at least one Lagrange radius is required".to_string(),
        ));
    }
    let order = MassOrder::new(view, frame, projection);
    if let Some(reason) = order.degenerate_reason() {
        return Ok(Measured::degenerate(vec![0.0; n], reason));
    }

    let total = order.total_mass();
    let mut radii: Vec<f64> = (1..n)
        .map(|i| order.radius_enclosing(total * i as f64 / n as f64))
        .collect();
    radii.resize(n, order.max_radius());
    Ok(Measured::ok(radii))
}

/// Radius enclosing `fraction` of the total mass
///
/// # Errors
///
/// Returns an error unless `0 < fraction <= 1`.
pub fn mass_fraction_radius(
    view: &ParticleView<'_>,
    frame: &Centre,
    fraction: f64,
    projection: Projection,
) -> Result<Measured<f64>, Error> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(Error::invalid_parameter(
            "fraction",
            format!("must lie in (0, 1], got {}", fraction),
        ));
    }
    Ok(fraction_radius(&MassOrder::new(view, frame, projection), fraction))
}

/// Radius enclosing half the total mass
pub fn half_mass_radius(view: &ParticleView<'_>, frame: &Centre, projection: Projection) -> Measured<f64> {
    fraction_radius(&MassOrder::new(view, frame, projection), 0.5)
}

pub(crate) fn fraction_radius(order: &MassOrder, fraction: f64) -> Measured<f64> {
    match order.degenerate_reason() {
        Some(reason) => Measured::degenerate(0.0, reason),
        None => Measured::ok(order.radius_enclosing(order.total_mass() * fraction)),
    }
}

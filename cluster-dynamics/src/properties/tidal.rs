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
//! Tidal and limiting radii in a host galaxy
//!
//! The host is abstracted behind [`GalacticPotential`], which only needs to
//! report its local density and the tidal radius of a given mass at the
//! cluster's galactocentric position. Two analytic hosts are provided.
//!
//! # References
//!
//! - King, I. (1962). "The structure of star clusters. I.", AJ 67, 471
//! - Bertin, G. & Varri, A. L. (2008). ApJ 689, 1005

use std::f64::consts::PI;

use super::profile::{density_profile, ProfileConfig};
use super::{check_positive, interpolate_x};
use crate::centre::Centre;
use crate::diagnostics::{DegenerateReason, Measured};
use crate::error::Error;
use crate::particles::{ParticleView, Projection};

/// A host galaxy potential evaluated at the cluster's position
///
/// Positions are galactocentric cylindrical coordinates `(r_cyl, z)` in the
/// snapshot's length unit; densities and masses are in snapshot units.
pub trait GalacticPotential {
    /// Local mass density of the host
    fn density_at(&self, r_cyl: f64, z: f64) -> f64;

    /// Tidal radius of a cluster of `mass`
    fn tidal_radius(&self, mass: f64, r_cyl: f64, z: f64) -> f64;
}

/// A point-mass host (Jacobi radius)
///
/// **r_t = R (m / 3M)^{1/3}**, with R the galactocentric distance. The
/// background density is zero away from the point mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMassHost {
    /// Host mass
    pub mass: f64,
}

impl GalacticPotential for PointMassHost {
    fn density_at(&self, _r_cyl: f64, _z: f64) -> f64 {
        0.0
    }

    fn tidal_radius(&self, mass: f64, r_cyl: f64, z: f64) -> f64 {
        let distance = r_cyl.hypot(z);
        distance * (mass / (3.0 * self.mass)).cbrt()
    }
}

/// A singular isothermal halo with a flat rotation curve
///
/// **ρ(R) = v_c² / (4π G R²)** and **r_t = (G m R² / 2 v_c²)^{1/3}**.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsothermalHalo {
    /// Circular velocity
    pub circular_velocity: f64,
    /// Gravitational constant in snapshot units
    pub grav: f64,
}

impl GalacticPotential for IsothermalHalo {
    fn density_at(&self, r_cyl: f64, z: f64) -> f64 {
        let r2 = r_cyl * r_cyl + z * z;
        self.circular_velocity * self.circular_velocity / (4.0 * PI * self.grav * r2)
    }

    fn tidal_radius(&self, mass: f64, r_cyl: f64, z: f64) -> f64 {
        let r2 = r_cyl * r_cyl + z * z;
        (self.grav * mass * r2 / (2.0 * self.circular_velocity * self.circular_velocity)).cbrt()
    }
}

/// Configuration for [`tidal_radius`]
#[derive(Debug, Clone, PartialEq)]
pub struct TidalConfig {
    /// Galactocentric cylindrical radius of the cluster
    pub r_gc: f64,
    /// Height above the galactic plane (default: 0.0)
    pub z_gc: f64,
    /// Maximum refinements on the enclosed mass (default: 0, use the total mass only)
    pub iterations: usize,
    /// Stop refining once new / old reaches this ratio (default: 0.9)
    pub converge: f64,
}

impl TidalConfig {
    /// Evaluate the host at `(r_gc, 0)` with no refinement
    pub fn new(r_gc: f64) -> Self {
        TidalConfig {
            r_gc,
            z_gc: 0.0,
            iterations: 0,
            converge: 0.9,
        }
    }

    /// Set the height above the plane
    pub fn with_z_gc(mut self, z_gc: f64) -> Self {
        self.z_gc = z_gc;
        self
    }

    /// Set the number of refinements
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the convergence ratio
    pub fn with_converge(mut self, converge: f64) -> Self {
        self.converge = converge;
        self
    }

    /// Check the parameters
    ///
    /// # Errors
    ///
    /// Returns an error if `r_gc` is negative or a value is not finite.
    pub fn validate(&self) -> Result<(), Error> {
        validate_position(self.r_gc, self.z_gc)?;
        check_positive("converge", self.converge)
    }
}

fn validate_position(r_gc: f64, z_gc: f64) -> Result<(), Error> {
    if !r_gc.is_finite() || r_gc < 0.0 {
        return Err(Error::invalid_parameter(
            "r_gc",
            format!("must be finite and non-negative, got {}", r_gc),
        ));
    }
    if !z_gc.is_finite() {
        return Err(Error::invalid_parameter("z_gc", format!("must be finite, got {}", z_gc)));
    }
    Ok(())
}

/// Result of [`tidal_radius`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidalRadius {
    /// Tidal radius
    pub radius: f64,
    /// Mass used for the final estimate
    pub mass: f64,
    /// Refinements applied
    pub iterations: usize,
}

/// Tidal radius of the cluster in `host`
///
/// The first estimate uses the total mass. Each refinement takes the mass
/// within the previous radius (3D, about `frame`) and asks the host again;
/// refinement stops when new / old reaches `converge`, which keeps the
/// previous estimate. If the host returns zero the radius collapses to 0
/// with status `Degenerate(ZeroTidalRadius)`.
///
/// # Errors
///
/// Returns an error if `config` fails [`TidalConfig::validate`].
pub fn tidal_radius<P>(
    view: &ParticleView<'_>,
    frame: &Centre,
    host: &P,
    config: &TidalConfig,
) -> Result<Measured<TidalRadius>, Error>
where
    P: GalacticPotential + ?Sized,
{
    config.validate()?;
    let mut estimate = TidalRadius {
        radius: 0.0,
        mass: view.total_mass(),
        iterations: 0,
    };
    if view.is_empty() {
        return Ok(Measured::degenerate(estimate, DegenerateReason::NoParticles));
    }
    if estimate.mass <= 0.0 {
        return Ok(Measured::degenerate(estimate, DegenerateReason::NoMass));
    }

    estimate.radius = host.tidal_radius(estimate.mass, config.r_gc, config.z_gc);
    if estimate.radius <= 0.0 {
        return Ok(Measured::degenerate(estimate, DegenerateReason::ZeroTidalRadius));
    }

    for _ in 0..config.iterations {
        let enclosed: f64 = (0..view.len())
            .filter(|&i| view.radius(i, frame, Projection::Full) < estimate.radius)
            .map(|i| view.mass(i))
            .sum();
        let refined = host.tidal_radius(enclosed, config.r_gc, config.z_gc);
        log::debug!(
            "tidal radius {} -> {} (enclosed mass {})",
            estimate.radius,
            refined,
            enclosed
        );

        if refined == 0.0 {
            log::warn!("tidal radius collapsed to zero after {} refinements", estimate.iterations);
            estimate.radius = 0.0;
            estimate.mass = enclosed;
            return Ok(Measured::degenerate(estimate, DegenerateReason::ZeroTidalRadius));
        }
        if refined / estimate.radius >= config.converge {
            break;
        }
        estimate.radius = refined;
        estimate.mass = enclosed;
        estimate.iterations += 1;
    }

    Ok(Measured::ok(estimate))
}

/// Configuration for [`limiting_radius`]
#[derive(Debug, Clone, PartialEq)]
pub struct LimitingConfig {
    /// Galactocentric cylindrical radius of the cluster
    pub r_gc: f64,
    /// Height above the galactic plane (default: 0.0)
    pub z_gc: f64,
    /// Bins in the density profile (default: 20)
    pub nbins: usize,
    /// Spherical or projected profile (default: Full)
    pub projection: Projection,
}

impl LimitingConfig {
    /// Evaluate the host at `(r_gc, 0)` with a 20-bin 3D profile
    pub fn new(r_gc: f64) -> Self {
        LimitingConfig {
            r_gc,
            z_gc: 0.0,
            nbins: 20,
            projection: Projection::Full,
        }
    }

    /// Set the height above the plane
    pub fn with_z_gc(mut self, z_gc: f64) -> Self {
        self.z_gc = z_gc;
        self
    }

    /// Set the number of profile bins
    pub fn with_nbins(mut self, nbins: usize) -> Self {
        self.nbins = nbins;
        self
    }

    /// Set the projection
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Check the parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the position is invalid or `nbins` is zero.
    pub fn validate(&self) -> Result<(), Error> {
        validate_position(self.r_gc, self.z_gc)?;
        if self.nbins == 0 {
            return Err(Error::invalid_parameter("nbins", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Radius where the cluster's density profile meets the host's local density
///
/// Returns the outermost bin radius if the profile never drops below the
/// background, 0 if even the innermost bin is below it, and otherwise the
/// linear interpolation between the last bin above and the first bin below.
///
/// # Errors
///
/// Returns an error if `config` fails [`LimitingConfig::validate`].
pub fn limiting_radius<P>(
    view: &ParticleView<'_>,
    frame: &Centre,
    host: &P,
    config: &LimitingConfig,
) -> Result<Measured<f64>, Error>
where
    P: GalacticPotential + ?Sized,
{
    config.validate()?;
    let background = host.density_at(config.r_gc, config.z_gc);
    let profile_config = ProfileConfig::default()
        .with_nbins(config.nbins)
        .with_projection(config.projection);
    let (profile, status) = density_profile(view, frame, &profile_config)?.into_parts();
    if status.degenerate_reason().is_some() {
        return Ok(Measured::with_status(0.0, status));
    }

    let bins = &profile.bins;
    let (first, last) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(Measured::with_status(0.0, status)),
    };

    let r_l = if last.density > background {
        last.radius
    } else if first.density < background {
        0.0
    } else {
        match bins.iter().position(|bin| bin.density < background) {
            Some(below) if below > 0 => {
                let above = &bins[below - 1];
                let below = &bins[below];
                interpolate_x(above.radius, above.density, below.radius, below.density, background)
            }
            // last.density == background: the crossing is the outermost bin
            _ => last.radius,
        }
    };
    Ok(Measured::with_status(r_l, status))
}

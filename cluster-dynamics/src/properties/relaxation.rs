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
//! Two-body relaxation timescales
//!
//! All three estimates share the Coulomb logarithm **ln Λ = ln(γ N)**, with
//! γ the `coulomb` parameter and N the number of particles in the view.
//! Times come out in the snapshot's time unit (length / velocity); no
//! conversion to years is applied.
//!
//! # References
//!
//! - Spitzer, L. Jr. & Hart, M. H. (1971). ApJ 164, 399, equation 5
//! - Spitzer, L. (1987). "Dynamical Evolution of Globular Clusters"
//! - Stone, N. C. & Ostriker, J. P. (2015). ApJ 806, 28

use std::f64::consts::PI;

use super::check_positive;
use super::radii::{fraction_radius, MassOrder};
use crate::centre::Centre;
use crate::diagnostics::{DegenerateReason, Measured};
use crate::error::Error;
use crate::particles::{ParticleView, Projection};

/// Configuration shared by the relaxation-time estimates
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationConfig {
    /// Gravitational constant in snapshot units (default: 1.0)
    pub grav: f64,
    /// Coulomb parameter γ in ln(γ N) (default: 0.4)
    pub coulomb: f64,
    /// Radius for [`relaxation_time`] (default: None, the half-mass radius)
    pub radius: Option<f64>,
    /// Radii and speeds in 3D or projected (default: Full)
    pub projection: Projection,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        RelaxationConfig {
            grav: 1.0,
            coulomb: 0.4,
            radius: None,
            projection: Projection::Full,
        }
    }
}

impl RelaxationConfig {
    /// Set the gravitational constant
    pub fn with_grav(mut self, grav: f64) -> Self {
        self.grav = grav;
        self
    }

    /// Set the Coulomb parameter
    pub fn with_coulomb(mut self, coulomb: f64) -> Self {
        self.coulomb = coulomb;
        self
    }

    /// Measure within a fixed radius instead of the half-mass radius
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
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
    /// Returns an error unless `grav`, `coulomb` and any fixed `radius` are
    /// positive and finite.
    pub fn validate(&self) -> Result<(), Error> {
        check_positive("grav", self.grav)?;
        check_positive("coulomb", self.coulomb)?;
        if let Some(radius) = self.radius {
            check_positive("radius", radius)?;
        }
        Ok(())
    }

    fn coulomb_log(&self, n: usize) -> Result<f64, DegenerateReason> {
        let ln_lambda = (self.coulomb * n as f64).ln();
        if ln_lambda > 0.0 {
            Ok(ln_lambda)
        } else {
            Err(DegenerateReason::NonPositiveCoulombLog)
        }
    }
}

/// Relaxation time within a radius (Spitzer & Hart 1971)
///
/// **t_r = ⟨v²⟩^{3/2} / (15.4 G² m̄² n ln Λ)**
///
/// where ⟨v²⟩ and m̄ are averaged over the particles within the radius and
/// n is their number density. The radius defaults to the half-mass radius.
///
/// # Errors
///
/// Returns an error if `config` fails [`RelaxationConfig::validate`].
pub fn relaxation_time(
    view: &ParticleView<'_>,
    frame: &Centre,
    config: &RelaxationConfig,
) -> Result<Measured<f64>, Error> {
    config.validate()?;
    if view.is_empty() {
        return Ok(Measured::degenerate(0.0, DegenerateReason::NoParticles));
    }
    let ln_lambda = match config.coulomb_log(view.len()) {
        Ok(value) => value,
        Err(reason) => return Ok(Measured::degenerate(0.0, reason)),
    };

    let radius = match config.radius {
        Some(radius) => radius,
        None => {
            let (rm, status) = fraction_radius(&MassOrder::new(view, frame, config.projection), 0.5).into_parts();
            if status.degenerate_reason().is_some() {
                return Ok(Measured::with_status(0.0, status));
            }
            rm
        }
    };
    if radius <= 0.0 {
        return Ok(Measured::degenerate(0.0, DegenerateReason::ZeroExtent));
    }

    let inside: Vec<usize> = (0..view.len())
        .filter(|&i| view.radius(i, frame, config.projection) <= radius)
        .collect();
    if inside.is_empty() {
        return Ok(Measured::degenerate(
            0.0,
            DegenerateReason::InsufficientPopulation {
                available: 0,
                required: 1,
            },
        ));
    }

    let count = inside.len() as f64;
    let m_bar = inside.iter().map(|&i| view.mass(i)).sum::<f64>() / count;
    if m_bar <= 0.0 {
        return Ok(Measured::degenerate(0.0, DegenerateReason::NoMass));
    }
    let v2 = inside
        .iter()
        .map(|&i| {
            let v = view.speed(i, frame, config.projection);
            v * v
        })
        .sum::<f64>()
        / count;
    let number_density = count / (4.0 / 3.0 * PI * radius.powi(3));

    let grav = config.grav;
    Ok(Measured::ok(
        v2.powf(1.5) / (15.4 * grav * grav * m_bar * m_bar * number_density * ln_lambda),
    ))
}

/// Half-mass relaxation time (Spitzer 1987)
///
/// **t_rh = 0.138 √M r_h^{3/2} / (m̄ √G ln Λ)**
///
/// # Errors
///
/// Returns an error if `config` fails [`RelaxationConfig::validate`].
pub fn half_mass_relaxation_time(
    view: &ParticleView<'_>,
    frame: &Centre,
    config: &RelaxationConfig,
) -> Result<Measured<f64>, Error> {
    config.validate()?;
    let order = MassOrder::new(view, frame, config.projection);
    if let Some(reason) = order.degenerate_reason() {
        return Ok(Measured::degenerate(0.0, reason));
    }
    let ln_lambda = match config.coulomb_log(view.len()) {
        Ok(value) => value,
        Err(reason) => return Ok(Measured::degenerate(0.0, reason)),
    };

    let mass = order.total_mass();
    let m_bar = mass / view.len() as f64;
    let r_h = *fraction_radius(&order, 0.5).value();

    Ok(Measured::ok(
        0.138 * mass.sqrt() * r_h.powf(1.5) / (m_bar * config.grav.sqrt() * ln_lambda),
    ))
}

/// Core relaxation time (Stone & Ostriker 2015)
///
/// **t_rc = (0.39 / ln Λ) √(r_c³ / (G M)) (M / m̄) √(r_c r_h) / (r_c + r_h)**
///
/// with r_c the 10% Lagrange radius and r_h the half-mass radius.
///
/// # Errors
///
/// Returns an error if `config` fails [`RelaxationConfig::validate`].
pub fn core_relaxation_time(
    view: &ParticleView<'_>,
    frame: &Centre,
    config: &RelaxationConfig,
) -> Result<Measured<f64>, Error> {
    config.validate()?;
    let order = MassOrder::new(view, frame, config.projection);
    if let Some(reason) = order.degenerate_reason() {
        return Ok(Measured::degenerate(0.0, reason));
    }
    let ln_lambda = match config.coulomb_log(view.len()) {
        Ok(value) => value,
        Err(reason) => return Ok(Measured::degenerate(0.0, reason)),
    };

    let mass = order.total_mass();
    let m_bar = mass / view.len() as f64;
    let r_c = *fraction_radius(&order, 0.1).value();
    let r_h = *fraction_radius(&order, 0.5).value();
    // more than a tenth of the mass sits on the frame centre
    if r_c <= 0.0 {
        return Ok(Measured::degenerate(0.0, DegenerateReason::ZeroExtent));
    }

    let t = (0.39 / ln_lambda)
        * (r_c.powi(3) / (config.grav * mass)).sqrt()
        * (mass / m_bar)
        * (r_c * r_h).sqrt()
        / (r_c + r_h);
    Ok(Measured::ok(t))
}

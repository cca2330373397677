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
//! Shrinking-sphere centre of density

use super::{norm_sq, sub, weighted_centroid, Centre, CentreEstimate, Termination};
use crate::diagnostics::{DegenerateReason, Measured};
use crate::error::Error;
use crate::particles::ParticleView;

/// Configuration for [`find_centre_of_density`]
///
/// # Example
///
/// ```
/// use cluster_dynamics::centre::DensityCentreConfig;
///
/// let config = DensityCentreConfig::default()
///     .with_r_min(0.05)
///     .with_r_max(20.0)
///     .with_max_iterations(50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCentreConfig {
    /// Stop once the sphere radius is at or below this value (default: 0.1)
    pub r_min: f64,
    /// Initial sphere radius (default: None, the farthest particle from the start)
    pub r_max: Option<f64>,
    /// Maximum number of re-centring steps (default: 100)
    pub max_iterations: usize,
    /// A sphere must hold more than this many particles to be used (default: 100)
    pub min_population: usize,
    /// Factor applied to the radius after each step (default: 0.8)
    pub shrink_factor: f64,
}

impl Default for DensityCentreConfig {
    fn default() -> Self {
        DensityCentreConfig {
            r_min: 0.1,
            r_max: None,
            max_iterations: 100,
            min_population: 100,
            shrink_factor: 0.8,
        }
    }
}

impl DensityCentreConfig {
    /// Set the stopping radius
    pub fn with_r_min(mut self, r_min: f64) -> Self {
        self.r_min = r_min;
        self
    }

    /// Set the initial radius
    pub fn with_r_max(mut self, r_max: f64) -> Self {
        self.r_max = Some(r_max);
        self
    }

    /// Set the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the population floor
    pub fn with_min_population(mut self, min_population: usize) -> Self {
        self.min_population = min_population;
        self
    }

    /// Set the per-step shrink factor
    pub fn with_shrink_factor(mut self, shrink_factor: f64) -> Self {
        self.shrink_factor = shrink_factor;
        self
    }

    /// Check the parameters
    ///
    /// # Errors
    ///
    /// Returns an error if `r_min` is negative or not finite, `r_max` is not
    /// positive and finite, or `shrink_factor` is outside `(0, 1)`.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.r_min.is_finite() || self.r_min < 0.0 {
            return Err(Error::invalid_parameter(
                "r_min",
                format!("must be finite and non-negative, got {}", self.r_min),
            ));
        }
        if let Some(r_max) = self.r_max {
            if !r_max.is_finite() || r_max <= 0.0 {
                return Err(Error::invalid_parameter(
                    "r_max",
                    format!("must be finite and positive, got {}", r_max),
                ));
            }
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(Error::invalid_parameter(
                "shrink_factor",
                format!("must lie in (0, 1), got {}", self.shrink_factor),
            ));
        }
        Ok(())
    }
}

/// Find the centre of density by iteratively shrinking a sphere
///
/// Starting from `start`, each step selects the particles strictly inside
/// the current radius, moves the centre to their mass-weighted centroid
/// (position and velocity) and shrinks the radius by
/// [`DensityCentreConfig::shrink_factor`].
///
/// # Termination
///
/// - no mass inside the sphere: [`Termination::EmptySphere`], the current
///   centre is returned unchanged with status `Degenerate(EmptySphere)`;
/// - `min_population` particles or fewer inside the sphere:
///   [`Termination::PopulationFloor`], the previous centre is kept;
/// - radius at or below `r_min` after a step: [`Termination::Converged`];
/// - `max_iterations` steps taken: [`Termination::IterationLimit`].
///
/// An empty view returns `start` with status `Degenerate(NoParticles)`.
///
/// # Errors
///
/// Returns an error if `config` fails [`DensityCentreConfig::validate`].
pub fn find_centre_of_density(
    view: &ParticleView<'_>,
    start: Centre,
    config: &DensityCentreConfig,
) -> Result<Measured<CentreEstimate>, Error> {
    config.validate()?;

    let mut r_lim = match config.r_max {
        Some(r_max) => r_max,
        None => farthest(view, &start),
    };
    let mut estimate = CentreEstimate {
        centre: start,
        iterations: 0,
        population: 0,
        radius: r_lim,
        termination: Termination::EmptySphere,
    };

    if view.is_empty() {
        return Ok(Measured::degenerate(estimate, DegenerateReason::NoParticles));
    }
    if config.max_iterations == 0 {
        estimate.termination = Termination::IterationLimit;
        return Ok(Measured::ok(estimate));
    }

    loop {
        let r_lim_sq = r_lim * r_lim;
        let frame = estimate.centre;
        let inside: Vec<usize> = (0..view.len())
            .filter(|&i| norm_sq(sub(view.position(i), frame.position)) < r_lim_sq)
            .collect();

        let centroid = match weighted_centroid(view, &frame, inside.iter().copied()) {
            Some(centroid) => centroid,
            None => {
                log::debug!(
                    "centre of density: sphere of radius {} holds no mass after {} steps",
                    r_lim,
                    estimate.iterations
                );
                estimate.termination = Termination::EmptySphere;
                return Ok(Measured::degenerate(estimate, DegenerateReason::EmptySphere));
            }
        };

        if inside.len() <= config.min_population {
            log::debug!(
                "centre of density: {} particles inside r = {}, keeping previous centre",
                inside.len(),
                r_lim
            );
            estimate.termination = Termination::PopulationFloor;
            return Ok(Measured::ok(estimate));
        }

        // centroid is relative to the current frame, so this is a translation
        estimate.centre.translate(&centroid);
        estimate.iterations += 1;
        estimate.population = inside.len();
        estimate.radius = r_lim;

        if r_lim <= config.r_min {
            estimate.termination = Termination::Converged;
            return Ok(Measured::ok(estimate));
        }
        if estimate.iterations >= config.max_iterations {
            log::debug!(
                "centre of density: iteration limit {} reached at r = {}",
                config.max_iterations,
                r_lim
            );
            estimate.termination = Termination::IterationLimit;
            return Ok(Measured::ok(estimate));
        }
        r_lim *= config.shrink_factor;
    }
}

fn farthest(view: &ParticleView<'_>, from: &Centre) -> f64 {
    (0..view.len())
        .map(|i| norm_sq(sub(view.position(i), from.position)))
        .fold(0.0, f64::max)
        .sqrt()
}

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
//! Sigma-clipped centre of mass
//!
//! The same procedure NBODY6 uses to keep tidal tails out of the centre:
//! clip on radius until roughly `nsphere` particles remain, then take the
//! centre of mass of the survivors.

use super::{norm_sq, sub, weighted_centroid, Centre, CentreEstimate, Termination};
use crate::diagnostics::{DegenerateReason, Measured};
use crate::error::Error;
use crate::particles::ParticleView;

/// Configuration for [`find_centre_sigma_clip`]
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaClipConfig {
    /// Clip radius in units of the standard deviation of the radii (default: 1.0)
    pub nsigma: f64,
    /// Target population; clipping stops before going at or below it (default: 100)
    pub nsphere: usize,
}

impl Default for SigmaClipConfig {
    fn default() -> Self {
        SigmaClipConfig {
            nsigma: 1.0,
            nsphere: 100,
        }
    }
}

impl SigmaClipConfig {
    /// Set the clip width
    pub fn with_nsigma(mut self, nsigma: f64) -> Self {
        self.nsigma = nsigma;
        self
    }

    /// Set the target population
    pub fn with_nsphere(mut self, nsphere: usize) -> Self {
        self.nsphere = nsphere;
        self
    }

    /// Check the parameters
    ///
    /// # Errors
    ///
    /// Returns an error if `nsigma` is not positive and finite.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.nsigma.is_finite() || self.nsigma <= 0.0 {
            return Err(Error::invalid_parameter(
                "nsigma",
                format!("must be finite and positive, got {}", self.nsigma),
            ));
        }
        Ok(())
    }
}

/// Find the centre of mass of the particles surviving a radial sigma clip
///
/// While more than `nsphere` particles remain, radii are measured from the
/// working centre (initially `start`) and particles at or beyond
/// `nsigma * std(r)` are dropped. If the survivors still outnumber
/// `nsphere`, the working centre moves to their unweighted mean position and
/// the clip repeats. The result is the mass-weighted position and velocity
/// of the final set, in the input frame.
///
/// Stops with [`Termination::ClipExhausted`] when a clip would leave
/// `nsphere` or fewer particles (or there were never more), and with
/// [`Termination::NoClipProgress`] when a clip removes nothing.
///
/// # Errors
///
/// Returns an error if `config` fails [`SigmaClipConfig::validate`].
pub fn find_centre_sigma_clip(
    view: &ParticleView<'_>,
    start: Centre,
    config: &SigmaClipConfig,
) -> Result<Measured<CentreEstimate>, Error> {
    config.validate()?;

    let mut kept: Vec<usize> = (0..view.len()).collect();
    let mut working = start.position;
    let mut estimate = CentreEstimate {
        centre: start,
        iterations: 0,
        population: kept.len(),
        radius: f64::INFINITY,
        termination: Termination::ClipExhausted,
    };

    if view.is_empty() {
        return Ok(Measured::degenerate(estimate, DegenerateReason::NoParticles));
    }

    while kept.len() > config.nsphere {
        let radii: Vec<f64> = kept
            .iter()
            .map(|&i| norm_sq(sub(view.position(i), working)).sqrt())
            .collect();
        let clip = config.nsigma * population_std(&radii);

        let survivors: Vec<usize> = kept
            .iter()
            .zip(&radii)
            .filter(|&(_, &r)| r < clip)
            .map(|(&i, _)| i)
            .collect();

        if survivors.len() <= config.nsphere {
            estimate.termination = Termination::ClipExhausted;
            break;
        }
        if survivors.len() == kept.len() {
            estimate.termination = Termination::NoClipProgress;
            break;
        }

        working = mean_position(view, &survivors);
        kept = survivors;
        estimate.iterations += 1;
        estimate.radius = clip;
        log::debug!(
            "sigma clip {}: {} particles inside r = {}",
            estimate.iterations,
            kept.len(),
            clip
        );
    }

    estimate.population = kept.len();
    match weighted_centroid(view, &Centre::origin(), kept.iter().copied()) {
        Some(centroid) => {
            estimate.centre = centroid;
            Ok(Measured::ok(estimate))
        }
        None => Ok(Measured::degenerate(estimate, DegenerateReason::NoMass)),
    }
}

/// Standard deviation with divisor `n`
fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    variance.sqrt()
}

fn mean_position(view: &ParticleView<'_>, indices: &[usize]) -> [f64; 3] {
    let mut sum = [0.0; 3];
    for &i in indices {
        let p = view.position(i);
        for axis in 0..3 {
            sum[axis] += p[axis];
        }
    }
    let n = indices.len() as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

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
//! Dynamical centre estimation
//!
//! Two iterative strategies share one output contract, [`CentreEstimate`]:
//!
//! - [`find_centre_of_density`]: the shrinking-sphere search. The sphere
//!   starts at `r_max` (or the farthest particle), the mass-weighted centroid
//!   of its contents becomes the new centre, and the radius shrinks by a
//!   fixed factor until it reaches `r_min`, the iteration budget runs out or
//!   too few particles remain.
//! - [`find_centre_sigma_clip`]: repeatedly discards particles farther than
//!   `nsigma` standard deviations of the radius distribution until about
//!   `nsphere` remain, then takes their centre of mass.
//!
//! Both strategies are sequential: each iteration depends on the centre
//! found by the previous one.
//!
//! # References
//!
//! - Casertano, S. & Hut, P. (1985). "Core radius and density measurements
//!   in N-body experiments", ApJ 298, 80
//! - Harfst, S. et al. (2007). "Performance analysis of direct N-body
//!   algorithms on special-purpose supercomputers", NewA 12, 357

mod density;
mod sigma_clip;

pub use density::{find_centre_of_density, DensityCentreConfig};
pub use sigma_clip::{find_centre_sigma_clip, SigmaClipConfig};

use crate::diagnostics::{DegenerateReason, Measured};
use crate::error::Error;
use crate::particles::ParticleView;

/// A phase-space point: position and velocity in the input frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Centre {
    /// Position (x, y, z)
    pub position: [f64; 3],
    /// Velocity (vx, vy, vz)
    pub velocity: [f64; 3],
}

impl Centre {
    /// Create a centre from a position and velocity
    pub fn new(position: [f64; 3], velocity: [f64; 3]) -> Self {
        Centre { position, velocity }
    }

    /// The frame origin at rest
    pub fn origin() -> Self {
        Centre::default()
    }

    /// This centre expressed relative to `other`
    pub fn offset_from(&self, other: &Centre) -> Centre {
        Centre {
            position: sub(self.position, other.position),
            velocity: sub(self.velocity, other.velocity),
        }
    }

    /// Spatial distance to another centre
    pub fn distance_to(&self, other: &Centre) -> f64 {
        norm_sq(sub(self.position, other.position)).sqrt()
    }

    /// Six-dimensional phase-space distance to another centre
    pub fn phase_distance_to(&self, other: &Centre) -> f64 {
        let offset = self.offset_from(other);
        (norm_sq(offset.position) + norm_sq(offset.velocity)).sqrt()
    }

    fn translate(&mut self, by: &Centre) {
        for axis in 0..3 {
            self.position[axis] += by.position[axis];
            self.velocity[axis] += by.velocity[axis];
        }
    }
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn norm_sq(a: [f64; 3]) -> f64 {
    a[0] * a[0] + a[1] * a[1] + a[2] * a[2]
}

/// Why an iterative centre search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The search sphere reached `r_min`
    Converged,
    /// `max_iterations` re-centring steps were taken
    IterationLimit,
    /// The search sphere held no mass; the centre was left where it was
    EmptySphere,
    /// Too few particles remained; the previous centre was kept
    PopulationFloor,
    /// Sigma clipping reached the target population
    ClipExhausted,
    /// Sigma clipping stopped removing particles
    NoClipProgress,
}

/// Result of a centre search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentreEstimate {
    /// Estimated centre in the input frame
    pub centre: Centre,
    /// Number of accepted re-centring steps
    pub iterations: usize,
    /// Particles used by the last accepted step
    pub population: usize,
    /// Search radius of the last accepted step (sigma clipping: the clip radius)
    pub radius: f64,
    /// Why the search stopped
    pub termination: Termination,
}

/// Choice of centre-finding strategy
#[derive(Debug, Clone, PartialEq)]
pub enum CentreStrategy {
    /// Shrinking-sphere centre of density
    Density(DensityCentreConfig),
    /// Sigma-clipped centre of mass
    SigmaClip(SigmaClipConfig),
}

impl Default for CentreStrategy {
    fn default() -> Self {
        CentreStrategy::Density(DensityCentreConfig::default())
    }
}

/// Run the chosen strategy from `start`
///
/// # Errors
///
/// Returns an error if the strategy's configuration is invalid.
pub fn find_centre(
    view: &ParticleView<'_>,
    start: Centre,
    strategy: &CentreStrategy,
) -> Result<Measured<CentreEstimate>, Error> {
    match strategy {
        CentreStrategy::Density(config) => find_centre_of_density(view, start, config),
        CentreStrategy::SigmaClip(config) => find_centre_sigma_clip(view, start, config),
    }
}

/// Mass-weighted mean position and velocity of every particle
///
/// A view with no mass has no centre of mass; the origin is returned with
/// status `Degenerate(NoParticles)` or `Degenerate(NoMass)`.
pub fn centre_of_mass(view: &ParticleView<'_>) -> Measured<Centre> {
    if view.is_empty() {
        return Measured::degenerate(Centre::origin(), DegenerateReason::NoParticles);
    }
    match weighted_centroid(view, &Centre::origin(), 0..view.len()) {
        Some(centroid) => Measured::ok(centroid),
        None => Measured::degenerate(Centre::origin(), DegenerateReason::NoMass),
    }
}

/// Mass-weighted mean of a subset, relative to `frame`
///
/// `None` when the subset carries no mass.
pub(crate) fn weighted_centroid<I>(view: &ParticleView<'_>, frame: &Centre, indices: I) -> Option<Centre>
where
    I: IntoIterator<Item = usize>,
{
    let mut mass = 0.0;
    let mut position = [0.0; 3];
    let mut velocity = [0.0; 3];

    for i in indices {
        let m = view.mass(i);
        let p = sub(view.position(i), frame.position);
        let v = sub(view.velocity(i), frame.velocity);
        mass += m;
        for axis in 0..3 {
            position[axis] += m * p[axis];
            velocity[axis] += m * v[axis];
        }
    }

    if mass <= 0.0 {
        return None;
    }
    for axis in 0..3 {
        position[axis] /= mass;
        velocity[axis] /= mass;
    }
    Some(Centre { position, velocity })
}

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
//! Radial mass-density profile in equal-population bins

use std::f64::consts::PI;

use crate::centre::Centre;
use crate::diagnostics::{DegenerateReason, Diagnostic, Measured, Status};
use crate::error::Error;
use crate::particles::{ParticleView, Projection};

/// Configuration for [`density_profile`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileConfig {
    /// Number of radial bins (default: 20)
    pub nbins: usize,
    /// Only use particles with radius in this inclusive range
    pub radius_range: Option<(f64, f64)>,
    /// Only use particles with mass in this inclusive range
    pub mass_range: Option<(f64, f64)>,
    /// Only use particles with stellar type in this inclusive range
    pub kind_range: Option<(i32, i32)>,
    /// Spherical shells or projected annuli (default: Full)
    pub projection: Projection,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            nbins: 20,
            radius_range: None,
            mass_range: None,
            kind_range: None,
            projection: Projection::Full,
        }
    }
}

impl ProfileConfig {
    /// Set the number of bins
    pub fn with_nbins(mut self, nbins: usize) -> Self {
        self.nbins = nbins;
        self
    }

    /// Restrict to radii in `min..=max`
    pub fn with_radius_range(mut self, min: f64, max: f64) -> Self {
        self.radius_range = Some((min, max));
        self
    }

    /// Restrict to masses in `min..=max`
    pub fn with_mass_range(mut self, min: f64, max: f64) -> Self {
        self.mass_range = Some((min, max));
        self
    }

    /// Restrict to stellar types in `min..=max`
    pub fn with_kind_range(mut self, min: i32, max: i32) -> Self {
        self.kind_range = Some((min, max));
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
    /// Returns an error if `nbins` is zero or a range is empty or not finite.
    pub fn validate(&self) -> Result<(), Error> {
        if self.nbins == 0 {
            return Err(Error::invalid_parameter("nbins", "must be at least 1".to_string()));
        }
        for (name, range) in [("radius_range", self.radius_range), ("mass_range", self.mass_range)] {
            if let Some((min, max)) = range {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return Err(Error::invalid_parameter(
                        name,
                        format!("expected finite min <= max, got ({}, {})", min, max),
                    ));
                }
            }
        }
        if let Some((min, max)) = self.kind_range {
            if min > max {
                return Err(Error::invalid_parameter(
                    "kind_range",
                    format!("expected min <= max, got ({}, {})", min, max),
                ));
            }
        }
        Ok(())
    }
}

/// One radial bin of a [`DensityProfile`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileBin {
    /// Inner edge
    pub lower: f64,
    /// Outer edge
    pub upper: f64,
    /// Mean radius of the particles in the bin
    pub radius: f64,
    /// Mass per unit volume (per unit area when projected)
    pub density: f64,
    /// Number of particles in the bin
    pub count: usize,
}

/// Radial density profile, innermost bin first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DensityProfile {
    /// The bins
    pub bins: Vec<ProfileBin>,
}

impl DensityProfile {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True if no profile could be built
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Mean radius of every bin
    pub fn radii(&self) -> Vec<f64> {
        self.bins.iter().map(|bin| bin.radius).collect()
    }

    /// Density of every bin
    pub fn densities(&self) -> Vec<f64> {
        self.bins.iter().map(|bin| bin.density).collect()
    }
}

/// Measure the mass-density profile about `frame`
///
/// Selected particles are sorted by radius and split into `nbins` groups
/// of equal size (the first bins take one extra particle when the count
/// does not divide evenly). A bin runs from its innermost particle to the
/// innermost particle of the next bin (the last bin to the outermost
/// particle) and its density is the bin mass over the shell volume
/// **4/3 π (r_u³ - r_l³)**, or annulus area **π (r_u² - r_l²)** when
/// projected.
///
/// A bin whose edges coincide has no volume: its density is reported as 0
/// with a [`Diagnostic::ZeroVolumeShell`] warning. Fewer selected particles
/// than bins yields an empty profile with status
/// `Degenerate(InsufficientPopulation)`.
///
/// # Errors
///
/// Returns an error if `config` fails [`ProfileConfig::validate`].
pub fn density_profile(
    view: &ParticleView<'_>,
    frame: &Centre,
    config: &ProfileConfig,
) -> Result<Measured<DensityProfile>, Error> {
    config.validate()?;

    let in_range = |value: f64, range: Option<(f64, f64)>| {
        range.map_or(true, |(min, max)| value >= min && value <= max)
    };
    let mut selected: Vec<(f64, f64)> = (0..view.len())
        .filter(|&i| {
            in_range(view.mass(i), config.mass_range)
                && config
                    .kind_range
                    .map_or(true, |(min, max)| (min..=max).contains(&view.kind(i)))
        })
        .map(|i| (view.radius(i, frame, config.projection), view.mass(i)))
        .filter(|&(r, _)| in_range(r, config.radius_range))
        .collect();

    if selected.len() < config.nbins {
        return Ok(Measured::degenerate(
            DensityProfile::default(),
            DegenerateReason::InsufficientPopulation {
                available: selected.len(),
                required: config.nbins,
            },
        ));
    }
    selected.sort_by(|a, b| a.0.total_cmp(&b.0));

    let base = selected.len() / config.nbins;
    let extra = selected.len() % config.nbins;
    let mut bins = Vec::with_capacity(config.nbins);
    let mut warnings = Vec::new();
    let mut start = 0;

    for bin in 0..config.nbins {
        let size = base + usize::from(bin < extra);
        let members = &selected[start..start + size];
        let end = start + size;

        let lower = members[0].0;
        let upper = match selected.get(end) {
            Some(&(r, _)) => r,
            None => members[size - 1].0,
        };
        let mass: f64 = members.iter().map(|&(_, m)| m).sum();
        let radius = members.iter().map(|&(r, _)| r).sum::<f64>() / size as f64;

        let volume = match config.projection {
            Projection::Full => 4.0 / 3.0 * PI * (upper.powi(3) - lower.powi(3)),
            Projection::Projected => PI * (upper * upper - lower * lower),
        };
        let density = if volume > 0.0 {
            mass / volume
        } else {
            log::warn!("profile bin {} has zero volume at r = {}", bin, lower);
            warnings.push(Diagnostic::ZeroVolumeShell { bin, radius: lower });
            0.0
        };

        bins.push(ProfileBin {
            lower,
            upper,
            radius,
            density,
            count: size,
        });
        start = end;
    }

    Ok(Measured::with_status(
        DensityProfile { bins },
        Status::from_diagnostics(warnings),
    ))
}

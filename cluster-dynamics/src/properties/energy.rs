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
//! Kinetic and potential energy of every particle
//!
//! Kinetic energy uses the velocity relative to the frame:
//! **T_i = ½ m_i v_i²** (or **½ v_i²** per unit mass). Potential energy is
//! the direct sum **Φ_i = -G Σ_{j≠i} m_i m_j / r_ij** (or **-G Σ m_j / r_ij**
//! per unit mass), with coincident pairs skipped and reported.

use super::check_positive;
use crate::centre::Centre;
use crate::diagnostics::{Diagnostic, Measured, Status};
use crate::error::Error;
use crate::pairwise::{sum_pairs, PotentialKernel, SpecificPotentialKernel, SummationConfig};
use crate::particles::{ParticleView, Projection};

/// Configuration for [`energies`] and [`particle_energy`]
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyConfig {
    /// Gravitational constant in snapshot units (default: 1.0, N-body units)
    pub grav: f64,
    /// Report per-particle energies per unit mass (default: true)
    pub specific: bool,
    /// Distances and speeds in 3D or projected (default: Full)
    pub projection: Projection,
    /// Execution of the pairwise sum
    pub summation: SummationConfig,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        EnergyConfig {
            grav: 1.0,
            specific: true,
            projection: Projection::Full,
            summation: SummationConfig::default(),
        }
    }
}

impl EnergyConfig {
    /// Set the gravitational constant
    pub fn with_grav(mut self, grav: f64) -> Self {
        self.grav = grav;
        self
    }

    /// Choose specific (per unit mass) or absolute energies
    pub fn with_specific(mut self, specific: bool) -> Self {
        self.specific = specific;
        self
    }

    /// Set the projection
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Set the pairwise execution mode
    pub fn with_summation(mut self, summation: SummationConfig) -> Self {
        self.summation = summation;
        self
    }

    /// Check the parameters
    ///
    /// # Errors
    ///
    /// Returns an error if `grav` is not positive and finite.
    pub fn validate(&self) -> Result<(), Error> {
        check_positive("grav", self.grav)
    }
}

/// Per-particle and total energies
#[derive(Debug, Clone, PartialEq)]
pub struct Energies {
    /// Kinetic energy of each particle (per unit mass if `specific`)
    pub kinetic: Vec<f64>,
    /// Potential energy of each particle (per unit mass if `specific`)
    pub potential: Vec<f64>,
    /// Total kinetic energy of the system, Σ ½ m v²
    pub kinetic_total: f64,
    /// Total potential energy of the system, each pair counted once
    pub potential_total: f64,
}

impl Energies {
    /// Kinetic plus potential energy of the system
    pub fn total(&self) -> f64 {
        self.kinetic_total + self.potential_total
    }

    /// Virial ratio, -2T / W (1 for a system in virial equilibrium)
    pub fn virial_ratio(&self) -> f64 {
        -2.0 * self.kinetic_total / self.potential_total
    }
}

/// Energies of a single particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleEnergy {
    /// Kinetic energy
    pub kinetic: f64,
    /// Potential energy
    pub potential: f64,
}

impl ParticleEnergy {
    /// Kinetic plus potential energy
    pub fn total(&self) -> f64 {
        self.kinetic + self.potential
    }
}

fn kinetic(mass: f64, speed: f64, specific: bool) -> f64 {
    if specific {
        0.5 * speed * speed
    } else {
        0.5 * mass * speed * speed
    }
}

/// Kinetic and potential energy of every particle
///
/// Status follows the pairwise sum: `Degenerate` for fewer than two
/// particles (potentials are zero) and `Warning` when coincident pairs were
/// skipped.
///
/// # Errors
///
/// Returns an error if `config` fails [`EnergyConfig::validate`].
pub fn energies(
    view: &ParticleView<'_>,
    frame: &Centre,
    config: &EnergyConfig,
) -> Result<Measured<Energies>, Error> {
    config.validate()?;

    let speeds = view.speeds(frame, config.projection);
    let kinetic_per_particle: Vec<f64> = speeds
        .iter()
        .enumerate()
        .map(|(i, &v)| kinetic(view.mass(i), v, config.specific))
        .collect();
    let kinetic_total = speeds
        .iter()
        .enumerate()
        .map(|(i, &v)| kinetic(view.mass(i), v, false))
        .sum();

    let pairs = if config.specific {
        sum_pairs(view, &SpecificPotentialKernel, config.projection, &config.summation)
    } else {
        sum_pairs(view, &PotentialKernel, config.projection, &config.summation)
    };
    let (sum, status) = pairs.into_parts();

    let grav = config.grav;
    Ok(Measured::with_status(
        Energies {
            kinetic: kinetic_per_particle,
            potential: sum.per_particle.into_iter().map(|p| grav * p).collect(),
            kinetic_total,
            potential_total: grav * sum.total,
        },
        status,
    ))
}

/// Kinetic and potential energy of the particle with the given id
///
/// A direct O(N) sum over the other particles. Particles coincident with
/// the target are skipped and reported as warnings.
///
/// # Errors
///
/// Returns an error if no particle has `id` or `config` is invalid.
pub fn particle_energy(
    view: &ParticleView<'_>,
    frame: &Centre,
    id: i64,
    config: &EnergyConfig,
) -> Result<Measured<ParticleEnergy>, Error> {
    config.validate()?;
    let target = view.index_of(id).ok_or_else(|| Error::unknown_particle(id))?;

    let position = view.position(target);
    let m_target = view.mass(target);
    let mut potential = 0.0;
    let mut coincident = Vec::new();

    for j in (0..view.len()).filter(|&j| j != target) {
        let r = config.projection.distance(position, view.position(j));
        if r == 0.0 {
            log::warn!(
                "particles {} and {} are coincident; pair skipped",
                id,
                view.id(j)
            );
            coincident.push(Diagnostic::CoincidentPair {
                first_id: id,
                second_id: view.id(j),
                distance: r,
            });
            continue;
        }
        let m = if config.specific {
            view.mass(j)
        } else {
            m_target * view.mass(j)
        };
        potential -= config.grav * m / r;
    }

    let speed = view.speed(target, frame, config.projection);
    Ok(Measured::with_status(
        ParticleEnergy {
            kinetic: kinetic(m_target, speed, config.specific),
            potential,
        },
        Status::from_diagnostics(coincident),
    ))
}

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
//! Pairwise kernels evaluated by the summation engine

/// Result of evaluating a kernel on one unordered pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairTerm {
    /// Amount added once to the scalar total
    pub value: f64,
    /// Amount credited to the lower-index particle's accumulator
    pub share_i: f64,
    /// Amount credited to the higher-index particle's accumulator
    pub share_j: f64,
}

impl PairTerm {
    /// A term that credits both particles with the pair value
    #[inline]
    pub fn symmetric(value: f64) -> Self {
        PairTerm {
            value,
            share_i: value,
            share_j: value,
        }
    }
}

/// A function of two particles' masses and their separation
///
/// The engine only calls [`PairKernel::evaluate`] with `r > 0`; coincident
/// pairs are intercepted before the kernel sees them. Implementations must
/// be symmetric in the sense that swapping `(m_i, m_j)` swaps the two shares
/// and leaves `value` unchanged.
pub trait PairKernel: Sync {
    /// Evaluate the pair at separation `r`
    fn evaluate(&self, m_i: f64, m_j: f64, r: f64) -> PairTerm;
}

/// Gravitational potential energy, `-m_i m_j / r`
///
/// The scalar total is the system's potential energy in units of G; each
/// particle's accumulator holds its own potential energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PotentialKernel;

impl PairKernel for PotentialKernel {
    #[inline]
    fn evaluate(&self, m_i: f64, m_j: f64, r: f64) -> PairTerm {
        PairTerm::symmetric(-m_i * m_j / r)
    }
}

/// Specific (per unit mass) gravitational potential
///
/// Particle `i` is credited `-m_j / r`, so massless tracers get a finite
/// potential. The scalar total is still the system potential energy,
/// `-m_i m_j / r` per pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecificPotentialKernel;

impl PairKernel for SpecificPotentialKernel {
    #[inline]
    fn evaluate(&self, m_i: f64, m_j: f64, r: f64) -> PairTerm {
        let inv_r = 1.0 / r;
        PairTerm {
            value: -m_i * m_j * inv_r,
            share_i: -m_j * inv_r,
            share_j: -m_i * inv_r,
        }
    }
}

/// Mass-weighted inverse distance, `m_i m_j / r`, used for the virial radius
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseDistanceKernel;

impl PairKernel for InverseDistanceKernel {
    #[inline]
    fn evaluate(&self, m_i: f64, m_j: f64, r: f64) -> PairTerm {
        PairTerm::symmetric(m_i * m_j / r)
    }
}

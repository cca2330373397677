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
//! All-pairs summation engine
//!
//! For N particles this module evaluates a pairwise kernel over the
//! N(N-1)/2 unordered pairs and accumulates both a scalar total and a
//! per-particle array. It backs the potential energy, the inverse-distance
//! virial radius and the nearest-neighbour distances.
//!
//! # Algorithm
//!
//! A double loop over `i < j`. Each pair is evaluated once; its value is
//! added to the total and its two shares to the accumulators of `i` and
//! `j`. No spatial tree is used: the target is N up to a few times 10⁴,
//! where a direct sum split across threads is adequate and exact.
//!
//! ## Coincident particles
//!
//! Two particles at zero separation would divide by zero. The pair is
//! skipped (it contributes nothing), a `log::warn!` names both ids, and a
//! [`Diagnostic::CoincidentPair`](crate::diagnostics::Diagnostic::CoincidentPair) is attached to the result, whose status
//! becomes [`Status::Warning`]. Summation continues.
//!
//! ## Parallel Computation
//!
//! With the `parallel` feature, rows are split into contiguous ranges with
//! balanced pair counts (see `partition`). Each Rayon task owns one range and
//! returns an immutable partial result holding its own total, its own
//! accumulator for the particles it can reach and its own diagnostics.
//! After the fork-join barrier the partials are merged in range order by a
//! single-threaded reduction. No accumulator is shared between tasks, so no
//! locking is needed, and the result is deterministic for a fixed partition
//! count. Parallel and sequential results differ only by floating-point
//! summation order.
//!
//! # Example
//!
//! ```
//! use cluster_dynamics::pairwise::{sum_pairs, PotentialKernel, SummationConfig};
//! use cluster_dynamics::particles::{Particle, ParticleSet, Projection};
//!
//! let set = ParticleSet::from_particles(vec![
//!     Particle::new([0.0, 0.0, 0.0], [0.0; 3], 1.0, 0),
//!     Particle::new([2.0, 0.0, 0.0], [0.0; 3], 1.0, 1),
//! ]).unwrap();
//!
//! let sum = sum_pairs(&set.view(), &PotentialKernel, Projection::Full, &SummationConfig::sequential());
//! assert!(sum.is_ok());
//! assert_eq!(sum.value().total, -0.5);
//! assert_eq!(sum.value().per_particle, vec![-0.5, -0.5]);
//! ```

mod kernels;
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
mod partition;
mod rows;

pub use kernels::{
    InverseDistanceKernel, PairKernel, PairTerm, PotentialKernel, SpecificPotentialKernel,
};

use crate::diagnostics::{DegenerateReason, Measured, Status};
use crate::particles::{ParticleView, Projection};
use rows::{nearest_rows, reduce_min, reduce_sum, sum_rows, Reduced};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Output of [`sum_pairs`]
#[derive(Debug, Clone, PartialEq)]
pub struct PairSum {
    /// Sum of the kernel value over unique unordered pairs
    pub total: f64,
    /// Sum over `j != i` of the share credited to particle `i`
    pub per_particle: Vec<f64>,
}

/// How the outer loop is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// One thread, one pass over every row
    Sequential,
    /// Row ranges distributed over the Rayon thread pool
    ///
    /// Falls back to sequential execution when the `parallel` feature is
    /// disabled.
    Parallel,
}

/// Execution settings for the summation engine
#[derive(Debug, Clone, PartialEq)]
pub struct SummationConfig {
    execution: Execution,
    /// Number of row ranges (0 = auto)
    partitions: usize,
}

impl SummationConfig {
    /// Run on the calling thread
    pub fn sequential() -> Self {
        SummationConfig {
            execution: Execution::Sequential,
            partitions: 0,
        }
    }

    /// Run on the Rayon pool with an automatic partition count
    pub fn parallel() -> Self {
        SummationConfig {
            execution: Execution::Parallel,
            partitions: 0,
        }
    }

    /// Set the number of row ranges for parallel execution
    ///
    /// Set to 0 for automatic determination based on thread count. A fixed
    /// value makes results bit-for-bit reproducible across machines.
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    /// Get the execution mode
    pub fn execution(&self) -> Execution {
        self.execution
    }

    /// Get the configured partition count (0 = auto)
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    #[cfg(feature = "parallel")]
    fn resolved_partitions(&self) -> usize {
        if self.partitions > 0 {
            self.partitions
        } else {
            // Rule of thumb: aim for at least 4 chunks per thread for load balancing
            (rayon::current_num_threads() * 4).max(1)
        }
    }

    fn runs_parallel(&self) -> bool {
        match self.execution {
            Execution::Sequential => false,
            #[cfg(feature = "parallel")]
            Execution::Parallel => true,
            #[cfg(not(feature = "parallel"))]
            Execution::Parallel => {
                log::debug!("parallel summation requested without the `parallel` feature; running sequentially");
                false
            }
        }
    }
}

impl Default for SummationConfig {
    fn default() -> Self {
        #[cfg(feature = "parallel")]
        {
            SummationConfig::parallel()
        }

        #[cfg(not(feature = "parallel"))]
        {
            SummationConfig::sequential()
        }
    }
}

/// Sum `kernel` over all unordered pairs of `view`
///
/// # Returns
///
/// The total over unique pairs and the per-particle accumulators. Status is
/// `Degenerate(NoParticles)` for N = 0 (total 0, empty array),
/// `Degenerate(SingleParticle)` for N = 1 (total 0, `[0.0]`) and `Warning`
/// when coincident pairs were skipped.
pub fn sum_pairs<K>(
    view: &ParticleView<'_>,
    kernel: &K,
    projection: Projection,
    config: &SummationConfig,
) -> Measured<PairSum>
where
    K: PairKernel + ?Sized,
{
    let n = view.len();
    if let Some(reason) = degenerate_count(n) {
        let sum = PairSum {
            total: 0.0,
            per_particle: vec![0.0; n],
        };
        return Measured::degenerate(sum, reason);
    }

    let reduced = if config.runs_parallel() {
        sum_pairs_parallel(view, kernel, projection, config)
    } else {
        reduce_sum(n, vec![sum_rows(view, kernel, projection, 0..n)])
    };

    let Reduced {
        total,
        values,
        coincident,
    } = reduced;
    Measured::with_status(
        PairSum {
            total,
            per_particle: values,
        },
        Status::from_diagnostics(coincident),
    )
}

/// Distance from each particle to its nearest neighbour
///
/// Coincident pairs are legitimate neighbours at distance 0 but are still
/// reported as warnings. A lone particle has no neighbour and gets
/// `f64::INFINITY` with status `Degenerate(SingleParticle)`.
pub fn nearest_neighbour_distances(
    view: &ParticleView<'_>,
    projection: Projection,
    config: &SummationConfig,
) -> Measured<Vec<f64>> {
    let n = view.len();
    if let Some(reason) = degenerate_count(n) {
        return Measured::degenerate(vec![f64::INFINITY; n], reason);
    }

    let reduced = if config.runs_parallel() {
        nearest_parallel(view, projection, config)
    } else {
        reduce_min(n, vec![nearest_rows(view, projection, 0..n)])
    };

    Measured::with_status(reduced.values, Status::from_diagnostics(reduced.coincident))
}

fn degenerate_count(n: usize) -> Option<DegenerateReason> {
    match n {
        0 => Some(DegenerateReason::NoParticles),
        1 => Some(DegenerateReason::SingleParticle),
        _ => None,
    }
}

#[cfg(feature = "parallel")]
fn sum_pairs_parallel<K>(
    view: &ParticleView<'_>,
    kernel: &K,
    projection: Projection,
    config: &SummationConfig,
) -> Reduced
where
    K: PairKernel + ?Sized,
{
    let n = view.len();
    let ranges = partition::balanced_row_ranges(n, config.resolved_partitions());
    log::debug!("summing {} pairs over {} row ranges", partition::pair_count(n), ranges.len());

    let partials = ranges
        .into_par_iter()
        .map(|rows| sum_rows(view, kernel, projection, rows))
        .collect();

    reduce_sum(n, partials)
}

#[cfg(not(feature = "parallel"))]
fn sum_pairs_parallel<K>(
    view: &ParticleView<'_>,
    kernel: &K,
    projection: Projection,
    _config: &SummationConfig,
) -> Reduced
where
    K: PairKernel + ?Sized,
{
    reduce_sum(view.len(), vec![sum_rows(view, kernel, projection, 0..view.len())])
}

#[cfg(feature = "parallel")]
fn nearest_parallel(
    view: &ParticleView<'_>,
    projection: Projection,
    config: &SummationConfig,
) -> Reduced {
    let n = view.len();
    let partials = partition::balanced_row_ranges(n, config.resolved_partitions())
        .into_par_iter()
        .map(|rows| nearest_rows(view, projection, rows))
        .collect();

    reduce_min(n, partials)
}

#[cfg(not(feature = "parallel"))]
fn nearest_parallel(
    view: &ParticleView<'_>,
    projection: Projection,
    _config: &SummationConfig,
) -> Reduced {
    reduce_min(view.len(), vec![nearest_rows(view, projection, 0..view.len())])
}

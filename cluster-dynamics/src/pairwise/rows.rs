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
//! Row-range workers and the reduction that combines them
//!
//! A worker owns the rows `start..end` of the `i < j` loop. Its pairs touch
//! particles `start..n` only, so its private accumulator is offset by
//! `start`. Workers never share mutable state; the sequential path is a
//! single worker over every row.

use std::ops::Range;

use super::kernels::PairKernel;
use crate::diagnostics::Diagnostic;
use crate::particles::{ParticleView, Projection};

/// Immutable result of one worker's row range
#[derive(Debug, Clone)]
pub(crate) struct RowPartial {
    /// First particle index covered by `values`
    offset: usize,
    /// Sum of pair values (summation) or unused (nearest neighbour)
    total: f64,
    /// Per-particle shares or minimum separations for `offset..n`
    values: Vec<f64>,
    coincident: Vec<Diagnostic>,
}

fn coincident_pair(view: &ParticleView<'_>, i: usize, j: usize, distance: f64) -> Diagnostic {
    let (first_id, second_id) = (view.id(i), view.id(j));
    log::warn!(
        "particles {} and {} are coincident (r = {:e}); pair skipped",
        first_id,
        second_id,
        distance
    );
    Diagnostic::CoincidentPair {
        first_id,
        second_id,
        distance,
    }
}

/// Sum the kernel over every pair `(i, j)` with `i` in `rows` and `j > i`
pub(crate) fn sum_rows<K>(
    view: &ParticleView<'_>,
    kernel: &K,
    projection: Projection,
    rows: Range<usize>,
) -> RowPartial
where
    K: PairKernel + ?Sized,
{
    let n = view.len();
    let offset = rows.start;
    let mut values = vec![0.0; n - offset];
    let mut total = 0.0;
    let mut coincident = Vec::new();

    for i in rows {
        let p_i = view.position(i);
        let m_i = view.mass(i);
        let mut row_total = 0.0;
        let mut row_share = 0.0;

        for j in (i + 1)..n {
            let r = projection.distance(p_i, view.position(j));
            if r == 0.0 {
                coincident.push(coincident_pair(view, i, j, r));
                continue;
            }
            let term = kernel.evaluate(m_i, view.mass(j), r);
            row_total += term.value;
            row_share += term.share_i;
            values[j - offset] += term.share_j;
        }

        total += row_total;
        values[i - offset] += row_share;
    }

    RowPartial {
        offset,
        total,
        values,
        coincident,
    }
}

/// Smallest separation from each particle to any later particle in `rows`, and back
pub(crate) fn nearest_rows(
    view: &ParticleView<'_>,
    projection: Projection,
    rows: Range<usize>,
) -> RowPartial {
    let n = view.len();
    let offset = rows.start;
    let mut values = vec![f64::INFINITY; n - offset];
    let mut coincident = Vec::new();

    for i in rows {
        let p_i = view.position(i);
        let mut row_min = f64::INFINITY;

        for j in (i + 1)..n {
            let r_sq = projection.distance_sq(p_i, view.position(j));
            if r_sq == 0.0 {
                coincident.push(coincident_pair(view, i, j, 0.0));
            }
            row_min = row_min.min(r_sq);
            let slot = &mut values[j - offset];
            *slot = slot.min(r_sq);
        }

        let slot = &mut values[i - offset];
        *slot = slot.min(row_min);
    }

    // stored squared inside the loop
    for value in &mut values {
        *value = value.sqrt();
    }

    RowPartial {
        offset,
        total: 0.0,
        values,
        coincident,
    }
}

/// Combined result of all workers
pub(crate) struct Reduced {
    pub total: f64,
    pub values: Vec<f64>,
    pub coincident: Vec<Diagnostic>,
}

/// Add partials element-wise, in the order given
pub(crate) fn reduce_sum(n: usize, partials: Vec<RowPartial>) -> Reduced {
    reduce_with(n, 0.0, partials, |acc, v| *acc += v)
}

/// Take the element-wise minimum of partials
pub(crate) fn reduce_min(n: usize, partials: Vec<RowPartial>) -> Reduced {
    reduce_with(n, f64::INFINITY, partials, |acc, v| *acc = acc.min(v))
}

fn reduce_with<F>(n: usize, identity: f64, partials: Vec<RowPartial>, combine: F) -> Reduced
where
    F: Fn(&mut f64, f64),
{
    let mut partials = partials.into_iter().peekable();
    let starts_at_zero = partials.peek().map_or(false, |first| first.offset == 0);

    // a partial covering every particle can be reused as the accumulator
    let mut reduced = match partials.next() {
        Some(first) if starts_at_zero => Reduced {
            total: first.total,
            values: first.values,
            coincident: first.coincident,
        },
        first => {
            let mut reduced = Reduced {
                total: 0.0,
                values: vec![identity; n],
                coincident: Vec::new(),
            };
            if let Some(first) = first {
                merge_into(&mut reduced, first, &combine);
            }
            reduced
        }
    };

    for partial in partials {
        merge_into(&mut reduced, partial, &combine);
    }
    reduced
}

fn merge_into<F>(reduced: &mut Reduced, partial: RowPartial, combine: &F)
where
    F: Fn(&mut f64, f64),
{
    reduced.total += partial.total;
    for (acc, value) in reduced.values[partial.offset..]
        .iter_mut()
        .zip(partial.values)
    {
        combine(acc, value);
    }
    reduced.coincident.extend(partial.coincident);
}

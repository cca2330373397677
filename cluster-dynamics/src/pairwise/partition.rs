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
//! Splitting the upper-triangular pair loop into balanced row ranges
//!
//! Row `i` of the `i < j` loop visits `n - 1 - i` pairs, so equal-width row
//! ranges would leave the first worker with most of the work. Ranges are cut
//! instead where the running pair count crosses multiples of `total / parts`.

use std::ops::Range;

/// Number of pairs visited by rows `0..n` of an `n`-particle loop
#[inline]
pub(crate) fn pair_count(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1) / 2
}

/// Contiguous, non-empty row ranges covering `0..n` with roughly equal pair counts
///
/// At most `parts` ranges are produced (fewer when there are not enough
/// rows). The result depends only on `n` and `parts`.
pub(crate) fn balanced_row_ranges(n: usize, parts: usize) -> Vec<Range<usize>> {
    if n < 2 || parts <= 1 {
        return vec![0..n];
    }

    let total = pair_count(n);
    let parts = parts.min(n - 1) as u64;
    let mut ranges = Vec::with_capacity(parts as usize);
    let mut start = 0;
    let mut done: u64 = 0;
    let mut boundary: u64 = 1;

    for i in 0..n {
        done += (n - 1 - i) as u64;
        if boundary < parts && done * parts >= total * boundary {
            ranges.push(start..i + 1);
            start = i + 1;
            while boundary < parts && done * parts >= total * boundary {
                boundary += 1;
            }
        }
    }
    if start < n {
        ranges.push(start..n);
    }

    ranges
}

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
//! Seed table for [`super::fixed::Fixed`]'s Newton-Raphson `sqrt`.
//!
//! Ported from the bucketed range table in the original simulator
//! (`util/range.h` + the generated `roots.h`): the integer part of the
//! argument is located in one of a handful of order-of-magnitude buckets,
//! and the bucket's precomputed average root is used as the Newton-Raphson
//! seed. A seed within an order of magnitude of the true root converges to
//! the 1/K epsilon in a small, bounded number of iterations even for the
//! largest values this simulation produces (squared velocities up to
//! ~10^4, combined radii up to ~10^3).

/// One bucket of the seed table: `[min, max]` bounds on the integer part of
/// the argument, and the average square root over that bucket.
struct Range {
    min: i128,
    max: i128,
    avg: f64,
}

/// Buckets span the integer-part magnitudes this simulation actually
/// produces: radii and box half-widths (tens to low thousands), squared
/// velocities and kinetic energies (up to low millions), and a wide
/// high bucket as a catch-all so `locate_root` never runs off the table.
const RANGES: &[Range] = &[
    Range { min: 0, max: 0, avg: 0.0 },
    Range { min: 1, max: 9, avg: 2.2 },
    Range { min: 10, max: 99, avg: 7.0 },
    Range { min: 100, max: 999, avg: 22.0 },
    Range { min: 1_000, max: 9_999, avg: 70.0 },
    Range { min: 10_000, max: 99_999, avg: 220.0 },
    Range { min: 100_000, max: 999_999, avg: 700.0 },
    Range { min: 1_000_000, max: 9_999_999, avg: 2_200.0 },
    Range { min: 10_000_000, max: 99_999_999, avg: 7_000.0 },
    Range { min: 100_000_000, max: i128::MAX, avg: 22_000.0 },
];

/// Binary search `RANGES` for the bucket containing `whole_part` and return
/// its average root, to be used as a Newton-Raphson seed.
pub(super) fn locate_root(whole_part: i128) -> f64 {
    let mut bottom = 0usize;
    let mut top = RANGES.len() - 1;

    while bottom < top {
        let idx = (bottom + top) / 2;
        let range = &RANGES[idx];
        if whole_part < range.min {
            top = idx.saturating_sub(1).max(bottom);
            if top == idx {
                break;
            }
        } else if whole_part > range.max {
            bottom = idx + 1;
        } else {
            return range.avg;
        }
    }

    RANGES[bottom.min(RANGES.len() - 1)].avg
}

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
//! Benchmarks the O(N^2) pairwise collision pass, on both the fixed-point
//! and the `f64` scalar, across a range of particle counts. The Manhattan
//! gate is the pass's single biggest lever, so these also isolate a
//! densely-packed layout (most pairs reach the exact gate) against a
//! sparse one (most pairs are rejected by the Manhattan gate alone).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use sphere_sim::particle::Particle;
use sphere_sim::physics::collide_internal;
use sphere_sim::scalar::{Fixed, Scalar};
use sphere_sim::vector::Vector3;

struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng(seed)
    }

    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) as f64) / (u32::MAX as f64)
    }

    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

fn build_particles<S: Scalar>(count: usize, spread: f64, rng: &mut SimpleRng) -> Vec<Particle<S>> {
    (0..count)
        .map(|i| {
            let position = Vector3::new(
                S::from_f64(rng.range(-spread, spread)),
                S::from_f64(rng.range(-spread, spread)),
                S::from_f64(rng.range(-spread, spread)),
            );
            let velocity = Vector3::new(
                S::from_f64(rng.range(-5.0, 5.0)),
                S::from_f64(rng.range(-5.0, 5.0)),
                S::zero(),
            );
            let mut p = Particle::new(position, velocity, S::from_f64(10.0), S::from_f64(2.0));
            p.set_uid(i as u64 + 1);
            p
        })
        .collect()
}

fn run_pairwise_pass<S: Scalar>(particles: &mut [Particle<S>], tau: S) {
    let n = particles.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (left, right) = particles.split_at_mut(j);
            black_box(collide_internal(&mut left[i], &mut right[0], tau));
        }
    }
}

fn bench_collision_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision_pass");

    for &count in &[50usize, 200, 800] {
        group.throughput(Throughput::Elements((count * count / 2) as u64));

        group.bench_with_input(BenchmarkId::new("f64_dense", count), &count, |b, &count| {
            let mut rng = SimpleRng::new(0xF00D);
            let mut particles = build_particles::<f64>(count, 200.0, &mut rng);
            b.iter(|| run_pairwise_pass(&mut particles, 0.1));
        });

        group.bench_with_input(BenchmarkId::new("f64_sparse", count), &count, |b, &count| {
            let mut rng = SimpleRng::new(0xF00D);
            let mut particles = build_particles::<f64>(count, 5_000.0, &mut rng);
            b.iter(|| run_pairwise_pass(&mut particles, 0.1));
        });

        group.bench_with_input(BenchmarkId::new("fixed_dense", count), &count, |b, &count| {
            let mut rng = SimpleRng::new(0xF00D);
            let mut particles = build_particles::<Fixed>(count, 200.0, &mut rng);
            let tau = Fixed::from_f64(0.1);
            b.iter(|| run_pairwise_pass(&mut particles, tau));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_collision_pass);
criterion_main!(benches);

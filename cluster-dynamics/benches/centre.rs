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
//! Benchmarks for centre finding and the sort-based radii

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cluster_dynamics::centre::{
    find_centre_of_density, find_centre_sigma_clip, Centre, DensityCentreConfig, SigmaClipConfig,
};
use cluster_dynamics::particles::{Particle, ParticleSet, Projection};
use cluster_dynamics::properties::{density_profile, lagrange_radii, ProfileConfig};
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

// Centrally concentrated cluster: radius ~ u^2 so the density peaks at the
// centre, offset from the origin
fn setup_cluster(count: usize, seed: u64) -> ParticleSet {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let unit = Uniform::try_from(-1.0..1.0).unwrap();
    ParticleSet::from_particles((0..count).map(|i| {
        let scale = unit.sample(&mut rng).powi(2) * 5.0;
        let position = [
            10.0 + scale * unit.sample(&mut rng),
            -4.0 + scale * unit.sample(&mut rng),
            2.0 + scale * unit.sample(&mut rng),
        ];
        let velocity = [unit.sample(&mut rng), unit.sample(&mut rng), unit.sample(&mut rng)];
        Particle::new(position, velocity, 1.0, i as i64)
    }))
    .unwrap()
}

fn bench_centre_finding(c: &mut Criterion) {
    let mut group = c.benchmark_group("centre_finding");

    for count in [10_000, 100_000].iter() {
        let set = setup_cluster(*count, 7);
        group.bench_with_input(BenchmarkId::new("density", count), count, |b, _| {
            let view = set.view();
            let config = DensityCentreConfig::default();
            b.iter(|| black_box(find_centre_of_density(&view, Centre::origin(), &config)));
        });
        group.bench_with_input(BenchmarkId::new("sigma_clip", count), count, |b, _| {
            let view = set.view();
            let config = SigmaClipConfig::default();
            b.iter(|| black_box(find_centre_sigma_clip(&view, Centre::origin(), &config)));
        });
    }

    group.finish();
}

fn bench_radial_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("radial_statistics");
    let set = setup_cluster(100_000, 8);
    let view = set.view();
    let frame = Centre::new([10.0, -4.0, 2.0], [0.0; 3]);

    group.bench_function("lagrange_radii_10", |b| {
        b.iter(|| black_box(lagrange_radii(&view, &frame, 10, Projection::Full)));
    });
    group.bench_function("density_profile_50", |b| {
        let config = ProfileConfig::default().with_nbins(50);
        b.iter(|| black_box(density_profile(&view, &frame, &config)));
    });

    group.finish();
}

criterion_group!(benches, bench_centre_finding, bench_radial_statistics);
criterion_main!(benches);

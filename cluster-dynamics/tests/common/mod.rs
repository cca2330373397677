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
//! Shared helpers for the integration tests
//!
//! Named `mod.rs` so cargo does not build it as a test crate of its own.

#![allow(dead_code)]

use cluster_dynamics::particles::{Particle, ParticleSet};
use rand::distr::{Distribution, Uniform};
use rand_distr::{Normal, StandardNormal};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Same semantics as numpy.isclose
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

/// Seeded source of the random vectors the generators below need
pub struct Sampler {
    rng: Xoshiro256PlusPlus,
    unit: Uniform<f64>,
}

impl Sampler {
    pub fn new(seed: u64) -> Self {
        Sampler {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            unit: Uniform::try_from(0.0..1.0).unwrap(),
        }
    }

    /// Uniform deviate in [0, 1)
    pub fn uniform(&mut self) -> f64 {
        self.unit.sample(&mut self.rng)
    }

    /// Three independent N(0, sigma²) components
    pub fn gaussian(&mut self, sigma: f64) -> [f64; 3] {
        let normal = Normal::new(0.0, sigma).unwrap();
        [
            normal.sample(&mut self.rng),
            normal.sample(&mut self.rng),
            normal.sample(&mut self.rng),
        ]
    }

    /// Isotropic unit vector
    pub fn direction(&mut self) -> [f64; 3] {
        let v: [f64; 3] = [
            StandardNormal.sample(&mut self.rng),
            StandardNormal.sample(&mut self.rng),
            StandardNormal.sample(&mut self.rng),
        ];
        let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        [v[0] / norm, v[1] / norm, v[2] / norm]
    }
}

/// Isotropic Gaussian cluster of unit masses
pub fn gaussian_cluster(n: usize, centre: [f64; 3], sigma: f64, velocity_sigma: f64, seed: u64) -> ParticleSet {
    let mut sampler = Sampler::new(seed);
    ParticleSet::from_particles((0..n).map(|i| {
        let offset = sampler.gaussian(sigma);
        let position = [centre[0] + offset[0], centre[1] + offset[1], centre[2] + offset[2]];
        Particle::new(position, sampler.gaussian(velocity_sigma), 1.0, i as i64)
    }))
    .unwrap()
}

/// Copy of `set` with every position coordinate shifted by uniform noise in `[-amplitude, amplitude)`
pub fn with_uniform_noise(set: &ParticleSet, amplitude: f64, seed: u64) -> ParticleSet {
    let view = set.view();
    let mut sampler = Sampler::new(seed);
    ParticleSet::from_particles((0..view.len()).map(|i| {
        let mut particle = view.particle(i);
        for axis in 0..3 {
            particle.position[axis] += amplitude * (2.0 * sampler.uniform() - 1.0);
        }
        particle
    }))
    .unwrap()
}

/// Uniformly random points in a cube of side `side` with masses in [0.5, 1.5)
pub fn random_cube(n: usize, side: f64, seed: u64) -> ParticleSet {
    let mut sampler = Sampler::new(seed);
    ParticleSet::from_particles((0..n).map(|i| {
        let position = [
            side * sampler.uniform(),
            side * sampler.uniform(),
            side * sampler.uniform(),
        ];
        let mass = 0.5 + sampler.uniform();
        Particle::new(position, sampler.gaussian(1.0), mass, i as i64)
    }))
    .unwrap()
}

/// Cubic lattice of unit masses, `side` points per axis, centred on `centre`
pub fn lattice(side: usize, spacing: f64, centre: [f64; 3]) -> ParticleSet {
    let half = (side as i64 - 1) / 2;
    let mut set = ParticleSet::with_capacity(side * side * side);
    let mut id = 0;
    for i in 0..side as i64 {
        for j in 0..side as i64 {
            for k in 0..side as i64 {
                let position = [
                    centre[0] + (i - half) as f64 * spacing,
                    centre[1] + (j - half) as f64 * spacing,
                    centre[2] + (k - half) as f64 * spacing,
                ];
                set.push(Particle::new(position, [0.0; 3], 1.0, id)).unwrap();
                id += 1;
            }
        }
    }
    set
}

/// Antipodal pairs of unit masses on a sphere of `radius` about the origin
///
/// Every particle at `p` has a partner at `-p`, so the centroid is zero up
/// to rounding whenever whole pairs are selected.
pub fn symmetric_shell(pairs: usize, radius: f64, first_id: i64, seed: u64) -> Vec<Particle> {
    let mut sampler = Sampler::new(seed);
    let mut particles = Vec::with_capacity(2 * pairs);
    for n in 0..pairs {
        let u = sampler.direction();
        let p = [radius * u[0], radius * u[1], radius * u[2]];
        let id = first_id + 2 * n as i64;
        particles.push(Particle::new(p, [0.0; 3], 1.0, id));
        particles.push(Particle::new([-p[0], -p[1], -p[2]], [0.0; 3], 1.0, id + 1));
    }
    particles
}

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
//! Particle state in structure-of-arrays layout
//!
//! A snapshot is held as parallel arrays (x, y, z, vx, vy, vz, mass, id and
//! an optional stellar-type flag). Analysis routines never own particle data;
//! they borrow a [`ParticleView`] for the duration of one call.
//!
//! Validation happens once, when a view or set is built: array lengths must
//! agree, every value must be finite and masses must be non-negative. The
//! O(N²) kernels downstream can then assume clean input.
//!
//! # Example
//!
//! ```
//! use cluster_dynamics::particles::{Particle, ParticleSet, Projection};
//! use cluster_dynamics::centre::Centre;
//!
//! let mut set = ParticleSet::new();
//! set.push(Particle::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], 2.0, 7)).unwrap();
//! let view = set.view();
//! assert_eq!(view.len(), 1);
//! assert_eq!(view.radii(&Centre::origin(), Projection::Full), vec![1.0]);
//! ```

use crate::centre::Centre;
use crate::error::Error;

/// Whether distances use all three axes or only the sky-plane (x, y) axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Full 3D separations and speeds
    #[default]
    Full,
    /// Projected onto the x-y plane: z and vz are ignored
    Projected,
}

impl Projection {
    /// Squared separation between two points under this projection
    #[inline]
    pub fn distance_sq(self, a: [f64; 3], b: [f64; 3]) -> f64 {
        let dx = a[0] - b[0];
        let dy = a[1] - b[1];
        match self {
            Projection::Full => {
                let dz = a[2] - b[2];
                dx * dx + dy * dy + dz * dz
            }
            Projection::Projected => dx * dx + dy * dy,
        }
    }

    /// Separation between two points under this projection
    #[inline]
    pub fn distance(self, a: [f64; 3], b: [f64; 3]) -> f64 {
        self.distance_sq(a, b).sqrt()
    }
}

/// A single particle, by value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position (x, y, z)
    pub position: [f64; 3],
    /// Velocity (vx, vy, vz)
    pub velocity: [f64; 3],
    /// Mass, non-negative
    pub mass: f64,
    /// Caller-assigned identifier
    pub id: i64,
    /// Stellar type / evolution flag (0 when the snapshot carries none)
    pub kind: i32,
}

impl Particle {
    /// Create a particle with stellar type 0
    pub fn new(position: [f64; 3], velocity: [f64; 3], mass: f64, id: i64) -> Self {
        Particle {
            position,
            velocity,
            mass,
            id,
            kind: 0,
        }
    }

    /// Set the stellar type flag
    pub fn with_kind(mut self, kind: i32) -> Self {
        self.kind = kind;
        self
    }

    fn validate(&self, index: usize) -> Result<(), Error> {
        const POSITION: [&str; 3] = ["x", "y", "z"];
        const VELOCITY: [&str; 3] = ["vx", "vy", "vz"];
        for axis in 0..3 {
            if !self.position[axis].is_finite() {
                return Err(Error::non_finite(POSITION[axis], index));
            }
            if !self.velocity[axis].is_finite() {
                return Err(Error::non_finite(VELOCITY[axis], index));
            }
        }
        check_mass(self.mass, index)
    }
}

fn check_mass(mass: f64, index: usize) -> Result<(), Error> {
    if !mass.is_finite() {
        return Err(Error::non_finite("mass", index));
    }
    if mass < 0.0 {
        return Err(Error::negative_mass(index, mass));
    }
    Ok(())
}

fn check_column(field: &'static str, values: &[f64], expected: usize) -> Result<(), Error> {
    if values.len() != expected {
        return Err(Error::length_mismatch(field, expected, values.len()));
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(Error::non_finite(field, index)),
        None => Ok(()),
    }
}

/// Owned, validated particle arrays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSet {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    vx: Vec<f64>,
    vy: Vec<f64>,
    vz: Vec<f64>,
    mass: Vec<f64>,
    id: Vec<i64>,
    kind: Vec<i32>,
}

impl ParticleSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` particles
    pub fn with_capacity(capacity: usize) -> Self {
        ParticleSet {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            vx: Vec::with_capacity(capacity),
            vy: Vec::with_capacity(capacity),
            vz: Vec::with_capacity(capacity),
            mass: Vec::with_capacity(capacity),
            id: Vec::with_capacity(capacity),
            kind: Vec::with_capacity(capacity),
        }
    }

    /// Build a set from particles, rejecting the first invalid one
    pub fn from_particles<I>(particles: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Particle>,
    {
        let iter = particles.into_iter();
        let mut set = ParticleSet::with_capacity(iter.size_hint().0);
        for particle in iter {
            set.push(particle)?;
        }
        Ok(set)
    }

    /// Append a particle after validating it
    pub fn push(&mut self, particle: Particle) -> Result<(), Error> {
        particle.validate(self.len())?;
        self.x.push(particle.position[0]);
        self.y.push(particle.position[1]);
        self.z.push(particle.position[2]);
        self.vx.push(particle.velocity[0]);
        self.vy.push(particle.velocity[1]);
        self.vz.push(particle.velocity[2]);
        self.mass.push(particle.mass);
        self.id.push(particle.id);
        self.kind.push(particle.kind);
        Ok(())
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.mass.len()
    }

    /// True if the set holds no particles
    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    /// Borrow the set as a read-only view
    pub fn view(&self) -> ParticleView<'_> {
        ParticleView {
            x: &self.x,
            y: &self.y,
            z: &self.z,
            vx: &self.vx,
            vy: &self.vy,
            vz: &self.vz,
            mass: &self.mass,
            id: &self.id,
            kind: Some(self.kind.as_slice()),
        }
    }
}

/// Borrowed, validated structure-of-arrays view of a snapshot
#[derive(Debug, Clone, Copy)]
pub struct ParticleView<'a> {
    x: &'a [f64],
    y: &'a [f64],
    z: &'a [f64],
    vx: &'a [f64],
    vy: &'a [f64],
    vz: &'a [f64],
    mass: &'a [f64],
    id: &'a [i64],
    kind: Option<&'a [i32]>,
}

impl<'a> ParticleView<'a> {
    /// Wrap caller-owned arrays after validating them
    ///
    /// The particle count is taken from `mass`. Every other array must have
    /// the same length, all values must be finite and all masses
    /// non-negative.
    pub fn new(
        position: [&'a [f64]; 3],
        velocity: [&'a [f64]; 3],
        mass: &'a [f64],
        id: &'a [i64],
    ) -> Result<Self, Error> {
        let n = mass.len();
        check_column("x", position[0], n)?;
        check_column("y", position[1], n)?;
        check_column("z", position[2], n)?;
        check_column("vx", velocity[0], n)?;
        check_column("vy", velocity[1], n)?;
        check_column("vz", velocity[2], n)?;
        for (index, &m) in mass.iter().enumerate() {
            check_mass(m, index)?;
        }
        if id.len() != n {
            return Err(Error::length_mismatch("id", n, id.len()));
        }

        Ok(ParticleView {
            x: position[0],
            y: position[1],
            z: position[2],
            vx: velocity[0],
            vy: velocity[1],
            vz: velocity[2],
            mass,
            id,
            kind: None,
        })
    }

    /// Attach a stellar-type array
    pub fn with_kinds(mut self, kind: &'a [i32]) -> Result<Self, Error> {
        if kind.len() != self.len() {
            return Err(Error::length_mismatch("kind", self.len(), kind.len()));
        }
        self.kind = Some(kind);
        Ok(self)
    }

    /// Number of particles
    #[inline]
    pub fn len(&self) -> usize {
        self.mass.len()
    }

    /// True if the view holds no particles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    /// Position of particle `i`
    #[inline]
    pub fn position(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Velocity of particle `i`
    #[inline]
    pub fn velocity(&self, i: usize) -> [f64; 3] {
        [self.vx[i], self.vy[i], self.vz[i]]
    }

    /// Mass of particle `i`
    #[inline]
    pub fn mass(&self, i: usize) -> f64 {
        self.mass[i]
    }

    /// Id of particle `i`
    #[inline]
    pub fn id(&self, i: usize) -> i64 {
        self.id[i]
    }

    /// Stellar type of particle `i` (0 when the view carries none)
    #[inline]
    pub fn kind(&self, i: usize) -> i32 {
        self.kind.map_or(0, |kind| kind[i])
    }

    /// Particle `i` by value
    pub fn particle(&self, i: usize) -> Particle {
        Particle {
            position: self.position(i),
            velocity: self.velocity(i),
            mass: self.mass[i],
            id: self.id[i],
            kind: self.kind(i),
        }
    }

    /// All masses
    pub fn masses(&self) -> &'a [f64] {
        self.mass
    }

    /// All ids
    pub fn ids(&self) -> &'a [i64] {
        self.id
    }

    /// Index of the first particle with the given id
    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.id.iter().position(|&candidate| candidate == id)
    }

    /// Sum of all masses
    pub fn total_mass(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Distance of particle `i` from the frame's position
    #[inline]
    pub fn radius(&self, i: usize, frame: &Centre, projection: Projection) -> f64 {
        projection.distance(self.position(i), frame.position)
    }

    /// Distance of every particle from the frame's position
    pub fn radii(&self, frame: &Centre, projection: Projection) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.radius(i, frame, projection))
            .collect()
    }

    /// Speed of particle `i` relative to the frame's velocity
    #[inline]
    pub fn speed(&self, i: usize, frame: &Centre, projection: Projection) -> f64 {
        projection.distance(self.velocity(i), frame.velocity)
    }

    /// Speed of every particle relative to the frame's velocity
    pub fn speeds(&self, frame: &Centre, projection: Projection) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.speed(i, frame, projection))
            .collect()
    }

    /// Copy out the particles whose index satisfies `keep`
    pub fn select<P>(&self, mut keep: P) -> ParticleSet
    where
        P: FnMut(usize) -> bool,
    {
        let mut set = ParticleSet::new();
        for i in (0..self.len()).filter(|&i| keep(i)) {
            // values in a view are already validated
            set.x.push(self.x[i]);
            set.y.push(self.y[i]);
            set.z.push(self.z[i]);
            set.vx.push(self.vx[i]);
            set.vy.push(self.vy[i]);
            set.vz.push(self.vz[i]);
            set.mass.push(self.mass[i]);
            set.id.push(self.id[i]);
            set.kind.push(self.kind(i));
        }
        set
    }

    /// Copy out the particles whose stellar type lies in `min..=max`
    pub fn with_kind_range(&self, min: i32, max: i32) -> ParticleSet {
        self.select(|i| (min..=max).contains(&self.kind(i)))
    }
}

impl<'a> From<&'a ParticleSet> for ParticleView<'a> {
    fn from(set: &'a ParticleSet) -> Self {
        set.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ([Vec<f64>; 3], [Vec<f64>; 3], Vec<f64>, Vec<i64>) {
        (
            [vec![0.0, 3.0], vec![0.0, 4.0], vec![0.0, 12.0]],
            [vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 2.0]],
            vec![1.0, 2.0],
            vec![10, 11],
        )
    }

    #[test]
    fn test_view_from_slices() {
        let (pos, vel, mass, id) = columns();
        let view = ParticleView::new(
            [&pos[0], &pos[1], &pos[2]],
            [&vel[0], &vel[1], &vel[2]],
            &mass,
            &id,
        )
        .unwrap();

        assert_eq!(view.len(), 2);
        assert_eq!(view.position(1), [3.0, 4.0, 12.0]);
        assert_eq!(view.kind(1), 0);
        assert_eq!(view.total_mass(), 3.0);
        assert_eq!(view.index_of(11), Some(1));
        assert_eq!(view.index_of(99), None);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let (pos, vel, mass, id) = columns();
        let short = vec![0.0];
        let err = ParticleView::new(
            [&pos[0], &short, &pos[2]],
            [&vel[0], &vel[1], &vel[2]],
            &mass,
            &id,
        )
        .unwrap_err();
        assert!(err.is_length_mismatch());
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        let (pos, vel, _, id) = columns();
        let negative = vec![1.0, -0.5];
        let err = ParticleView::new(
            [&pos[0], &pos[1], &pos[2]],
            [&vel[0], &vel[1], &vel[2]],
            &negative,
            &id,
        )
        .unwrap_err();
        assert!(err.is_negative_mass());

        let mut set = ParticleSet::new();
        let err = set
            .push(Particle::new([0.0, f64::NAN, 0.0], [0.0; 3], 1.0, 0))
            .unwrap_err();
        assert!(err.is_non_finite());
        assert!(set.is_empty());
    }

    #[test]
    fn test_projected_radii_ignore_z() {
        let set = ParticleSet::from_particles(vec![
            Particle::new([3.0, 4.0, 12.0], [0.0, 0.0, 5.0], 1.0, 0),
        ])
        .unwrap();
        let view = set.view();
        let origin = Centre::origin();
        assert_eq!(view.radii(&origin, Projection::Full), vec![13.0]);
        assert_eq!(view.radii(&origin, Projection::Projected), vec![5.0]);
        assert_eq!(view.speeds(&origin, Projection::Projected), vec![0.0]);
    }

    #[test]
    fn test_kind_filter() {
        let set = ParticleSet::from_particles(
            (0..6).map(|i| Particle::new([i as f64, 0.0, 0.0], [0.0; 3], 1.0, i).with_kind(i as i32)),
        )
        .unwrap();
        let main_sequence = set.view().with_kind_range(0, 1);
        assert_eq!(main_sequence.len(), 2);
        assert_eq!(main_sequence.view().ids(), &[0, 1]);
        assert_eq!(main_sequence.view().kind(1), 1);
    }
}

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
//! Degenerate input never yields NaN and invalid input is rejected up front

use cluster_dynamics::centre::{
    centre_of_mass, find_centre_of_density, find_centre_sigma_clip, Centre, DensityCentreConfig,
    SigmaClipConfig,
};
use cluster_dynamics::diagnostics::{DegenerateReason, Diagnostic};
use cluster_dynamics::pairwise::SummationConfig;
use cluster_dynamics::particles::{Particle, ParticleSet, ParticleView, Projection};
use cluster_dynamics::properties::{
    core_relaxation_time, density_profile, energies, half_mass_radius, half_mass_relaxation_time,
    lagrange_radii, limiting_radius, mass_fraction_radius, particle_energy, relaxation_time,
    tidal_radius, virial_radius, virial_radius_critical_density, CriticalDensity, EnergyConfig,
    IsothermalHalo, LimitingConfig, PointMassHost, ProfileConfig, RelaxationConfig, TidalConfig,
};

fn host() -> IsothermalHalo {
    IsothermalHalo {
        circular_velocity: 220.0,
        grav: 4.302e-3,
    }
}

/// Run every scalar property on `set` and collect the values
fn all_scalars(set: &ParticleSet) -> Vec<f64> {
    let view = set.view();
    let frame = Centre::origin();
    let relax = RelaxationConfig::default();
    vec![
        *virial_radius(&view, Projection::Full, &SummationConfig::default()).value(),
        *virial_radius_critical_density(&view, &frame, &CriticalDensity::default(), Projection::Full)
            .unwrap()
            .value(),
        *half_mass_radius(&view, &frame, Projection::Projected).value(),
        *mass_fraction_radius(&view, &frame, 0.9, Projection::Full).unwrap().value(),
        *relaxation_time(&view, &frame, &relax).unwrap().value(),
        *half_mass_relaxation_time(&view, &frame, &relax).unwrap().value(),
        *core_relaxation_time(&view, &frame, &relax).unwrap().value(),
        tidal_radius(&view, &frame, &host(), &TidalConfig::new(8000.0).with_iterations(5))
            .unwrap()
            .value()
            .radius,
        *limiting_radius(&view, &frame, &host(), &LimitingConfig::new(8000.0)).unwrap().value(),
    ]
}

#[test]
fn test_empty_snapshot_is_degenerate_not_nan() {
    let empty = ParticleSet::new();
    let view = empty.view();
    assert!(all_scalars(&empty).iter().all(|v| *v == 0.0));

    let e = energies(&view, &Centre::origin(), &EnergyConfig::default()).unwrap();
    assert_eq!(e.status().degenerate_reason(), Some(DegenerateReason::NoParticles));
    assert_eq!(e.value().total(), 0.0);

    let lagrange = lagrange_radii(&view, &Centre::origin(), 4, Projection::Full).unwrap();
    assert_eq!(lagrange.value(), &vec![0.0; 4]);
    assert!(lagrange.is_degenerate());

    let profile = density_profile(&view, &Centre::origin(), &ProfileConfig::default()).unwrap();
    assert!(profile.value().is_empty());
    assert_eq!(
        profile.status().degenerate_reason(),
        Some(DegenerateReason::InsufficientPopulation {
            available: 0,
            required: 20
        })
    );

    let start = Centre::new([1.0, 1.0, 1.0], [0.0; 3]);
    let density = find_centre_of_density(&view, start, &DensityCentreConfig::default()).unwrap();
    let clipped = find_centre_sigma_clip(&view, start, &SigmaClipConfig::default()).unwrap();
    assert_eq!(density.value().centre, start);
    assert_eq!(clipped.value().centre, start);
    assert!(centre_of_mass(&view).is_degenerate());
}

#[test]
fn test_single_particle() {
    let set = ParticleSet::from_particles(vec![Particle::new([1.0, 2.0, 2.0], [0.0, 3.0, 4.0], 2.0, 42)]).unwrap();
    let view = set.view();
    assert!(all_scalars(&set).iter().all(|v| v.is_finite()));

    let e = energies(&view, &Centre::origin(), &EnergyConfig::default()).unwrap();
    assert_eq!(e.status().degenerate_reason(), Some(DegenerateReason::SingleParticle));
    assert_eq!(e.value().potential, vec![0.0]);
    assert_eq!(e.value().kinetic, vec![12.5]);

    let single = particle_energy(&view, &Centre::origin(), 42, &EnergyConfig::default()).unwrap();
    assert!(single.is_ok());
    assert_eq!(single.value().potential, 0.0);

    // ln(0.4) < 0
    let t = half_mass_relaxation_time(&view, &Centre::origin(), &RelaxationConfig::default()).unwrap();
    assert_eq!(t.status().degenerate_reason(), Some(DegenerateReason::NonPositiveCoulombLog));
    assert_eq!(*t.value(), 0.0);

    assert_eq!(*half_mass_radius(&view, &Centre::origin(), Projection::Full).value(), 3.0);
}

#[test]
fn test_massless_snapshot() {
    let set = ParticleSet::from_particles(
        (0..300).map(|i| Particle::new([i as f64 * 0.01, 0.0, 0.0], [0.0; 3], 0.0, i)),
    )
    .unwrap();
    let view = set.view();
    assert!(all_scalars(&set).iter().all(|v| v.is_finite()));

    assert_eq!(
        half_mass_radius(&view, &Centre::origin(), Projection::Full).status().degenerate_reason(),
        Some(DegenerateReason::NoMass)
    );
    assert_eq!(
        virial_radius(&view, Projection::Full, &SummationConfig::default())
            .status()
            .degenerate_reason(),
        Some(DegenerateReason::NoMass)
    );
    assert_eq!(
        tidal_radius(&view, &Centre::origin(), &host(), &TidalConfig::new(8000.0))
            .unwrap()
            .status()
            .degenerate_reason(),
        Some(DegenerateReason::NoMass)
    );
    let com = centre_of_mass(&view);
    assert_eq!(com.status().degenerate_reason(), Some(DegenerateReason::NoMass));

    // massless tracers still feel the (zero) potential of the others
    let e = energies(&view, &Centre::origin(), &EnergyConfig::default()).unwrap();
    assert!(e.value().potential.iter().all(|p| *p == 0.0));
}

#[test]
fn test_all_particles_at_centre() {
    let set = ParticleSet::from_particles((0..5).map(|i| Particle::new([0.0; 3], [1.0, 0.0, 0.0], 1.0, i))).unwrap();
    let view = set.view();

    let r_v = virial_radius_critical_density(&view, &Centre::origin(), &CriticalDensity::default(), Projection::Full)
        .unwrap();
    assert_eq!(r_v.status().degenerate_reason(), Some(DegenerateReason::ZeroExtent));
    assert_eq!(*r_v.value(), 0.0);

    // the snapshot has mass, it just has no extent
    let r_v = virial_radius(&view, Projection::Full, &SummationConfig::default());
    assert_eq!(r_v.status().degenerate_reason(), Some(DegenerateReason::ZeroExtent));
    assert_eq!(*r_v.value(), 0.0);

    // ten pairs, all coincident
    let e = energies(&view, &Centre::origin(), &EnergyConfig::default()).unwrap();
    assert!(e.is_warning());
    assert_eq!(e.status().diagnostics().len(), 10);
    assert!(e
        .status()
        .diagnostics()
        .iter()
        .all(|d| matches!(d, Diagnostic::CoincidentPair { .. })));
    assert_eq!(e.value().potential_total, 0.0);

    let profile = density_profile(&view, &Centre::origin(), &ProfileConfig::default().with_nbins(5)).unwrap();
    assert!(profile.is_warning());
    assert!(profile.value().densities().iter().all(|d| *d == 0.0));

    let t = core_relaxation_time(&view, &Centre::origin(), &RelaxationConfig::default()).unwrap();
    assert_eq!(t.status().degenerate_reason(), Some(DegenerateReason::ZeroExtent));
}

#[test]
fn test_invalid_particles_are_rejected() {
    let nan = ParticleSet::from_particles(vec![
        Particle::new([0.0; 3], [0.0; 3], 1.0, 0),
        Particle::new([0.0, f64::NAN, 0.0], [0.0; 3], 1.0, 1),
    ]);
    assert!(nan.unwrap_err().is_non_finite());

    let negative = ParticleSet::from_particles(vec![Particle::new([0.0; 3], [0.0; 3], -1.0, 0)]);
    assert!(negative.unwrap_err().is_negative_mass());

    let fast = ParticleSet::from_particles(vec![Particle::new([0.0; 3], [f64::INFINITY, 0.0, 0.0], 1.0, 0)]);
    assert!(fast.unwrap_err().is_non_finite());

    let short = [0.0];
    let long = [0.0, 1.0];
    let mass = [1.0, 1.0];
    let id = [0, 1];
    let mismatch = ParticleView::new([&long, &short, &long], [&long, &long, &long], &mass, &id);
    let err = mismatch.unwrap_err();
    assert!(err.is_length_mismatch());
    assert!(err.to_string().contains("`y`"));

    let view = ParticleView::new([&long, &long, &long], [&long, &long, &long], &mass, &id).unwrap();
    assert!(view.with_kinds(&[1]).unwrap_err().is_length_mismatch());
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let set = ParticleSet::from_particles((0..10).map(|i| Particle::new([i as f64, 0.0, 0.0], [0.0; 3], 1.0, i))).unwrap();
    let view = set.view();
    let frame = Centre::origin();

    assert!(energies(&view, &frame, &EnergyConfig::default().with_grav(0.0))
        .unwrap_err()
        .is_invalid_parameter());
    assert!(particle_energy(&view, &frame, 3, &EnergyConfig::default().with_grav(-1.0))
        .unwrap_err()
        .is_invalid_parameter());
    assert!(particle_energy(&view, &frame, 30, &EnergyConfig::default())
        .unwrap_err()
        .is_unknown_particle());
    assert!(lagrange_radii(&view, &frame, 0, Projection::Full)
        .unwrap_err()
        .is_invalid_parameter());
    for fraction in [0.0, 1.5, f64::NAN] {
        assert!(mass_fraction_radius(&view, &frame, fraction, Projection::Full).is_err());
    }
    assert!(virial_radius_critical_density(
        &view,
        &frame,
        &CriticalDensity::default().with_overdensity(0.0),
        Projection::Full
    )
    .is_err());
    assert!(relaxation_time(&view, &frame, &RelaxationConfig::default().with_radius(-1.0)).is_err());
    assert!(half_mass_relaxation_time(&view, &frame, &RelaxationConfig::default().with_coulomb(0.0)).is_err());
    assert!(density_profile(&view, &frame, &ProfileConfig::default().with_nbins(0)).is_err());
    assert!(density_profile(&view, &frame, &ProfileConfig::default().with_radius_range(2.0, 1.0)).is_err());
    assert!(density_profile(&view, &frame, &ProfileConfig::default().with_kind_range(3, 1)).is_err());
    assert!(tidal_radius(&view, &frame, &PointMassHost { mass: 1.0 }, &TidalConfig::new(-1.0)).is_err());
    assert!(limiting_radius(&view, &frame, &host(), &LimitingConfig::new(1.0).with_nbins(0)).is_err());
    assert!(find_centre_of_density(&view, frame, &DensityCentreConfig::default().with_r_max(f64::NAN)).is_err());
    assert!(find_centre_sigma_clip(&view, frame, &SigmaClipConfig::default().with_nsigma(0.0)).is_err());
}

#[test]
fn test_projection_ignores_depth() {
    let set = ParticleSet::from_particles(vec![
        Particle::new([0.0, 0.0, 0.0], [0.0, 0.0, 5.0], 1.0, 0),
        Particle::new([3.0, 4.0, 100.0], [0.0, 0.0, -5.0], 1.0, 1),
    ])
    .unwrap();
    let view = set.view();

    let full = virial_radius(&view, Projection::Full, &SummationConfig::sequential());
    let projected = virial_radius(&view, Projection::Projected, &SummationConfig::sequential());
    assert_eq!(*projected.value(), 10.0);
    assert!(*full.value() > 100.0);

    let e = energies(&view, &Centre::origin(), &EnergyConfig::default().with_projection(Projection::Projected))
        .unwrap()
        .into_value();
    assert_eq!(e.kinetic, vec![0.0, 0.0]);
    assert_eq!(e.potential, vec![-0.2, -0.2]);
}

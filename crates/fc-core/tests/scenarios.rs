/// End-to-end chain detection on small hand-built arenas
///
/// Each arena is classified from uniaxial compressive stresses and searched
/// with alpha = pi/4.
use std::f64::consts::FRAC_PI_4;

use fc_core::{Domain, Particle, Snapshot, find_chains, periodic_adjust};
use nalgebra::{Matrix3, Vector3};

/// Particle of radius 1 under unit uniaxial compression along `dir`.
fn compressed(id: usize, position: Vector3<f64>, dir: Vector3<f64>) -> Particle {
    let d = dir.normalize();
    Particle::new(id, 1.0, position).with_stress(-d * d.transpose())
}

fn connect(particles: &mut [Particle], a: usize, b: usize) {
    particles[a].neighbors.push(b);
    particles[b].neighbors.push(a);
}

fn classify_all(particles: &mut [Particle]) {
    for p in particles.iter_mut() {
        p.classify();
    }
}

fn assert_no_duplicate_linkages(particles: &[Particle]) {
    for p in particles {
        let mut seen = p.linkages().to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), p.linkages().len(), "particle {} repeats a linkage", p.id);
    }
}

#[test]
fn three_collinear_particles_form_one_chain() {
    let mut particles: Vec<Particle> = (0..3)
        .map(|i| compressed(i, Vector3::new(2.0 * i as f64, 0.0, 0.0), Vector3::x()))
        .collect();
    connect(&mut particles, 0, 1);
    connect(&mut particles, 1, 2);
    classify_all(&mut particles);

    let chains = find_chains(&mut particles, FRAC_PI_4, None).expect("search");
    assert_eq!(chains, vec![vec![0, 1, 2]]);
    assert!(particles.iter().all(|p| p.chain_id() == Some(0)));
    assert!(particles[0].link_nodes().is_empty());
    assert_eq!(particles[1].link_nodes()[0].predecessor, 0);
    assert_eq!(particles[2].link_nodes()[0].predecessor, 1);
    assert_no_duplicate_linkages(&particles);
}

#[test]
fn two_particles_are_discarded_and_marked() {
    // Ids start at 1; slot 0 is an unstressed placeholder.
    let mut particles = vec![
        Particle::new(0, 0.0, Vector3::zeros()),
        compressed(1, Vector3::zeros(), Vector3::x()),
        compressed(2, Vector3::new(2.0, 0.0, 0.0), Vector3::x()),
    ];
    connect(&mut particles, 1, 2);
    classify_all(&mut particles);

    let chains = find_chains(&mut particles, FRAC_PI_4, None).expect("search");
    assert!(chains.is_empty());
    assert!(particles.iter().all(|p| p.chain_id().is_none()));

    let last = particles[2].link_nodes().last().expect("second particle was entered");
    assert!(last.discarded);
    assert_eq!(last.predecessor, 1);
    assert!(last.signed() < 0);
}

#[test]
fn branching_center_collects_four_neighbors() {
    let (s, c) = 20f64.to_radians().sin_cos();
    let mut particles = vec![compressed(0, Vector3::zeros(), Vector3::x())];
    for (i, (sx, sy)) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)]
        .into_iter()
        .enumerate()
    {
        let position = Vector3::new(2.0 * c * sx, 2.0 * s * sy, 0.0);
        particles.push(compressed(i + 1, position, Vector3::x()));
    }
    for i in 1..5 {
        connect(&mut particles, 0, i);
    }
    classify_all(&mut particles);

    let chains = find_chains(&mut particles, FRAC_PI_4, None).expect("search");
    assert_eq!(chains.len(), 1);
    let mut members = chains[0].clone();
    members.sort_unstable();
    assert_eq!(members, vec![0, 1, 2, 3, 4]);
    assert!(particles[0].linkages().len() >= 2);
    assert_no_duplicate_linkages(&particles);
}

#[test]
fn chain_continues_across_periodic_boundary() {
    let domain = Domain::new([0.0; 3], [10.0; 3]).expect("domain");
    // Axis at 60 degrees in the xy plane; the third particle wraps in x.
    let dir = Vector3::new(0.5, 3f64.sqrt() / 2.0, 0.0);
    let p0 = Vector3::new(8.0, 2.0, 5.0);
    let p1 = p0 + 2.0 * dir;
    let p2 = p1 + 2.0 * dir - Vector3::new(10.0, 0.0, 0.0);

    let build = || {
        let mut particles = vec![
            compressed(0, p0, dir),
            compressed(1, p1, dir),
            compressed(2, p2, dir),
        ];
        connect(&mut particles, 0, 1);
        connect(&mut particles, 1, 2);
        classify_all(&mut particles);
        particles
    };

    let image = periodic_adjust(&p1, &p2, &domain);
    assert!((p1 - p2).norm() > 2.0);
    assert!(((image - p1).norm() - 2.0).abs() < 1e-9);

    let mut wrapped = build();
    let chains = find_chains(&mut wrapped, FRAC_PI_4, Some(domain)).expect("search");
    assert_eq!(chains, vec![vec![0, 1, 2]]);

    // Without the domain the direct vector is misaligned and the chain breaks.
    let mut direct = build();
    let chains = find_chains(&mut direct, FRAC_PI_4, None).expect("search");
    assert!(chains.is_empty());
}

#[test]
fn tensile_and_complex_particles_stay_out() {
    let mut particles: Vec<Particle> = (0..5)
        .map(|i| compressed(i, Vector3::new(2.0 * i as f64, 0.0, 0.0), Vector3::x()))
        .collect();
    particles[1].stress = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
    // Eigenvalues -1 +/- 5i and 3.
    particles[3].stress = Matrix3::new(-1.0, -5.0, 0.0, 5.0, -1.0, 0.0, 0.0, 0.0, 3.0);
    for i in 1..5 {
        connect(&mut particles, i - 1, i);
    }
    classify_all(&mut particles);

    assert!(!particles[1].has_minor_stress());
    assert!(!particles[3].has_minor_stress());

    let chains = find_chains(&mut particles, FRAC_PI_4, None).expect("search");
    assert!(chains.is_empty());
    for i in [1, 3] {
        assert_eq!(particles[i].chain_id(), None);
        assert!(particles[i].linkages().is_empty());
        assert!(particles[i].link_nodes().is_empty());
    }
}

#[test]
fn snapshot_reset_allows_a_second_search() {
    let mut particles: Vec<Particle> = (0..4)
        .map(|i| compressed(i, Vector3::new(0.0, 0.0, 2.0 * i as f64), Vector3::z()))
        .collect();
    for i in 1..4 {
        connect(&mut particles, i - 1, i);
    }
    let mut snapshot = Snapshot::from_particles(particles, None).expect("snapshot");
    snapshot.classify_stresses();

    let first = find_chains(&mut snapshot.particles, FRAC_PI_4, None).expect("first");
    snapshot.reset_chains();
    let second = find_chains(&mut snapshot.particles, FRAC_PI_4, None).expect("second");
    assert_eq!(first, second);
    assert_eq!(first, vec![vec![0, 1, 2, 3]]);
}

use crate::swarm::{archive::ParetoArchive, particle::Particle, rng::SharedRng, task::CancelToken};

fn scored_particle(position: &[f64], errors: &[f64]) -> Particle {
    let mut particle = Particle::new(position.len(), errors.len());
    particle.position.copy_from_slice(position);
    particle.errors.copy_from_slice(errors);
    particle
}

fn sorted_unique_errors(archive: &ParetoArchive) -> Vec<Vec<f64>> {
    let mut errors: Vec<Vec<f64>> = archive
        .members()
        .iter()
        .map(|member| member.errors().to_vec())
        .collect();
    errors.sort_by(|a, b| a.partial_cmp(b).expect("comparable error vectors"));
    errors.dedup();
    errors
}

#[test]
fn test_absorb_keeps_mutually_nondominated_particles() {
    let swarm = vec![
        scored_particle(&[0.0], &[0.0, 3.0]),
        scored_particle(&[1.0], &[1.0, 1.0]),
        scored_particle(&[2.0], &[3.0, 0.0]),
    ];
    let mut archive = ParetoArchive::new(10);
    archive.absorb(&swarm, &CancelToken::new(), &SharedRng::seeded(1));
    assert_eq!(archive.len(), 3);
}

#[test]
fn test_absorb_discards_dominated_candidates() {
    let mut archive = ParetoArchive::new(10);
    let cancel = CancelToken::new();
    let rng = SharedRng::seeded(1);

    archive.absorb(&[scored_particle(&[0.0], &[1.0, 1.0])], &cancel, &rng);
    archive.absorb(&[scored_particle(&[5.0], &[2.0, 2.0])], &cancel, &rng);

    assert_eq!(archive.len(), 1);
    assert_eq!(archive.members()[0].errors(), &[1.0, 1.0]);
}

#[test]
fn test_absorb_evicts_members_the_candidate_dominates() {
    let mut archive = ParetoArchive::new(10);
    let cancel = CancelToken::new();
    let rng = SharedRng::seeded(1);

    archive.absorb(
        &[
            scored_particle(&[0.0], &[2.0, 2.0]),
            scored_particle(&[1.0], &[3.0, 0.0]),
        ],
        &cancel,
        &rng,
    );
    archive.absorb(&[scored_particle(&[2.0], &[1.0, 1.0])], &cancel, &rng);

    // [1, 1] pushes out [2, 2] but coexists with the [3, 0] trade-off.
    let errors = sorted_unique_errors(&archive);
    assert_eq!(errors, vec![vec![1.0, 1.0], vec![3.0, 0.0]]);
    assert_eq!(archive.len(), 2);
}

#[test]
fn test_capacity_eviction_keeps_a_random_subset() {
    let swarm: Vec<Particle> = (0..10)
        .map(|i| scored_particle(&[i as f64], &[i as f64, 9.0 - i as f64]))
        .collect();
    let mut archive = ParetoArchive::new(4);
    archive.absorb(&swarm, &CancelToken::new(), &SharedRng::seeded(8));

    assert_eq!(archive.capacity(), 4);
    assert_eq!(archive.len(), archive.capacity());
    for member in archive.members() {
        let i = member.position()[0];
        assert_eq!(member.errors(), &[i, 9.0 - i]);
    }
}

#[test]
fn test_rebuild_from_same_swarm_preserves_the_front() {
    let swarm = vec![
        scored_particle(&[0.0], &[0.0, 3.0]),
        scored_particle(&[1.0], &[1.0, 1.0]),
        scored_particle(&[2.0], &[3.0, 0.0]),
        scored_particle(&[3.0], &[2.0, 2.0]),
    ];
    let mut archive = ParetoArchive::new(20);
    let cancel = CancelToken::new();
    let rng = SharedRng::seeded(5);

    archive.absorb(&swarm, &cancel, &rng);
    let first = sorted_unique_errors(&archive);
    archive.absorb(&swarm, &cancel, &rng);
    let second = sorted_unique_errors(&archive);

    assert_eq!(first, second);
    assert_eq!(first, vec![vec![0.0, 3.0], vec![1.0, 1.0], vec![3.0, 0.0]]);
}

#[test]
fn test_cancelled_absorb_adds_nothing() {
    let swarm = vec![scored_particle(&[0.0], &[1.0, 1.0])];
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut archive = ParetoArchive::new(10);
    archive.absorb(&swarm, &cancel, &SharedRng::seeded(1));
    assert!(archive.is_empty());
}

#[test]
fn test_contains_match_compares_positions() {
    let mut archive = ParetoArchive::new(10);
    archive.absorb(
        &[scored_particle(&[1.5], &[1.0])],
        &CancelToken::new(),
        &SharedRng::seeded(1),
    );

    assert!(archive.contains_match(&scored_particle(&[1.5 + 1.0e-7], &[9.0])));
    assert!(!archive.contains_match(&scored_particle(&[1.501], &[1.0])));
}

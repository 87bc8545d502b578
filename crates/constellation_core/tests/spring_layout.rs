use constellation_core::{
    apply_spring, initial_positions, relax, Connection, LayoutConfig, LayoutError, Position,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn edge(from: usize, to: usize, strength: f64) -> Connection {
    Connection {
        from,
        to,
        strength,
        reason: "test".to_string(),
    }
}

fn distance(a: &Position, b: &Position) -> f64 {
    a.delta_to(b).norm()
}

#[test]
fn single_step_preserves_pair_center_of_mass() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = LayoutConfig::default();

    for _ in 0..100 {
        let mut positions = initial_positions(2, &config, &mut rng);
        let strength = rng.gen_range(0.31..=1.0);
        let before = positions.clone();

        apply_spring(&mut positions, &edge(0, 1, strength), &config).unwrap();

        let moved_from = before[0].delta_to(&positions[0]);
        let moved_to = before[1].delta_to(&positions[1]);
        assert!((moved_from.x + moved_to.x).abs() < 1e-12);
        assert!((moved_from.y + moved_to.y).abs() < 1e-12);
        assert!((moved_from.z + moved_to.z).abs() < 1e-12);
    }
}

#[test]
fn relaxation_moves_distant_pair_toward_target_separation() {
    let mut positions = vec![Position::new(-4.0, 0.0, 0.0), Position::new(4.0, 0.0, 0.0)];
    let stats = relax(&mut positions, &[edge(0, 1, 1.0)], &LayoutConfig::default()).unwrap();

    let after = distance(&positions[0], &positions[1]);
    assert_eq!(stats.iterations, 50);
    assert_eq!(stats.applied_steps, 50);
    assert!(after < 8.0, "pair should contract, got {after}");
    assert!(after > 2.0, "pair should not overshoot target, got {after}");
}

#[test]
fn stronger_connections_contract_faster() {
    let config = LayoutConfig::default();
    let start = vec![Position::new(0.0, 0.0, 0.0), Position::new(0.0, 9.0, 0.0)];

    let mut weak = start.clone();
    relax(&mut weak, &[edge(0, 1, 0.35)], &config).unwrap();
    let mut strong = start;
    relax(&mut strong, &[edge(0, 1, 1.0)], &config).unwrap();

    assert!(distance(&strong[0], &strong[1]) < distance(&weak[0], &weak[1]));
}

#[test]
fn unconnected_stars_do_not_move() {
    let mut rng = StdRng::seed_from_u64(3);
    let config = LayoutConfig::default();
    let mut positions = initial_positions(4, &config, &mut rng);
    let before = positions.clone();

    relax(&mut positions, &[edge(0, 1, 0.8)], &config).unwrap();

    assert_eq!(positions[2], before[2]);
    assert_eq!(positions[3], before[3]);
}

#[test]
fn seeded_layout_is_reproducible() {
    let config = LayoutConfig::default();
    let connections = vec![edge(0, 1, 0.9), edge(1, 2, 0.6), edge(2, 0, 0.4)];

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut positions = initial_positions(3, &config, &mut rng);
        relax(&mut positions, &connections, &config).unwrap();
        positions
    };

    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn custom_constants_are_honored() {
    let config = LayoutConfig {
        iterations: 1,
        target_separation: 0.0,
        spring_constant: 1.0,
        step_scale: 0.1,
        ..LayoutConfig::default()
    };
    let mut positions = vec![Position::new(0.0, 0.0, 0.0), Position::new(1.0, 0.0, 0.0)];
    relax(&mut positions, &[edge(0, 1, 1.0)], &config).unwrap();
    // f = 1 * 1 * 1 = 1; shift = 1 * 1 * 0.1
    assert!((positions[0].x - 0.1).abs() < 1e-12);
    assert!((positions[1].x - 0.9).abs() < 1e-12);
}

#[test]
fn out_of_range_connection_fails_fast() {
    let mut positions = vec![Position::default(); 2];
    let err = relax(&mut positions, &[edge(0, 5, 0.9)], &LayoutConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::ConnectionOutOfRange {
            index: 5,
            star_count: 2,
            ..
        }
    ));
}

//! Random initial placement and Hookean spring relaxation.
//!
//! Each step pulls a pair toward `target_separation` with force
//! `(dist - target) * k * strength`, displacing `from` by `+d * f * step` and
//! `to` by `-d * f * step` so the pair's center of mass stays put. Steps run
//! sequentially in connection order; the heuristic is bounded, not convergent.

use crate::layout::{LayoutConfig, LayoutError};
use crate::model::constellation::{Connection, Position};
use log::debug;
use rand::Rng;

/// Counters reported by [`relax`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaxStats {
    pub iterations: u32,
    pub applied_steps: usize,
    /// Steps skipped because endpoints coincided or distance was not finite.
    pub skipped_degenerate: usize,
}

/// Draws `count` positions uniformly from the placement cube.
pub fn initial_positions<R: Rng + ?Sized>(
    count: usize,
    config: &LayoutConfig,
    rng: &mut R,
) -> Vec<Position> {
    (0..count)
        .map(|_| {
            Position::new(
                scatter(rng, config.extent),
                scatter(rng, config.extent),
                scatter(rng, config.extent),
            )
        })
        .collect()
}

/// Runs `config.iterations` sweeps over `connections`, mutating `positions`.
///
/// # Errors
/// Fails before touching any position when a connection references an
/// out-of-range star or loops onto itself.
pub fn relax(
    positions: &mut [Position],
    connections: &[Connection],
    config: &LayoutConfig,
) -> Result<RelaxStats, LayoutError> {
    for (slot, connection) in connections.iter().enumerate() {
        check_endpoints(slot, connection, positions.len())?;
    }

    let mut stats = RelaxStats {
        iterations: config.iterations,
        ..RelaxStats::default()
    };
    for _ in 0..config.iterations {
        for connection in connections {
            if step(positions, connection, config) {
                stats.applied_steps += 1;
            } else {
                stats.skipped_degenerate += 1;
            }
        }
    }

    debug!(
        "event=layout_relaxed module=layout stars={} connections={} iterations={} skipped={}",
        positions.len(),
        connections.len(),
        stats.iterations,
        stats.skipped_degenerate
    );
    Ok(stats)
}

/// Applies one spring step for a single connection.
///
/// Returns `Ok(false)` when the step was skipped as degenerate.
pub fn apply_spring(
    positions: &mut [Position],
    connection: &Connection,
    config: &LayoutConfig,
) -> Result<bool, LayoutError> {
    check_endpoints(0, connection, positions.len())?;
    Ok(step(positions, connection, config))
}

fn scatter<R: Rng + ?Sized>(rng: &mut R, extent: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * extent
}

fn check_endpoints(
    slot: usize,
    connection: &Connection,
    star_count: usize,
) -> Result<(), LayoutError> {
    for index in [connection.from, connection.to] {
        if index >= star_count {
            return Err(LayoutError::ConnectionOutOfRange {
                connection: slot,
                index,
                star_count,
            });
        }
    }
    if connection.from == connection.to {
        return Err(LayoutError::SelfLoop {
            connection: slot,
            index: connection.from,
        });
    }
    Ok(())
}

// Endpoints must already be checked.
fn step(positions: &mut [Position], connection: &Connection, config: &LayoutConfig) -> bool {
    let from = positions[connection.from];
    let to = positions[connection.to];
    let d = from.delta_to(&to);
    let dist = d.norm();
    if dist == 0.0 || !dist.is_finite() {
        return false;
    }

    let force = (dist - config.target_separation) * config.spring_constant * connection.strength;
    let scale = force * config.step_scale;
    let shift = Position::new(d.x * scale, d.y * scale, d.z * scale);
    if !shift.is_finite() {
        return false;
    }

    let moved_from = &mut positions[connection.from];
    moved_from.x += shift.x;
    moved_from.y += shift.y;
    moved_from.z += shift.z;

    let moved_to = &mut positions[connection.to];
    moved_to.x -= shift.x;
    moved_to.y -= shift.y;
    moved_to.z -= shift.z;
    true
}

#[cfg(test)]
mod tests {
    use super::{apply_spring, initial_positions, relax};
    use crate::layout::{LayoutConfig, LayoutError};
    use crate::model::constellation::{Connection, Position};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn edge(from: usize, to: usize, strength: f64) -> Connection {
        Connection {
            from,
            to,
            strength,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn initial_positions_stay_inside_cube() {
        let mut rng = StdRng::seed_from_u64(7);
        let positions = initial_positions(200, &LayoutConfig::default(), &mut rng);
        assert_eq!(positions.len(), 200);
        for p in positions {
            for axis in [p.x, p.y, p.z] {
                assert!((-5.0..5.0).contains(&axis), "axis out of cube: {axis}");
            }
        }
    }

    #[test]
    fn stretched_spring_pulls_endpoints_together() {
        let mut positions = vec![Position::new(0.0, 0.0, 0.0), Position::new(10.0, 0.0, 0.0)];
        let applied = apply_spring(&mut positions, &edge(0, 1, 1.0), &LayoutConfig::default())
            .expect("valid edge");
        assert!(applied);
        // f = (10 - 2) * 0.1 * 1.0 = 0.8; shift = 10 * 0.8 * 0.01 = 0.08
        assert!((positions[0].x - 0.08).abs() < 1e-12);
        assert!((positions[1].x - 9.92).abs() < 1e-12);
    }

    #[test]
    fn compressed_spring_pushes_endpoints_apart() {
        let mut positions = vec![Position::new(0.0, 0.0, 0.0), Position::new(1.0, 0.0, 0.0)];
        apply_spring(&mut positions, &edge(0, 1, 1.0), &LayoutConfig::default())
            .expect("valid edge");
        assert!(positions[0].x < 0.0);
        assert!(positions[1].x > 1.0);
    }

    #[test]
    fn coincident_endpoints_are_skipped_without_nan() {
        let mut positions = vec![Position::new(1.0, 1.0, 1.0); 2];
        let stats = relax(&mut positions, &[edge(0, 1, 0.9)], &LayoutConfig::default())
            .expect("valid edge");
        assert_eq!(stats.applied_steps, 0);
        assert_eq!(stats.skipped_degenerate, 50);
        assert!(positions.iter().all(Position::is_finite));
    }

    #[test]
    fn out_of_range_edge_fails_before_mutation() {
        let original = vec![Position::new(0.0, 0.0, 0.0), Position::new(4.0, 0.0, 0.0)];
        let mut positions = original.clone();
        let err = relax(
            &mut positions,
            &[edge(0, 1, 0.5), edge(1, 2, 0.5)],
            &LayoutConfig::default(),
        )
        .expect_err("index 2 is out of range");
        assert_eq!(
            err,
            LayoutError::ConnectionOutOfRange {
                connection: 1,
                index: 2,
                star_count: 2
            }
        );
        assert_eq!(positions, original);
    }

    #[test]
    fn self_loop_is_rejected() {
        let mut positions = vec![Position::default(); 3];
        let err = apply_spring(&mut positions, &edge(2, 2, 0.5), &LayoutConfig::default())
            .expect_err("self loop must fail");
        assert!(matches!(err, LayoutError::SelfLoop { index: 2, .. }));
    }
}

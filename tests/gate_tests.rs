#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evo_track::simulation::error::Error;
use evo_track::simulation::gates::GateSequence;
use evo_track::simulation::geometric_utils::OrientedBox;
use geo::Coord;

fn c(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

/// Three vertical gates at x = 0, 10 and 20.
fn straight_gates() -> GateSequence {
    let mut gates = GateSequence::new(4.0).unwrap();
    for x in [0.0, 10.0, 20.0] {
        gates.add_gate(c(x, -5.0), c(x, 5.0)).unwrap();
    }
    gates
}

#[test]
fn test_checkpoint_count() {
    let gates = straight_gates();
    assert_eq!(gates.checkpoint_count(), 3);
}

#[test]
fn test_projection_fraction_between_gates() {
    let gates = straight_gates();
    assert!((gates.projection_fraction(0, c(2.5, 3.0)) - 0.25).abs() < 1e-12);
    assert!((gates.projection_fraction(1, c(15.0, -4.0)) - 0.5).abs() < 1e-12);
}

#[test]
fn test_projection_fraction_clamped() {
    let gates = straight_gates();
    assert_eq!(gates.projection_fraction(0, c(-30.0, 0.0)), 0.0);
    assert_eq!(gates.projection_fraction(0, c(300.0, 0.0)), 1.0);
}

#[test]
fn test_projection_fraction_out_of_range_is_zero() {
    let gates = straight_gates();
    // The last gate has no successor.
    assert_eq!(gates.projection_fraction(2, c(25.0, 0.0)), 0.0);
    assert_eq!(gates.projection_fraction(3, c(5.0, 0.0)), 0.0);
    assert_eq!(gates.projection_fraction(usize::MAX, c(5.0, 0.0)), 0.0);
    // Before the first gate.
    assert_eq!(gates.progress(None, c(5.0, 0.0)), 0.0);
}

#[test]
fn test_projection_fraction_in_unit_interval() {
    let gates = straight_gates();
    for i in -20..20 {
        for j in -20..20 {
            let p = c(f64::from(i) * 3.7, f64::from(j) * 11.3);
            for gate in 0..3 {
                let f = gates.projection_fraction(gate, p);
                assert!((0.0..=1.0).contains(&f));
            }
        }
    }
}

#[test]
fn test_progress_adds_crossed_gates() {
    let gates = straight_gates();
    assert!((gates.progress(Some(0), c(5.0, 0.0)) - 1.5).abs() < 1e-12);
    assert!((gates.progress(Some(1), c(12.0, 0.0)) - 2.2).abs() < 1e-12);
}

#[test]
fn test_degenerate_gate_rejected() {
    let mut gates = straight_gates();
    let err = gates.add_gate(c(1.0, 1.0), c(1.0, 1.0));
    assert!(matches!(err, Err(Error::DegenerateGate { index: 3 })));
    assert_eq!(gates.checkpoint_count(), 3);
}

#[test]
fn test_gate_detection_through_shared_engine() {
    let mut gates = straight_gates();
    let car = OrientedBox::new(c(10.0, 1.0), 4.0, 2.0, 0.0);
    assert_eq!(gates.is_box_colliding(&car), Some(1));

    let between = OrientedBox::new(c(5.0, 0.0), 4.0, 2.0, 0.0);
    assert_eq!(gates.is_box_colliding(&between), None);

    let d = gates.ray_min_distance(c(3.0, 0.0), 0.0, 100.0).unwrap();
    assert!((d - 7.0).abs() < 1e-9);
}

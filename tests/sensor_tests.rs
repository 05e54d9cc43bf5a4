#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evo_track::simulation::error::Error;
use evo_track::simulation::sensors::{EXTRA_INPUTS, RawSensors, SensorConfig, SensorNormalizer};

fn create_test_config() -> SensorConfig {
    SensorConfig {
        ray_count: 5,
        field_of_view: std::f64::consts::PI,
        ray_length: 100.0,
        ttc_horizon: 2.0,
        max_speed: 50.0,
        max_yaw_rate: 2.0,
        max_slip: 0.5,
        smoothing: 0.0,
    }
}

#[test]
fn test_input_size_and_angles() {
    let config = create_test_config();
    assert_eq!(config.input_size(), 5 + EXTRA_INPUTS);

    let angles = config.relative_ray_angles();
    assert_eq!(angles.len(), 5);
    assert!((angles[0] + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert!(angles[2].abs() < 1e-12);
    assert!((angles[4] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

    let single = SensorConfig {
        ray_count: 1,
        ..config
    };
    assert_eq!(single.ray_angles(1.0), vec![1.0]);
}

#[test]
fn test_outputs_are_bounded() {
    let mut normalizer = SensorNormalizer::new(create_test_config()).unwrap();
    let distances = [Some(500.0), None, Some(0.0), Some(-3.0), Some(42.0)];
    let out = normalizer
        .normalize(&RawSensors {
            ray_distances: &distances,
            speed: 400.0,
            yaw_rate: -30.0,
            slip_angle: 9.0,
        })
        .unwrap();

    assert_eq!(out.len(), 10);
    for i in 0..5 {
        assert!((0.0..=1.0).contains(&out[i]));
    }
    assert_eq!(out[0], 1.0);
    assert_eq!(out[1], 1.0);
    assert_eq!(out[2], 0.0);
    assert!((out[4] - 0.42).abs() < 1e-6);
    assert!((0.0..=1.0).contains(&out[5]));
    assert!((-1.0..=1.0).contains(&out[6]));
    assert_eq!(out[7], -1.0);
    assert_eq!(out[8], 1.0);
    assert_eq!(out[9], 1.0);
}

#[test]
fn test_time_to_collision() {
    let mut normalizer = SensorNormalizer::new(create_test_config()).unwrap();
    let distances = [None, None, Some(10.0), None, None];

    // 10 m ahead at 10 m/s is one second, half the 2 s horizon.
    let out = normalizer
        .normalize(&RawSensors {
            ray_distances: &distances,
            speed: 10.0,
            yaw_rate: 0.0,
            slip_angle: 0.0,
        })
        .unwrap();
    assert!((out[5] - 0.5).abs() < 1e-6);

    // Standing still never collides.
    let out = normalizer
        .normalize(&RawSensors {
            ray_distances: &distances,
            speed: 0.0,
            yaw_rate: 0.0,
            slip_angle: 0.0,
        })
        .unwrap();
    assert_eq!(out[5], 1.0);
}

#[test]
fn test_balance_sign() {
    let mut normalizer = SensorNormalizer::new(create_test_config()).unwrap();
    // Rays run right to left; open space on the left.
    let distances = [Some(10.0), Some(10.0), Some(50.0), Some(90.0), Some(90.0)];
    let out = normalizer
        .normalize(&RawSensors {
            ray_distances: &distances,
            speed: 0.0,
            yaw_rate: 0.0,
            slip_angle: 0.0,
        })
        .unwrap();
    assert!((out[6] - 0.8).abs() < 1e-6);
}

#[test]
fn test_wrong_arity_fails() {
    let mut normalizer = SensorNormalizer::new(create_test_config()).unwrap();
    let err = normalizer.normalize(&RawSensors {
        ray_distances: &[Some(1.0)],
        speed: 0.0,
        yaw_rate: 0.0,
        slip_angle: 0.0,
    });
    assert!(matches!(
        err,
        Err(Error::SensorArity {
            expected: 5,
            found: 1
        })
    ));
}

#[test]
fn test_smoothing() {
    let config = SensorConfig {
        smoothing: 0.5,
        ..create_test_config()
    };
    let mut normalizer = SensorNormalizer::new(config).unwrap();
    let far = [Some(100.0); 5];
    let near = [Some(0.0); 5];
    let raw = |d| RawSensors {
        ray_distances: d,
        speed: 0.0,
        yaw_rate: 0.0,
        slip_angle: 0.0,
    };

    let first = normalizer.normalize(&raw(&far)).unwrap();
    assert_eq!(first[0], 1.0);
    let second = normalizer.normalize(&raw(&near)).unwrap();
    assert!((second[0] - 0.5).abs() < 1e-6);
    let third = normalizer.normalize(&raw(&near)).unwrap();
    assert!((third[0] - 0.25).abs() < 1e-6);

    normalizer.reset();
    let fresh = normalizer.normalize(&raw(&near)).unwrap();
    assert_eq!(fresh[0], 0.0);
}

#[test]
fn test_invalid_config_rejected() {
    let bad_range = SensorConfig {
        ray_length: 0.0,
        ..create_test_config()
    };
    assert!(SensorNormalizer::new(bad_range).is_err());

    let bad_smoothing = SensorConfig {
        smoothing: 1.0,
        ..create_test_config()
    };
    assert!(SensorNormalizer::new(bad_smoothing).is_err());
}

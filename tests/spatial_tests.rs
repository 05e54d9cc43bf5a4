#![allow(missing_docs)]

use evo_track::simulation::spatial::{CellKey, SpatialGrid};
use geo::Coord;

fn c(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

#[test]
fn test_cell_key_roundtrip_extremes() {
    for &(cx, cy) in &[
        (0, 0),
        (-1, -1),
        (i32::MAX, i32::MIN),
        (i32::MIN, i32::MAX),
        (-70_000, 70_000),
    ] {
        assert_eq!(CellKey::pack(cx, cy).unpack(), (cx, cy));
    }
}

#[test]
fn test_cell_keys_distinct_for_large_coordinates() {
    // A 32-bit xor packing would fold these together.
    let a = CellKey::pack(65_536, 0);
    let b = CellKey::pack(0, 65_536);
    let c = CellKey::pack(1, 1);
    let d = CellKey::pack(-1, -1);
    assert_ne!(a, b);
    assert_ne!(c, d);
}

#[test]
fn test_invalid_cell_size() {
    assert!(SpatialGrid::new(0.0).is_err());
    assert!(SpatialGrid::new(-4.0).is_err());
    assert!(SpatialGrid::new(f64::NAN).is_err());
}

#[test]
fn test_cells_for_horizontal_segment() {
    let grid = SpatialGrid::new(4.0).unwrap();
    let mut cells = grid.cells_for_segment(c(0.0, 0.0), c(7.0, 0.0));
    cells.sort();
    let mut expected = vec![CellKey::pack(0, 0), CellKey::pack(1, 0)];
    expected.sort();
    assert_eq!(cells, expected);
}

#[test]
fn test_insert_registers_every_overlapped_cell() {
    let mut grid = SpatialGrid::new(4.0).unwrap();
    grid.insert(3, c(-1.0, -1.0), c(5.0, 1.0));

    for cx in -1..=1 {
        for cy in -1..=0 {
            assert_eq!(grid.cell(CellKey::pack(cx, cy)), &[3]);
        }
    }
    assert!(grid.cell(CellKey::pack(2, 0)).is_empty());
    assert_eq!(grid.cell_count(), 6);
}

#[test]
fn test_ray_cells_start_at_origin_and_stop_at_max_length() {
    let grid = SpatialGrid::new(1.0).unwrap();
    let cells = grid.cells_along_ray(c(0.5, 0.5), 0.0, 3.0);
    assert_eq!(
        cells,
        vec![
            CellKey::pack(0, 0),
            CellKey::pack(1, 0),
            CellKey::pack(2, 0),
            CellKey::pack(3, 0),
        ]
    );
}

#[test]
fn test_ray_cells_negative_direction() {
    let grid = SpatialGrid::new(1.0).unwrap();
    let cells = grid.cells_along_ray(c(0.5, 0.5), std::f64::consts::PI, 2.0);
    assert_eq!(
        cells,
        vec![CellKey::pack(0, 0), CellKey::pack(-1, 0), CellKey::pack(-2, 0)]
    );
}

#[test]
fn test_ray_cells_entry_distances_increase() {
    let grid = SpatialGrid::new(2.0).unwrap();
    let entries: Vec<f64> = grid
        .ray_cells(c(0.3, 0.7), 0.6, 50.0)
        .map(|(_, t)| t)
        .collect();
    assert_eq!(entries[0], 0.0);
    assert!(entries.windows(2).all(|w| w[0] <= w[1]));
    assert!(entries.iter().all(|&t| t <= 50.0));
}

#[test]
fn test_diagonal_ray_cells_are_connected() {
    let grid = SpatialGrid::new(1.0).unwrap();
    let cells = grid.cells_along_ray(c(0.2, 0.1), 0.9, 20.0);
    for w in cells.windows(2) {
        let (x0, y0) = w[0].unpack();
        let (x1, y1) = w[1].unpack();
        // Each step crosses exactly one boundary.
        assert_eq!((x1 - x0).abs() + (y1 - y0).abs(), 1);
    }
}

#[test]
fn test_degenerate_ray_yields_origin_cell_only() {
    let grid = SpatialGrid::new(1.0).unwrap();
    let cells = grid.cells_along_ray(c(2.5, -0.5), f64::NAN, 10.0);
    assert_eq!(cells, vec![CellKey::pack(2, -1)]);
}

#[test]
fn test_cells_for_rotated_box_cover_corners() {
    let grid = SpatialGrid::new(1.0).unwrap();
    let cells = grid.cells_for_box(c(0.0, 0.0), 2.0, 0.5, std::f64::consts::FRAC_PI_4);
    // The rotated box reaches about 1.77 in x and y.
    assert!(cells.contains(&CellKey::pack(1, 1)));
    assert!(cells.contains(&CellKey::pack(-2, -2)));
    assert!(!cells.contains(&CellKey::pack(2, 2)));
}

#[test]
fn test_unbounded_ray_cells_stop_at_coordinate_limit() {
    let grid = SpatialGrid::new(1.0).unwrap();
    let origin = c(f64::from(i32::MAX) - 1.5, 0.5);
    let cells: Vec<_> = grid
        .ray_cells(origin, 0.0, f64::INFINITY)
        .map(|(key, _)| key.unpack())
        .collect();
    assert_eq!(
        cells,
        vec![
            (i32::MAX - 2, 0),
            (i32::MAX - 1, 0),
            (i32::MAX, 0),
        ]
    );
}

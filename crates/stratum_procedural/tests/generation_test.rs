//! # Terrain Generation Tests
//!
//! Verifies that generated chunk groups tile seamlessly and that the
//! level sets feeding the mesher stay in range.

use stratum_core::{Axis, IVec3};
use stratum_procedural::{
    convert_chunks, NoiseThreshold, TerrainGenerator, WorldSeed, EMPTY_LEVEL,
};

/// Test: adjacent groups share their boundary layer.
#[test]
fn test_adjacent_groups_share_boundary() {
    let generator = TerrainGenerator::new(WorldSeed::new(42));
    let size = [9, 9, 9];

    let left = generator.generate(size, [1, 1, 1], IVec3::new(0, 0, 0));
    let right = generator.generate(size, [1, 1, 1], IVec3::new(1, 0, 0));

    let a = &left.chunks()[0];
    let b = &right.chunks()[0];
    assert_eq!(b.coords().x - a.coords().x, 8);

    let mut checked = 0;
    for z in 0..9 {
        for y in 0..9 {
            assert_eq!(a.get(8, y, z), b.get(0, y, z), "seam mismatch at y={y} z={z}");
            checked += 1;
        }
    }
    println!("Checked {checked} seam voxels");
}

/// Test: a group is a full lattice in grid order.
#[test]
fn test_group_lattice() {
    let generator = TerrainGenerator::new(WorldSeed::new(7));
    let grid = generator.generate([5, 5, 5], [2, 2, 2], IVec3::new(-1, -1, -1));

    assert_eq!(grid.len(), 8);
    assert_eq!(grid.chunks()[0].coords(), IVec3::new(-4, -4, -4));
    assert_eq!(grid.chunks()[7].coords(), IVec3::new(0, 0, 0));

    let origin = &grid.chunks()[0];
    assert_eq!(origin.neighbor(Axis::X, true), Some(1));
    assert_eq!(origin.neighbor(Axis::Y, true), Some(2));
    assert_eq!(origin.neighbor(Axis::Z, true), Some(4));
    assert_eq!(origin.neighbor(Axis::X, false), None);
}

/// Test: level sets stay within [-0.5, 0.5].
#[test]
fn test_level_sets_in_range() {
    let generator = TerrainGenerator::with_threshold(WorldSeed::new(99), NoiseThreshold::new(-0.8, 0.1));
    let voxels = generator.generate([12, 12, 12], [2, 1, 1], IVec3::new(3, -2, 5));
    let levels = convert_chunks(&voxels);

    for (src, dst) in voxels.chunks().iter().zip(levels.chunks()) {
        for (v, level) in src.data().iter().zip(dst.data()) {
            assert!((-0.5..=0.5).contains(level), "level {level} out of range");
            if v.is_empty() {
                assert_eq!(*level, EMPTY_LEVEL);
            }
        }
    }
}

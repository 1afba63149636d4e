//! Shared helpers for integration tests

#![allow(dead_code)]

use objmesh::{MeshGroup, Vector2, Vector3};
use std::path::PathBuf;

/// Path of a fixture under `test_files/`
pub fn test_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_files")
        .join(name)
}

/// Assert two position/normal arrays match within `epsilon`
pub fn assert_vec3_close(actual: &[Vector3], expected: &[Vector3], epsilon: f32) {
    assert_eq!(actual.len(), expected.len(), "array lengths differ");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(a.almost_eq(e, epsilon), "element {}: {:?} != {:?}", i, a, e);
    }
}

/// Assert two uv arrays match within `epsilon`
pub fn assert_vec2_close(actual: &[Vector2], expected: &[Vector2], epsilon: f32) {
    assert_eq!(actual.len(), expected.len(), "array lengths differ");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(a.almost_eq(e, epsilon), "element {}: {:?} != {:?}", i, a, e);
    }
}

/// Check the co-indexing invariant of a flattened group
pub fn assert_flattened(group: &MeshGroup) {
    assert!(group.is_flattened(), "group '{}' is not flattened", group.name);
    assert_eq!(group.positions.len(), group.normals.len());
    assert_eq!(group.positions.len(), group.uv_coords.len());
    assert_eq!(group.indices.len() % 3, 0);
    assert!(
        group
            .indices
            .iter()
            .all(|&i| (i as usize) < group.positions.len()),
        "group '{}' has an out-of-range index",
        group.name
    );
}

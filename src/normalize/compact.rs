//! Per-group attribute compaction for tuple-form groups
//!
//! The interchange format numbers attributes globally. Compaction copies the
//! attributes a group actually references into group-local arrays, numbering
//! them in first-reference order, and rewrites the corner tuples to match.

use std::collections::HashMap;

use crate::model::{Color3, MeshGroup, Triangle, Vector2, Vector3};

/// Group-local arrays and rewritten corner tuples
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CompactMesh {
    pub positions: Vec<Vector3>,
    pub normals: Vec<Vector3>,
    pub uv_coords: Vec<Vector2>,
    /// Empty, or one colour per position
    pub colors: Vec<Color3>,
    pub faces: Vec<Triangle>,
}

impl CompactMesh {
    /// Store the compacted data in a group, keeping it in tuple form
    ///
    /// `indices` is set to the position index of every corner.
    pub fn apply_to(self, group: &mut MeshGroup) {
        group.indices = self
            .faces
            .iter()
            .flat_map(|face| face.corners.iter().map(|c| c.position))
            .collect();
        group.positions = self.positions;
        group.normals = self.normals;
        group.uv_coords = self.uv_coords;
        group.colors = self.colors;
        group.faces = self.faces;
    }
}

/// First-reference renumbering for one attribute kind
#[derive(Default)]
struct Reindex {
    local: HashMap<u32, u32>,
    order: Vec<u32>,
}

impl Reindex {
    fn map(&mut self, global: u32) -> u32 {
        let next = self.order.len() as u32;
        *self.local.entry(global).or_insert_with(|| {
            self.order.push(global);
            next
        })
    }

    fn gather<T: Copy + Default>(&self, source: &[T]) -> Vec<T> {
        self.order
            .iter()
            .map(|&i| source.get(i as usize).copied().unwrap_or_default())
            .collect()
    }
}

/// Copy referenced attributes into local arrays and rewrite the faces
///
/// Vertex colours travel with their positions; an empty `colors` slice
/// stays empty.
pub(crate) fn compact_triangles(
    faces: &[Triangle],
    positions: &[Vector3],
    normals: &[Vector3],
    uv_coords: &[Vector2],
    colors: &[Color3],
) -> CompactMesh {
    let mut pos = Reindex::default();
    let mut uv = Reindex::default();
    let mut normal = Reindex::default();

    let faces: Vec<Triangle> = faces
        .iter()
        .map(|face| {
            let mut face = *face;
            for corner in &mut face.corners {
                corner.position = pos.map(corner.position);
                corner.uv = corner.uv.map(|i| uv.map(i));
                corner.normal = corner.normal.map(|i| normal.map(i));
            }
            face
        })
        .collect();

    CompactMesh {
        positions: pos.gather(positions),
        normals: normal.gather(normals),
        uv_coords: uv.gather(uv_coords),
        colors: if colors.is_empty() {
            Vec::new()
        } else {
            pos.gather(colors)
        },
        faces,
    }
}

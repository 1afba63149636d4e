//! Per-vertex attribute flattening
//!
//! Converts independently indexed (position, uv, normal) corner tuples into
//! co-indexed arrays where one index names all three attributes.

use std::collections::HashMap;

use crate::model::{Color3, MeshGroup, Triangle, Vector2, Vector3, VertexRef};

/// Co-indexed vertex arrays produced by flattening
///
/// `positions`, `normals` and `uv_coords` always have the same length;
/// `colors` is either empty or that length too. `sources[i]` records the
/// tuple that produced flat vertex `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FlatMesh {
    pub positions: Vec<Vector3>,
    pub normals: Vec<Vector3>,
    pub uv_coords: Vec<Vector2>,
    pub colors: Vec<Color3>,
    pub indices: Vec<u32>,
    pub sources: Vec<VertexRef>,
}

impl FlatMesh {
    /// View an already flattened group, one source tuple per vertex
    pub fn from_group(group: &MeshGroup) -> Self {
        let count = group.positions.len();
        let has_uvs = group.uv_coords.len() == count;
        let has_normals = group.normals.len() == count;
        let sources = (0..count as u32)
            .map(|i| VertexRef {
                position: i,
                uv: has_uvs.then_some(i),
                normal: has_normals.then_some(i),
            })
            .collect();
        Self {
            positions: group.positions.clone(),
            normals: group.normals.clone(),
            uv_coords: group.uv_coords.clone(),
            colors: group.colors.clone(),
            indices: group.indices.clone(),
            sources,
        }
    }

    /// Number of flat vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Replace a group's geometry with these arrays
    pub fn apply_to(self, group: &mut MeshGroup) {
        group.positions = self.positions;
        group.normals = self.normals;
        group.uv_coords = self.uv_coords;
        group.colors = self.colors;
        group.indices = self.indices;
        group.faces.clear();
    }
}

/// Deduplicate corner tuples into flat vertices
///
/// The first occurrence of a tuple defines its flat index, so the output is
/// deterministic for identical input. Missing or out-of-range attribute
/// references read as zero, which keeps all three arrays the same length.
pub(crate) fn flatten_triangles(
    faces: &[Triangle],
    positions: &[Vector3],
    normals: &[Vector3],
    uv_coords: &[Vector2],
    colors: &[Color3],
) -> FlatMesh {
    let mut lookup: HashMap<VertexRef, u32> = HashMap::with_capacity(faces.len() * 2);
    let mut sources: Vec<VertexRef> = Vec::with_capacity(faces.len() * 2);
    let mut indices = Vec::with_capacity(faces.len() * 3);

    for corner in faces.iter().flat_map(|face| face.corners.iter()) {
        let next = sources.len() as u32;
        let index = *lookup.entry(*corner).or_insert_with(|| {
            sources.push(*corner);
            next
        });
        indices.push(index);
    }

    let positions = sources
        .iter()
        .map(|s| positions.get(s.position as usize).copied().unwrap_or_default())
        .collect();
    let normals = sources
        .iter()
        .map(|s| {
            s.normal
                .and_then(|i| normals.get(i as usize))
                .copied()
                .unwrap_or_default()
        })
        .collect();
    let uv_coords = sources
        .iter()
        .map(|s| {
            s.uv.and_then(|i| uv_coords.get(i as usize))
                .copied()
                .unwrap_or_default()
        })
        .collect();
    let colors = if colors.is_empty() {
        Vec::new()
    } else {
        sources
            .iter()
            .map(|s| colors.get(s.position as usize).copied().unwrap_or_default())
            .collect()
    };

    FlatMesh {
        positions,
        normals,
        uv_coords,
        colors,
        indices,
        sources,
    }
}

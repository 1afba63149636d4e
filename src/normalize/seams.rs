//! UV shell relabelling for flattened meshes
//!
//! Flattening already gives every distinct (position, uv, normal) tuple its
//! own vertex, so a position on a UV seam is duplicated by construction. This
//! pass groups flat vertices into shells (connected through triangles, or
//! sharing a source position and uv) and renumbers them so every shell owns a
//! contiguous index range. Vertices are never merged and triangle order is
//! kept.

use std::collections::HashMap;

use super::flatten::FlatMesh;

/// Union-find over vertex indices
struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
        }
    }

    fn find(&mut self, mut v: u32) -> u32 {
        while self.parent[v as usize] != v {
            let grandparent = self.parent[self.parent[v as usize] as usize];
            self.parent[v as usize] = grandparent;
            v = grandparent;
        }
        v
    }

    /// Join two sets; the smaller root survives
    fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (keep, drop) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[drop as usize] = keep;
        }
    }
}

/// Relabel vertices so each UV shell is contiguous, returning the shell count
///
/// Shells are ordered by their lowest vertex index, and vertices keep their
/// relative order inside a shell.
pub(crate) fn split_uv_seams(mesh: &mut FlatMesh) -> usize {
    let count = mesh.vertex_count();
    if count == 0 {
        return 0;
    }

    let mut sets = DisjointSet::new(count);
    for tri in mesh.indices.chunks_exact(3) {
        sets.union(tri[0], tri[1]);
        sets.union(tri[0], tri[2]);
    }
    // hard-edged vertices differ only by normal and stay in one shell
    let mut by_source: HashMap<(u32, Option<u32>), u32> = HashMap::new();
    for (v, source) in mesh.sources.iter().enumerate() {
        let first = *by_source
            .entry((source.position, source.uv))
            .or_insert(v as u32);
        sets.union(first, v as u32);
    }

    let mut shell_of_root: HashMap<u32, usize> = HashMap::new();
    let shells: Vec<usize> = (0..count as u32)
        .map(|v| {
            let root = sets.find(v);
            let next = shell_of_root.len();
            *shell_of_root.entry(root).or_insert(next)
        })
        .collect();

    let mut order: Vec<u32> = (0..count as u32).collect();
    order.sort_by_key(|&v| shells[v as usize]);

    let mut remap = vec![0_u32; count];
    for (new_index, &old_index) in order.iter().enumerate() {
        remap[old_index as usize] = new_index as u32;
    }

    mesh.positions = order.iter().map(|&v| mesh.positions[v as usize]).collect();
    mesh.normals = order.iter().map(|&v| mesh.normals[v as usize]).collect();
    mesh.uv_coords = order.iter().map(|&v| mesh.uv_coords[v as usize]).collect();
    if !mesh.colors.is_empty() {
        mesh.colors = order.iter().map(|&v| mesh.colors[v as usize]).collect();
    }
    mesh.sources = order.iter().map(|&v| mesh.sources[v as usize]).collect();
    for index in &mut mesh.indices {
        *index = remap[*index as usize];
    }

    debug_assert!(
        order
            .windows(2)
            .all(|w| shells[w[0] as usize] <= shells[w[1] as usize]),
        "shell ranges must be contiguous"
    );
    shell_of_root.len()
}

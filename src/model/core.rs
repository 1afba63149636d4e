//! Core mesh types: vectors, face tuples, groups and documents

use std::fmt;
use std::sync::Arc;

use crate::normalize::{compact, flatten, seams};
use crate::parser::DEFAULT_GROUP_NAME;

use super::material::{Color3, Material};

/// Two-component float vector, used for texture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    /// U / X component
    pub x: f32,
    /// V / Y component
    pub y: f32,
}

impl Vector2 {
    /// All components zero
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new vector
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise comparison within `epsilon`
    pub fn almost_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

/// Three-component float vector, used for positions, normals and transforms
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vector3 {
    /// All components zero
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All components one
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a new vector
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise comparison within `epsilon`
    pub fn almost_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl std::ops::Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// One corner of a triangle in tuple form
///
/// Each field indexes the owning group's attribute array of the same kind.
/// `uv` and `normal` are absent when the source face did not reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexRef {
    /// Index into `positions`
    pub position: u32,
    /// Index into `uv_coords`
    pub uv: Option<u32>,
    /// Index into `normals`
    pub normal: Option<u32>,
}

impl VertexRef {
    /// Create a corner referencing only a position
    pub const fn new(position: u32) -> Self {
        Self {
            position,
            uv: None,
            normal: None,
        }
    }

    /// Create a corner referencing position, uv and normal
    pub const fn full(position: u32, uv: u32, normal: u32) -> Self {
        Self {
            position,
            uv: Some(uv),
            normal: Some(normal),
        }
    }
}

/// Triangle made of three tuple-form corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Corners in winding order
    pub corners: [VertexRef; 3],
}

impl Triangle {
    /// Create a triangle from three corners
    pub const fn new(a: VertexRef, b: VertexRef, c: VertexRef) -> Self {
        Self {
            corners: [a, b, c],
        }
    }
}

/// Interleaved vertex layout used by most game engines
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BasicVertex {
    /// Vertex position
    pub pos: Vector3,
    /// Texture coordinate
    pub uv: Vector2,
    /// Vertex normal
    pub normal: Vector3,
}

/// Summary statistics for one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    /// Group id
    pub group_id: usize,
    /// Group name
    pub name: String,
    /// Number of positions
    pub positions: usize,
    /// Number of normals
    pub normals: usize,
    /// Number of texture coordinates
    pub uvs: usize,
    /// Number of triangles
    pub triangles: usize,
    /// Anchor offset of the group
    pub offset: Vector3,
}

impl fmt::Display for GroupStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {:<28}", self.name)?;
        write!(f, "  {:5} verts  {:5} tris", self.positions, self.triangles)?;
        if self.uvs > 0 {
            write!(f, "  {:5} uvs", self.uvs)?;
        }
        if self.normals > 0 {
            write!(f, "  {:5} normals", self.normals)?;
        }
        if self.offset != Vector3::ZERO {
            write!(
                f,
                "  offset:({}, {}, {})",
                self.offset.x, self.offset.y, self.offset.z
            )?;
        }
        Ok(())
    }
}

/// A named sub-mesh with a single material and transform metadata
///
/// Once flattened, `positions`, `normals` and `uv_coords` have equal length and
/// `indices` names triangles directly in that shared index space. `colors` is
/// either empty or holds one colour per position, black meaning uncoloured. A group that
/// was loaded without flattening keeps its face tuples (see [`MeshGroup::faces`]);
/// `indices` then references `positions` only.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGroup {
    /// Dense zero-based id, equal to the group's position in its document
    pub group_id: usize,
    /// Name, unique within the document
    pub name: String,
    /// Shared material, if any
    pub material: Option<Arc<Material>>,
    /// Vertex positions
    pub positions: Vec<Vector3>,
    /// Vertex normals
    pub normals: Vec<Vector3>,
    /// Texture coordinates
    pub uv_coords: Vec<Vector2>,
    /// Per-position vertex colours
    pub colors: Vec<Color3>,
    /// Triangle list, three entries per triangle
    pub indices: Vec<u32>,
    /// Anchor offset
    pub offset: Vector3,
    /// Euler XYZ rotation in degrees
    pub rotation: Vector3,
    /// Scale
    pub scale: Vector3,
    pub(crate) faces: Vec<Triangle>,
}

impl MeshGroup {
    /// Create an empty group with identity transform
    pub fn new(group_id: usize, name: impl Into<String>) -> Self {
        Self {
            group_id,
            name: name.into(),
            material: None,
            positions: Vec::new(),
            normals: Vec::new(),
            uv_coords: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
            offset: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
            faces: Vec::new(),
        }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if the group has no triangles
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// True if attributes are co-indexed with positions
    pub fn is_flattened(&self) -> bool {
        self.faces.is_empty()
    }

    /// Face tuples of a group that was loaded without flattening
    ///
    /// Empty for flattened groups.
    pub fn faces(&self) -> &[Triangle] {
        &self.faces
    }

    /// True if offset, rotation and scale are all identity
    pub fn has_identity_transform(&self) -> bool {
        self.offset == Vector3::ZERO && self.rotation == Vector3::ZERO && self.scale == Vector3::ONE
    }

    /// Assign a new material to this group and return a shared handle to it
    pub fn set_material(&mut self, material: Material) -> Arc<Material> {
        let material = Arc::new(material);
        self.material = Some(Arc::clone(&material));
        material
    }

    /// Faces in tuple form, synthesized from `indices` for flattened groups
    pub fn tuple_faces(&self) -> Vec<Triangle> {
        if !self.faces.is_empty() {
            return self.faces.clone();
        }
        let has_uvs = self.uv_coords.len() == self.positions.len();
        let has_normals = self.normals.len() == self.positions.len();
        self.indices
            .chunks_exact(3)
            .map(|tri| {
                let corner = |i: u32| VertexRef {
                    position: i,
                    uv: has_uvs.then_some(i),
                    normal: has_normals.then_some(i),
                };
                Triangle::new(corner(tri[0]), corner(tri[1]), corner(tri[2]))
            })
            .collect()
    }

    /// Convert tuple-form faces into co-indexed vertex arrays
    ///
    /// Identical (position, uv, normal) tuples share one vertex; the first
    /// occurrence defines its index. Does nothing on flattened groups.
    pub fn flatten(&mut self) {
        if self.is_flattened() {
            return;
        }
        let flat = flatten::flatten_triangles(
            &self.faces,
            &self.positions,
            &self.normals,
            &self.uv_coords,
            &self.colors,
        );
        flat.apply_to(self);
    }

    /// Flatten, then relabel vertices so every UV shell is contiguous
    pub fn optimized_flatten(&mut self) {
        let mut flat = flatten::flatten_triangles(
            &self.tuple_faces(),
            &self.positions,
            &self.normals,
            &self.uv_coords,
            &self.colors,
        );
        seams::split_uv_seams(&mut flat);
        flat.apply_to(self);
    }

    /// True if any position carries a vertex colour
    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    /// Flip face winding between clockwise and counter-clockwise
    pub fn invert_face_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        for face in &mut self.faces {
            face.corners.swap(1, 2);
        }
    }

    /// Point every normal the opposite way
    pub fn invert_normals(&mut self) {
        for n in &mut self.normals {
            *n = Vector3::new(-n.x, -n.y, -n.z);
        }
    }

    /// Interleaved vertices plus a triangle index list
    ///
    /// Vertices are shared wherever position, uv and normal all match.
    pub fn game_vertices(&self) -> (Vec<BasicVertex>, Vec<u32>) {
        let flat = if self.is_flattened() {
            flatten::FlatMesh::from_group(self)
        } else {
            flatten::flatten_triangles(
                &self.faces,
                &self.positions,
                &self.normals,
                &self.uv_coords,
                &[],
            )
        };
        let vertices = (0..flat.positions.len())
            .map(|i| BasicVertex {
                pos: flat.positions[i],
                uv: flat.uv_coords.get(i).copied().unwrap_or_default(),
                normal: flat.normals.get(i).copied().unwrap_or_default(),
            })
            .collect();
        (vertices, flat.indices)
    }

    /// Append another group's geometry, offsetting its positions
    ///
    /// The result stays flattened only if both groups were flattened. If
    /// either group has vertex colours, positions of the other read as black.
    pub fn append_group_data(&mut self, other: &MeshGroup, offset: Vector3) {
        let keep_flat = self.is_flattened() && other.is_flattened();
        let mut faces = self.tuple_faces();

        let base_pos = self.positions.len() as u32;
        let base_uv = self.uv_coords.len() as u32;
        let base_normal = self.normals.len() as u32;
        faces.extend(other.tuple_faces().into_iter().map(|mut face| {
            for corner in &mut face.corners {
                corner.position += base_pos;
                corner.uv = corner.uv.map(|i| i + base_uv);
                corner.normal = corner.normal.map(|i| i + base_normal);
            }
            face
        }));

        if self.has_colors() || other.has_colors() {
            self.colors.resize(self.positions.len(), Color3::BLACK);
            self.colors.extend_from_slice(&other.colors);
            self.colors
                .resize(self.positions.len() + other.positions.len(), Color3::BLACK);
        }
        self.positions
            .extend(other.positions.iter().map(|p| *p + offset));
        self.uv_coords.extend_from_slice(&other.uv_coords);
        self.normals.extend_from_slice(&other.normals);
        if self.material.is_none() {
            self.material = other.material.clone();
        }

        let compacted = compact::compact_triangles(
            &faces,
            &self.positions,
            &self.normals,
            &self.uv_coords,
            &self.colors,
        );
        compacted.apply_to(self);
        if keep_flat {
            self.flatten();
        }
    }

    /// Summary statistics
    pub fn stats(&self) -> GroupStats {
        GroupStats {
            group_id: self.group_id,
            name: self.name.clone(),
            positions: self.positions.len(),
            normals: self.normals.len(),
            uvs: self.uv_coords.len(),
            triangles: self.triangle_count(),
            offset: self.offset,
        }
    }
}

/// Root aggregate: a named, ordered collection of groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDocument {
    /// Document name (from `o`, the file stem, or `new`)
    pub name: String,
    pub(crate) groups: Vec<MeshGroup>,
}

impl MeshDocument {
    /// Create an empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    pub(crate) fn from_groups(name: String, groups: Vec<MeshGroup>) -> Self {
        Self { name, groups }
    }

    /// All groups in order
    pub fn groups(&self) -> &[MeshGroup] {
        &self.groups
    }

    /// Mutable access to all groups
    pub fn groups_mut(&mut self) -> &mut [MeshGroup] {
        &mut self.groups
    }

    /// Number of groups
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Group by id, `None` when out of range
    pub fn group(&self, group_id: usize) -> Option<&MeshGroup> {
        self.groups.get(group_id)
    }

    /// Mutable group by id, `None` when out of range
    pub fn group_mut(&mut self, group_id: usize) -> Option<&mut MeshGroup> {
        self.groups.get_mut(group_id)
    }

    /// Group by exact name
    pub fn find_group(&self, name: &str) -> Option<&MeshGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Append a new empty group and return it for population
    ///
    /// An empty name becomes `default`, the name the reader gives unnamed
    /// groups. A name already used in this document gets a `_<n>` suffix.
    pub fn new_group(&mut self, name: impl Into<String>) -> &mut MeshGroup {
        let mut name = name.into();
        if name.is_empty() {
            name = DEFAULT_GROUP_NAME.to_string();
        }
        let name = self.unique_group_name(name);
        let id = self.groups.len();
        self.groups.push(MeshGroup::new(id, name));
        &mut self.groups[id]
    }

    fn unique_group_name(&self, name: String) -> String {
        if self.find_group(&name).is_none() {
            return name;
        }
        let mut n = self.groups.len();
        loop {
            let candidate = format!("{}_{}", name, n);
            if self.find_group(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Material used by any group, matched by name (case-insensitive fallback)
    pub fn find_material(&self, name: &str) -> Option<Arc<Material>> {
        let materials = self.materials();
        materials
            .iter()
            .find(|m| m.name == name)
            .or_else(|| materials.iter().find(|m| m.name.eq_ignore_ascii_case(name)))
            .cloned()
    }

    /// Distinct materials in first-reference order
    pub fn materials(&self) -> Vec<Arc<Material>> {
        let mut distinct: Vec<Arc<Material>> = Vec::new();
        for mat in self.groups.iter().filter_map(|g| g.material.as_ref()) {
            if !distinct.iter().any(|m| Arc::ptr_eq(m, mat)) {
                distinct.push(Arc::clone(mat));
            }
        }
        distinct
    }

    /// True if at least one group has a material
    pub fn has_any_materials(&self) -> bool {
        self.groups.iter().any(|g| g.material.is_some())
    }

    /// Total triangles across groups
    pub fn total_triangles(&self) -> usize {
        self.groups.iter().map(MeshGroup::triangle_count).sum()
    }

    /// Total positions across groups
    pub fn total_positions(&self) -> usize {
        self.groups.iter().map(|g| g.positions.len()).sum()
    }

    /// Per-group statistics in group order
    pub fn group_stats(&self) -> Vec<GroupStats> {
        self.groups.iter().map(MeshGroup::stats).collect()
    }

    /// Collapse all groups into the first one
    pub fn merge_groups(&mut self) {
        if self.groups.len() <= 1 {
            return;
        }
        let rest: Vec<MeshGroup> = self.groups.drain(1..).collect();
        let merged = &mut self.groups[0];
        for group in &rest {
            merged.append_group_data(group, Vector3::ZERO);
        }
    }

    /// Copy another document's groups into this one
    ///
    /// Names that collide with existing groups are made unique and every
    /// copied position is shifted by `offset`.
    pub fn append_document(&mut self, other: &MeshDocument, offset: Vector3) {
        for group in &other.groups {
            let mut copy = group.clone();
            copy.name = self.unique_group_name(copy.name);
            copy.group_id = self.groups.len();
            if offset != Vector3::ZERO {
                for p in &mut copy.positions {
                    *p = *p + offset;
                }
            }
            self.groups.push(copy);
        }
    }

    /// Flatten every group and relabel UV shells contiguously
    pub fn optimized_flatten(&mut self) {
        for group in &mut self.groups {
            group.optimized_flatten();
        }
    }

    /// Clone with private copies of every material instead of shared handles
    pub fn deep_clone(&self) -> Self {
        let mut copy = self.clone();
        let originals = self.materials();
        let copies: Vec<Arc<Material>> = originals
            .iter()
            .map(|m| Arc::new(Material::clone(m)))
            .collect();
        for group in &mut copy.groups {
            if let Some(mat) = &group.material {
                if let Some(pos) = originals.iter().position(|m| Arc::ptr_eq(m, mat)) {
                    group.material = Some(Arc::clone(&copies[pos]));
                }
            }
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_group() -> MeshGroup {
        let mut group = MeshGroup::new(0, "quad");
        group.positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        group.indices = vec![0, 1, 2, 0, 2, 3];
        group
    }

    #[test]
    fn test_new_group_has_identity_transform() {
        let group = MeshGroup::new(3, "anchor");
        assert_eq!(group.group_id, 3);
        assert!(group.is_empty());
        assert!(group.has_identity_transform());
        assert_eq!(group.scale, Vector3::ONE);
    }

    #[test]
    fn test_new_group_names_are_unique() {
        let mut doc = MeshDocument::new("doc");
        doc.new_group("body");
        let second = doc.new_group("body");
        assert_eq!(second.group_id, 1);
        assert_eq!(second.name, "body_1");
        assert!(doc.find_group("body").is_some());
        assert!(doc.find_group("body_1").is_some());
    }

    #[test]
    fn test_new_group_with_empty_name() {
        let mut doc = MeshDocument::new("doc");
        assert_eq!(doc.new_group("").name, DEFAULT_GROUP_NAME);
        assert_eq!(doc.new_group("").name, "default_1");
    }

    #[test]
    fn test_group_lookup_out_of_range() {
        let mut doc = MeshDocument::new("doc");
        doc.new_group("a");
        assert!(doc.group(0).is_some());
        assert!(doc.group(1).is_none());
    }

    #[test]
    fn test_invert_face_winding() {
        let mut group = quad_group();
        group.invert_face_winding();
        assert_eq!(group.indices, vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn test_invert_normals() {
        let mut group = quad_group();
        group.normals = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, -1.0, 0.0)];
        group.invert_normals();
        assert_eq!(
            group.normals,
            vec![Vector3::new(0.0, 0.0, -1.0), Vector3::new(0.0, 1.0, 0.0)]
        );
        // winding is untouched
        assert_eq!(group.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_tuple_faces_from_flattened_group() {
        let mut group = quad_group();
        group.normals = vec![Vector3::new(0.0, 0.0, 1.0); 4];
        let faces = group.tuple_faces();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[1].corners[2].position, 3);
        assert_eq!(faces[1].corners[2].normal, Some(3));
        assert_eq!(faces[1].corners[2].uv, None);
    }

    #[test]
    fn test_game_vertices_fill_missing_attributes() {
        let group = quad_group();
        let (vertices, indices) = group.game_vertices();
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(vertices[2].pos, Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(vertices[2].uv, Vector2::ZERO);
    }

    #[test]
    fn test_merge_groups_offsets_indices() {
        let mut doc = MeshDocument::new("doc");
        let mut a = quad_group();
        a.name = "a".into();
        *doc.new_group("a") = a;
        let b = doc.new_group("b");
        let mut quad = quad_group();
        quad.group_id = 1;
        quad.name = "b".into();
        *b = quad;

        doc.merge_groups();
        assert_eq!(doc.num_groups(), 1);
        let merged = &doc.groups()[0];
        assert_eq!(merged.name, "a");
        assert_eq!(merged.triangle_count(), 4);
        assert_eq!(merged.positions.len(), 8);
        assert!(merged.is_flattened());
        assert!(merged.indices.iter().all(|&i| (i as usize) < merged.positions.len()));
    }

    #[test]
    fn test_merge_pads_missing_colors_with_black() {
        let red = Color3::new(1.0, 0.0, 0.0);
        let mut painted = quad_group();
        painted.colors = vec![red; 4];
        let mut doc = MeshDocument::new("doc");
        *doc.new_group("plain") = quad_group();
        doc.groups.push(MeshGroup {
            group_id: 1,
            name: "painted".into(),
            ..painted
        });

        doc.merge_groups();
        let merged = &doc.groups()[0];
        assert_eq!(merged.colors.len(), merged.positions.len());
        assert_eq!(&merged.colors[..4], &[Color3::BLACK; 4]);
        assert_eq!(&merged.colors[4..], &[red; 4]);
    }

    #[test]
    fn test_append_document_renames_and_offsets() {
        let mut doc = MeshDocument::new("a");
        *doc.new_group("quad") = quad_group();
        let other = doc.clone();

        doc.append_document(&other, Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(doc.num_groups(), 2);
        let copy = &doc.groups()[1];
        assert_eq!(copy.group_id, 1);
        assert_ne!(copy.name, "quad");
        assert_eq!(copy.positions[0], Vector3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_materials_are_distinct_and_deep_clone_detaches() {
        let mut doc = MeshDocument::new("doc");
        let shared = doc.new_group("a").set_material(Material::new("steel"));
        doc.new_group("b").material = Some(Arc::clone(&shared));
        doc.new_group("c");

        assert!(doc.has_any_materials());
        assert_eq!(doc.materials().len(), 1);
        assert!(doc.find_material("STEEL").is_some());

        let copy = doc.deep_clone();
        let a = copy.groups()[0].material.as_ref().unwrap();
        let b = copy.groups()[1].material.as_ref().unwrap();
        assert!(Arc::ptr_eq(a, b));
        assert!(!Arc::ptr_eq(a, &shared));
    }

    #[test]
    fn test_stats_display() {
        let mut group = quad_group();
        group.offset = Vector3::new(1.0, 2.0, 3.0);
        let text = group.stats().to_string();
        assert!(text.contains("quad"));
        assert!(text.contains("4 verts"));
        assert!(text.contains("2 tris"));
        assert!(text.contains("offset:(1, 2, 3)"));
    }
}

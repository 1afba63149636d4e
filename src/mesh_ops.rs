//! Geometry helpers for mesh groups using parry3d and nalgebra
//!
//! This module provides:
//! - Group transform matrices built from offset, rotation and scale
//! - Bounding box calculation
//! - Face normals, smooth vertex normals and signed volume
//! - Ray picking of the closest triangle in a document

use crate::model::{MeshDocument, MeshGroup, Vector3};
use nalgebra::{Matrix4, Point3, Rotation3};
use parry3d::bounding_volume::{Aabb, BoundingVolume};
use parry3d::query::{Ray, RayCast};
use parry3d::shape::{FeatureId, Shape, TriMesh as ParryTriMesh};

/// An axis-aligned bounding box represented as (min_point, max_point)
pub type BoundingBox = (Vector3, Vector3);

fn to_na(v: Vector3) -> nalgebra::Vector3<f32> {
    nalgebra::Vector3::new(v.x, v.y, v.z)
}

fn from_na(v: nalgebra::Vector3<f32>) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

/// Local transform of a group: translation * Rz * Ry * Rx * scale
///
/// Rotation is Euler XYZ in degrees, so X is applied first.
///
/// # Example
/// ```
/// use objmesh::{MeshGroup, Vector3, mesh_ops::{group_transform_matrix, transform_point}};
///
/// let mut anchor = MeshGroup::new(0, "Anchor");
/// anchor.offset = Vector3::new(1.0, 0.0, 0.0);
/// anchor.scale = Vector3::new(2.0, 2.0, 2.0);
///
/// let m = group_transform_matrix(&anchor);
/// let p = transform_point(&m, Vector3::new(1.0, 1.0, 1.0));
/// assert!(p.almost_eq(&Vector3::new(3.0, 2.0, 2.0), 1e-6));
/// ```
pub fn group_transform_matrix(group: &MeshGroup) -> Matrix4<f32> {
    let r = group.rotation;
    let rotation = Rotation3::from_euler_angles(r.x.to_radians(), r.y.to_radians(), r.z.to_radians());
    let scale = Matrix4::new_nonuniform_scaling(&to_na(group.scale));
    let translation = Matrix4::new_translation(&to_na(group.offset));
    translation * rotation.to_homogeneous() * scale
}

/// Apply an affine transform to a point
pub fn transform_point(matrix: &Matrix4<f32>, point: Vector3) -> Vector3 {
    let p = matrix.transform_point(&to_point(point));
    Vector3::new(p.x, p.y, p.z)
}

fn to_point(v: Vector3) -> Point3<f32> {
    Point3::new(v.x, v.y, v.z)
}

fn from_aabb(aabb: &Aabb) -> BoundingBox {
    (
        Vector3::new(aabb.mins.x, aabb.mins.y, aabb.mins.z),
        Vector3::new(aabb.maxs.x, aabb.maxs.y, aabb.maxs.z),
    )
}

/// A group's triangles as a parry3d mesh
///
/// Triangles with out-of-range indices are left out; `triangles[i]` is the
/// group triangle behind mesh triangle `i`. `None` without valid triangles,
/// since parry3d needs at least one.
struct GroupTriMesh {
    mesh: ParryTriMesh,
    triangles: Vec<usize>,
}

impl GroupTriMesh {
    fn new(group: &MeshGroup, vertices: Vec<Point3<f32>>) -> Option<Self> {
        let count = vertices.len() as u32;
        let (triangles, indices): (Vec<usize>, Vec<[u32; 3]>) = group
            .indices
            .chunks_exact(3)
            .enumerate()
            .filter(|(_, tri)| tri.iter().all(|&i| i < count))
            .map(|(t, tri)| (t, [tri[0], tri[1], tri[2]]))
            .unzip();
        if indices.is_empty() {
            return None;
        }

        let mesh = ParryTriMesh::new(vertices, indices);
        Some(Self { mesh, triangles })
    }
}

/// Bounding box of a group's triangles, or of every position when the group
/// has none; `None` for a group without positions
fn group_aabb(group: &MeshGroup, vertices: Vec<Point3<f32>>) -> Option<BoundingBox> {
    if vertices.is_empty() {
        return None;
    }
    if !group.is_empty() {
        if let Some(trimesh) = GroupTriMesh::new(group, vertices.clone()) {
            return Some(from_aabb(&trimesh.mesh.local_aabb()));
        }
    }
    Some(from_aabb(&Aabb::from_points(&vertices)))
}

/// Bounding box of a group, `None` for a group without positions
///
/// Only positions referenced by triangles count, unless the group has no
/// valid triangles at all (an anchor or a point set).
pub fn compute_group_aabb(group: &MeshGroup) -> Option<BoundingBox> {
    let vertices = group.positions.iter().copied().map(to_point).collect();
    group_aabb(group, vertices)
}

/// Bounding box of a group after its transform is applied
pub fn compute_transformed_group_aabb(group: &MeshGroup) -> Option<BoundingBox> {
    let matrix = group_transform_matrix(group);
    let vertices = group
        .positions
        .iter()
        .map(|p| matrix.transform_point(&to_point(*p)))
        .collect();
    group_aabb(group, vertices)
}

/// Bounding box enclosing the boxes of every group in a document
pub fn compute_document_aabb(doc: &MeshDocument) -> Option<BoundingBox> {
    doc.groups()
        .iter()
        .filter_map(compute_group_aabb)
        .map(|(min, max)| Aabb::new(to_point(min), to_point(max)))
        .reduce(|a, b| a.merged(&b))
        .map(|aabb| from_aabb(&aabb))
}

/// Calculate the unit normal of a triangle
///
/// Counter-clockwise winding gives a right-handed normal; a degenerate
/// triangle gives the zero vector.
///
/// # Example
/// ```
/// use objmesh::{Vector3, mesh_ops::calculate_face_normal};
///
/// let n = calculate_face_normal(
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(0.0, 1.0, 0.0),
/// );
/// assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));
/// ```
pub fn calculate_face_normal(v0: Vector3, v1: Vector3, v2: Vector3) -> Vector3 {
    let cross = (to_na(v1) - to_na(v0)).cross(&(to_na(v2) - to_na(v0)));
    match cross.try_normalize(0.0) {
        Some(n) => from_na(n),
        None => Vector3::ZERO,
    }
}

fn triangle_positions(group: &MeshGroup, tri: &[u32]) -> Option<[Vector3; 3]> {
    let get = |i: u32| group.positions.get(i as usize).copied();
    Some([get(tri[0])?, get(tri[1])?, get(tri[2])?])
}

/// Face normal of every triangle in a group, zero for invalid triangles
pub fn calculate_face_normals(group: &MeshGroup) -> Vec<Vector3> {
    group
        .indices
        .chunks_exact(3)
        .map(|tri| match triangle_positions(group, tri) {
            Some([a, b, c]) => calculate_face_normal(a, b, c),
            None => Vector3::ZERO,
        })
        .collect()
}

/// Calculate smooth vertex normals for a group
///
/// Every triangle adds its area-weighted face normal to its three corners,
/// then the sums are normalized. The result has one normal per position;
/// positions touched only by degenerate triangles get the zero vector.
/// Flattened groups are smoothed per flat vertex, so vertices split along a
/// UV seam keep separate normals.
///
/// # Example
/// ```
/// use objmesh::{MeshGroup, Vector3, mesh_ops::calculate_vertex_normals};
///
/// let mut group = MeshGroup::new(0, "tri");
/// group.positions = vec![
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(0.0, 1.0, 0.0),
/// ];
/// group.indices = vec![0, 1, 2];
///
/// let normals = calculate_vertex_normals(&group);
/// assert!(normals.iter().all(|n| n.almost_eq(&Vector3::new(0.0, 0.0, 1.0), 1e-6)));
/// ```
pub fn calculate_vertex_normals(group: &MeshGroup) -> Vec<Vector3> {
    let mut sums = vec![nalgebra::Vector3::<f32>::zeros(); group.positions.len()];
    for tri in group.indices.chunks_exact(3) {
        let Some([a, b, c]) = triangle_positions(group, tri) else {
            continue;
        };
        // the cross product's length is twice the triangle area
        let weighted = (to_na(b) - to_na(a)).cross(&(to_na(c) - to_na(a)));
        for &i in tri {
            sums[i as usize] += weighted;
        }
    }
    sums.into_iter()
        .map(|n| n.try_normalize(0.0).map_or(Vector3::ZERO, from_na))
        .collect()
}

/// Replace a group's normals with smooth vertex normals
///
/// A tuple-form group stays in tuple form: every corner is pointed at the
/// normal of its own position.
pub fn recalculate_normals(group: &mut MeshGroup) {
    let normals = calculate_vertex_normals(group);
    for face in &mut group.faces {
        for corner in &mut face.corners {
            corner.normal = Some(corner.position);
        }
    }
    group.normals = normals;
}

/// Signed volume of a group using the divergence theorem
///
/// Positive for a closed mesh with outward facing, counter-clockwise
/// triangles. Triangles with out-of-range indices are skipped.
pub fn compute_signed_volume(group: &MeshGroup) -> f32 {
    let volume: f32 = group
        .indices
        .chunks_exact(3)
        .filter_map(|tri| triangle_positions(group, tri))
        .map(|[a, b, c]| to_na(a).dot(&to_na(b).cross(&to_na(c))))
        .sum();
    volume / 6.0
}

/// Closest triangle hit by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickedTriangle {
    /// Group containing the triangle
    pub group_id: usize,
    /// Triangle index within the group
    pub triangle: usize,
    /// Distance along the ray, in units of `direction`
    pub distance: f32,
    /// Hit point
    pub point: Vector3,
}

/// Find the closest triangle hit by a ray across all groups
///
/// Both faces of a triangle count as hits. Positions are used as stored;
/// group transforms are not applied.
pub fn pick_triangle(
    doc: &MeshDocument,
    origin: Vector3,
    direction: Vector3,
) -> Option<PickedTriangle> {
    let ray = Ray::new(to_point(origin), to_na(direction));
    let mut best: Option<PickedTriangle> = None;
    for group in doc.groups() {
        let vertices = group.positions.iter().copied().map(to_point).collect();
        let Some(trimesh) = GroupTriMesh::new(group, vertices) else {
            continue;
        };
        let Some(hit) = trimesh
            .mesh
            .cast_local_ray_and_get_normal(&ray, f32::MAX, false)
        else {
            continue;
        };
        let FeatureId::Face(face) = hit.feature else {
            continue;
        };
        // back faces are numbered after the front faces
        let face = face as usize % trimesh.triangles.len();
        let distance = hit.time_of_impact;
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(PickedTriangle {
                group_id: group.group_id,
                triangle: trimesh.triangles[face],
                distance,
                point: from_na(ray.point_at(distance).coords),
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Triangle, VertexRef};

    fn unit_cube() -> MeshGroup {
        let mut group = MeshGroup::new(0, "cube");
        group.positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 1.0, 1.0),
        ];
        group.indices = vec![
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            3, 7, 6, 3, 6, 2, // back
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        group
    }

    #[test]
    fn test_signed_volume_of_cube() {
        let mut cube = unit_cube();
        assert!((compute_signed_volume(&cube) - 1.0).abs() < 1e-6);
        cube.invert_face_winding();
        assert!((compute_signed_volume(&cube) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_group_aabb() {
        let mut group = MeshGroup::new(0, "g");
        assert!(compute_group_aabb(&group).is_none());
        group.positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, 5.0, 3.0),
            Vector3::new(-2.0, 8.0, 1.0),
        ];
        let (min, max) = compute_group_aabb(&group).unwrap();
        assert_eq!(min, Vector3::new(-2.0, 0.0, 0.0));
        assert_eq!(max, Vector3::new(10.0, 8.0, 3.0));
    }

    #[test]
    fn test_transformed_aabb_uses_rotation() {
        let mut group = MeshGroup::new(0, "g");
        group.positions = vec![Vector3::new(1.0, 0.0, 0.0)];
        group.rotation = Vector3::new(0.0, 0.0, 90.0);
        group.offset = Vector3::new(0.0, 0.0, 5.0);
        let (min, _) = compute_transformed_group_aabb(&group).unwrap();
        assert!(min.almost_eq(&Vector3::new(0.0, 1.0, 5.0), 1e-6));
    }

    #[test]
    fn test_document_aabb() {
        let mut doc = MeshDocument::new("d");
        doc.new_group("a").positions = vec![Vector3::new(-1.0, 0.0, 0.0)];
        doc.new_group("b").positions = vec![Vector3::new(0.0, 4.0, 2.0)];
        let (min, max) = compute_document_aabb(&doc).unwrap();
        assert_eq!(min, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(max, Vector3::new(0.0, 4.0, 2.0));
    }

    #[test]
    fn test_face_normals() {
        let normals = calculate_face_normals(&unit_cube());
        assert_eq!(normals.len(), 12);
        assert!(normals[0].almost_eq(&Vector3::new(0.0, 0.0, -1.0), 1e-6));
        assert!(normals[2].almost_eq(&Vector3::new(0.0, 0.0, 1.0), 1e-6));
        let degenerate = calculate_face_normal(Vector3::ZERO, Vector3::ONE, Vector3::ONE);
        assert_eq!(degenerate, Vector3::ZERO);
    }

    #[test]
    fn test_pick_closest_triangle() {
        let mut doc = MeshDocument::new("scene");
        *doc.new_group("cube") = unit_cube();
        let mut far = unit_cube();
        for p in &mut far.positions {
            p.z += 5.0;
        }
        far.group_id = 1;
        far.name = "far".into();
        doc.groups.push(far);

        let hit = pick_triangle(&doc, Vector3::new(0.25, 0.5, 10.0), Vector3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert_eq!(hit.group_id, 1);
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!(hit.point.almost_eq(&Vector3::new(0.25, 0.5, 6.0), 1e-5));
        // top face of the far cube is triangles 2 and 3
        assert!(hit.triangle == 2 || hit.triangle == 3);

        let miss = pick_triangle(&doc, Vector3::new(5.0, 5.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(miss.is_none());
    }

    #[test]
    fn test_group_aabb_covers_triangles_only() {
        let mut cube = unit_cube();
        cube.positions.push(Vector3::new(50.0, 50.0, 50.0));
        let (min, max) = compute_group_aabb(&cube).unwrap();
        assert!(min.almost_eq(&Vector3::ZERO, 1e-6));
        assert!(max.almost_eq(&Vector3::ONE, 1e-6));
    }

    #[test]
    fn test_pick_from_inside_hits_back_face() {
        let mut doc = MeshDocument::new("scene");
        *doc.new_group("cube") = unit_cube();
        let hit = pick_triangle(&doc, Vector3::new(0.25, 0.5, 0.5), Vector3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert_eq!(hit.group_id, 0);
        assert!((hit.distance - 0.5).abs() < 1e-5);
        assert!(hit.triangle == 2 || hit.triangle == 3);
    }

    #[test]
    fn test_pick_skips_invalid_triangles() {
        let mut doc = MeshDocument::new("scene");
        let group = doc.new_group("quad");
        group.positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
        ];
        group.indices = vec![0, 1, 9, 0, 1, 2];
        let hit = pick_triangle(&doc, Vector3::new(0.75, 0.25, 1.0), Vector3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert_eq!(hit.triangle, 1);
        assert!(hit.point.almost_eq(&Vector3::new(0.75, 0.25, 0.0), 1e-5));
    }

    #[test]
    fn test_vertex_normals_of_cube_corners() {
        let normals = calculate_vertex_normals(&unit_cube());
        assert_eq!(normals.len(), 8);
        let d = 1.0 / 3.0_f32.sqrt();
        assert!(normals[0].almost_eq(&Vector3::new(-d, -d, -d), 1e-5));
        assert!(normals[6].almost_eq(&Vector3::new(d, d, d), 1e-5));
    }

    #[test]
    fn test_vertex_normals_ignore_degenerate_triangles() {
        let mut group = MeshGroup::new(0, "line");
        group.positions = vec![Vector3::ZERO, Vector3::ONE, Vector3::new(2.0, 2.0, 2.0)];
        group.indices = vec![0, 1, 2];
        assert_eq!(calculate_vertex_normals(&group), vec![Vector3::ZERO; 3]);
    }

    #[test]
    fn test_recalculate_normals_in_tuple_form() {
        let mut group = MeshGroup::new(0, "tri");
        group.positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        ];
        group.normals = vec![Vector3::new(0.0, 1.0, 0.0)];
        group.faces = vec![Triangle::new(
            VertexRef::new(0),
            VertexRef::new(1),
            VertexRef {
                position: 2,
                uv: None,
                normal: Some(0),
            },
        )];
        group.indices = vec![0, 1, 2];

        recalculate_normals(&mut group);
        assert!(!group.is_flattened());
        assert_eq!(group.normals.len(), 3);
        assert!(group.normals[1].almost_eq(&Vector3::new(0.0, 0.0, -1.0), 1e-6));
        for corner in &group.faces()[0].corners {
            assert_eq!(corner.normal, Some(corner.position));
        }

        group.invert_normals();
        assert!(group.normals[1].almost_eq(&Vector3::new(0.0, 0.0, 1.0), 1e-6));
    }
}

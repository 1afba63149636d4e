//! Mesh text writing

use std::io::{self, Write};

use crate::model::{MeshDocument, MeshGroup, Vector3, VertexRef};
use crate::parser::{DEFAULT_GROUP_NAME, NO_MATERIAL};

use super::material::LibraryNames;

/// Write a document as mesh text
///
/// Attribute blocks are written group by group, so face indices of a group
/// are offset by the attributes of all groups before it. Once the document
/// has materials, every group states its own, `usemtl (null)` for none.
pub(super) fn write_mesh<W: Write>(
    doc: &MeshDocument,
    library_name: Option<&str>,
    materials: &LibraryNames,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "# objmesh {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        writer,
        "# {} groups, {} triangles",
        doc.num_groups(),
        doc.total_triangles()
    )?;
    if let Some(library) = library_name {
        writeln!(writer, "mtllib {}", library)?;
    }
    if !doc.name.is_empty() {
        writeln!(writer, "o {}", doc.name)?;
    }

    let mut bases = Bases::default();
    for group in doc.groups() {
        write_group(group, &bases, materials, writer)?;
        bases.advance(group);
    }
    Ok(())
}

/// 1-based index of the first attribute of the next group
#[derive(Debug, Clone, Copy)]
struct Bases {
    position: u32,
    uv: u32,
    normal: u32,
}

impl Default for Bases {
    fn default() -> Self {
        Self {
            position: 1,
            uv: 1,
            normal: 1,
        }
    }
}

impl Bases {
    fn advance(&mut self, group: &MeshGroup) {
        self.position += group.positions.len() as u32;
        self.uv += group.uv_coords.len() as u32;
        self.normal += group.normals.len() as u32;
    }
}

fn write_group<W: Write>(
    group: &MeshGroup,
    bases: &Bases,
    materials: &LibraryNames,
    writer: &mut W,
) -> io::Result<()> {
    for (i, p) in group.positions.iter().enumerate() {
        match group.colors.get(i).filter(|c| !c.is_black()) {
            Some(c) => writeln!(writer, "v {} {} {} {} {} {}", p.x, p.y, p.z, c.r, c.g, c.b)?,
            None => writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?,
        }
    }
    for t in &group.uv_coords {
        writeln!(writer, "vt {} {}", t.x, t.y)?;
    }
    for n in &group.normals {
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }

    let name = if group.name.is_empty() {
        DEFAULT_GROUP_NAME
    } else {
        group.name.as_str()
    };
    writeln!(writer, "g {}", name)?;
    write_annotation(writer, "offset", group.offset, Vector3::ZERO)?;
    write_annotation(writer, "rotation", group.rotation, Vector3::ZERO)?;
    write_annotation(writer, "scale", group.scale, Vector3::ONE)?;
    match group.material.as_ref().and_then(|m| materials.name_of(m)) {
        Some(material) => writeln!(writer, "usemtl {}", material)?,
        None if !materials.is_empty() => writeln!(writer, "usemtl {}", NO_MATERIAL)?,
        None => {}
    }

    for face in group.tuple_faces() {
        write!(writer, "f")?;
        for corner in &face.corners {
            write!(writer, " ")?;
            write_corner(writer, corner, bases)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn write_annotation<W: Write>(
    writer: &mut W,
    keyword: &str,
    value: Vector3,
    identity: Vector3,
) -> io::Result<()> {
    if value == identity {
        return Ok(());
    }
    writeln!(writer, "#@{} {} {} {}", keyword, value.x, value.y, value.z)
}

/// `v`, `v/t`, `v//n` or `v/t/n`, whichever carries the corner's data
fn write_corner<W: Write>(writer: &mut W, corner: &VertexRef, bases: &Bases) -> io::Result<()> {
    let position = bases.position + corner.position;
    match (corner.uv, corner.normal) {
        (None, None) => write!(writer, "{}", position),
        (Some(t), None) => write!(writer, "{}/{}", position, bases.uv + t),
        (None, Some(n)) => write!(writer, "{}//{}", position, bases.normal + n),
        (Some(t), Some(n)) => write!(
            writer,
            "{}/{}/{}",
            position,
            bases.uv + t,
            bases.normal + n
        ),
    }
}

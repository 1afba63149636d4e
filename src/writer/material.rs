//! Material library writing

use std::io::{self, Write};
use std::sync::Arc;

use crate::model::{Color3, Material, MeshDocument, TextureSlot};

/// Names materials are written under, unique within one library
///
/// Distinct materials sharing a name get a `_<n>` suffix. Equal materials
/// behind different handles share one entry.
#[derive(Debug, Default)]
pub(super) struct LibraryNames {
    entries: Vec<(Arc<Material>, String)>,
}

impl LibraryNames {
    pub fn new(doc: &MeshDocument) -> Self {
        let mut names = Self::default();
        for material in doc.materials() {
            if names.name_of(&material).is_some() {
                continue;
            }
            let name = names.unique_name(&material.name);
            if name != material.name {
                log::warn!(
                    "two different materials are named '{}', writing one as '{}'",
                    material.name,
                    name
                );
            }
            names.entries.push((material, name));
        }
        names
    }

    fn unique_name(&self, base: &str) -> String {
        let taken = |name: &str| self.entries.iter().any(|(_, n)| n == name);
        if !taken(base) {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Written name of a material referenced by the document
    pub fn name_of(&self, material: &Arc<Material>) -> Option<&str> {
        self.entries
            .iter()
            .find(|(m, _)| Arc::ptr_eq(m, material) || **m == **material)
            .map(|(_, name)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write each material once, under its library name
pub(super) fn write_library<W: Write>(names: &LibraryNames, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "# objmesh {} material library", env!("CARGO_PKG_VERSION"))?;
    for (material, name) in &names.entries {
        writeln!(writer)?;
        write_material(material, name, writer)?;
    }
    Ok(())
}

fn write_material<W: Write>(material: &Material, name: &str, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "newmtl {}", name)?;
    write_color(writer, "Ka", material.ambient_color)?;
    write_color(writer, "Kd", material.diffuse_color)?;
    write_color(writer, "Ks", material.specular_color)?;
    if !material.emissive_color.is_black() {
        write_color(writer, "Ke", material.emissive_color)?;
    }
    writeln!(writer, "Ns {}", material.specular_exponent)?;
    writeln!(writer, "d {}", material.alpha)?;
    for slot in TextureSlot::ALL {
        if let Some(path) = material.texture(slot) {
            writeln!(writer, "{} {}", slot.keyword(), path)?;
        }
    }
    writeln!(writer, "illum 2")
}

fn write_color<W: Write>(writer: &mut W, keyword: &str, color: Color3) -> io::Result<()> {
    writeln!(writer, "{} {} {} {}", keyword, color.r, color.g, color.b)
}

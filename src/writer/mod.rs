//! Mesh and material library serialization
//!
//! A document is written as mesh text plus, when any group has a material,
//! a companion library named `<stem>.mtl` beside it.

mod core;
mod material;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::MeshDocument;

use material::LibraryNames;

/// Write mesh text and library text to arbitrary writers
///
/// The `mtllib` directive naming `library_name` is only emitted when the
/// document references materials.
pub(crate) fn write_to<W: Write, M: Write>(
    doc: &MeshDocument,
    mut mesh: W,
    mut library: M,
    library_name: &str,
) -> Result<()> {
    let materials = LibraryNames::new(doc);
    let reference = (!materials.is_empty()).then_some(library_name);
    core::write_mesh(doc, reference, &materials, &mut mesh)?;
    material::write_library(&materials, &mut library)?;
    mesh.flush()?;
    library.flush()?;
    Ok(())
}

/// Save a document to `path`, and its library beside it
pub(crate) fn save(doc: &MeshDocument, path: &Path) -> Result<()> {
    let materials = LibraryNames::new(doc);
    let library_path = (!materials.is_empty()).then(|| path.with_extension("mtl"));
    let library_name = library_path
        .as_deref()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned());

    write_file(path, |w| {
        core::write_mesh(doc, library_name.as_deref(), &materials, w)
    })?;
    if let Some(library_path) = &library_path {
        write_file(library_path, |w| material::write_library(&materials, w))?;
        log::debug!(
            "saved {} materials to {}",
            materials.len(),
            library_path.display()
        );
    }
    log::debug!(
        "saved '{}' with {} groups to {}",
        doc.name,
        doc.num_groups(),
        path.display()
    );
    Ok(())
}

fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let to_error = |e| Error::write(PathBuf::from(path), e);
    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    body(&mut writer).map_err(to_error)?;
    writer.flush().map_err(to_error)
}

//! Mesh text parsing
//!
//! The pipeline is scanner, assembly, then the normalization passes in
//! [`crate::normalize`]. Options are validated before any input is read.

pub(crate) mod assembly;
mod material;
mod scanner;

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{MeshDocument, Options};
use crate::normalize;

pub use assembly::{DEFAULT_GROUP_NAME, NO_MATERIAL};
pub use material::{FileSystemSource, MaterialSource, MemorySource, NoLibraries, parse_library};
pub use scanner::{Record, Scanner, TransformKind};

/// Load a mesh file, reading material libraries from its folder
///
/// The document is named after the file stem unless the text carries an
/// `o` line. When `usemtl` appears before any `mtllib`, `<stem>.mtl` next to
/// the mesh is tried as an implicit library.
pub fn load_file(path: &Path, options: Options) -> Result<MeshDocument> {
    options.validate()?;
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(Error::Io(e)),
    };
    let text = decode_text(bytes, path);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let fallback = (!stem.is_empty()).then(|| format!("{}.mtl", stem));
    let mut source = FileSystemSource::new(path.parent().unwrap_or_else(|| Path::new("")));

    log::debug!("loading {}", path.display());
    parse_document(&text, &stem, options, &mut source, fallback)
}

/// Decode file contents as UTF-8, replacing invalid sequences with U+FFFD
pub(crate) fn decode_text(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!(
                "{} is not valid UTF-8 after byte {}, invalid sequences replaced",
                path.display(),
                e.utf8_error().valid_up_to()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

/// Parse mesh text, loading libraries through `source`
///
/// `name` is the document name used when the text has no `o` line.
pub fn parse_str<S: MaterialSource + ?Sized>(
    text: &str,
    name: &str,
    options: Options,
    source: &mut S,
) -> Result<MeshDocument> {
    options.validate()?;
    parse_document(text, name, options, source, None)
}

fn parse_document<S: MaterialSource + ?Sized>(
    text: &str,
    default_name: &str,
    options: Options,
    source: &mut S,
    fallback_library: Option<String>,
) -> Result<MeshDocument> {
    log::debug!("parsing mesh '{}' with options {}", default_name, options);
    let assembled = assembly::assemble(text, source, fallback_library, options.error_policy)?;
    let name = assembled
        .object_name
        .clone()
        .unwrap_or_else(|| default_name.to_string());

    let doc = normalize::normalize(assembled, name, &options);
    if options.log_group_info {
        log_group_info(&doc);
    }
    Ok(doc)
}

/// Log the per-group statistics of a document at info level
pub(crate) fn log_group_info(doc: &MeshDocument) {
    log::info!(
        "mesh '{}': {} groups, {} positions, {} triangles",
        doc.name,
        doc.num_groups(),
        doc.total_positions(),
        doc.total_triangles()
    );
    for stats in doc.group_stats() {
        log::info!("  {}", stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_options_rejected_before_reading() {
        let err = load_file(Path::new("does/not/exist.obj"), Options::SPLIT_SEAMS).unwrap_err();
        assert!(matches!(err, Error::InvalidOptionCombination(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(Path::new("does/not/exist.obj"), Options::new()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.obj");
        fs::write(&path, b"v 0 0 0\nv 1 0 0\nv 0 1 0\ng pi\xf1a\nf 1 2 3\n").unwrap();

        let doc = load_file(&path, Options::new()).unwrap();
        assert_eq!(doc.groups()[0].name, "pi\u{fffd}a");
        assert_eq!(doc.total_triangles(), 1);

        assert_eq!(decode_text(b"plain".to_vec(), &path), "plain");
    }

    #[test]
    fn test_document_name() {
        let doc = parse_str("v 0 0 0\nf 1 1 1\n", "fallback", Options::new(), &mut NoLibraries)
            .unwrap();
        assert_eq!(doc.name, "fallback");
        let doc = parse_str("o Crate\n", "fallback", Options::new(), &mut NoLibraries).unwrap();
        assert_eq!(doc.name, "Crate");
    }

    #[test]
    fn test_flatten_and_seams() {
        let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vt 0.5 0.5
f 1/1 2/2 3/3
f 1/5 3/3 4/4
";
        let plain = parse_str(text, "m", Options::FLATTEN, &mut NoLibraries).unwrap();
        let group = &plain.groups()[0];
        assert!(group.is_flattened());
        assert_eq!(group.positions.len(), 5);
        assert_eq!(group.normals.len(), 5);
        assert_eq!(group.uv_coords.len(), 5);

        let split = parse_str(
            text,
            "m",
            Options::FLATTEN | Options::SPLIT_SEAMS,
            &mut NoLibraries,
        )
        .unwrap();
        assert_eq!(split.groups()[0].positions.len(), 5);
    }
}

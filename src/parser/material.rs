//! Material library parsing and library sources

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{Color3, Material, MaterialTable, TextureSlot};

/// Supplies material libraries referenced by `mtllib`
///
/// The default load path reads libraries from disk next to the mesh file.
/// Other sources allow loading meshes whose libraries live in memory, or
/// ignoring libraries entirely.
pub trait MaterialSource {
    /// Load and parse the library referenced as `path`
    ///
    /// Fails with [`Error::MaterialFileNotFound`] if the library does not exist.
    fn load_library(&mut self, path: &str) -> Result<MaterialTable>;
}

/// Reads libraries from disk, relative to a base folder
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    base_dir: PathBuf,
}

impl FileSystemSource {
    /// Create a source rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Folder library paths are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl MaterialSource for FileSystemSource {
    fn load_library(&mut self, path: &str) -> Result<MaterialTable> {
        let full = self.base_dir.join(path);
        let bytes = match fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::MaterialFileNotFound { path: full });
            }
            Err(e) => return Err(Error::Io(e)),
        };
        log::debug!("loading material library {}", full.display());
        parse_library(&super::decode_text(bytes, &full), &full.to_string_lossy())
    }
}

/// Serves libraries from in-memory text, keyed by the `mtllib` path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    libraries: HashMap<String, String>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library and return the source
    pub fn with_library(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Add or replace a library
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.libraries.insert(path.into(), text.into());
    }
}

impl MaterialSource for MemorySource {
    fn load_library(&mut self, path: &str) -> Result<MaterialTable> {
        match self.libraries.get(path) {
            Some(text) => parse_library(text, path),
            None => Err(Error::MaterialFileNotFound {
                path: PathBuf::from(path),
            }),
        }
    }
}

/// Source with no libraries; every `mtllib` reference is missing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLibraries;

impl MaterialSource for NoLibraries {
    fn load_library(&mut self, path: &str) -> Result<MaterialTable> {
        Err(Error::MaterialFileNotFound {
            path: PathBuf::from(path),
        })
    }
}

/// Parse material library text
///
/// `path` is recorded as each material's `material_file` and used in errors.
/// Property lines before the first `newmtl` are ignored with a warning.
pub fn parse_library(text: &str, path: &str) -> Result<MaterialTable> {
    let mut table = MaterialTable::new();
    let mut current: Option<Material> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };
        let fail = |message: String| Error::material_parse(path, line_number, line, message);

        if keyword == "newmtl" {
            if rest.is_empty() {
                return Err(fail("newmtl requires a material name".to_string()));
            }
            if let Some(done) = current.take() {
                table.insert(done);
            }
            let mut material = Material::new(rest);
            material.material_file = path.to_string();
            current = Some(material);
            continue;
        }

        let Some(material) = current.as_mut() else {
            log::warn!(
                "{}:{}: '{}' appears before any newmtl, ignored",
                path,
                line_number,
                keyword
            );
            continue;
        };

        match keyword {
            "Ka" => material.ambient_color = parse_color(rest).map_err(fail)?,
            "Kd" => material.diffuse_color = parse_color(rest).map_err(fail)?,
            "Ks" => material.specular_color = parse_color(rest).map_err(fail)?,
            "Ke" => material.emissive_color = parse_color(rest).map_err(fail)?,
            "Ns" => material.specular_exponent = parse_scalar(rest).map_err(fail)?,
            "d" => material.alpha = parse_scalar(rest).map_err(fail)?,
            "Tr" => material.alpha = 1.0 - parse_scalar(rest).map_err(fail)?,
            "illum" => {}
            _ => match TextureSlot::from_keyword(keyword) {
                Some(slot) => {
                    // option flags such as `-bm 0.5` precede the file name
                    let file = rest
                        .split_whitespace()
                        .last()
                        .ok_or_else(|| fail(format!("{} requires a texture path", keyword)))?;
                    material.set_texture(slot, file);
                }
                None => log::debug!(
                    "{}:{}: ignoring unsupported keyword '{}'",
                    path,
                    line_number,
                    keyword
                ),
            },
        }
    }

    if let Some(done) = current {
        table.insert(done);
    }
    Ok(table)
}

fn parse_scalar(rest: &str) -> std::result::Result<f32, String> {
    let mut tokens = rest.split_whitespace();
    let value = tokens
        .next()
        .ok_or_else(|| "missing value".to_string())?;
    value
        .parse()
        .map_err(|_| format!("invalid number '{}'", value))
}

/// `r g b`, or a single value for grey
fn parse_color(rest: &str) -> std::result::Result<Color3, String> {
    let channels = rest
        .split_whitespace()
        .map(|t| t.parse::<f32>().map_err(|_| format!("invalid colour channel '{}'", t)))
        .collect::<std::result::Result<Vec<f32>, String>>()?;
    match channels.as_slice() {
        [v] => Ok(Color3::grey(*v)),
        [r, g, b] => Ok(Color3::new(*r, *g, *b)),
        other => Err(format!(
            "colour needs 1 or 3 channels, found {}",
            other.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = "\
# two materials
newmtl Brick
Ka 0.1 0.1 0.1
Kd 0.8 0.3 0.2
Ks 0.5
Ns 96.0
d 0.9
illum 2
map_Kd -bm 1.0 textures/brick.png
map_bump brick_n.png

newmtl Glass
Tr 0.75
Ke 0 0 0.2
";

    #[test]
    fn test_parse_library() {
        let table = parse_library(LIBRARY, "assets/walls.mtl").unwrap();
        assert_eq!(table.len(), 2);

        let brick = table.resolve("Brick").unwrap();
        assert_eq!(brick.material_file, "assets/walls.mtl");
        assert_eq!(brick.ambient_color, Color3::grey(0.1));
        assert_eq!(brick.diffuse_color, Color3::new(0.8, 0.3, 0.2));
        assert_eq!(brick.specular_color, Color3::grey(0.5));
        assert_eq!(brick.specular_exponent, 96.0);
        assert_eq!(brick.alpha, 0.9);
        assert_eq!(brick.diffuse_path.as_deref(), Some("textures/brick.png"));
        assert_eq!(brick.normal_path.as_deref(), Some("brick_n.png"));
        assert_eq!(
            brick.texture_path(TextureSlot::Diffuse),
            Some(PathBuf::from("assets/textures/brick.png"))
        );

        let glass = table.resolve("glass").unwrap();
        assert_eq!(glass.alpha, 0.25);
        assert_eq!(glass.emissive_color, Color3::new(0.0, 0.0, 0.2));
        assert_eq!(glass.diffuse_color, Color3::BLACK);
    }

    #[test]
    fn test_redefinition_last_wins() {
        let text = "newmtl a\nd 0.5\nnewmtl b\nnewmtl a\nd 0.25\n";
        let table = parse_library(text, "x.mtl").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve("a").unwrap().alpha, 0.25);
    }

    #[test]
    fn test_properties_before_newmtl_are_ignored() {
        let table = parse_library("Kd 1 1 1\nnewmtl a\n", "x.mtl").unwrap();
        assert_eq!(table.resolve("a").unwrap().diffuse_color, Color3::BLACK);
    }

    #[test]
    fn test_malformed_lines() {
        let cases = [
            ("newmtl a\nKd 1 x 1\n", 2),
            ("newmtl a\nKd 1 1\n", 2),
            ("newmtl a\n\nNs\n", 3),
            ("newmtl\n", 1),
            ("newmtl a\nmap_Kd\n", 2),
        ];
        for (text, line) in cases {
            let err = parse_library(text, "bad.mtl").unwrap_err();
            assert!(matches!(err, Error::MaterialParse { .. }), "{}", text);
            assert_eq!(err.line(), Some(line), "{}", text);
        }
    }

    #[test]
    fn test_memory_and_empty_sources() {
        let mut source = MemorySource::new().with_library("m.mtl", "newmtl red\nKd 1 0 0\n");
        let table = source.load_library("m.mtl").unwrap();
        assert_eq!(table.resolve("red").unwrap().diffuse_color, Color3::new(1.0, 0.0, 0.0));
        assert!(matches!(
            source.load_library("other.mtl"),
            Err(Error::MaterialFileNotFound { .. })
        ));
        assert!(NoLibraries.load_library("m.mtl").unwrap_err().is_not_found());
    }

    #[test]
    fn test_file_system_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.mtl"), "newmtl stone\nNs 10\n").unwrap();

        let mut source = FileSystemSource::new(dir.path());
        let table = source.load_library("lib.mtl").unwrap();
        let stone = table.resolve("stone").unwrap();
        assert_eq!(stone.specular_exponent, 10.0);
        assert!(stone.material_file.ends_with("lib.mtl"));

        // invalid bytes are replaced rather than failing the load
        fs::write(dir.path().join("latin.mtl"), b"newmtl caf\xe9\nd 0.5\n").unwrap();
        let table = source.load_library("latin.mtl").unwrap();
        assert_eq!(table.resolve("caf\u{fffd}").unwrap().alpha, 0.5);

        match source.load_library("missing.mtl") {
            Err(Error::MaterialFileNotFound { path }) => {
                assert_eq!(path, dir.path().join("missing.mtl"));
            }
            other => panic!("expected MaterialFileNotFound, got {:?}", other),
        }
    }
}

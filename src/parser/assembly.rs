//! Mesh assembly: scanner records to raw groups
//!
//! Attributes are accumulated globally, the way the interchange format
//! numbers them. Groups collect corner tuples that index those global arrays;
//! compaction into group-local arrays happens later, once every group is known.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Color3, ErrorPolicy, Material, MaterialTable, Triangle, Vector2, Vector3};

use super::material::MaterialSource;
use super::scanner::{Record, Scanner, TransformKind};

/// Name given to faces outside any group marker
pub const DEFAULT_GROUP_NAME: &str = "default";

/// `usemtl` argument that clears the current material
pub const NO_MATERIAL: &str = "(null)";

/// A group as collected during assembly, indexing the global arrays
#[derive(Debug, Clone)]
pub(crate) struct RawGroup {
    pub name: String,
    pub material: Option<Arc<Material>>,
    pub faces: Vec<Triangle>,
    pub offset: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
    conflict_reported: bool,
}

impl RawGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: None,
            faces: Vec::new(),
            offset: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
            conflict_reported: false,
        }
    }
}

/// Everything assembly produces, ready for the finalizer
#[derive(Debug, Clone, Default)]
pub(crate) struct Assembled {
    /// Name from the last `o` line
    pub object_name: Option<String>,
    pub positions: Vec<Vector3>,
    pub normals: Vec<Vector3>,
    pub uv_coords: Vec<Vector2>,
    /// Empty until the first coloured position, then one per position
    pub colors: Vec<Color3>,
    pub groups: Vec<RawGroup>,
    /// First material successfully selected by `usemtl`
    pub first_material: Option<Arc<Material>>,
}

struct Assembler<'s, S: MaterialSource + ?Sized> {
    source: &'s mut S,
    fallback_library: Option<String>,
    materials: MaterialTable,
    saw_library: bool,
    group_ids: HashMap<String, usize>,
    current_group: Option<usize>,
    current_material: Option<Arc<Material>>,
    out: Assembled,
}

/// Scan and assemble mesh text
///
/// `fallback_library` is tried once, when `usemtl` appears before any
/// `mtllib`; its absence is not an error. Under
/// [`ErrorPolicy::SkipMalformedLines`] malformed mesh lines are logged and
/// skipped, while library errors always abort.
pub(crate) fn assemble<S: MaterialSource + ?Sized>(
    text: &str,
    source: &mut S,
    fallback_library: Option<String>,
    policy: ErrorPolicy,
) -> Result<Assembled> {
    let mut assembler = Assembler {
        source,
        fallback_library,
        materials: MaterialTable::new(),
        saw_library: false,
        group_ids: HashMap::new(),
        current_group: None,
        current_material: None,
        out: Assembled::default(),
    };

    let mut skipped = 0usize;
    for item in Scanner::new(text) {
        match item.and_then(|record| assembler.apply(record)) {
            Ok(()) => {}
            Err(e @ Error::Parse { .. }) if policy == ErrorPolicy::SkipMalformedLines => {
                log::warn!("skipping malformed line: {}", e);
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    if skipped > 0 {
        log::warn!("{} malformed lines skipped", skipped);
    }
    Ok(assembler.out)
}

impl<S: MaterialSource + ?Sized> Assembler<'_, S> {
    fn apply(&mut self, record: Record<'_>) -> Result<()> {
        match record {
            Record::Position(v, color) => self.add_position(v, color),
            Record::Normal(v) => self.out.normals.push(v),
            Record::TexCoord(v) => self.out.uv_coords.push(v),
            Record::Face(face) => self.add_face(face),
            Record::GroupMarker(name) => {
                let name = if name.is_empty() {
                    DEFAULT_GROUP_NAME
                } else {
                    name
                };
                self.current_group = Some(self.open_group(name));
            }
            Record::ObjectName(name) => {
                if !name.is_empty() {
                    self.out.object_name = Some(name.to_string());
                }
            }
            Record::MaterialLib(path) => {
                self.saw_library = true;
                let table = self.source.load_library(path)?;
                log::debug!("library {} defines {} materials", path, table.len());
                self.materials.merge(table);
            }
            Record::MaterialUse(name) => self.use_material(name)?,
            Record::GroupTransform(kind, value) => self.set_transform(kind, value),
        }
        Ok(())
    }

    /// Look up a group by name, creating it on first sight
    fn open_group(&mut self, name: &str) -> usize {
        if let Some(&id) = self.group_ids.get(name) {
            return id;
        }
        let id = self.out.groups.len();
        self.out.groups.push(RawGroup::new(name));
        self.group_ids.insert(name.to_string(), id);
        id
    }

    fn add_position(&mut self, position: Vector3, color: Option<Color3>) {
        let colors = &mut self.out.colors;
        match color {
            Some(color) => {
                colors.resize(self.out.positions.len(), Color3::BLACK);
                colors.push(color);
            }
            None if !colors.is_empty() => colors.push(Color3::BLACK),
            None => {}
        }
        self.out.positions.push(position);
    }

    fn add_face(&mut self, face: Triangle) {
        let id = match self.current_group {
            Some(id) => id,
            None => {
                let id = self.open_group(DEFAULT_GROUP_NAME);
                self.current_group = Some(id);
                id
            }
        };
        let group = &mut self.out.groups[id];
        if group.faces.is_empty() {
            group.material = self.current_material.clone();
        } else if !group.conflict_reported
            && !same_material(group.material.as_ref(), self.current_material.as_ref())
        {
            log::warn!(
                "group '{}' uses more than one material, keeping {}",
                group.name,
                group.material.as_ref().map_or("none", |m| m.name.as_str())
            );
            group.conflict_reported = true;
        }
        group.faces.push(face);
    }

    fn use_material(&mut self, name: &str) -> Result<()> {
        if name == NO_MATERIAL {
            self.current_material = None;
            return Ok(());
        }
        if !self.saw_library {
            if let Some(fallback) = self.fallback_library.take() {
                match self.source.load_library(&fallback) {
                    Ok(table) => {
                        log::debug!("using implicit material library {}", fallback);
                        self.materials.merge(table);
                    }
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }
        }

        self.current_material = self.materials.resolve(name);
        match &self.current_material {
            Some(material) => {
                if self.out.first_material.is_none() {
                    self.out.first_material = Some(Arc::clone(material));
                }
            }
            None => log::warn!("material '{}' is not defined in any library", name),
        }
        Ok(())
    }

    fn set_transform(&mut self, kind: TransformKind, value: Vector3) {
        let Some(id) = self.current_group else {
            log::warn!("#@{} annotation outside any group, ignored", kind.keyword());
            return;
        };
        let group = &mut self.out.groups[id];
        match kind {
            TransformKind::Offset => group.offset = value,
            TransformKind::Rotation => group.rotation = value,
            TransformKind::Scale => group.scale = value,
        }
    }
}

fn same_material(a: Option<&Arc<Material>>, b: Option<&Arc<Material>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::material::{MemorySource, NoLibraries};

    const LIBRARY: &str = "newmtl red\nKd 1 0 0\nnewmtl blue\nKd 0 0 1\n";

    fn run(text: &str) -> Assembled {
        let mut source = MemorySource::new().with_library("lib.mtl", LIBRARY);
        assemble(text, &mut source, None, ErrorPolicy::Abort).unwrap()
    }

    #[test]
    fn test_faces_without_marker_go_to_default_group() {
        let out = run("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_eq!(out.groups.len(), 1);
        assert_eq!(out.groups[0].name, DEFAULT_GROUP_NAME);
        assert_eq!(out.groups[0].faces.len(), 1);
        assert_eq!(out.positions.len(), 3);
    }

    #[test]
    fn test_reopened_group_reuses_entry() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\ng a\nf 1 2 3\ng b\nf 1 2 3\ng a\nf 3 2 1\n";
        let out = run(text);
        assert_eq!(out.groups.len(), 2);
        assert_eq!(out.groups[0].name, "a");
        assert_eq!(out.groups[0].faces.len(), 2);
        assert_eq!(out.groups[1].faces.len(), 1);
    }

    #[test]
    fn test_material_bound_at_first_face() {
        let text = "mtllib lib.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl red\ng a\nf 1 2 3\nusemtl blue\nf 1 2 3\ng b\nf 1 2 3\n";
        let out = run(text);
        assert_eq!(out.groups[0].material.as_ref().unwrap().name, "red");
        assert_eq!(out.groups[1].material.as_ref().unwrap().name, "blue");
        assert_eq!(out.first_material.as_ref().unwrap().name, "red");
    }

    #[test]
    fn test_null_material_clears_current() {
        let text = "mtllib lib.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\ng a\nusemtl red\nf 1 2 3\ng b\nusemtl (null)\nf 1 2 3\ng c\nf 1 2 3\n";
        let out = run(text);
        assert_eq!(out.groups[0].material.as_ref().unwrap().name, "red");
        assert!(out.groups[1].material.is_none());
        assert!(out.groups[2].material.is_none());
    }

    #[test]
    fn test_colors_cover_every_position_once_seen() {
        let out = run("v 0 0 0\nv 1 0 0 1 0 0\nv 0 1 0\n");
        assert_eq!(out.positions.len(), 3);
        assert_eq!(
            out.colors,
            vec![Color3::BLACK, Color3::new(1.0, 0.0, 0.0), Color3::BLACK]
        );

        let plain = run("v 0 0 0\nv 1 0 0\n");
        assert!(plain.colors.is_empty());
    }

    #[test]
    fn test_unknown_material_is_absent() {
        let out = run("mtllib lib.mtl\nusemtl nothing\nv 0 0 0\nf 1 1 1\n");
        assert!(out.groups[0].material.is_none());
        assert!(out.first_material.is_none());
    }

    #[test]
    fn test_transform_annotations_apply_to_current_group() {
        let out = run("#@offset 9 9 9\ng Anchor\n#@offset 1 2 3\n#@scale 2 2 2\n");
        assert_eq!(out.groups.len(), 1);
        let anchor = &out.groups[0];
        assert!(anchor.faces.is_empty());
        assert_eq!(anchor.offset, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(anchor.rotation, Vector3::ZERO);
        assert_eq!(anchor.scale, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_object_name_last_wins() {
        let out = run("o first\no second\n");
        assert_eq!(out.object_name.as_deref(), Some("second"));
    }

    #[test]
    fn test_fallback_library_used_without_mtllib() {
        let mut source = MemorySource::new().with_library("cube.mtl", LIBRARY);
        let text = "usemtl blue\nv 0 0 0\nf 1 1 1\n";
        let out = assemble(text, &mut source, Some("cube.mtl".into()), ErrorPolicy::Abort).unwrap();
        assert_eq!(out.groups[0].material.as_ref().unwrap().name, "blue");

        // a missing fallback is not an error
        let out = assemble(text, &mut NoLibraries, Some("cube.mtl".into()), ErrorPolicy::Abort).unwrap();
        assert!(out.groups[0].material.is_none());
    }

    #[test]
    fn test_missing_library_aborts() {
        let err = assemble("mtllib gone.mtl\n", &mut NoLibraries, None, ErrorPolicy::SkipMalformedLines)
            .unwrap_err();
        assert!(matches!(err, Error::MaterialFileNotFound { .. }));
    }

    #[test]
    fn test_error_policy() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\nf 1 2 3\n";
        let err = assemble(text, &mut NoLibraries, None, ErrorPolicy::Abort).unwrap_err();
        assert_eq!(err.line(), Some(4));

        let out = assemble(text, &mut NoLibraries, None, ErrorPolicy::SkipMalformedLines).unwrap();
        assert_eq!(out.groups[0].faces.len(), 1);
    }
}

//! Group policy: single-group merging, empty group handling and id assignment

use crate::model::{MeshDocument, MeshGroup, Options};
use crate::parser::assembly::{Assembled, DEFAULT_GROUP_NAME, RawGroup};

use super::compact::compact_triangles;

/// Apply group policy and build the document in tuple form
///
/// Group ids are assigned densely after empty groups are dropped. With
/// `force_single_group` the result always holds exactly one group.
pub(crate) fn finalize(assembled: Assembled, doc_name: String, options: &Options) -> MeshDocument {
    let Assembled {
        positions,
        normals,
        uv_coords,
        colors,
        groups,
        first_material,
        ..
    } = assembled;

    let groups: Vec<RawGroup> = if options.force_single_group {
        let name = if doc_name.is_empty() {
            DEFAULT_GROUP_NAME
        } else {
            doc_name.as_str()
        };
        let mut single = RawGroup::new(name);
        single.material = first_material;
        single.faces = groups.into_iter().flat_map(|g| g.faces).collect();
        vec![single]
    } else if options.create_empty_groups {
        groups
    } else {
        let before = groups.len();
        let kept: Vec<RawGroup> = groups.into_iter().filter(|g| !g.faces.is_empty()).collect();
        if kept.len() < before {
            log::debug!("dropped {} empty groups", before - kept.len());
        }
        kept
    };

    let groups = groups
        .into_iter()
        .enumerate()
        .map(|(id, raw)| {
            let mut group = MeshGroup::new(id, raw.name);
            group.material = raw.material;
            group.offset = raw.offset;
            group.rotation = raw.rotation;
            group.scale = raw.scale;
            compact_triangles(&raw.faces, &positions, &normals, &uv_coords, &colors)
                .apply_to(&mut group);
            group
        })
        .collect();

    MeshDocument::from_groups(doc_name, groups)
}

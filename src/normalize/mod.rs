//! Post-assembly transforms: group policy, flattening and seam relabelling

pub(crate) mod compact;
pub(crate) mod finalize;
pub(crate) mod flatten;
pub(crate) mod seams;

use crate::model::{MeshDocument, Options};
use crate::parser::assembly::Assembled;

/// Run the finalizer, then the optional flattening passes
pub(crate) fn normalize(assembled: Assembled, doc_name: String, options: &Options) -> MeshDocument {
    let mut doc = finalize::finalize(assembled, doc_name, options);
    if !options.per_vertex_flatten {
        return doc;
    }
    for group in doc.groups_mut() {
        let before = group.positions.len();
        if options.split_uv_seams {
            group.optimized_flatten();
        } else {
            group.flatten();
        }
        log::trace!(
            "flattened group '{}': {} positions -> {} vertices",
            group.name,
            before,
            group.positions.len()
        );
    }
    doc
}

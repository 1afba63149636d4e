#![no_main]

use libfuzzer_sys::fuzz_target;
use objmesh::{MeshDocument, Options};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // The full pipeline must never panic, whatever the options
    let _ = MeshDocument::from_str_with_options(&text, "fuzz", Options::new());
    let _ = MeshDocument::from_str_with_options(&text, "fuzz", Options::SKIP_MALFORMED | Options::EMPTY_GROUPS);
    if let Ok(doc) = MeshDocument::from_str_with_options(
        &text,
        "fuzz",
        Options::FLATTEN | Options::SPLIT_SEAMS | Options::SKIP_MALFORMED,
    ) {
        for group in doc.groups() {
            assert_eq!(group.positions.len(), group.uv_coords.len());
            assert!(group.colors.is_empty() || group.colors.len() == group.positions.len());
            assert!(group.indices.iter().all(|&i| (i as usize) < group.positions.len()));
        }
        let mut mesh = Vec::new();
        let mut library = Vec::new();
        let _ = doc.write_to(&mut mesh, &mut library, "fuzz.mtl");
    }
});

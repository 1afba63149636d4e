//! Build a mesh in code and save it as OBJ + MTL
//!
//! Usage: cargo run --example build_mesh -- [output.obj]

use objmesh::{Color3, Material, MeshDocument, Options, Vector2, Vector3};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let output = env::args().nth(1).unwrap_or_else(|| "pyramid.obj".to_string());

    let mut doc = MeshDocument::new("pyramid");

    let body = doc.new_group("body");
    body.positions = vec![
        Vector3::new(-1.0, 0.0, -1.0),
        Vector3::new(1.0, 0.0, -1.0),
        Vector3::new(1.0, 0.0, 1.0),
        Vector3::new(-1.0, 0.0, 1.0),
        Vector3::new(0.0, 1.5, 0.0),
    ];
    body.uv_coords = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.0, 1.0),
        Vector2::new(0.5, 0.5),
    ];
    body.indices = vec![
        0, 2, 1, 0, 3, 2, // base
        0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4, // sides
    ];
    let mut sandstone = Material::new("sandstone");
    sandstone.diffuse_color = Color3::new(0.85, 0.7, 0.45);
    sandstone.specular_exponent = 8.0;
    body.set_material(sandstone);

    // zero-triangle group used as an attachment point
    let tip = doc.new_group("tip_anchor");
    tip.offset = Vector3::new(0.0, 1.5, 0.0);

    doc.save_with_options(&output, Options::LOG_GROUPS)?;
    println!("Wrote {} ({} triangles)", output, doc.total_triangles());

    let reloaded = MeshDocument::open_with_options(&output, Options::EMPTY_GROUPS | Options::FLATTEN)?;
    println!("Reloaded {} groups:", reloaded.num_groups());
    for stats in reloaded.group_stats() {
        println!("  {}", stats);
    }
    Ok(())
}

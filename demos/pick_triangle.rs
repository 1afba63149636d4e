//! Cast a ray into an OBJ file and report the closest triangle
//!
//! Usage: cargo run --example pick_triangle -- <file.obj> ox oy oz dx dy dz

use objmesh::mesh_ops::{compute_document_aabb, pick_triangle};
use objmesh::{MeshDocument, Options, Vector3};
use std::env;
use std::process;

fn parse_vector(values: &[String]) -> Option<Vector3> {
    let parsed: Vec<f32> = values.iter().filter_map(|v| v.parse().ok()).collect();
    match parsed.as_slice() {
        [x, y, z] => Some(Vector3::new(*x, *y, *z)),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 7 {
        eprintln!("Usage: pick_triangle <file.obj> ox oy oz dx dy dz");
        process::exit(1);
    }
    let (Some(origin), Some(direction)) = (parse_vector(&args[1..4]), parse_vector(&args[4..7]))
    else {
        eprintln!("Ray origin and direction must be three numbers each");
        process::exit(1);
    };

    let doc = MeshDocument::open_with_options(&args[0], Options::FLATTEN)?;
    if let Some((min, max)) = compute_document_aabb(&doc) {
        println!("Bounds: {:?} .. {:?}", min, max);
    }

    match pick_triangle(&doc, origin, direction) {
        Some(hit) => {
            let group = &doc.groups()[hit.group_id];
            println!(
                "Hit group '{}' triangle {} at distance {} ({:?})",
                group.name, hit.triangle, hit.distance, hit.point
            );
        }
        None => println!("No triangle hit"),
    }
    Ok(())
}

//! Print a summary of an OBJ file
//!
//! Usage: cargo run --example obj_info -- <file.obj> [--flatten] [--split-seams] [--single] [--empty]
//!
//! Set RUST_LOG=debug to see library loading and skipped lines.

use objmesh::{MeshDocument, Options, TextureSlot};
use std::env;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.iter().find(|a| !a.starts_with("--")) else {
        eprintln!("Usage: obj_info <file.obj> [--flatten] [--split-seams] [--single] [--empty]");
        process::exit(1);
    };

    let mut options = Options::new().with_log_group_info(true);
    for flag in args.iter().filter(|a| a.starts_with("--")) {
        options = match flag.as_str() {
            "--flatten" => options.with_per_vertex_flatten(true),
            "--split-seams" => options.with_per_vertex_flatten(true).with_split_uv_seams(true),
            "--single" => options.with_force_single_group(true),
            "--empty" => options.with_create_empty_groups(true),
            other => {
                eprintln!("Unknown flag: {}", other);
                process::exit(1);
            }
        };
    }

    let doc = match MeshDocument::open_with_options(path, options) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("Mesh '{}' loaded with options {}", doc.name, options);
    println!("  Groups:    {}", doc.num_groups());
    println!("  Positions: {}", doc.total_positions());
    println!("  Triangles: {}", doc.total_triangles());
    println!();

    for stats in doc.group_stats() {
        println!("{}", stats);
    }

    let materials = doc.materials();
    if !materials.is_empty() {
        println!("\nMaterials:");
        for mat in &materials {
            println!(
                "  {} (Kd {} {} {}, alpha {})",
                mat.name, mat.diffuse_color.r, mat.diffuse_color.g, mat.diffuse_color.b, mat.alpha
            );
            for slot in TextureSlot::ALL {
                if let Some(texture) = mat.texture_path(slot) {
                    println!("    {:<8} {}", slot.keyword(), texture.display());
                }
            }
        }
    }
}

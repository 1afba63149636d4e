//! # objmesh
//!
//! A pure Rust implementation for loading, normalizing and saving meshes in
//! the OBJ interchange format and its MTL material libraries.
//!
//! Loading produces a [`MeshDocument`]: an ordered list of named groups, each
//! with at most one shared material. On request, the attributes of every
//! group are flattened into co-indexed vertex buffers ready for a GPU, and UV
//! shells are relabelled into contiguous index ranges.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Fan triangulation of polygons and relative (negative) index references
//! - Group re-opening, empty anchor groups and group transform annotations
//! - Per-vertex attribute flattening and UV seam relabelling
//! - Round-trip serialization of meshes and material libraries
//! - Optional geometry helpers (`mesh-ops` feature)
//!
//! ## Example
//!
//! ```no_run
//! use objmesh::{MeshDocument, Options};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = MeshDocument::open_with_options("crate.obj", Options::FLATTEN)?;
//!
//! for group in doc.groups() {
//!     println!("{}: {} triangles", group.name, group.triangle_count());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
#[cfg(feature = "mesh-ops")]
pub mod mesh_ops;
pub mod model;
mod normalize;
pub mod parser;
mod writer;

pub use error::{Error, Result};
pub use model::{
    BasicVertex, Color3, ErrorPolicy, GroupStats, Material, MaterialTable, MeshDocument,
    MeshGroup, Options, TextureSlot, Triangle, Vector2, Vector3, VertexRef,
};
pub use parser::{FileSystemSource, MaterialSource, MemorySource, NoLibraries};

use std::io::Write;
use std::path::Path;

impl MeshDocument {
    /// Load a mesh file with default options
    ///
    /// Material libraries are read relative to the file's folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use objmesh::MeshDocument;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let doc = MeshDocument::open("crate.obj")?;
    /// println!("{} groups", doc.num_groups());
    /// # Ok(())
    /// # }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, Options::new())
    }

    /// Load a mesh file with custom options
    ///
    /// Fails with [`Error::InvalidOptionCombination`] before touching the
    /// file if the options conflict, and with [`Error::FileNotFound`] if the
    /// path does not exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use objmesh::{MeshDocument, Options};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let options = Options::new()
    ///     .with_per_vertex_flatten(true)
    ///     .with_split_uv_seams(true)
    ///     .with_create_empty_groups(true);
    ///
    /// let doc = MeshDocument::open_with_options("level.obj", options)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: Options) -> Result<Self> {
        parser::load_file(path.as_ref(), options)
    }

    /// Parse mesh text held in memory
    ///
    /// `mtllib` references cannot be resolved and fail with
    /// [`Error::MaterialFileNotFound`]; use [`MeshDocument::parse_with_source`]
    /// to supply libraries. `name` is used when the text has no `o` line.
    ///
    /// # Example
    ///
    /// ```
    /// use objmesh::{MeshDocument, Options};
    ///
    /// let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
    /// let doc = MeshDocument::from_str_with_options(text, "quad", Options::FLATTEN).unwrap();
    /// assert_eq!(doc.groups()[0].indices, vec![0, 1, 2, 0, 2, 3]);
    /// ```
    pub fn from_str_with_options(text: &str, name: &str, options: Options) -> Result<Self> {
        parser::parse_str(text, name, options, &mut NoLibraries)
    }

    /// Parse mesh text, loading material libraries through `source`
    ///
    /// # Example
    ///
    /// ```
    /// use objmesh::{MemorySource, MeshDocument, Options};
    ///
    /// let mut libraries = MemorySource::new().with_library("paint.mtl", "newmtl red\nKd 1 0 0\n");
    /// let text = "mtllib paint.mtl\nusemtl red\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
    ///
    /// let doc = MeshDocument::parse_with_source(text, "tri", Options::new(), &mut libraries).unwrap();
    /// assert_eq!(doc.groups()[0].material.as_ref().unwrap().name, "red");
    /// ```
    pub fn parse_with_source<S: MaterialSource + ?Sized>(
        text: &str,
        name: &str,
        options: Options,
        source: &mut S,
    ) -> Result<Self> {
        parser::parse_str(text, name, options, source)
    }

    /// Save the document, plus `<stem>.mtl` beside it when any group has a material
    ///
    /// Fails with [`Error::Write`] if a file cannot be created or written.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use objmesh::{MeshDocument, Vector3};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut doc = MeshDocument::new("triangle");
    /// let group = doc.new_group("tri");
    /// group.positions = vec![Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)];
    /// group.indices = vec![0, 1, 2];
    ///
    /// doc.save("triangle.obj")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        writer::save(self, path.as_ref())
    }

    /// Save the document, logging group statistics if `log_group_info` is set
    pub fn save_with_options<P: AsRef<Path>>(&self, path: P, options: Options) -> Result<()> {
        self.save(path)?;
        if options.log_group_info {
            parser::log_group_info(self);
        }
        Ok(())
    }

    /// Write mesh text and library text to arbitrary writers
    ///
    /// `library_name` is the name written in the `mtllib` directive, which
    /// is only emitted when the document references materials.
    pub fn write_to<W: Write, M: Write>(&self, mesh: W, library: M, library_name: &str) -> Result<()> {
        writer::write_to(self, mesh, library, library_name)
    }
}

//! Data structures representing mesh documents

mod core;
mod material;
mod options;

// Re-export all public types from core module
pub use core::{
    BasicVertex, GroupStats, MeshDocument, MeshGroup, Triangle, Vector2, Vector3, VertexRef,
};

// Re-export all public types from material module
pub use material::{Color3, Material, MaterialTable, TextureSlot};

// Re-export all public types from options module
pub use options::{ErrorPolicy, Options};

//! Material records and the name-indexed material table

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// RGB colour with float channels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color3 {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
}

impl Color3 {
    /// Black (all channels zero)
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    /// White (all channels one)
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a new colour
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Grey colour with all channels set to `value`
    pub const fn grey(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// True if every channel is zero
    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }
}

/// Texture map slots a material can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// `map_Kd`
    Diffuse,
    /// `map_d`
    Alpha,
    /// `map_Ks`
    Specular,
    /// `map_bump`, `bump` or `norm`
    Normal,
    /// `map_Ke`
    Emissive,
}

impl TextureSlot {
    /// All slots in serialization order
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::Diffuse,
        TextureSlot::Alpha,
        TextureSlot::Specular,
        TextureSlot::Normal,
        TextureSlot::Emissive,
    ];

    /// Library keyword used when writing this slot
    pub fn keyword(&self) -> &'static str {
        match self {
            TextureSlot::Diffuse => "map_Kd",
            TextureSlot::Alpha => "map_d",
            TextureSlot::Specular => "map_Ks",
            TextureSlot::Normal => "map_bump",
            TextureSlot::Emissive => "map_Ke",
        }
    }

    /// Slot for a library keyword, accepting common aliases
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "map_Kd" => Some(TextureSlot::Diffuse),
            "map_d" => Some(TextureSlot::Alpha),
            "map_Ks" => Some(TextureSlot::Specular),
            "map_bump" | "map_Bump" | "bump" | "norm" => Some(TextureSlot::Normal),
            "map_Ke" => Some(TextureSlot::Emissive),
            _ => None,
        }
    }
}

/// Surface material definition
///
/// Numeric fields default to zero, except `alpha` which defaults to fully opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name as used by `usemtl`
    pub name: String,
    /// Library file this material came from
    pub material_file: String,
    /// Diffuse texture path
    pub diffuse_path: Option<String>,
    /// Alpha texture path
    pub alpha_path: Option<String>,
    /// Specular texture path
    pub specular_path: Option<String>,
    /// Normal / bump texture path
    pub normal_path: Option<String>,
    /// Emissive texture path
    pub emissive_path: Option<String>,
    /// `Ka`
    pub ambient_color: Color3,
    /// `Kd`
    pub diffuse_color: Color3,
    /// `Ks`
    pub specular_color: Color3,
    /// `Ke`
    pub emissive_color: Color3,
    /// `Ns`
    pub specular_exponent: f32,
    /// `d`, 0 (transparent) to 1 (opaque)
    pub alpha: f32,
}

impl Material {
    /// Create a material with default values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material_file: String::new(),
            diffuse_path: None,
            alpha_path: None,
            specular_path: None,
            normal_path: None,
            emissive_path: None,
            ambient_color: Color3::BLACK,
            diffuse_color: Color3::BLACK,
            specular_color: Color3::BLACK,
            emissive_color: Color3::BLACK,
            specular_exponent: 0.0,
            alpha: 1.0,
        }
    }

    /// Texture path stored in a slot, as written in the library
    pub fn texture(&self, slot: TextureSlot) -> Option<&str> {
        match slot {
            TextureSlot::Diffuse => self.diffuse_path.as_deref(),
            TextureSlot::Alpha => self.alpha_path.as_deref(),
            TextureSlot::Specular => self.specular_path.as_deref(),
            TextureSlot::Normal => self.normal_path.as_deref(),
            TextureSlot::Emissive => self.emissive_path.as_deref(),
        }
    }

    /// Set the texture path of a slot
    pub fn set_texture(&mut self, slot: TextureSlot, path: impl Into<String>) {
        let path = Some(path.into());
        match slot {
            TextureSlot::Diffuse => self.diffuse_path = path,
            TextureSlot::Alpha => self.alpha_path = path,
            TextureSlot::Specular => self.specular_path = path,
            TextureSlot::Normal => self.normal_path = path,
            TextureSlot::Emissive => self.emissive_path = path,
        }
    }

    /// Texture path of a slot resolved against the library's folder
    pub fn texture_path(&self, slot: TextureSlot) -> Option<PathBuf> {
        let texture = self.texture(slot)?;
        let folder = Path::new(&self.material_file)
            .parent()
            .unwrap_or_else(|| Path::new(""));
        Some(folder.join(texture))
    }
}

/// Named materials, indexed for lookup by `usemtl`
///
/// Redefining a name replaces the earlier definition (last wins) while
/// keeping the position of the first definition in iteration order.
/// Concurrent reads of a populated table are safe; it holds shared handles.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: Vec<Arc<Material>>,
    by_name: HashMap<String, usize>,
}

impl MaterialTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a material by name
    pub fn insert(&mut self, material: Material) -> Arc<Material> {
        let material = Arc::new(material);
        match self.by_name.get(&material.name) {
            Some(&index) => self.materials[index] = Arc::clone(&material),
            None => {
                self.by_name
                    .insert(material.name.clone(), self.materials.len());
                self.materials.push(Arc::clone(&material));
            }
        }
        material
    }

    /// Merge another table into this one, later definitions win
    pub fn merge(&mut self, other: MaterialTable) {
        for material in other.materials {
            self.insert(Arc::unwrap_or_clone(material));
        }
    }

    /// Resolve a material by name: exact match first, then case-insensitive
    pub fn resolve(&self, name: &str) -> Option<Arc<Material>> {
        if let Some(&index) = self.by_name.get(name) {
            return Some(Arc::clone(&self.materials[index]));
        }
        self.materials
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Number of materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True if the table holds no materials
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Materials in definition order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Material>> {
        self.materials.iter()
    }
}

//! Country materials: one per cover image URL, or a palette colour for
//! countries without an image. The cache only grows.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Colours for countries without a cover image, assigned by country index.
pub const PALETTE: [[f32; 3]; 8] = [
    [0.91, 0.42, 0.36],
    [0.96, 0.72, 0.33],
    [0.55, 0.78, 0.45],
    [0.33, 0.67, 0.80],
    [0.49, 0.45, 0.82],
    [0.82, 0.46, 0.71],
    [0.62, 0.60, 0.55],
    [0.36, 0.80, 0.70],
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    Image(String),
    Palette(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub key: MaterialKey,
    /// Shown for palette materials, and for image materials whose texture
    /// failed to load.
    pub color: [f32; 3],
}

impl Material {
    pub fn image_url(&self) -> Option<&str> {
        match &self.key {
            MaterialKey::Image(url) => Some(url),
            MaterialKey::Palette(_) => None,
        }
    }
}

pub fn palette_color(index: usize) -> [f32; 3] {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Default)]
pub struct MaterialCache {
    materials: Vec<Material>,
    by_key: FxHashMap<MaterialKey, MaterialId>,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Material for `key`, created on first use. `palette_index` picks the
    /// fallback colour of a new image material.
    pub fn get_or_insert(&mut self, key: MaterialKey, palette_index: usize) -> MaterialId {
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let color = match &key {
            MaterialKey::Palette(index) => palette_color(*index),
            MaterialKey::Image(_) => palette_color(palette_index),
        };
        let id = MaterialId(self.materials.len());
        self.materials.push(Material {
            key: key.clone(),
            color,
        });
        self.by_key.insert(key, id);
        id
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i), m))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to fetch texture {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// Where cover image bytes come from.
pub trait TextureSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TextureError>;
}

/// Resolves image URLs as paths relative to a directory.
#[derive(Debug, Clone)]
pub struct FileTextureSource {
    root: PathBuf,
}

impl FileTextureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let relative = url.strip_prefix("file://").unwrap_or(url);
        self.root.join(relative.trim_start_matches('/'))
    }
}

impl TextureSource for FileTextureSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TextureError> {
        std::fs::read(self.resolve(url)).map_err(|source| TextureError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}

/// Decode encoded image bytes to RGBA8.
pub fn decode_texture(bytes: &[u8]) -> Result<image::RgbaImage, TextureError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(TextureError::ZeroDimensions {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image)
}

/// Fetch and decode, as one fallible step.
pub fn load_texture(source: &dyn TextureSource, url: &str) -> Result<image::RgbaImage, TextureError> {
    decode_texture(&source.fetch(url)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_image_materials_are_shared_per_url() {
        let mut cache = MaterialCache::new();
        let a = cache.get_or_insert(MaterialKey::Image("a.png".into()), 0);
        let b = cache.get_or_insert(MaterialKey::Image("a.png".into()), 5);
        let c = cache.get_or_insert(MaterialKey::Image("c.png".into()), 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(a).unwrap().color, PALETTE[0]);
    }

    #[test]
    fn test_palette_index_wraps() {
        let mut cache = MaterialCache::new();
        let id = cache.get_or_insert(MaterialKey::Palette(PALETTE.len() + 2), 0);
        assert_eq!(cache.get(id).unwrap().color, PALETTE[2]);
        assert_eq!(cache.get(id).unwrap().image_url(), None);
    }

    #[test]
    fn test_file_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("covers")).unwrap();
        std::fs::write(dir.path().join("covers/a.png"), png_bytes()).unwrap();

        let source = FileTextureSource::new(dir.path());
        let image = load_texture(&source, "covers/a.png").unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(0, 0).0, [10, 20, 30, 255]);

        let image = load_texture(&source, "file:///covers/a.png").unwrap();
        assert_eq!(image.dimensions(), (4, 2));
    }

    #[test]
    fn test_missing_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileTextureSource::new(dir.path());
        assert!(matches!(
            load_texture(&source, "missing.png"),
            Err(TextureError::Fetch { .. })
        ));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        assert!(matches!(
            decode_texture(b"not an image"),
            Err(TextureError::Decode(_))
        ));
    }
}

use std::sync::Arc;

use crate::error::GeometryError;

/// Decoded RGBA8 image used as a diffuse map.
///
/// Decoding from disk is the asset loader's business; the renderer only ever
/// sees raw texels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl MaterialImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, GeometryError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(GeometryError::MaterialSize {
                width,
                height,
                len: pixels.len(),
                expected,
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// A 1×1 image of a single colour.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self { width: 1, height: 1, pixels: rgba.to_vec() }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// A named diffuse map.  Cheap to clone; the texels are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Arc<MaterialImage>,
}

impl Material {
    pub fn new(name: impl Into<String>, diffuse: Arc<MaterialImage>) -> Self {
        Self { name: name.into(), diffuse }
    }

    /// Convenience constructor for a flat-coloured material.
    pub fn solid(name: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self::new(name, Arc::new(MaterialImage::solid(rgba)))
    }
}

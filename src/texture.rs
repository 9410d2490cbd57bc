use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use wgpu::{Extent3d, ImageCopyTexture, ImageDataLayout, Origin3d, TextureAspect};

use crate::render::Gpu;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("atlas must be square, got {width}x{height}")]
    NotSquare { width: u32, height: u32 },
    #[error("expected {expected} bytes of rgba8 data, got {actual}")]
    BadLength { expected: usize, actual: usize },
}

/// Rgba8 pixels for a square glyph atlas.
pub struct Texture {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self, TextureError> {
        if width != height {
            return Err(TextureError::NotSquare { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TextureError::BadLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Couldn't load atlas {}", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let texture = Self::new(img.into_raw(), width, height)
            .with_context(|| format!("Bad atlas {}", path.display()))?;
        log::info!("loaded {}x{} atlas from {}", width, height, path.display());
        Ok(texture)
    }

    /// Side length of the atlas, used to normalise texture coordinates.
    pub fn dimension(&self) -> f32 {
        self.width as f32
    }

    pub fn extent(&self) -> Extent3d {
        Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Copies the pixels into `target`, which must be at least as large as this texture.
    pub fn write_to(&self, gpu: &Gpu, target: &wgpu::Texture) {
        gpu.queue.write_texture(
            ImageCopyTexture {
                texture: target,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            &self.data,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            self.extent(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn atlas_must_be_square() {
        assert_eq!(
            Texture::new(vec![0; 4 * 8 * 4], 8, 4).err(),
            Some(TextureError::NotSquare {
                width: 8,
                height: 4
            })
        );
    }

    #[test]
    fn pixel_data_must_fill_the_atlas() {
        assert_eq!(
            Texture::new(vec![0; 10], 2, 2).err(),
            Some(TextureError::BadLength {
                expected: 16,
                actual: 10
            })
        );
        let texture = Texture::new(vec![255; 16], 2, 2).unwrap();
        assert_eq!(texture.dimension(), 2.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Texture::from_path("does/not/exist.png").err().unwrap();
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}

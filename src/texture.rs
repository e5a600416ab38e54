//! Texture metadata probing and the placeholder synthesis seam

use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Default placeholder size when the template's dimensions are unknown.
pub const DEFAULT_PLACEHOLDER_SIZE: (u32, u32) = (1024, 1024);

/// Decoded metadata of one texture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    /// Pixel format name, e.g. `"Rgba8"`.
    pub color_type: String,
    pub has_alpha: bool,
}

/// Decode a texture and capture its dimensions, color mode, and alpha.
///
/// Decode failure is an error value, never a panic; the validator records it.
pub fn probe(path: &Path) -> Result<TextureInfo> {
    let img = image::open(path).map_err(|e| Error::TextureDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let color = img.color();
    Ok(TextureInfo {
        width: img.width(),
        height: img.height(),
        color_type: format!("{color:?}"),
        has_alpha: color.has_alpha(),
    })
}

/// Seam for producing stand-in textures when no template source exists.
///
/// Real generation backends live outside this crate; the default
/// implementation writes an obviously-fake placeholder.
pub trait TextureSynthesizer: Send + Sync {
    /// Write a texture of the given dimensions to `dest`.
    fn synthesize(&self, dest: &Path, width: u32, height: u32) -> Result<()>;
}

/// Default synthesizer: a transparent PNG with a red border.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSynthesizer;

impl TextureSynthesizer for PlaceholderSynthesizer {
    fn synthesize(&self, dest: &Path, width: u32, height: u32) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
        draw_border(&mut img, 10, 5, Rgba([255, 0, 0, 255]));

        img.save_with_format(dest, image::ImageFormat::Png)
            .map_err(|e| Error::PlaceholderSynthesis {
                path: dest.to_path_buf(),
                reason: e.to_string(),
            })?;
        info!(path = %dest.display(), width, height, "synthesized placeholder texture");
        Ok(())
    }
}

/// Draw a rectangular border inset from the image edges.
fn draw_border(img: &mut RgbaImage, inset: u32, thickness: u32, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    if w <= 2 * inset || h <= 2 * inset {
        return;
    }
    for y in inset..h - inset {
        for x in inset..w - inset {
            let on_edge = x < inset + thickness
                || x >= w - inset - thickness
                || y < inset + thickness
                || y >= h - inset - thickness;
            if on_edge {
                img.put_pixel(x, y, color);
            }
        }
    }
}

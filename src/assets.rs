use std::collections::HashMap;
use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::error::AssetError;
use crate::gpu::GpuContext;

/// Information about a single glyph in the font atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
    /// UV coordinates in the atlas (x, y, width, height) normalized to [0, 1].
    pub uv: [f32; 4],
    /// Size of the glyph in pixels.
    pub width: u32,
    pub height: u32,
    /// Offset from the cursor position to where the glyph should be drawn.
    pub offset_x: f32,
    pub offset_y: f32,
    /// How far to advance the cursor after this glyph.
    pub advance: f32,
}

/// Coverage bitmap with every printable ASCII glyph packed into rows.
#[derive(Debug)]
pub struct GlyphSheet {
    pub width: u32,
    pub height: u32,
    /// One byte of coverage per pixel.
    pub pixels: Vec<u8>,
    pub glyphs: HashMap<char, GlyphInfo>,
}

const PADDING: u32 = 1;

/// Row-pack `(char, metrics, bitmap)` triples into the smallest power-of-two
/// sheet (starting at 512×512) that holds them all.
pub fn pack_glyphs(rasterized: &[(char, fontdue::Metrics, Vec<u8>)]) -> GlyphSheet {
    let mut width = 512u32;
    let mut height = 512u32;
    while !fits(rasterized, width, height) {
        if width <= height {
            width *= 2;
        } else {
            height *= 2;
        }
    }

    let mut pixels = vec![0u8; (width * height) as usize];
    let mut glyphs = HashMap::with_capacity(rasterized.len());

    let mut x = PADDING;
    let mut y = PADDING;
    let mut row_height = 0u32;

    for (c, metrics, bitmap) in rasterized {
        let glyph_w = metrics.width as u32;
        let glyph_h = metrics.height as u32;

        if x + glyph_w + PADDING > width {
            x = PADDING;
            y += row_height + PADDING;
            row_height = 0;
        }

        for gy in 0..glyph_h {
            let src = (gy * glyph_w) as usize;
            let dst = ((y + gy) * width + x) as usize;
            pixels[dst..dst + glyph_w as usize].copy_from_slice(&bitmap[src..src + glyph_w as usize]);
        }

        glyphs.insert(
            *c,
            GlyphInfo {
                uv: [
                    x as f32 / width as f32,
                    y as f32 / height as f32,
                    glyph_w as f32 / width as f32,
                    glyph_h as f32 / height as f32,
                ],
                width: glyph_w,
                height: glyph_h,
                offset_x: metrics.xmin as f32,
                offset_y: metrics.ymin as f32,
                advance: metrics.advance_width,
            },
        );

        x += glyph_w + PADDING;
        row_height = row_height.max(glyph_h);
    }

    GlyphSheet {
        width,
        height,
        pixels,
        glyphs,
    }
}

fn fits(rasterized: &[(char, fontdue::Metrics, Vec<u8>)], width: u32, height: u32) -> bool {
    let mut x = PADDING;
    let mut y = PADDING;
    let mut row_height = 0u32;

    for (_, metrics, _) in rasterized {
        let glyph_w = metrics.width as u32;
        let glyph_h = metrics.height as u32;

        if x + glyph_w + PADDING > width {
            x = PADDING;
            y += row_height + PADDING;
            row_height = 0;
        }
        if y + glyph_h + PADDING > height {
            return false;
        }

        x += glyph_w + PADDING;
        row_height = row_height.max(glyph_h);
    }
    true
}

/// A font atlas containing pre-rasterized glyphs.
pub struct FontAtlas {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    line_height: f32,
}

impl FontAtlas {
    /// Load a TTF/OTF file and rasterize it at `size` pixels.
    pub fn from_file(gpu: &GpuContext, path: &Path, size: f32) -> Result<Self, AssetError> {
        let data = std::fs::read(path).map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|reason| {
            AssetError::Font {
                path: path.display().to_string(),
                reason,
            }
        })?;
        Ok(Self::new(gpu, &font, size))
    }

    /// Create a new font atlas from a parsed font.
    pub fn new(gpu: &GpuContext, font: &Font, size: f32) -> Self {
        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (32u8..=126u8)
            .map(|c| {
                let c = c as char;
                let (metrics, bitmap) = font.rasterize(c, size);
                (c, metrics, bitmap)
            })
            .collect();

        let sheet = pack_glyphs(&rasterized);
        let extent = wgpu::Extent3d {
            width: sheet.width,
            height: sheet.height,
            depth_or_array_layers: 1,
        };

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &sheet.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(sheet.width),
                rows_per_image: Some(sheet.height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let line_height = font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2);

        Self {
            texture,
            view,
            sampler,
            glyphs: sheet.glyphs,
            size,
            line_height,
        }
    }

    /// Get glyph info for a character.
    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    /// Get the font size this atlas was created with.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Get the line height for this font.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Measure the width of a string.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .filter_map(|c| self.glyphs.get(&c))
            .map(|g| g.advance)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(c: char, width: usize, height: usize) -> (char, fontdue::Metrics, Vec<u8>) {
        let metrics = fontdue::Metrics {
            width,
            height,
            advance_width: width as f32 + 1.0,
            ..Default::default()
        };
        (c, metrics, vec![255; width * height])
    }

    #[test]
    fn packs_glyphs_without_overlap() {
        let rasterized: Vec<_> = (0..40u8).map(|i| glyph((b'!' + i) as char, 20, 30)).collect();
        let sheet = pack_glyphs(&rasterized);
        assert_eq!((sheet.width, sheet.height), (512, 512));

        let rects: Vec<[u32; 4]> = sheet
            .glyphs
            .values()
            .map(|g| {
                let x = (g.uv[0] * sheet.width as f32).round() as u32;
                let y = (g.uv[1] * sheet.height as f32).round() as u32;
                [x, y, x + g.width, y + g.height]
            })
            .collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                let disjoint = a[2] <= b[0] || b[2] <= a[0] || a[3] <= b[1] || b[3] <= a[1];
                assert!(disjoint, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn grows_sheet_when_full() {
        let rasterized: Vec<_> = (0..64u8).map(|i| glyph((b'!' + i) as char, 100, 100)).collect();
        let sheet = pack_glyphs(&rasterized);
        assert!(sheet.width * sheet.height > 512 * 512);
        assert_eq!(sheet.glyphs.len(), 64);
        assert_eq!(sheet.pixels.len(), (sheet.width * sheet.height) as usize);
    }

    #[test]
    fn copies_coverage() {
        let sheet = pack_glyphs(&[glyph('A', 3, 2)]);
        let info = sheet.glyphs[&'A'];
        assert_eq!(info.advance, 4.0);
        let x = PADDING as usize;
        let row = PADDING as usize * sheet.width as usize;
        assert_eq!(&sheet.pixels[row + x..row + x + 3], &[255, 255, 255]);
        assert_eq!(sheet.pixels[row + x + 3], 0);
    }
}

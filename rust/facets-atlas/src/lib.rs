//! Sprite-atlas packing: merges many equally-sized PNG images into one
//! square-grid image addressed by input index.
//!
//! Sprite `i` of `n` lands in grid cell `(i mod size, i div size)` with
//! `size = ceil(sqrt(n))`, i.e. at pixel offset
//! `((i mod size) * w, (i div size) * h)`. Any consumer given `size`, `w`
//! and `h` can recompute offsets without further metadata. Sprites are never
//! resized; decoding normalizes every PNG color type to RGBA8, which is
//! format re-encoding, not resampling.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use facets_common::{Result, error::Error};

/// A packed sprite-sheet image. Trailing grid cells of a non-square sprite
/// count stay transparent (the canvas is zero-initialized).
#[derive(Debug, Clone)]
pub struct Atlas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    sprite_width: u32,
    sprite_height: u32,
    grid_size: u32,
}

impl Atlas {
    /// Atlas width in pixels (`grid_size * sprite_width`).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Atlas height in pixels (`grid_size * sprite_height`).
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sprite_width(&self) -> u32 {
        self.sprite_width
    }

    pub fn sprite_height(&self) -> u32 {
        self.sprite_height
    }

    /// Grid side length, `ceil(sqrt(sprite count))`.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Raw RGBA8 pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Encodes the atlas as a PNG file.
    pub fn write_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let context = path.display().to_string();
        let file = File::create(path).map_err(|e| Error::io(&context, e))?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::image(&context, e))?;
        writer
            .write_image_data(&self.pixels)
            .map_err(|e| Error::image(&context, e))?;
        Ok(())
    }
}

/// Packs the images at `paths` (in order) into one atlas.
///
/// Fails with an empty-atlas error when `paths` is empty, and with a
/// dimension-mismatch error naming the offending path and both dimension
/// pairs when any image differs from the first one. No partial atlas is
/// produced on failure.
pub fn build_atlas(paths: &[String]) -> Result<Atlas> {
    if paths.is_empty() {
        return Err(Error::empty_atlas());
    }

    let first = decode_png(&paths[0])?;
    let (sprite_width, sprite_height) = (first.width, first.height);
    let grid_size = (paths.len() as f64).sqrt().ceil() as u32;
    let width = grid_size * sprite_width;
    let height = grid_size * sprite_height;
    log::debug!(
        "packing {} sprites of {}x{} into a {}x{} grid",
        paths.len(),
        sprite_width,
        sprite_height,
        grid_size,
        grid_size
    );

    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    for (i, path) in paths.iter().enumerate() {
        let sprite = if i == 0 {
            first.clone()
        } else {
            decode_png(path)?
        };
        if sprite.width != sprite_width || sprite.height != sprite_height {
            return Err(Error::dimension_mismatch(
                path,
                (sprite_width, sprite_height),
                (sprite.width, sprite.height),
            ));
        }
        let cell_x = (i as u32 % grid_size) * sprite_width;
        let cell_y = (i as u32 / grid_size) * sprite_height;
        blit(&mut pixels, width, &sprite, cell_x, cell_y);
    }

    Ok(Atlas {
        pixels,
        width,
        height,
        sprite_width,
        sprite_height,
        grid_size,
    })
}

#[derive(Debug, Clone)]
struct Sprite {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

fn blit(canvas: &mut [u8], canvas_width: u32, sprite: &Sprite, x: u32, y: u32) {
    let row_bytes = sprite.width as usize * 4;
    for row in 0..sprite.height as usize {
        let src = row * row_bytes;
        let dst = ((y as usize + row) * canvas_width as usize + x as usize) * 4;
        canvas[dst..dst + row_bytes].copy_from_slice(&sprite.pixels[src..src + row_bytes]);
    }
}

fn decode_png(path: &str) -> Result<Sprite> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    // Expand palette/grayscale and strip 16-bit depth so that the output is
    // always one of the 8-bit color types handled below.
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(|e| Error::image(path, e))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| Error::image(path, e))?;
    buf.truncate(info.buffer_size());

    let pixel_count = info.width as usize * info.height as usize;
    let pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => {
            let mut rgba = Vec::with_capacity(pixel_count * 4);
            for px in buf.chunks_exact(3) {
                rgba.extend_from_slice(&[px[0], px[1], px[2], 0xff]);
            }
            rgba
        }
        png::ColorType::Grayscale => {
            let mut rgba = Vec::with_capacity(pixel_count * 4);
            for &g in &buf {
                rgba.extend_from_slice(&[g, g, g, 0xff]);
            }
            rgba
        }
        png::ColorType::GrayscaleAlpha => {
            let mut rgba = Vec::with_capacity(pixel_count * 4);
            for px in buf.chunks_exact(2) {
                rgba.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
            }
            rgba
        }
        png::ColorType::Indexed => {
            // normalize_to_color8 expands indexed images.
            return Err(Error::image(
                path,
                std::io::Error::other("unexpected indexed color after expansion"),
            ));
        }
    };

    Ok(Sprite {
        pixels,
        width: info.width,
        height: info.height,
    })
}

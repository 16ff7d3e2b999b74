//! PNG export for sprites and frame sequences

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::SpriteBuffer;
use crate::error::{GenError, Result};

/// Encode a sprite as an 8-bit RGBA PNG into any writer
pub fn encode_png<W: Write>(sprite: &SpriteBuffer, w: W) -> Result<()> {
    let mut encoder = png::Encoder::new(w, sprite.width, sprite.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    let mut writer = encoder.write_header().map_err(std::io::Error::other)?;
    writer
        .write_image_data(&sprite.pixels)
        .map_err(std::io::Error::other)?;
    Ok(())
}

/// Write a sprite to a PNG file
///
/// # Example
/// ```no_run
/// use spacegen::sprite::{SpriteBuffer, write_png};
/// use std::path::Path;
///
/// let sprite = SpriteBuffer::filled(16, 16, [255, 0, 0, 255]);
/// write_png(&sprite, Path::new("red.png")).unwrap();
/// ```
pub fn write_png(sprite: &SpriteBuffer, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    encode_png(sprite, BufWriter::new(file))
}

/// Lay frames out left to right in a single strip.
///
/// All frames must share one canvas size.
pub fn sprite_sheet(frames: &[SpriteBuffer]) -> Result<SpriteBuffer> {
    let Some(first) = frames.first() else {
        return Err(GenError::InvalidParameter("no frames to pack".into()));
    };
    let (w, h) = (first.width, first.height);
    if let Some(odd) = frames.iter().find(|f| f.width != w || f.height != h) {
        return Err(GenError::InvalidParameter(format!(
            "frame size {}x{} differs from {}x{}",
            odd.width, odd.height, w, h
        )));
    }

    let mut sheet = SpriteBuffer::new(w * frames.len() as u32, h);
    let row = (w * 4) as usize;
    let sheet_row = (sheet.width * 4) as usize;
    for (i, frame) in frames.iter().enumerate() {
        for y in 0..h as usize {
            let dst = y * sheet_row + i * row;
            sheet.pixels[dst..dst + row].copy_from_slice(&frame.pixels[y * row..(y + 1) * row]);
        }
    }
    Ok(sheet)
}

/// Pack frames into a strip and write it as one PNG
pub fn write_sprite_sheet(frames: &[SpriteBuffer], path: &Path) -> Result<()> {
    write_png(&sprite_sheet(frames)?, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprite.png");
        let sprite = SpriteBuffer::filled(8, 8, [10, 20, 30, 255]);
        write_png(&sprite, &path).unwrap();

        let decoder = png::Decoder::new(std::io::BufReader::new(File::open(&path).unwrap()));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 8);
        assert_eq!(reader.info().color_type, png::ColorType::Rgba);
    }

    #[test]
    fn test_sprite_sheet_layout() {
        let a = SpriteBuffer::filled(2, 2, [1, 1, 1, 255]);
        let b = SpriteBuffer::filled(2, 2, [2, 2, 2, 255]);
        let sheet = sprite_sheet(&[a, b]).unwrap();
        assert_eq!((sheet.width, sheet.height), (4, 2));
        assert_eq!(sheet.get_pixel(1, 1), [1, 1, 1, 255]);
        assert_eq!(sheet.get_pixel(2, 0), [2, 2, 2, 255]);
        assert_eq!(sheet.get_pixel(3, 1), [2, 2, 2, 255]);
    }

    #[test]
    fn test_sprite_sheet_rejects_mixed_sizes() {
        let frames = [SpriteBuffer::square(2), SpriteBuffer::square(3)];
        assert!(matches!(sprite_sheet(&frames), Err(GenError::InvalidParameter(_))));
        assert!(sprite_sheet(&[]).is_err());
    }
}

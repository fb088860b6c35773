//! Strip PNG fixture builders.

use stitch_codec::{ColorType, Compression, StripPng};

/// Raw filtered scanlines for a `width`×`height` RGBA strip filled with one
/// color: each row is a zero filter byte followed by `width` pixels.
#[must_use]
pub fn strip_raster(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let mut raster = Vec::with_capacity(height as usize * (width as usize * 4 + 1));
    for _ in 0..height {
        raster.push(0);
        for _ in 0..width {
            raster.extend_from_slice(&rgba);
        }
    }
    raster
}

/// A serialized, well-formed strip PNG filled with one color.
#[must_use]
pub fn strip_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let mut png = StripPng::new(width, height, 8, ColorType::Rgba);
    png.set_raster(&strip_raster(width, height, rgba), Compression::default())
        .expect("deflate of fixture raster");
    png.to_bytes().expect("serialize fixture PNG")
}

//! PNG encoding of the finished canvas.
//!
//! Maps with few distinct colors (flat fills, no anti-aliased text) are
//! written as indexed PNG (color type 3); everything else as RGBA (color
//! type 6). Canvas pixels are premultiplied and get demultiplied first.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use map_common::{MapError, MapResult};
use rayon::prelude::*;
use tiny_skia::Pixmap;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG
const MAX_PALETTE_SIZE: usize = 256;

/// Pixel count above which the color scan runs in parallel
const PARALLEL_THRESHOLD: usize = 64 * 64;

type Rgba = [u8; 4];

/// Encode a canvas, choosing indexed or RGBA output.
pub fn encode_pixmap(pixmap: &Pixmap) -> MapResult<Vec<u8>> {
    let rgba = straight_rgba(pixmap);
    let (width, height) = (pixmap.width() as usize, pixmap.height() as usize);
    match build_palette(&rgba) {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices),
        None => encode_rgba(&rgba, width, height),
    }
}

/// Encode and write to `path`.
pub fn save_png(pixmap: &Pixmap, path: impl AsRef<Path>) -> MapResult<()> {
    let bytes = encode_pixmap(pixmap)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Canvas pixels as straight (non-premultiplied) RGBA bytes.
fn straight_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.pixels().len() * 4);
    for p in pixmap.pixels() {
        let c = p.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Palette and per-pixel indices, or None with more than 256 colors.
fn build_palette(rgba: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let colors = if rgba.len() / 4 >= PARALLEL_THRESHOLD {
        distinct_colors_parallel(rgba)?
    } else {
        distinct_colors(rgba)?
    };

    let palette: Vec<Rgba> = colors.iter().map(|c| c.to_le_bytes()).collect();
    let lookup: HashMap<u32, u8> = colors
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, i as u8))
        .collect();

    let indices = rgba
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
        .collect();
    Some((palette, indices))
}

/// Distinct colors in first-seen order.
fn distinct_colors(rgba: &[u8]) -> Option<Vec<u32>> {
    let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
    let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
    for px in rgba.chunks_exact(4) {
        let c = pack(px);
        if seen.insert(c) {
            if colors.len() == MAX_PALETTE_SIZE {
                return None;
            }
            colors.push(c);
        }
    }
    Some(colors)
}

fn distinct_colors_parallel(rgba: &[u8]) -> Option<Vec<u32>> {
    let chunk = (rgba.len() / 4 / rayon::current_num_threads()).max(256) * 4;
    let per_chunk: Vec<Option<Vec<u32>>> = rgba.par_chunks(chunk).map(distinct_colors).collect();

    let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
    let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
    for part in per_chunk {
        for c in part? {
            if seen.insert(c) {
                if colors.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                colors.push(c);
            }
        }
    }
    Some(colors)
}

fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[Rgba],
    indices: &[u8],
) -> MapResult<Vec<u8>> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_rows(indices, width, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn encode_rgba(rgba: &[u8], width: usize, height: usize) -> MapResult<Vec<u8>> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, 6));
    write_chunk(&mut png, b"IDAT", &deflate_rows(rgba, width * 4, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn header(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    // bit depth, color type, compression, filter, interlace
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
    ihdr
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_rows(data: &[u8], row_bytes: usize, height: usize) -> MapResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (row_bytes + 1));
    for row in data.chunks_exact(row_bytes.max(1)).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let compress = || -> std::io::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
        encoder.write_all(&raw)?;
        encoder.finish()
    };
    compress().map_err(|e| MapError::EncodeError(format!("IDAT compression failed: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

//! Slider-captcha gap detection.
//!
//! The portal renders the puzzle gap as a transparent cut-out in an
//! otherwise opaque PNG, so the alpha channel alone separates the gap from
//! the background photo. The pipeline is: threshold the alpha channel, clean
//! speckle with a morphological opening, then take the first connected
//! region whose bounding box is gap-sized.

/// Alpha values at or below this are part of the cut-out.
const ALPHA_THRESHOLD: u8 = 200;

/// Exclusive bounds on the gap's bounding-box sides, in source pixels.
const MIN_SIDE: u32 = 40;
const MAX_SIDE: u32 = 75;

/// Binary image backed by a flat `bool` grid.
struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    /// 3x3 erosion. Out-of-bounds neighbors count as background, so the
    /// image border always erodes.
    fn erode(&self) -> Self {
        self.morph(|hits| hits == 9)
    }

    /// 3x3 dilation.
    fn dilate(&self) -> Self {
        self.morph(|hits| hits > 0)
    }

    fn morph(&self, keep: impl Fn(u8) -> bool) -> Self {
        let mut bits = vec![false; self.bits.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                let mut hits = 0u8;
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                        if nx >= 0
                            && ny >= 0
                            && (nx as usize) < self.width
                            && (ny as usize) < self.height
                            && self.get(nx as usize, ny as usize)
                        {
                            hits += 1;
                        }
                    }
                }
                bits[y * self.width + x] = keep(hits);
            }
        }
        Self {
            width: self.width,
            height: self.height,
            bits,
        }
    }
}

/// Axis-aligned bounding box of a connected region.
#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl BoundingBox {
    fn width(self) -> u32 {
        self.max_x - self.min_x + 1
    }

    fn height(self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Bounding boxes of all 4-connected foreground regions, in row-major
/// discovery order.
fn connected_regions(mask: &Mask) -> Vec<BoundingBox> {
    let mut visited = vec![false; mask.bits.len()];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for start_y in 0..mask.height {
        for start_x in 0..mask.width {
            let start = start_y * mask.width + start_x;
            if visited[start] || !mask.bits[start] {
                continue;
            }

            let mut bbox = BoundingBox {
                min_x: start_x as u32,
                min_y: start_y as u32,
                max_x: start_x as u32,
                max_y: start_y as u32,
            };
            visited[start] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                bbox.min_x = bbox.min_x.min(x as u32);
                bbox.max_x = bbox.max_x.max(x as u32);
                bbox.min_y = bbox.min_y.min(y as u32);
                bbox.max_y = bbox.max_y.max(y as u32);

                let mut neighbors = Vec::with_capacity(4);
                if x > 0 {
                    neighbors.push((x - 1, y));
                }
                if x + 1 < mask.width {
                    neighbors.push((x + 1, y));
                }
                if y > 0 {
                    neighbors.push((x, y - 1));
                }
                if y + 1 < mask.height {
                    neighbors.push((x, y + 1));
                }
                for (nx, ny) in neighbors {
                    let index = ny * mask.width + nx;
                    if mask.bits[index] && !visited[index] {
                        visited[index] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            regions.push(bbox);
        }
    }

    regions
}

/// Horizontal offset of the puzzle gap's left edge, in source-image pixels.
///
/// Returns `None` when the image carries no alpha channel or no region
/// matches the expected gap size.
///
/// # Errors
///
/// Returns [`image::ImageError`] when the bytes do not decode as an image.
pub fn locate_gap(png: &[u8]) -> Result<Option<u32>, image::ImageError> {
    let decoded = image::load_from_memory(png)?;
    if !decoded.color().has_alpha() {
        return Ok(None);
    }
    let rgba = decoded.to_rgba8();

    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    let bits = rgba
        .pixels()
        .map(|pixel| pixel.0[3] <= ALPHA_THRESHOLD)
        .collect();
    let mask = Mask {
        width,
        height,
        bits,
    };

    let opened = mask.erode().dilate();
    let gap = connected_regions(&opened).into_iter().find(|bbox| {
        bbox.width() > MIN_SIDE
            && bbox.width() < MAX_SIDE
            && bbox.height() > MIN_SIDE
            && bbox.height() < MAX_SIDE
    });

    Ok(gap.map(|bbox| bbox.min_x))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode_rgba(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Opaque 350x200 canvas with a transparent square punched at
    /// (`gap_x`, 60).
    fn captcha_with_gap(gap_x: u32, side: u32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(350, 200, Rgba([90, 120, 150, 255]));
        for y in 60..60 + side {
            for x in gap_x..gap_x + side {
                image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        image
    }

    #[test]
    fn should_locate_gap_left_edge() {
        let png = encode_rgba(&captcha_with_gap(120, 55));
        assert_eq!(locate_gap(&png).unwrap(), Some(120));
    }

    #[test]
    fn should_return_none_without_alpha_channel() {
        let image = RgbImage::from_pixel(350, 200, Rgb([90, 120, 150]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        assert_eq!(locate_gap(&bytes).unwrap(), None);
    }

    #[test]
    fn should_ignore_speckle_noise() {
        let mut image = captcha_with_gap(200, 50);
        // Isolated transparent pixels; the opening must wipe them out.
        for x in [5, 40, 90, 130, 310] {
            image.put_pixel(x, 10, Rgba([0, 0, 0, 0]));
        }
        let png = encode_rgba(&image);
        assert_eq!(locate_gap(&png).unwrap(), Some(200));
    }

    #[test]
    fn should_reject_regions_outside_the_expected_size() {
        // 20x20 is too small, 100x100 is too big.
        let mut image = RgbaImage::from_pixel(350, 200, Rgba([90, 120, 150, 255]));
        for y in 10..30 {
            for x in 10..30 {
                image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        for y in 50..150 {
            for x in 200..300 {
                image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        let png = encode_rgba(&image);
        assert_eq!(locate_gap(&png).unwrap(), None);
    }

    #[test]
    fn should_reject_garbage_bytes() {
        assert!(locate_gap(b"not a png").is_err());
    }
}

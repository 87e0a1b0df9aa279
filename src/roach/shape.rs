use glam::{IVec2, Vec2};

use super::heading::{HeadingTable, Orientation};

/// Splat bitmap extent.
pub const SPLAT_SIZE: IVec2 = IVec2::new(48, 48);

/// 1-bit image, one bool per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    bits: Vec<bool>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize) {
        self.bits[y * self.width + x] = true;
    }

    #[cfg(test)]
    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Pack into the layout an X server expects for a depth-1 image: each row
    /// padded to `scanline_pad` bits, bits within a byte in the given order.
    pub fn pack(&self, scanline_pad: usize, lsb_first: bool) -> Vec<u8> {
        let pad = scanline_pad.max(8);
        let stride = self.width.div_ceil(pad) * pad / 8;
        let mut out = vec![0u8; stride * self.height];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    let bit = if lsb_first { x % 8 } else { 7 - x % 8 };
                    out[y * stride + x / 8] |= 1 << bit;
                }
            }
        }
        out
    }
}

/// Distance from `p` to the segment `a`–`b`.
fn segment_dist(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let t = ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}

fn in_ellipse(p: Vec2, center: Vec2, radii: Vec2) -> bool {
    let d = (p - center) / radii;
    d.length_squared() <= 1.0
}

/// Whether body-local point `p` (x forward, y across) is part of the roach.
fn roach_covers(p: Vec2) -> bool {
    const LEG_HALF_WIDTH: f32 = 0.75;
    // (hip along body, foot along body)
    const LEGS: [(f32, f32); 3] = [(7.0, 13.0), (3.0, 1.0), (-1.0, -11.0)];

    if in_ellipse(p, Vec2::new(-6.0, 0.0), Vec2::new(13.0, 7.0))
        || in_ellipse(p, Vec2::new(9.0, 0.0), Vec2::new(5.0, 5.5))
        || in_ellipse(p, Vec2::new(15.5, 0.0), Vec2::new(3.5, 4.0))
    {
        return true;
    }

    let side = p.y.signum();
    for (hip, foot) in LEGS {
        let a = Vec2::new(hip, 4.0 * side);
        let b = Vec2::new(foot, 11.0 * side);
        if segment_dist(p, a, b) <= LEG_HALF_WIDTH {
            return true;
        }
    }
    segment_dist(p, Vec2::new(17.5, 2.0 * side), Vec2::new(21.5, 8.0 * side)) <= LEG_HALF_WIDTH
}

/// Render the roach rotated to `orientation`, filling exactly its box.
pub fn roach_bitmap(orientation: &Orientation) -> Bitmap {
    let size = orientation.size;
    let mut bitmap = Bitmap::new(size.x as usize, size.y as usize);
    let center = size.as_vec2() * 0.5;
    let (cos, sin) = (orientation.dir.x, orientation.dir.y);

    for y in 0..bitmap.height {
        for x in 0..bitmap.width {
            // Screen Y grows downward, so flip it before undoing the rotation.
            let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
            let (sx, sy) = (d.x, -d.y);
            let local = Vec2::new(sx * cos + sy * sin, -sx * sin + sy * cos);
            if roach_covers(local) {
                bitmap.set(x, y);
            }
        }
    }
    bitmap
}

/// One bitmap per heading, indexed like the table.
pub fn roach_bitmaps(table: &HeadingTable) -> Vec<Bitmap> {
    table.iter().map(roach_bitmap).collect()
}

/// Irregular blob with a few droplets around it.
pub fn splat_bitmap() -> Bitmap {
    let mut bitmap = Bitmap::new(SPLAT_SIZE.x as usize, SPLAT_SIZE.y as usize);
    let center = SPLAT_SIZE.as_vec2() * 0.5;
    let droplets = [
        (Vec2::new(-17.0, -15.0), 2.5),
        (Vec2::new(18.0, -9.0), 2.0),
        (Vec2::new(-14.0, 17.0), 2.0),
        (Vec2::new(15.0, 16.0), 3.0),
    ];

    for y in 0..bitmap.height {
        for x in 0..bitmap.width {
            let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
            let theta = d.y.atan2(d.x);
            let edge = 12.0 + 3.5 * (5.0 * theta).sin() + 1.5 * (3.0 * theta + 1.0).sin();
            if d.length() <= edge || droplets.iter().any(|&(c, r)| d.distance(c) <= r) {
                bitmap.set(x, y);
            }
        }
    }
    bitmap
}

use glam::{IVec2, Vec2};

/// Number of pre-rotated orientations.
pub const HEADINGS: usize = 24;
/// Angle between neighbouring headings.
pub const HEADING_STEP: f32 = std::f32::consts::TAU / HEADINGS as f32;

/// Roach length along its heading, legs and antennae included.
pub const BODY_LENGTH: f32 = 44.0;
/// Roach width across its heading, legs included.
pub const BODY_WIDTH: f32 = 24.0;

/// One discretized heading.
#[derive(Debug, Clone, Copy)]
pub struct Orientation {
    /// `(cos, sin)` of the counter-clockwise rotation from "facing right".
    /// Screen movement subtracts the `y` part.
    pub dir: Vec2,
    /// Axis-aligned bounding box of the rotated body.
    pub size: IVec2,
}

/// Headings and their box sizes, computed once at startup.
#[derive(Debug, Clone)]
pub struct HeadingTable {
    entries: [Orientation; HEADINGS],
}

impl HeadingTable {
    pub fn new() -> Self {
        let entries = std::array::from_fn(|i| {
            let angle = i as f32 * HEADING_STEP;
            let (sin, cos) = angle.sin_cos();
            let w = BODY_LENGTH * cos.abs() + BODY_WIDTH * sin.abs();
            let h = BODY_LENGTH * sin.abs() + BODY_WIDTH * cos.abs();
            Orientation {
                dir: Vec2::new(cos, sin),
                size: IVec2::new(snap_up(w), snap_up(h)),
            }
        });
        Self { entries }
    }

    pub fn get(&self, heading: usize) -> &Orientation {
        &self.entries[heading]
    }

    pub fn size(&self, heading: usize) -> IVec2 {
        self.entries[heading].size
    }

    pub fn iter(&self) -> impl Iterator<Item = &Orientation> {
        self.entries.iter()
    }
}

impl Default for HeadingTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Ceil, ignoring float noise from `sin_cos` at right angles.
fn snap_up(v: f32) -> i32 {
    (v - 1e-3).ceil() as i32
}

/// Rotate `heading` by `steps` slots, counter-clockwise when `left`.
/// Always lands in `[0, HEADINGS)`.
pub fn rotate(heading: usize, steps: i32, left: bool) -> usize {
    let delta = if left { steps } else { -steps };
    (heading as i32 + delta).rem_euclid(HEADINGS as i32) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxes_follow_rotation() {
        let table = HeadingTable::new();
        assert_eq!(table.size(0), IVec2::new(44, 24));
        assert_eq!(table.size(6), IVec2::new(24, 44));
        // Diagonals are the widest.
        assert!(table.size(3).x > table.size(0).x);
        for o in table.iter() {
            assert!((o.dir.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn rotate_wraps_both_ways() {
        assert_eq!(rotate(23, 1, true), 0);
        assert_eq!(rotate(22, 3, true), 1);
        assert_eq!(rotate(0, 1, false), 23);
        assert_eq!(rotate(1, 3, false), 22);
        for h in 0..HEADINGS {
            for steps in 1..=3 {
                assert!(rotate(h, steps, true) < HEADINGS);
                assert!(rotate(h, steps, false) < HEADINGS);
            }
        }
    }
}

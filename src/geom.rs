use glam::IVec2;

/// Axis-aligned integer rectangle in screen pixels. Half-open: covers
/// `[x, x + w) × [y, y + h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle anchored at `pos` with extent `size`.
    pub fn at(pos: IVec2, size: IVec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.w as i64 * self.h as i64
        }
    }

    #[cfg(test)]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 > x0 && y1 > y0 {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }

    /// `self − other` as up to four disjoint pieces: full-width bands above
    /// and below the overlap, then the left and right slivers beside it.
    pub fn subtract(&self, other: &Rect, out: &mut Vec<Rect>) {
        let Some(hole) = self.intersect(other) else {
            if !self.is_empty() {
                out.push(*self);
            }
            return;
        };

        if hole.y > self.y {
            out.push(Rect::new(self.x, self.y, self.w, hole.y - self.y));
        }
        if hole.bottom() < self.bottom() {
            out.push(Rect::new(self.x, hole.bottom(), self.w, self.bottom() - hole.bottom()));
        }
        if hole.x > self.x {
            out.push(Rect::new(self.x, hole.y, hole.x - self.x, hole.h));
        }
        if hole.right() < self.right() {
            out.push(Rect::new(hole.right(), hole.y, self.right() - hole.right(), hole.h));
        }
    }
}

/// How a rectangle relates to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// No pixel of the rectangle is in the region.
    Out,
    /// Every pixel of the rectangle is in the region.
    In,
    Partial,
}

/// A set of pixels stored as pairwise-disjoint rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Self { rects: Vec::new() }
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.union_rect(rect);
        region
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn area(&self) -> i64 {
        self.rects.iter().map(Rect::area).sum()
    }

    /// Add `rect` to the region. Only the parts not already covered are
    /// stored, so the rectangles stay disjoint.
    pub fn union_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut pieces = vec![rect];
        let mut scratch = Vec::with_capacity(4);
        for existing in &self.rects {
            scratch.clear();
            for piece in &pieces {
                piece.subtract(existing, &mut scratch);
            }
            std::mem::swap(&mut pieces, &mut scratch);
            if pieces.is_empty() {
                return;
            }
        }
        self.rects.extend(pieces);
    }

    /// Remove every pixel of `other` from the region.
    pub fn subtract(&mut self, other: &Region) {
        let mut scratch = Vec::with_capacity(self.rects.len() * 2);
        for hole in &other.rects {
            scratch.clear();
            for rect in &self.rects {
                rect.subtract(hole, &mut scratch);
            }
            std::mem::swap(&mut self.rects, &mut scratch);
            if self.rects.is_empty() {
                return;
            }
        }
    }

    #[cfg(test)]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains_point(x, y))
    }

    /// Classify `rect` against the region. Disjoint storage means the
    /// covered area is a plain sum of intersections.
    pub fn rect_in(&self, rect: &Rect) -> Overlap {
        if rect.is_empty() {
            return Overlap::Out;
        }
        let covered: i64 = self
            .rects
            .iter()
            .filter_map(|r| r.intersect(rect))
            .map(|r| r.area())
            .sum();
        if covered == 0 {
            Overlap::Out
        } else if covered == rect.area() {
            Overlap::In
        } else {
            Overlap::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disjoint(region: &Region) -> bool {
        let rects = region.rects();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                if a.intersect(b).is_some() {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn subtract_rect_pieces_cover_the_rest() {
        let outer = Rect::new(0, 0, 10, 10);
        let mut pieces = Vec::new();
        outer.subtract(&Rect::new(3, 3, 4, 4), &mut pieces);
        assert_eq!(pieces.len(), 4);
        let total: i64 = pieces.iter().map(Rect::area).sum();
        assert_eq!(total, 100 - 16);
    }

    #[test]
    fn overlapping_unions_stay_disjoint() {
        let mut region = Region::new();
        region.union_rect(Rect::new(0, 0, 50, 50));
        region.union_rect(Rect::new(25, 25, 50, 50));
        region.union_rect(Rect::new(10, 10, 5, 5));
        assert!(disjoint(&region));
        assert_eq!(region.area(), 2500 + 2500 - 625);
    }

    #[test]
    fn surface_minus_covers_matches_sample_grid() {
        let surface = Rect::new(0, 0, 320, 200);
        let covers = [
            Rect::new(10, 10, 100, 40),
            Rect::new(60, 30, 90, 90),
            Rect::new(-20, 150, 80, 100),
            Rect::new(300, -5, 40, 40),
            Rect::new(200, 100, 0, 50),
        ];

        let mut covered = Region::new();
        for r in covers {
            covered.union_rect(r);
        }
        let mut visible = Region::from_rect(surface);
        visible.subtract(&covered);
        assert!(disjoint(&visible));

        for y in (-10..210).step_by(3) {
            for x in (-10..330).step_by(3) {
                let expected =
                    surface.contains_point(x, y) && !covers.iter().any(|r| r.contains_point(x, y));
                assert_eq!(visible.contains_point(x, y), expected, "sample ({x}, {y})");
            }
        }
    }

    #[test]
    fn rect_in_reports_out_in_partial() {
        let mut visible = Region::from_rect(Rect::new(0, 0, 100, 100));
        visible.subtract(&Region::from_rect(Rect::new(0, 0, 100, 50)));

        assert_eq!(visible.rect_in(&Rect::new(10, 10, 20, 20)), Overlap::Out);
        assert_eq!(visible.rect_in(&Rect::new(10, 60, 20, 20)), Overlap::In);
        assert_eq!(visible.rect_in(&Rect::new(10, 40, 20, 20)), Overlap::Partial);
    }

    #[test]
    fn fully_covered_surface_is_empty() {
        let mut visible = Region::from_rect(Rect::new(0, 0, 64, 64));
        visible.subtract(&Region::from_rect(Rect::new(-1, -1, 100, 100)));
        assert!(visible.is_empty());
        assert_eq!(visible.rect_in(&Rect::new(0, 0, 8, 8)), Overlap::Out);
    }
}

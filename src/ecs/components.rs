use glam::{IVec2, Vec2};

/// Top-left corner of the roach's box in surface pixels, sub-pixel precise.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

/// Orientation slots into the heading table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading {
    /// Where the roach is pointing now. Movement uses this.
    pub current: usize,
    /// Orientation used by the last render pass.
    pub drawn: usize,
}

impl Heading {
    pub fn new(heading: usize) -> Self {
        Self {
            current: heading,
            drawn: heading,
        }
    }

    /// The last turn has been rendered, so another one may start.
    pub fn is_settled(&self) -> bool {
        self.current == self.drawn
    }
}

/// Turn bias and countdown until the next turn decision.
#[derive(Debug, Clone, Copy)]
pub struct Turning {
    /// Turn counter-clockwise (heading index up) when true.
    pub left: bool,
    /// Ticks until the bias is reconsidered.
    pub steps: i32,
}

/// Last rendered top-left. `None` until drawn in the current visibility
/// episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drawn(pub Option<IVec2>);

/// Entirely under other windows. Hidden roaches neither move nor draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hidden(pub bool);

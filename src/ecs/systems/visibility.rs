use crate::ecs::components::{Drawn, Heading, Hidden};
use crate::geom::{Overlap, Rect};
use crate::occlusion::Occlusion;
use crate::roach::heading::HeadingTable;

/// Mark roaches whose last drawn box is entirely under other windows as
/// hidden. Returns how many are still visible.
///
/// Without a current visible region nothing can be decided, so every roach
/// is treated as visible until the next successful rebuild.
pub fn classify(world: &mut hecs::World, table: &HeadingTable, occlusion: &Occlusion) -> usize {
    let Some(visible) = occlusion.visible() else {
        return reveal_all(world);
    };

    let mut count = 0;
    for (_, (heading, drawn, hidden)) in world.query_mut::<(&Heading, &Drawn, &mut Hidden)>() {
        if hidden.0 {
            continue;
        }
        if let Some(at) = drawn.0 {
            let rect = Rect::at(at, table.size(heading.drawn));
            if visible.rect_in(&rect) == Overlap::Out {
                hidden.0 = true;
                continue;
            }
        }
        count += 1;
    }
    count
}

/// Clear every hidden flag. Returns the population.
pub fn reveal_all(world: &mut hecs::World) -> usize {
    let mut count = 0;
    for (_, hidden) in world.query_mut::<&mut Hidden>() {
        hidden.0 = false;
        count += 1;
    }
    count
}

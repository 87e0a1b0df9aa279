use crate::ecs::components::{Drawn, Heading, Hidden, Position};
use crate::platform::{PlatformError, Renderer};
use crate::roach::heading::HeadingTable;

/// Erase last frame's boxes, then draw every visible roach at its current
/// position and heading.
///
/// All erasing happens before any drawing so one roach's clear can't wipe a
/// neighbour that was already redrawn this frame. Hidden roaches lose their
/// drawn box; whatever covers them already hides the old image.
pub fn render<R: Renderer + ?Sized>(
    world: &mut hecs::World,
    table: &HeadingTable,
    renderer: &mut R,
) -> Result<(), PlatformError> {
    for (_, (heading, drawn, hidden)) in world.query_mut::<(&Heading, &mut Drawn, &Hidden)>() {
        if hidden.0 {
            drawn.0 = None;
        } else if let Some(prev) = drawn.0 {
            renderer.clear_box(prev, table.size(heading.drawn))?;
        }
    }

    for (_, (pos, heading, drawn, hidden)) in
        world.query_mut::<(&Position, &mut Heading, &mut Drawn, &Hidden)>()
    {
        if hidden.0 {
            continue;
        }
        let at = pos.0.floor().as_ivec2();
        heading.drawn = heading.current;
        drawn.0 = Some(at);
        renderer.draw_roach(at, heading.current)?;
    }
    Ok(())
}

use glam::IVec2;

use crate::ecs::components::{Drawn, Heading};
use crate::platform::{PlatformError, Renderer};
use crate::roach::heading::HeadingTable;

/// Squish every roach whose last drawn box strictly contains `(x, y)`.
///
/// Each hit is replaced by a splat at its drawn position and despawned.
/// Overlapping roaches under the same click all go. Returns how many were
/// removed.
pub fn squish<R: Renderer + ?Sized>(
    world: &mut hecs::World,
    table: &HeadingTable,
    click: IVec2,
    renderer: &mut R,
    hits: &mut Vec<(hecs::Entity, IVec2)>,
) -> Result<usize, PlatformError> {
    hits.clear();
    for (entity, (heading, drawn)) in world.query::<(&Heading, &Drawn)>().iter() {
        let Some(at) = drawn.0 else {
            continue;
        };
        let far = at + table.size(heading.drawn);
        if click.x > at.x && click.x < far.x && click.y > at.y && click.y < far.y {
            hits.push((entity, at));
        }
    }

    for &(entity, at) in hits.iter() {
        renderer.draw_splat(at)?;
        // Collected from a live query just above, so it still exists.
        let _ = world.despawn(entity);
        log::debug!("squished roach at {at}");
    }
    Ok(hits.len())
}

pub mod heading;
pub mod shape;

use glam::Vec2;

use crate::config::SimConfig;
use crate::ecs::components::*;
use crate::geom::Rect;
use heading::{HeadingTable, HEADINGS};

/// Spawn one roach unless the population is at capacity.
///
/// The roach gets a random heading, and a random position such that its box
/// for that heading fits on `surface`.
pub fn spawn_roach(
    world: &mut hecs::World,
    table: &HeadingTable,
    config: &SimConfig,
    surface: Rect,
    rng: &mut fastrand::Rng,
) -> Option<hecs::Entity> {
    if world.len() as usize >= config.population {
        return None;
    }

    let heading = rng.usize(0..HEADINGS);
    let size = table.size(heading);
    let x = surface.x + rng.i32(0..(surface.w - size.x).max(1));
    let y = surface.y + rng.i32(0..(surface.h - size.y).max(1));

    Some(world.spawn((
        Position(Vec2::new(x as f32, y as f32)),
        Heading::new(heading),
        Turning {
            left: rng.bool(),
            steps: rng.i32(0..config.turn_steps()),
        },
        Drawn(None),
        Hidden(false),
    )))
}

/// Fill the world up to the configured population.
pub fn spawn_roaches(
    world: &mut hecs::World,
    table: &HeadingTable,
    config: &SimConfig,
    surface: Rect,
    rng: &mut fastrand::Rng,
) {
    while spawn_roach(world, table, config, surface, rng).is_some() {}
}

use glam::{IVec2, Vec2};

use crate::config::SimConfig;
use crate::ecs::components::{Heading, Hidden, Position, Turning};
use crate::geom::Rect;
use crate::roach::heading::{rotate, HeadingTable};

/// Chance, each time the turn countdown runs out, that the turn bias flips.
/// Without it roaches just run in circles.
const FLIP_CHANCE: f32 = 0.2;
/// Largest heading change in one turn, in table slots.
const MAX_TURN_SLOTS: i32 = 3;

/// Shared inputs for one movement pass.
pub struct Motion<'a> {
    pub table: &'a HeadingTable,
    pub surface: Rect,
    pub config: &'a SimConfig,
}

/// Whether a box of `size` at `pos` (floored to pixels) lies on `surface`.
pub fn fits(surface: Rect, pos: Vec2, size: IVec2) -> bool {
    surface.contains_rect(&Rect::at(pos.floor().as_ivec2(), size))
}

/// Advance every roach that isn't hidden by one tick.
pub fn advance_all(world: &mut hecs::World, motion: &Motion, rng: &mut fastrand::Rng) {
    for (_, (pos, heading, turning, hidden)) in
        world.query_mut::<(&mut Position, &mut Heading, &mut Turning, &Hidden)>()
    {
        if hidden.0 {
            continue;
        }
        advance(pos, heading, turning, motion, rng);
    }
}

/// Step one roach along its heading.
///
/// If the step would leave the surface the roach stays put and turns
/// instead, leaving its countdown alone.
pub fn advance(
    pos: &mut Position,
    heading: &mut Heading,
    turning: &mut Turning,
    motion: &Motion,
    rng: &mut fastrand::Rng,
) {
    let orientation = motion.table.get(heading.current);
    // Headings run counter-clockwise but screen Y grows downward.
    let step = Vec2::new(orientation.dir.x, -orientation.dir.y) * motion.config.speed;
    let candidate = pos.0 + step;

    if !fits(motion.surface, candidate, orientation.size) {
        turn(pos, heading, turning.left, motion, rng);
        return;
    }

    pos.0 = candidate;
    let expired = turning.steps <= 0;
    turning.steps -= 1;
    if expired {
        turn(pos, heading, turning.left, motion, rng);
        turning.steps = rng.i32(0..motion.config.turn_steps());
        if rng.f32() < FLIP_CHANCE {
            turning.left = !turning.left;
        }
    }
}

/// Swing the heading 1–3 slots toward `left`.
///
/// No-op until the previous turn has been drawn, so a roach blocked at an
/// edge doesn't spin through several headings between frames. The position
/// is pulled back onto the surface if the new orientation's box is bigger.
pub fn turn(
    pos: &mut Position,
    heading: &mut Heading,
    left: bool,
    motion: &Motion,
    rng: &mut fastrand::Rng,
) {
    if !heading.is_settled() {
        return;
    }
    heading.current = rotate(heading.current, rng.i32(1..=MAX_TURN_SLOTS), left);

    let size = motion.table.size(heading.current);
    let surface = motion.surface;
    let max = Vec2::new(
        (surface.right() - size.x).max(surface.x) as f32,
        (surface.bottom() - size.y).max(surface.y) as f32,
    );
    pos.0 = pos.0.min(max).max(Vec2::new(surface.x as f32, surface.y as f32));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roach::heading::HEADINGS;

    fn turning(left: bool, steps: i32) -> Turning {
        Turning { left, steps }
    }

    #[test]
    fn moves_along_heading_with_screen_y_flipped() {
        let table = HeadingTable::new();
        let config = SimConfig::default();
        let motion = Motion { table: &table, surface: Rect::new(0, 0, 1000, 1000), config: &config };
        let mut rng = fastrand::Rng::with_seed(1);

        // Heading 6 is 90°: straight up the screen.
        let mut pos = Position(Vec2::new(500.0, 500.0));
        let mut heading = Heading::new(6);
        let mut t = turning(true, 5);
        advance(&mut pos, &mut heading, &mut t, &motion, &mut rng);
        assert!((pos.0.x - 500.0).abs() < 1e-3);
        assert!((pos.0.y - 480.0).abs() < 1e-3);
        assert_eq!(t.steps, 4);
        assert_eq!(heading.current, 6);
    }

    #[test]
    fn blocked_step_turns_without_moving_or_counting() {
        let table = HeadingTable::new();
        let config = SimConfig::default();
        let motion = Motion { table: &table, surface: Rect::new(0, 0, 200, 200), config: &config };
        let mut rng = fastrand::Rng::with_seed(2);

        // Facing right, flush against the right edge.
        let start = Vec2::new((200 - table.size(0).x) as f32, 80.0);
        let mut pos = Position(start);
        let mut heading = Heading::new(0);
        let mut t = turning(true, 7);
        advance(&mut pos, &mut heading, &mut t, &motion, &mut rng);

        assert_eq!(t.steps, 7);
        assert!((1..=3).contains(&heading.current));
        let size = table.size(heading.current);
        assert!(fits(motion.surface, pos.0, size));

        // Only the clamp moves it: back off the right edge by exactly the
        // growth of the box, and not at all vertically.
        assert_eq!(pos.0.y, start.y);
        assert_eq!(start.x - pos.0.x, (size.x - table.size(0).x) as f32);
        assert_eq!(pos.0.x, (200 - size.x) as f32);
    }

    #[test]
    fn blocked_step_away_from_the_clamped_edge_stays_put() {
        let table = HeadingTable::new();
        let config = SimConfig::default();
        let motion = Motion { table: &table, surface: Rect::new(0, 0, 400, 400), config: &config };
        let mut rng = fastrand::Rng::with_seed(9);

        // Facing left against the left edge: every new box still fits where
        // it is, so nothing moves at all.
        let start = Vec2::new(0.0, 150.0);
        let mut pos = Position(start);
        let mut heading = Heading::new(12);
        let mut t = turning(false, 4);
        advance(&mut pos, &mut heading, &mut t, &motion, &mut rng);

        assert_eq!(t.steps, 4);
        assert!((9..=11).contains(&heading.current));
        assert_eq!(pos.0, start);
    }

    #[test]
    fn expired_countdown_turns_and_reseeds() {
        let table = HeadingTable::new();
        let config = SimConfig::default();
        let motion = Motion { table: &table, surface: Rect::new(0, 0, 1000, 1000), config: &config };
        let mut rng = fastrand::Rng::with_seed(3);

        let mut pos = Position(Vec2::new(400.0, 400.0));
        let mut heading = Heading::new(12);
        let mut t = turning(false, 0);
        advance(&mut pos, &mut heading, &mut t, &motion, &mut rng);

        assert!((9..=11).contains(&heading.current));
        assert!((0..config.turn_steps()).contains(&t.steps));
    }

    #[test]
    fn turn_is_ignored_until_previous_turn_is_drawn() {
        let table = HeadingTable::new();
        let config = SimConfig::default();
        let motion = Motion { table: &table, surface: Rect::new(0, 0, 500, 500), config: &config };
        let mut rng = fastrand::Rng::with_seed(4);

        let mut pos = Position(Vec2::new(100.0, 100.0));
        let mut heading = Heading { current: 5, drawn: 4 };
        turn(&mut pos, &mut heading, true, &motion, &mut rng);
        assert_eq!(heading, Heading { current: 5, drawn: 4 });

        heading.drawn = heading.current;
        turn(&mut pos, &mut heading, true, &motion, &mut rng);
        assert_ne!(heading.current, 5);
    }

    #[test]
    fn turns_wrap_around_the_table() {
        let table = HeadingTable::new();
        let config = SimConfig::default();
        let motion = Motion { table: &table, surface: Rect::new(0, 0, 500, 500), config: &config };
        let mut rng = fastrand::Rng::with_seed(5);

        for _ in 0..200 {
            let mut pos = Position(Vec2::new(200.0, 200.0));
            let mut left = Heading::new(HEADINGS - 1);
            turn(&mut pos, &mut left, true, &motion, &mut rng);
            assert!(left.current < 3);

            let mut right = Heading::new(0);
            turn(&mut pos, &mut right, false, &motion, &mut rng);
            assert!(right.current >= HEADINGS - 3 && right.current < HEADINGS);
        }
    }

    #[test]
    fn boxes_stay_on_surface_over_many_ticks() {
        let table = HeadingTable::new();
        let config = SimConfig {
            population: 50,
            speed: 13.5,
            squish: false,
        };
        let surface = Rect::new(0, 0, 400, 300);
        let motion = Motion { table: &table, surface, config: &config };
        let mut rng = fastrand::Rng::with_seed(6);

        let mut world = hecs::World::new();
        crate::roach::spawn_roaches(&mut world, &table, &config, surface, &mut rng);

        for tick in 0..2_000 {
            advance_all(&mut world, &motion, &mut rng);
            // Every other tick stands in for a render pass.
            if tick % 2 == 0 {
                for (_, heading) in world.query_mut::<&mut Heading>() {
                    heading.drawn = heading.current;
                }
            }
            for (_, (pos, heading)) in world.query::<(&Position, &Heading)>().iter() {
                assert!(
                    fits(surface, pos.0, table.size(heading.current)),
                    "tick {tick}: {:?} heading {}",
                    pos.0,
                    heading.current
                );
            }
        }
    }

    #[test]
    fn hidden_roaches_do_not_move() {
        let table = HeadingTable::new();
        let config = SimConfig::default();
        let motion = Motion { table: &table, surface: Rect::new(0, 0, 800, 600), config: &config };
        let mut rng = fastrand::Rng::with_seed(8);

        let mut world = hecs::World::new();
        let e = world.spawn((
            Position(Vec2::new(300.0, 300.0)),
            Heading::new(0),
            turning(true, 5),
            Hidden(true),
        ));
        advance_all(&mut world, &motion, &mut rng);
        let pos = world.get::<&Position>(e).unwrap();
        assert_eq!(pos.0, Vec2::new(300.0, 300.0));
    }
}

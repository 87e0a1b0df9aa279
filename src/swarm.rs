use glam::IVec2;

use crate::config::SimConfig;
use crate::ecs::systems::movement::Motion;
use crate::ecs::systems::{draw, movement, squish, visibility};
use crate::geom::Rect;
use crate::occlusion::{Occlusion, Rebuild};
use crate::platform::{PlatformError, Renderer, WindowSource};
use crate::roach;
use crate::roach::heading::HeadingTable;

/// The whole simulation: roaches, their heading table, the occlusion cache
/// and the RNG. Owned by the driving loop; nothing here is global.
pub struct Swarm {
    world: hecs::World,
    headings: HeadingTable,
    occlusion: Occlusion,
    config: SimConfig,
    surface: Rect,
    rng: fastrand::Rng,
    // Reused across clicks.
    hits: Vec<(hecs::Entity, IVec2)>,
}

impl Swarm {
    pub fn new(config: SimConfig, surface: Rect, rng: fastrand::Rng) -> Self {
        Self {
            world: hecs::World::new(),
            headings: HeadingTable::new(),
            occlusion: Occlusion::new(),
            config,
            surface,
            rng,
            hits: Vec::new(),
        }
    }

    /// Spawn roaches up to the configured population.
    pub fn populate(&mut self) {
        roach::spawn_roaches(
            &mut self.world,
            &self.headings,
            &self.config,
            self.surface,
            &mut self.rng,
        );
    }

    pub fn population(&self) -> usize {
        self.world.len() as usize
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn headings(&self) -> &HeadingTable {
        &self.headings
    }

    #[cfg(test)]
    pub fn occlusion(&self) -> &Occlusion {
        &self.occlusion
    }

    #[cfg(test)]
    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    /// The window stack changed; the visible region must be rebuilt.
    pub fn invalidate(&mut self) {
        self.occlusion.invalidate();
    }

    /// Rebuild the visible region if it is stale, then classify roaches.
    /// Returns the number still visible.
    pub fn refresh_visibility<S: WindowSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<usize, PlatformError> {
        if !self.occlusion.is_fresh() && self.occlusion.rebuild(source)? == Rebuild::Fresh {
            // The new region says nothing about individual roaches yet.
            visibility::reveal_all(&mut self.world);
        }
        Ok(visibility::classify(&mut self.world, &self.headings, &self.occlusion))
    }

    /// Move every visible roach one tick.
    pub fn advance(&mut self) {
        let motion = Motion {
            table: &self.headings,
            surface: self.surface,
            config: &self.config,
        };
        movement::advance_all(&mut self.world, &motion, &mut self.rng);
    }

    pub fn render<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<(), PlatformError> {
        draw::render(&mut self.world, &self.headings, renderer)
    }

    /// Squish whatever is under a click. Does nothing unless squishing is
    /// enabled.
    pub fn squish<R: Renderer + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        renderer: &mut R,
    ) -> Result<usize, PlatformError> {
        if !self.config.squish {
            return Ok(0);
        }
        squish::squish(
            &mut self.world,
            &self.headings,
            IVec2::new(x, y),
            renderer,
            &mut self.hits,
        )
    }
}

use crate::geom::Region;
use crate::platform::{PlatformError, WindowSource};

/// Result of one rebuild attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebuild {
    /// The visible region was recomputed and is current.
    Fresh,
    /// A topology event arrived mid-scan. The cache is untouched and still
    /// stale; try again next tick.
    Raced,
}

/// Cached region of the surface not covered by any other mapped window.
///
/// Starts stale. Any topology event makes it stale again; only a complete,
/// un-raced rebuild makes it fresh.
#[derive(Debug, Default)]
pub struct Occlusion {
    visible: Option<Region>,
    fresh: bool,
    rebuilds: u64,
}

impl Occlusion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// A window was created, destroyed, mapped, unmapped, reconfigured or
    /// exposed.
    pub fn invalidate(&mut self) {
        if self.fresh {
            log::trace!("visible region invalidated");
        }
        self.fresh = false;
    }

    /// The visible region, only while it is current.
    pub fn visible(&self) -> Option<&Region> {
        if self.fresh {
            self.visible.as_ref()
        } else {
            None
        }
    }

    /// Number of successful rebuilds so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Recompute the visible region from the current window stack.
    ///
    /// Windows that vanish between enumeration and query are skipped. If a
    /// topology event shows up while scanning, the scan is abandoned so the
    /// cache never holds a region built from a half-changed stack.
    pub fn rebuild<S: WindowSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Rebuild, PlatformError> {
        let surface = source.surface_rect();
        let windows = source.sibling_windows()?;

        let mut covered = Region::new();
        for id in windows {
            if source.topology_event_queued() {
                log::debug!("visible region rebuild raced by a topology event");
                return Ok(Rebuild::Raced);
            }

            let info = match source.window_info(id) {
                Ok(info) => info,
                Err(e) => {
                    log::trace!("skipping window {id:#x}: {e}");
                    continue;
                }
            };

            if info.mapped && info.occluding {
                covered.union_rect(info.rect);
            }
        }

        let mut visible = Region::from_rect(surface);
        visible.subtract(&covered);

        self.rebuilds += 1;
        if visible.is_empty() {
            log::debug!("visible region rebuild #{}: surface fully covered", self.rebuilds());
        } else {
            log::debug!(
                "visible region rebuild #{}: {} rects, {} of {} px uncovered",
                self.rebuilds(),
                visible.rects().len(),
                visible.area(),
                surface.area()
            );
        }

        self.visible = Some(visible);
        self.fresh = true;
        Ok(Rebuild::Fresh)
    }
}

//! In-memory desktop for tests: a window stack, an event queue and a log of
//! draw calls.

use std::collections::{HashSet, VecDeque};

use glam::IVec2;

use super::{
    DesktopEvent, EventSource, PlatformError, Renderer, WindowId, WindowInfo, WindowSource,
};
use crate::geom::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOp {
    Roach { pos: IVec2, heading: usize },
    Clear { pos: IVec2, size: IVec2 },
    Splat { pos: IVec2 },
}

pub struct FakeDesktop {
    surface: Rect,
    windows: Vec<(WindowId, WindowInfo)>,
    failing: HashSet<WindowId>,
    events: VecDeque<DesktopEvent>,
    race_after: Option<usize>,
    queries: usize,
    next_id: WindowId,
    pub ops: Vec<DrawOp>,
    pub overlay_up: bool,
    pub flushes: usize,
    pub waits: usize,
    pub restored: bool,
}

impl FakeDesktop {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            surface: Rect::new(0, 0, width, height),
            windows: Vec::new(),
            failing: HashSet::new(),
            events: VecDeque::new(),
            race_after: None,
            queries: 0,
            next_id: 0x40_0001,
            ops: Vec::new(),
            overlay_up: false,
            flushes: 0,
            waits: 0,
            restored: false,
        }
    }

    pub fn add_window(&mut self, info: WindowInfo) -> WindowId {
        let id = self.next_id;
        self.next_id += 1;
        self.windows.push((id, info));
        id
    }

    pub fn set_window(&mut self, id: WindowId, info: WindowInfo) {
        if let Some(entry) = self.windows.iter_mut().find(|(w, _)| *w == id) {
            entry.1 = info;
        }
    }

    /// Make queries for `id` fail, as if it was destroyed mid-scan.
    pub fn fail_query(&mut self, id: WindowId) {
        self.failing.insert(id);
    }

    /// Queue a topology event once `n` more window queries have been made.
    pub fn race_after_queries(&mut self, n: usize) {
        self.race_after = Some(self.queries + n);
    }

    pub fn push_event(&mut self, event: DesktopEvent) {
        self.events.push_back(event);
    }

    pub fn roach_draws(&self) -> impl Iterator<Item = (IVec2, usize)> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            DrawOp::Roach { pos, heading } => Some((pos, heading)),
            _ => None,
        })
    }
}

impl WindowSource for FakeDesktop {
    fn surface_rect(&self) -> Rect {
        self.surface
    }

    fn sibling_windows(&mut self) -> Result<Vec<WindowId>, PlatformError> {
        Ok(self.windows.iter().map(|(id, _)| *id).collect())
    }

    fn window_info(&mut self, id: WindowId) -> Result<WindowInfo, PlatformError> {
        self.queries += 1;
        if self.failing.contains(&id) {
            return Err(PlatformError::WindowGone(id));
        }
        self.windows
            .iter()
            .find(|(w, _)| *w == id)
            .map(|(_, info)| *info)
            .ok_or(PlatformError::WindowGone(id))
    }

    fn topology_event_queued(&mut self) -> bool {
        if self.race_after.is_some_and(|n| self.queries >= n) {
            self.race_after = None;
            self.events.push_back(DesktopEvent::Topology);
        }
        self.events.contains(&DesktopEvent::Topology)
    }
}

impl Renderer for FakeDesktop {
    fn draw_roach(&mut self, pos: IVec2, heading: usize) -> Result<(), PlatformError> {
        self.ops.push(DrawOp::Roach { pos, heading });
        Ok(())
    }

    fn clear_box(&mut self, pos: IVec2, size: IVec2) -> Result<(), PlatformError> {
        self.ops.push(DrawOp::Clear { pos, size });
        Ok(())
    }

    fn draw_splat(&mut self, pos: IVec2) -> Result<(), PlatformError> {
        self.ops.push(DrawOp::Splat { pos });
        Ok(())
    }

    fn set_squish_overlay(&mut self, up: bool) -> Result<(), PlatformError> {
        self.overlay_up = up;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PlatformError> {
        self.flushes += 1;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), PlatformError> {
        self.restored = true;
        Ok(())
    }
}

impl EventSource for FakeDesktop {
    fn poll_event(&mut self) -> Result<Option<DesktopEvent>, PlatformError> {
        Ok(self.events.pop_front())
    }

    /// With nothing queued, behaves as if a termination signal interrupted
    /// the wait.
    fn wait_event(&mut self) -> Result<DesktopEvent, PlatformError> {
        self.waits += 1;
        Ok(self.events.pop_front().unwrap_or(DesktopEvent::Shutdown))
    }
}

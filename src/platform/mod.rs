//! Display-server collaborators. The simulation only talks to these traits;
//! `x11` implements them against a live X server and `fake` (tests only)
//! against an in-memory desktop.

use glam::IVec2;

use crate::geom::Rect;

#[cfg(test)]
pub mod fake;
pub mod x11;

/// Opaque handle for a sibling window of the drawing surface.
pub type WindowId = u32;

/// What the occlusion engine needs to know about one sibling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInfo {
    /// Screen-space bounds including the border on every side.
    pub rect: Rect,
    /// Window is viewable (it and all its ancestors are mapped).
    pub mapped: bool,
    /// Window can paint over the surface (InputOutput, not InputOnly).
    pub occluding: bool,
}

/// Events the driving loop consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopEvent {
    /// A sibling was created, destroyed, mapped, unmapped, moved/resized,
    /// or the surface was exposed. Invalidates the visible region.
    Topology,
    /// Pointer button press on the squish overlay.
    Click { x: i32, y: i32 },
    /// A termination signal arrived.
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("cannot connect to X server {display}: {source}")]
    Connect {
        display: String,
        #[source]
        source: x11rb::errors::ConnectError,
    },
    #[error("X connection failed: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),
    #[error("X request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),
    #[error("X resource allocation failed: {0}")]
    ReplyOrId(#[from] x11rb::errors::ReplyOrIdError),
    #[error("window {0:#x} is gone")]
    WindowGone(WindowId),
    #[error("screen {0} does not exist")]
    NoScreen(usize),
    #[error("waiting on the X socket failed: {0}")]
    Poll(#[source] nix::Error),
    #[error("installing signal handler failed: {0}")]
    Signal(#[source] nix::Error),
}

/// Enumerates and queries the windows that may cover the surface.
pub trait WindowSource {
    /// Bounds of the surface roaches live on.
    fn surface_rect(&self) -> Rect;

    /// Children of the surface's parent that are stacked above it. A failure
    /// here means the connection is gone.
    fn sibling_windows(&mut self) -> Result<Vec<WindowId>, PlatformError>;

    /// Query one window. May fail if the window vanished since enumeration.
    fn window_info(&mut self, id: WindowId) -> Result<WindowInfo, PlatformError>;

    /// Whether a topology-change event is already queued, without consuming
    /// it.
    fn topology_event_queued(&mut self) -> bool;
}

/// Drawing side effects. Positions are top-left corners in surface pixels.
pub trait Renderer {
    /// Fill the box at `pos` with the prepared bitmap for `heading`.
    fn draw_roach(&mut self, pos: IVec2, heading: usize) -> Result<(), PlatformError>;

    /// Repaint the surface background over `[pos, pos + size)`.
    fn clear_box(&mut self, pos: IVec2, size: IVec2) -> Result<(), PlatformError>;

    /// One-shot splat drawn where a roach was squished.
    fn draw_splat(&mut self, pos: IVec2) -> Result<(), PlatformError>;

    /// Map or unmap the input overlay that catches clicks for squishing.
    fn set_squish_overlay(&mut self, up: bool) -> Result<(), PlatformError>;

    fn flush(&mut self) -> Result<(), PlatformError>;

    /// Force the surface to repaint itself, erasing anything drawn on it.
    fn restore(&mut self) -> Result<(), PlatformError>;
}

/// Source of desktop events.
pub trait EventSource {
    /// Next event if one is already available. Never blocks.
    fn poll_event(&mut self) -> Result<Option<DesktopEvent>, PlatformError>;

    /// Block until an event arrives. Returns `Shutdown` if a termination
    /// signal interrupts the wait.
    fn wait_event(&mut self) -> Result<DesktopEvent, PlatformError>;
}

/// Everything the app loop drives.
pub trait Desktop: WindowSource + Renderer + EventSource {}

impl<T: WindowSource + Renderer + EventSource> Desktop for T {}

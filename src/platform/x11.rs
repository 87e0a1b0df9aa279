use std::collections::VecDeque;
use std::os::fd::AsFd;

use glam::IVec2;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{
    AtomEnum, BackPixmap, ChangeGCAux, ChangeWindowAttributesAux, ConfigureWindowAux,
    ConnectionExt, CreateGCAux, CreateWindowAux, EventMask, FillStyle, Gcontext, ImageFormat,
    ImageOrder, MapState, Pixmap, Rectangle, Screen, StackMode, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::{COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT, NONE};

use super::{
    DesktopEvent, EventSource, PlatformError, Renderer, WindowId, WindowInfo, WindowSource,
};
use crate::geom::Rect;
use crate::roach::heading::HeadingTable;
use crate::roach::shape::{self, Bitmap, SPLAT_SIZE};
use crate::shutdown;

/// Colors and options for the X11 desktop.
pub struct X11Options<'a> {
    pub display: Option<&'a str>,
    pub roach_color: &'a str,
    pub guts_color: &'a str,
    pub squish: bool,
}

/// Roaches drawn straight onto the root (or virtual root) window.
pub struct X11Desktop {
    conn: RustConnection,
    root: Window,
    width: u16,
    height: u16,
    roach_gc: Gcontext,
    guts_gc: Gcontext,
    roach_maps: Vec<(Pixmap, IVec2)>,
    splat_map: Option<Pixmap>,
    squish_win: Option<Window>,
    pending: VecDeque<DesktopEvent>,
}

impl X11Desktop {
    pub fn connect(options: &X11Options, headings: &HeadingTable) -> Result<Self, PlatformError> {
        let (conn, screen_num) =
            x11rb::connect(options.display).map_err(|source| PlatformError::Connect {
                display: options
                    .display
                    .map(str::to_string)
                    .or_else(|| std::env::var("DISPLAY").ok())
                    .unwrap_or_else(|| "(default)".into()),
                source,
            })?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .cloned()
            .ok_or(PlatformError::NoScreen(screen_num))?;

        let root = find_root(&conn, &screen)?;
        let (width, height) = (screen.width_in_pixels, screen.height_in_pixels);
        log::info!("Drawing on window {root:#x} ({width}x{height})");

        let roach_pixel = alloc_color(&conn, &screen, options.roach_color)?;
        let roach_gc = stipple_gc(&conn, root, roach_pixel)?;
        let guts_gc = if options.squish && options.guts_color != options.roach_color {
            let guts_pixel = alloc_color(&conn, &screen, options.guts_color)?;
            stipple_gc(&conn, root, guts_pixel)?
        } else {
            roach_gc
        };

        let roach_maps = shape::roach_bitmaps(headings)
            .iter()
            .zip(headings.iter())
            .map(|(bitmap, o)| Ok((upload_bitmap(&conn, root, bitmap)?, o.size)))
            .collect::<Result<Vec<_>, PlatformError>>()?;
        let splat_map = if options.squish {
            Some(upload_bitmap(&conn, root, &shape::splat_bitmap())?)
        } else {
            None
        };

        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new()
                .event_mask(EventMask::EXPOSURE | EventMask::SUBSTRUCTURE_NOTIFY),
        )?;

        let squish_win = if options.squish {
            let win = conn.generate_id()?;
            conn.create_window(
                COPY_DEPTH_FROM_PARENT,
                win,
                root,
                0,
                0,
                width,
                height,
                0,
                WindowClass::INPUT_ONLY,
                COPY_FROM_PARENT,
                &CreateWindowAux::new()
                    .override_redirect(1)
                    .event_mask(EventMask::BUTTON_PRESS),
            )?;
            conn.configure_window(win, &ConfigureWindowAux::new().stack_mode(StackMode::BELOW))?;
            Some(win)
        } else {
            None
        };

        conn.flush()?;

        Ok(Self {
            conn,
            root,
            width,
            height,
            roach_gc,
            guts_gc,
            roach_maps,
            splat_map,
            squish_win,
            pending: VecDeque::new(),
        })
    }

    /// Move everything already readable from the socket into `pending`.
    fn drain_socket(&mut self) -> Result<(), PlatformError> {
        while let Some(event) = self.conn.poll_for_event()? {
            if let Some(event) = translate(event, self.squish_win) {
                self.pending.push_back(event);
            }
        }
        Ok(())
    }

    fn fill(&self, gc: Gcontext, stipple: Pixmap, pos: IVec2, size: IVec2) -> Result<(), PlatformError> {
        self.conn.change_gc(
            gc,
            &ChangeGCAux::new()
                .stipple(stipple)
                .tile_stipple_x_origin(pos.x)
                .tile_stipple_y_origin(pos.y),
        )?;
        self.conn.poly_fill_rectangle(
            self.root,
            gc,
            &[Rectangle {
                x: pos.x as i16,
                y: pos.y as i16,
                width: size.x as u16,
                height: size.y as u16,
            }],
        )?;
        Ok(())
    }
}

/// Map a raw X event to what the loop cares about. Our own overlay being
/// mapped or unmapped says nothing about the windows above the surface.
fn translate(event: Event, squish_win: Option<Window>) -> Option<DesktopEvent> {
    match event {
        Event::MapNotify(e) if Some(e.window) == squish_win => None,
        Event::UnmapNotify(e) if Some(e.window) == squish_win => None,
        Event::MapNotify(_)
        | Event::UnmapNotify(_)
        | Event::ConfigureNotify(_)
        | Event::CreateNotify(_)
        | Event::DestroyNotify(_)
        | Event::Expose(_) => Some(DesktopEvent::Topology),
        Event::ButtonPress(e) => Some(DesktopEvent::Click {
            x: e.event_x as i32,
            y: e.event_y as i32,
        }),
        Event::Error(e) => {
            log::debug!("X error: {e:?}");
            None
        }
        _ => None,
    }
}

/// Window managers with virtual desktops paint on a child of the real root
/// tagged `__SWM_VROOT`. Roaches must live on that window to be seen.
fn find_root(conn: &RustConnection, screen: &Screen) -> Result<Window, PlatformError> {
    let real = screen.root;
    let vroot = conn.intern_atom(true, b"__SWM_VROOT")?.reply()?.atom;
    if vroot == NONE {
        return Ok(real);
    }

    let tree = conn.query_tree(real)?.reply()?;
    for child in tree.children {
        let Ok(prop) = conn
            .get_property(false, child, vroot, AtomEnum::WINDOW, 0, 1)?
            .reply()
        else {
            continue;
        };
        if let Some(found) = prop.value32().and_then(|mut v| v.next()) {
            if found != real {
                log::info!("Using virtual root {found:#x}");
                return Ok(found);
            }
        }
    }
    Ok(real)
}

/// Parse `#rrggbb` into 16-bit channels.
fn parse_hex_color(name: &str) -> Option<(u16, u16, u16)> {
    let hex = name.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|c| c as u16 * 257);
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Allocate `name` in the default colormap, falling back to black.
fn alloc_color(conn: &RustConnection, screen: &Screen, name: &str) -> Result<u32, PlatformError> {
    let cmap = screen.default_colormap;
    let reply = match parse_hex_color(name) {
        Some((r, g, b)) => conn.alloc_color(cmap, r, g, b)?.reply().map(|r| r.pixel),
        None => conn.alloc_named_color(cmap, name.as_bytes())?.reply().map(|r| r.pixel),
    };
    match reply {
        Ok(pixel) => Ok(pixel),
        Err(ReplyError::X11Error(e)) => {
            log::warn!("Cannot allocate color {name:?} ({:?}), using black", e.error_kind);
            Ok(screen.black_pixel)
        }
        Err(e) => Err(e.into()),
    }
}

fn stipple_gc(conn: &RustConnection, root: Window, pixel: u32) -> Result<Gcontext, PlatformError> {
    let gc = conn.generate_id()?;
    conn.create_gc(
        gc,
        root,
        &CreateGCAux::new()
            .foreground(pixel)
            .fill_style(FillStyle::STIPPLED),
    )?;
    Ok(gc)
}

/// Upload a bitmap into a fresh depth-1 pixmap.
fn upload_bitmap(conn: &RustConnection, root: Window, bitmap: &Bitmap) -> Result<Pixmap, PlatformError> {
    let setup = conn.setup();
    let data = bitmap.pack(
        setup.bitmap_format_scanline_pad as usize,
        setup.bitmap_format_bit_order == ImageOrder::LSB_FIRST,
    );

    let pixmap = conn.generate_id()?;
    let (w, h) = (bitmap.width as u16, bitmap.height as u16);
    conn.create_pixmap(1, pixmap, root, w, h)?;

    let gc = conn.generate_id()?;
    conn.create_gc(gc, pixmap, &CreateGCAux::new().foreground(1).background(0))?;
    conn.put_image(ImageFormat::XY_PIXMAP, pixmap, gc, w, h, 0, 0, 0, 1, &data)?;
    conn.free_gc(gc)?;
    Ok(pixmap)
}

impl WindowSource for X11Desktop {
    fn surface_rect(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    fn sibling_windows(&mut self) -> Result<Vec<WindowId>, PlatformError> {
        Ok(self.conn.query_tree(self.root)?.reply()?.children)
    }

    fn window_info(&mut self, id: WindowId) -> Result<WindowInfo, PlatformError> {
        let gone = |e: ReplyError| match e {
            ReplyError::X11Error(_) => PlatformError::WindowGone(id),
            other => other.into(),
        };

        let attrs = self.conn.get_window_attributes(id)?.reply().map_err(gone)?;
        let mapped = attrs.map_state == MapState::VIEWABLE;
        let occluding = attrs.class == WindowClass::INPUT_OUTPUT;
        if !(mapped && occluding) {
            return Ok(WindowInfo {
                rect: Rect::new(0, 0, 0, 0),
                mapped,
                occluding,
            });
        }

        let geom = self.conn.get_geometry(id)?.reply().map_err(gone)?;
        let border = 2 * geom.border_width as i32;
        Ok(WindowInfo {
            rect: Rect::new(
                geom.x as i32,
                geom.y as i32,
                geom.width as i32 + border,
                geom.height as i32 + border,
            ),
            mapped,
            occluding,
        })
    }

    fn topology_event_queued(&mut self) -> bool {
        if let Err(e) = self.drain_socket() {
            // Surfaces again from the next poll_event.
            log::debug!("event drain failed: {e}");
        }
        self.pending.contains(&DesktopEvent::Topology)
    }
}

impl Renderer for X11Desktop {
    fn draw_roach(&mut self, pos: IVec2, heading: usize) -> Result<(), PlatformError> {
        let (pixmap, size) = self.roach_maps[heading];
        self.fill(self.roach_gc, pixmap, pos, size)
    }

    fn clear_box(&mut self, pos: IVec2, size: IVec2) -> Result<(), PlatformError> {
        self.conn.clear_area(
            false,
            self.root,
            pos.x as i16,
            pos.y as i16,
            size.x as u16,
            size.y as u16,
        )?;
        Ok(())
    }

    fn draw_splat(&mut self, pos: IVec2) -> Result<(), PlatformError> {
        match self.splat_map {
            Some(pixmap) => self.fill(self.guts_gc, pixmap, pos, SPLAT_SIZE),
            None => Ok(()),
        }
    }

    fn set_squish_overlay(&mut self, up: bool) -> Result<(), PlatformError> {
        if let Some(win) = self.squish_win {
            if up {
                self.conn.map_window(win)?;
            } else {
                self.conn.unmap_window(win)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PlatformError> {
        self.conn.flush()?;
        Ok(())
    }

    /// Map a lowered, parent-relative window over the whole surface. The
    /// server repaints the root underneath, wiping every roach.
    fn restore(&mut self) -> Result<(), PlatformError> {
        let win = self.conn.generate_id()?;
        self.conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            win,
            self.root,
            0,
            0,
            self.width,
            self.height,
            0,
            WindowClass::INPUT_OUTPUT,
            COPY_FROM_PARENT,
            &CreateWindowAux::new()
                .background_pixmap(u32::from(BackPixmap::PARENT_RELATIVE))
                .override_redirect(1),
        )?;
        self.conn
            .configure_window(win, &ConfigureWindowAux::new().stack_mode(StackMode::BELOW))?;
        self.conn.map_window(win)?;
        self.conn.flush()?;
        Ok(())
    }
}

impl EventSource for X11Desktop {
    fn poll_event(&mut self) -> Result<Option<DesktopEvent>, PlatformError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        while let Some(event) = self.conn.poll_for_event()? {
            if let Some(event) = translate(event, self.squish_win) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    fn wait_event(&mut self) -> Result<DesktopEvent, PlatformError> {
        loop {
            if let Some(event) = self.poll_event()? {
                return Ok(event);
            }
            if shutdown::requested() {
                return Ok(DesktopEvent::Shutdown);
            }
            self.conn.flush()?;

            let mut fds = [PollFd::new(self.conn.stream().as_fd(), PollFlags::POLLIN)];
            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) | Err(Errno::EINTR) => {}
                Err(e) => return Err(PlatformError::Poll(e)),
            }
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use instant::Instant;

use crate::config::Cli;
use crate::debug::timer::{SystemPhase, SystemTimers};
use crate::platform::x11::{X11Desktop, X11Options};
use crate::platform::{Desktop, DesktopEvent, PlatformError, WindowSource};
use crate::roach::heading::HeadingTable;
use crate::shutdown;
use crate::swarm::Swarm;

/// Pause between ticks while something is visible.
const TICK_DELAY: Duration = Duration::from_millis(20);
/// How often to log tick stats (seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Tick timing
// ---------------------------------------------------------------------------

struct FrameStats {
    tick_count: u64,
    last_log_time: Instant,
    tick_time_sum: f64,
    tick_time_min: f64,
    tick_time_max: f64,
    ticks_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            tick_count: 0,
            last_log_time: Instant::now(),
            tick_time_sum: 0.0,
            tick_time_min: f64::MAX,
            tick_time_max: 0.0,
            ticks_since_log: 0,
        }
    }

    fn record_tick(&mut self, dt: f64, visible: usize, timers: &SystemTimers) {
        self.tick_count += 1;
        self.ticks_since_log += 1;
        self.tick_time_sum += dt;
        self.tick_time_min = self.tick_time_min.min(dt);
        self.tick_time_max = self.tick_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            let avg_ms = (self.tick_time_sum / self.ticks_since_log as f64) * 1000.0;
            let tps = self.ticks_since_log as f64 / elapsed;
            log::info!(
                "Ticks/s: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | visible: {} | total ticks: {}",
                tps,
                avg_ms,
                self.tick_time_min * 1000.0,
                self.tick_time_max * 1000.0,
                visible,
                self.tick_count,
            );
            log::debug!("{} | total {:.1}us", timers.summary(), timers.total_us());
            self.last_log_time = Instant::now();
            self.tick_time_sum = 0.0;
            self.tick_time_min = f64::MAX;
            self.tick_time_max = 0.0;
            self.ticks_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// Erase the roaches before disconnecting.
    Restore,
    /// Signalled while blocked: drop the connection as is.
    Abandon,
}

/// Drives a swarm against a desktop, switching between polling while roaches
/// are visible and blocking on the display while they are all hidden.
struct App<D: Desktop> {
    desktop: D,
    swarm: Swarm,
    overlay_up: bool,
    stop: &'static AtomicBool,
    tick_delay: Duration,
    frame_stats: FrameStats,
    timers: SystemTimers,
}

impl<D: Desktop> App<D> {
    fn new(desktop: D, swarm: Swarm, stop: &'static AtomicBool) -> Self {
        Self {
            desktop,
            swarm,
            overlay_up: false,
            stop,
            tick_delay: TICK_DELAY,
            frame_stats: FrameStats::new(),
            timers: SystemTimers::new(),
        }
    }

    fn handle(&mut self, event: DesktopEvent, blocked: bool) -> Result<Option<Exit>, PlatformError> {
        match event {
            DesktopEvent::Topology => self.swarm.invalidate(),
            DesktopEvent::Click { x, y } => {
                if self.swarm.squish(x, y, &mut self.desktop)? > 0 {
                    self.desktop.flush()?;
                    if self.swarm.population() == 0 {
                        log::info!("Last roach squished");
                        return Ok(Some(Exit::Restore));
                    }
                }
            }
            DesktopEvent::Shutdown if blocked => return Ok(Some(Exit::Abandon)),
            DesktopEvent::Shutdown => return Ok(Some(Exit::Restore)),
        }
        Ok(None)
    }

    /// One loop iteration: handle a pending event, or run a tick.
    fn step(&mut self) -> Result<Option<Exit>, PlatformError> {
        if self.stop.load(Ordering::SeqCst) {
            return Ok(Some(Exit::Restore));
        }
        if let Some(event) = self.desktop.poll_event()? {
            return self.handle(event, false);
        }

        let tick_start = Instant::now();

        self.timers.begin();
        let visible = self.swarm.refresh_visibility(&mut self.desktop)?;
        self.timers.end(SystemPhase::Visibility);

        let want_overlay = self.swarm.config().squish && visible > 0;
        if want_overlay != self.overlay_up {
            self.desktop.set_squish_overlay(want_overlay)?;
            self.overlay_up = want_overlay;
        }

        if visible == 0 {
            // Erase what is left, then sleep until the desktop changes.
            self.swarm.render(&mut self.desktop)?;
            self.desktop.flush()?;
            log::trace!("all roaches hidden, waiting for events");
            let event = self.desktop.wait_event()?;
            return self.handle(event, true);
        }

        self.timers.begin();
        self.swarm.advance();
        self.timers.end(SystemPhase::Movement);

        self.timers.begin();
        self.swarm.render(&mut self.desktop)?;
        self.timers.end(SystemPhase::Draw);

        self.timers.begin();
        self.desktop.flush()?;
        self.timers.end(SystemPhase::Flush);

        self.frame_stats
            .record_tick(tick_start.elapsed().as_secs_f64(), visible, &self.timers);

        if !self.tick_delay.is_zero() {
            std::thread::sleep(self.tick_delay);
        }
        Ok(None)
    }

    /// Run until the session ends, restoring the surface unless told not to.
    fn run_loop(&mut self) -> Result<Exit, PlatformError> {
        let exit = loop {
            if let Some(exit) = self.step()? {
                break exit;
            }
        };
        match exit {
            Exit::Restore => {
                log::info!("Restoring desktop");
                self.desktop.restore()?;
            }
            Exit::Abandon => log::info!("Interrupted while idle, skipping restore"),
        }
        Ok(exit)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    shutdown::install()?;

    let config = cli.sim_config();
    let options = X11Options {
        display: cli.display.as_deref(),
        roach_color: &cli.roach_color,
        guts_color: cli.guts_color(),
        squish: config.squish,
    };
    let desktop = X11Desktop::connect(&options, &HeadingTable::new())?;

    let surface = desktop.surface_rect();
    let mut swarm = Swarm::new(config, surface, fastrand::Rng::new());
    swarm.populate();
    log::info!(
        "{} roaches at {} px/tick on {}x{} (squish {})",
        swarm.population(),
        config.speed,
        surface.w,
        surface.h,
        if config.squish { "on" } else { "off" },
    );

    let mut app = App::new(desktop, swarm, shutdown::flag());
    app.run_loop()?;
    Ok(())
}

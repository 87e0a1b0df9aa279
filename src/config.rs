use clap::Parser;

/// Default roach population.
pub const DEFAULT_ROACHES: usize = 10;
/// Default travel per tick, in pixels.
pub const DEFAULT_SPEED: f32 = 20.0;
/// `turn_steps = TURN_SCALE / speed`, so faster roaches turn after fewer
/// ticks and sweep the same arc per distance travelled.
const TURN_SCALE: f32 = 200.0;

/// Roaches that hide under your windows.
#[derive(Parser, Debug, Clone)]
#[command(name = "roachtoy", version, about)]
pub struct Cli {
    /// X display to connect to. Defaults to $DISPLAY.
    #[arg(long, value_name = "DISPLAY")]
    pub display: Option<String>,

    /// Roach color, any X color name or #rrggbb.
    #[arg(long = "roach-color", visible_alias = "rc", value_name = "COLOR", default_value = "black")]
    pub roach_color: String,

    /// Number of roaches.
    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = DEFAULT_ROACHES,
        value_parser = parse_population
    )]
    pub roaches: usize,

    /// Pixels each roach travels per tick.
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_SPEED, value_parser = parse_speed)]
    pub speed: f32,

    /// Let clicks squish roaches.
    #[arg(long)]
    pub squish: bool,

    /// Color of squished roach guts. Defaults to the roach color.
    #[arg(long = "guts-color", visible_alias = "rgc", value_name = "COLOR")]
    pub guts_color: Option<String>,
}

impl Cli {
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            population: self.roaches,
            speed: self.speed,
            squish: self.squish,
        }
    }

    pub fn guts_color(&self) -> &str {
        self.guts_color.as_deref().unwrap_or(&self.roach_color)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("speed must be a positive number of pixels, got {0}")]
    Speed(f32),
    #[error("need at least one roach")]
    Population,
}

fn parse_speed(s: &str) -> Result<f32, ConfigError> {
    let speed: f32 = s.parse().map_err(|_| ConfigError::NotANumber(s.to_string()))?;
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(ConfigError::Speed(speed))
    }
}

fn parse_population(s: &str) -> Result<usize, ConfigError> {
    match s.parse::<usize>() {
        Ok(0) => Err(ConfigError::Population),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::NotANumber(s.to_string())),
    }
}

/// Values the simulation core consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Capacity of the roach population.
    pub population: usize,
    /// Pixels travelled per tick.
    pub speed: f32,
    /// Whether clicks squish roaches.
    pub squish: bool,
}

impl SimConfig {
    /// Exclusive upper bound of the random turn countdown. Always at least 1.
    pub fn turn_steps(&self) -> i32 {
        ((TURN_SCALE / self.speed) as i32).max(1)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population: DEFAULT_ROACHES,
            speed: DEFAULT_SPEED,
            squish: false,
        }
    }
}

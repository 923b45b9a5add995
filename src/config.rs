//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, `neko.toml`, `NEKO_*`
//! environment variables, command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use serde::Deserialize;

use crate::error::{NekoError, Result};
use crate::pet::{FrameWindow, Tuning, SPRITE_SIZE};

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "neko.toml";
const ENV_PREFIX: &str = "NEKO_";

/// A cat that lives on your desktop and chases the mouse.
#[derive(Parser, Debug, Default)]
#[command(name = "neko", version, about)]
pub struct Args {
    /// TOML config file [default: ./neko.toml if present]
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Pixels the cat runs per tick
    #[arg(long)]
    pub speed: Option<f64>,

    /// Window scale of the 32px sprite
    #[arg(long)]
    pub scale: Option<f64>,

    /// Disable sound
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub quiet: Option<bool>,

    /// Let clicks pass through the cat to the window below
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub mouse_passthrough: Option<bool>,

    /// Sound volume, 0.0 to 1.0
    #[arg(long)]
    pub volume: Option<f32>,

    /// Simulation ticks per second
    #[arg(long)]
    pub tps: Option<u32>,

    /// Directory holding the sprite PNGs and sound WAVs
    #[arg(long)]
    pub assets: Option<PathBuf>,
}

/// Frame-count pacing of the idle animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timing {
    pub frame_min: u32,
    pub frame_max: u32,
    pub yawn_min: u32,
    pub yawn_max: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            frame_min: FrameWindow::DEFAULT.min,
            frame_max: FrameWindow::DEFAULT.max,
            yawn_min: FrameWindow::YAWN.min,
            yawn_max: FrameWindow::YAWN.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub speed: f64,
    pub scale: f64,
    pub quiet: bool,
    #[serde(alias = "mousepassthrough")]
    pub mouse_passthrough: bool,
    pub volume: f32,
    pub tps: u32,
    pub assets: PathBuf,
    pub timing: Timing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: 2.0,
            scale: 2.0,
            quiet: false,
            mouse_passthrough: false,
            volume: 0.3,
            tps: 50,
            assets: PathBuf::from("assets"),
            timing: Timing::default(),
        }
    }
}

impl Config {
    /// Resolve the full config from the process environment and `args`.
    pub fn load(args: &Args) -> Result<Self> {
        Self::resolve(
            args,
            |key| std::env::var(key).ok(),
            Path::new(DEFAULT_CONFIG_FILE),
        )
    }

    /// Layer file, environment and flags over the defaults.
    ///
    /// A file named by `--config` or `NEKO_CONFIG` must exist; the default
    /// file is optional.
    pub fn resolve(
        args: &Args,
        env: impl Fn(&str) -> Option<String>,
        default_file: &Path,
    ) -> Result<Self> {
        let named = args
            .config
            .clone()
            .or_else(|| env("NEKO_CONFIG").map(PathBuf::from));

        let mut cfg = match named {
            Some(path) => Self::from_file(&path)?,
            None if default_file.exists() => Self::from_file(default_file)?,
            None => Self::default(),
        };

        cfg.apply_env(&env)?;
        cfg.apply_args(args);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| NekoError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = toml::from_str(&text).map_err(|source| NekoError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(cfg)
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            env(&key).map(|value| (key, value))
        };

        if let Some(kv) = var("SPEED") {
            self.speed = parse_env(kv)?;
        }
        if let Some(kv) = var("SCALE") {
            self.scale = parse_env(kv)?;
        }
        if let Some(kv) = var("QUIET") {
            self.quiet = parse_flag(kv)?;
        }
        if let Some(kv) = var("MOUSE_PASSTHROUGH").or_else(|| var("MOUSEPASSTHROUGH")) {
            self.mouse_passthrough = parse_flag(kv)?;
        }
        if let Some(kv) = var("VOLUME") {
            self.volume = parse_env(kv)?;
        }
        if let Some(kv) = var("TPS") {
            self.tps = parse_env(kv)?;
        }
        if let Some((_, value)) = var("ASSETS") {
            self.assets = PathBuf::from(value);
        }
        Ok(())
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(v) = args.speed {
            self.speed = v;
        }
        if let Some(v) = args.scale {
            self.scale = v;
        }
        if let Some(v) = args.quiet {
            self.quiet = v;
        }
        if let Some(v) = args.mouse_passthrough {
            self.mouse_passthrough = v;
        }
        if let Some(v) = args.volume {
            self.volume = v;
        }
        if let Some(v) = args.tps {
            self.tps = v;
        }
        if let Some(v) = &args.assets {
            self.assets = v.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(NekoError::ConfigInvalid(msg));

        if !self.speed.is_finite() || self.speed < 0.0 {
            return invalid(format!("speed must be a finite number >= 0, got {}", self.speed));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return invalid(format!("scale must be a finite number > 0, got {}", self.scale));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return invalid(format!("volume must be within 0.0..=1.0, got {}", self.volume));
        }
        if !(1..=1000).contains(&self.tps) {
            return invalid(format!("tps must be within 1..=1000, got {}", self.tps));
        }
        let t = &self.timing;
        for (name, min, max) in [
            ("frame", t.frame_min, t.frame_max),
            ("yawn", t.yawn_min, t.yawn_max),
        ] {
            if min == 0 || min > max {
                return invalid(format!(
                    "timing.{name}_min must be >= 1 and <= {name}_max, got {min}..{max}"
                ));
            }
        }
        Ok(())
    }

    /// Behavior parameters for the pet.
    pub fn tuning(&self) -> Tuning {
        Tuning {
            pace: FrameWindow {
                min: self.timing.frame_min,
                max: self.timing.frame_max,
            },
            drowsy_pace: FrameWindow {
                min: self.timing.yawn_min,
                max: self.timing.yawn_max,
            },
            ..Tuning::new(self.speed, self.scale)
        }
    }

    /// Edge length of the square window in physical pixels.
    pub fn window_size(&self) -> u32 {
        ((SPRITE_SIZE as f64 * self.scale).round() as u32).max(1)
    }

    /// Seconds per simulation tick.
    pub fn tick_rate(&self) -> f64 {
        1.0 / self.tps as f64
    }
}

fn parse_env<T: FromStr>((key, value): (String, String)) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| NekoError::ConfigEnv { key, value })
}

fn parse_flag((key, value): (String, String)) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(NekoError::ConfigEnv { key, value }),
    }
}

use std::time::Duration;

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};

use crate::{cloud::Smoothing, entity::Shape};

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visual {
    /// Only the drifting shape clouds.
    Field,
    /// Only the orbital rings.
    Accent,
    /// Both, sharing one surface.
    Both,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "shape-cloud", version, about = "Animated instanced particle background")]
pub struct Args {
    /// Which visuals to mount.
    #[arg(long, value_enum, default_value_t = Visual::Both)]
    pub visual: Visual,

    /// Logical window width.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Logical window height.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Target frame rate for redraw pacing.
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,

    /// Added to every cloud's seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u32,

    /// Multiplies the instance count of every cloud.
    #[arg(long, default_value_t = 1.0)]
    pub density: f32,

    /// Ease pointer tracking by elapsed time instead of by frame.
    #[arg(long)]
    pub frame_independent_smoothing: bool,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CloudConfig {
    pub shape: Shape,
    pub count: usize,
    pub seed: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub frame_interval: Duration,
    pub clouds: Vec<CloudConfig>,
    pub accent: bool,
    pub smoothing: Smoothing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "shape-cloud".to_owned(),
            width: 1280,
            height: 720,
            frame_interval: Duration::from_secs_f64(1.0 / 60.0),
            clouds: Self::default_clouds(),
            accent: true,
            smoothing: Smoothing::PerFrame,
        }
    }
}

impl Config {
    fn default_clouds() -> Vec<CloudConfig> {
        vec![
            CloudConfig {
                shape: Shape::Sphere {
                    radius: 0.15,
                    segments: 32,
                },
                count: 700,
                seed: 0,
            },
            CloudConfig {
                shape: Shape::Cuboid { size: 0.2 },
                count: 700,
                seed: 1,
            },
            CloudConfig {
                shape: Shape::Cone {
                    radius: 0.15,
                    height: 0.3,
                    segments: 32,
                },
                count: 600,
                seed: 2,
            },
        ]
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        ensure!(
            args.fps.is_finite() && args.fps > 0.0,
            "--fps must be a positive number, got {}",
            args.fps
        );
        ensure!(
            args.density.is_finite() && args.density > 0.0,
            "--density must be a positive number, got {}",
            args.density
        );
        ensure!(
            args.width > 0 && args.height > 0,
            "Window size must be non-zero, got {}x{}",
            args.width,
            args.height
        );

        let clouds = match args.visual {
            Visual::Accent => Vec::new(),
            Visual::Field | Visual::Both => Self::default_clouds()
                .into_iter()
                .map(|cloud| CloudConfig {
                    count: ((cloud.count as f32 * args.density).round() as usize).max(1),
                    seed: cloud.seed.wrapping_add(args.seed),
                    ..cloud
                })
                .collect(),
        };

        Ok(Self {
            width: args.width,
            height: args.height,
            frame_interval: Duration::from_secs_f64(1.0 / args.fps),
            clouds,
            accent: matches!(args.visual, Visual::Accent | Visual::Both),
            smoothing: if args.frame_independent_smoothing {
                Smoothing::FrameRateIndependent
            } else {
                Smoothing::PerFrame
            },
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let args = Args::try_parse_from(std::iter::once("shape-cloud").chain(args.iter().copied()))?;
        Config::from_args(&args)
    }

    #[test]
    fn defaults_match_the_background_scene() -> Result<()> {
        let config = parse(&[])?;
        assert_eq!(config, Config::default());
        let counts: Vec<_> = config.clouds.iter().map(|c| (c.count, c.seed)).collect();
        assert_eq!(counts, vec![(700, 0), (700, 1), (600, 2)]);
        assert!(config.accent);
        Ok(())
    }

    #[test]
    fn visual_selects_mounted_parts() -> Result<()> {
        let field = parse(&["--visual", "field"])?;
        assert_eq!(field.clouds.len(), 3);
        assert!(!field.accent);

        let accent = parse(&["--visual", "accent"])?;
        assert!(accent.clouds.is_empty());
        assert!(accent.accent);
        Ok(())
    }

    #[test]
    fn seed_and_density_adjust_every_cloud() -> Result<()> {
        let config = parse(&["--seed", "10", "--density", "0.5"])?;
        let counts: Vec<_> = config.clouds.iter().map(|c| (c.count, c.seed)).collect();
        assert_eq!(counts, vec![(350, 10), (350, 11), (300, 12)]);

        let sparse = parse(&["--density", "0.0001"])?;
        assert!(sparse.clouds.iter().all(|c| c.count == 1));
        Ok(())
    }

    #[test]
    fn smoothing_flag() -> Result<()> {
        let config = parse(&["--frame-independent-smoothing", "--fps", "144"])?;
        assert_eq!(config.smoothing, Smoothing::FrameRateIndependent);
        assert_eq!(config.frame_interval, Duration::from_secs_f64(1.0 / 144.0));
        Ok(())
    }

    #[test]
    fn rejects_invalid_numbers() {
        assert!(parse(&["--fps", "0"]).is_err());
        assert!(parse(&["--density", "-1"]).is_err());
        assert!(parse(&["--width", "0"]).is_err());
        assert!(parse(&["--visual", "sideways"]).is_err());
    }
}

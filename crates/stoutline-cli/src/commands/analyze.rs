use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use stoutline_core::config::{FallbackPolicy, LevelMethod, ScoreMethod, StrategyKind};
use stoutline_core::consts::{DEFAULT_LEVEL_FALLBACK_FRACTION, DEFAULT_MAX_ROW_DEVIATION};
use stoutline_core::detection::{DetectionNote, GlassGeometry};
use stoutline_core::io::{load_capture, save_overlay, CaptureSize};
use stoutline_core::overlay::{build_overlay, DrawCommand, OverlayStyle};
use stoutline_core::{AnalysisResult, Analyzer, AnalyzerConfig, PixelBuffer, ScoreResult};
use tracing::debug;

use crate::summary::{print_analyze_summary, print_report};

#[derive(Clone, ValueEnum)]
pub enum StrategyArg {
    RimEdge,
    Darkness,
}

#[derive(Clone, ValueEnum)]
pub enum LevelMethodArg {
    SlidingContrast,
    ColorDifference,
}

#[derive(Clone, ValueEnum)]
pub enum ScoreMethodArg {
    Ratio,
    RowDistance,
}

#[derive(Clone, ValueEnum)]
pub enum FallbackArg {
    Base,
    ImageFraction,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input images
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Analyzer config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Target fill ratio of the glass (0-1)
    #[arg(long)]
    pub target: Option<f32>,

    /// How the detected level is scored
    #[arg(long, value_enum)]
    pub score_method: Option<ScoreMethodArg>,

    /// Row-distance tolerance as a fraction of the glass height
    #[arg(long)]
    pub max_deviation: Option<f32>,

    /// Boundary detection strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Liquid line scan
    #[arg(long, value_enum)]
    pub level_method: Option<LevelMethodArg>,

    /// Where to put the liquid line when no transition is found
    #[arg(long, value_enum)]
    pub fallback: Option<FallbackArg>,

    /// Image height fraction used by the image-fraction fallback
    #[arg(long)]
    pub fallback_fraction: Option<f32>,

    /// Take the nearer (lower) rim when the two halves of the glass disagree
    #[arg(long)]
    pub prefer_near_rim: bool,

    /// Resize captures to 640x480 before analysis
    #[arg(long)]
    pub resize: bool,

    /// Write overlay images to this directory
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Per-file result as printed or serialized. Row statistics are left out.
#[derive(Serialize)]
pub struct Report {
    pub file: PathBuf,
    pub width: usize,
    pub height: usize,
    pub strategy: StrategyKind,
    pub geometry: GlassGeometry,
    pub fill_ratio: f32,
    pub level_strength: f32,
    pub low_confidence: bool,
    pub notes: Vec<DetectionNote>,
    pub score: ScoreResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl Report {
    fn new(file: &Path, analysis: AnalysisResult, score: ScoreResult) -> Self {
        Self {
            file: file.to_path_buf(),
            width: analysis.width,
            height: analysis.height,
            strategy: analysis.strategy,
            geometry: analysis.geometry,
            fill_ratio: analysis.fill_ratio,
            level_strength: analysis.level_strength,
            low_confidence: analysis.low_confidence,
            notes: analysis.notes,
            score,
            overlay: None,
            labels: Vec::new(),
        }
    }
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let config = build_config(args)?;
    let analyzer = Analyzer::new(config).context("Invalid analyzer config")?;

    if !args.json {
        print_analyze_summary(analyzer.config(), args.files.len());
    }

    if let Some(ref dir) = args.overlay {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create overlay directory {}", dir.display()))?;
    }

    let pb = if args.files.len() > 1 && !args.json {
        let pb = ProgressBar::new(args.files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:20} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let size = args.resize.then(CaptureSize::default);
    let style = OverlayStyle::default();
    let mut reports = Vec::with_capacity(args.files.len());

    for path in &args.files {
        pb.set_message(file_label(path));
        debug!(file = %path.display(), "Analyzing capture");

        let capture = load_capture(path, size)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let buffer = PixelBuffer::from_image(&capture)?;
        let (analysis, score) = analyzer
            .evaluate(&buffer)
            .with_context(|| format!("Failed to analyze {}", path.display()))?;

        let commands = args
            .overlay
            .as_ref()
            .map(|_| build_overlay(&analysis, &score, &style));
        let mut report = Report::new(path, analysis, score);

        if let (Some(dir), Some(commands)) = (&args.overlay, commands) {
            let out = overlay_path(dir, path);
            save_overlay(&capture, &commands, &out)
                .with_context(|| format!("Failed to write overlay {}", out.display()))?;
            report.labels = label_texts(&commands);
            report.overlay = Some(out);
        }

        reports.push(report);
        pb.inc(1);
    }
    pb.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(args: &AnalyzeArgs) -> Result<AnalyzerConfig> {
    let mut config: AnalyzerConfig = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid analyzer config")?
    } else {
        AnalyzerConfig::default()
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

/// Tolerance and fraction flags apply to whichever method and fallback are in
/// effect afterwards, whether chosen on the command line or in the file.
fn apply_overrides(config: &mut AnalyzerConfig, args: &AnalyzeArgs) {
    if let Some(target) = args.target {
        config.scoring.target_ratio = target;
    }
    if let Some(ref method) = args.score_method {
        config.scoring.method = match method {
            ScoreMethodArg::Ratio => ScoreMethod::Ratio,
            ScoreMethodArg::RowDistance => ScoreMethod::RowDistance {
                max_deviation: DEFAULT_MAX_ROW_DEVIATION,
            },
        };
    }
    if let (Some(deviation), ScoreMethod::RowDistance { max_deviation }) =
        (args.max_deviation, &mut config.scoring.method)
    {
        *max_deviation = deviation;
    }
    if let Some(ref strategy) = args.strategy {
        config.detection.strategy = match strategy {
            StrategyArg::RimEdge => StrategyKind::RimEdge,
            StrategyArg::Darkness => StrategyKind::DarknessThreshold,
        };
    }
    if let Some(ref method) = args.level_method {
        config.detection.level_method = match method {
            LevelMethodArg::SlidingContrast => LevelMethod::SlidingContrast,
            LevelMethodArg::ColorDifference => LevelMethod::ColorDifference,
        };
    }
    if let Some(ref fallback) = args.fallback {
        config.detection.fallback = match fallback {
            FallbackArg::Base => FallbackPolicy::Base,
            FallbackArg::ImageFraction => {
                FallbackPolicy::ImageFraction(DEFAULT_LEVEL_FALLBACK_FRACTION)
            }
        };
    }
    if let (Some(fraction), FallbackPolicy::ImageFraction(f)) =
        (args.fallback_fraction, &mut config.detection.fallback)
    {
        *f = fraction;
    }
    if args.prefer_near_rim {
        config.detection.prefer_near_rim = true;
    }
}

/// `<dir>/<stem>_overlay.png`
fn overlay_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".into());
    dir.join(format!("{stem}_overlay.png"))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn label_texts(commands: &[DrawCommand]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Label { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

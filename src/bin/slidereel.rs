use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use slidereel::scene::project::project_base_dir;
use slidereel::{
    AspectRatio, CancelToken, DefaultFetcher, ExportJob, Exporter, FfmpegProbe, FrameIndex,
    FrameRenderer, ImageLoader, Project, ReelConfig, SentenceSceneGenerator, SlideDeck, Studio,
    Timeline, UrlTemplateSupplier,
};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    /// Settings JSON (defaults apply to anything not set).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a script into slides and supply an image for each.
    Generate(GenerateArgs),
    /// Print the timeline of a project as JSON.
    Plan(PlanArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Script text file.
    #[arg(long)]
    script: PathBuf,

    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,

    /// `16:9` or `9:16`.
    #[arg(long, default_value = "16:9", value_parser = parse_aspect)]
    aspect: AspectRatio,

    /// Total video duration in seconds.
    #[arg(long, default_value_t = 60.0)]
    duration: f64,

    /// Image URL template with `{width}`, `{height}` and `{seed}` placeholders.
    #[arg(long)]
    image_template: Option<String>,

    /// Seed for transitions and image URLs.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Directory the video is written to.
    #[arg(long)]
    out_dir: PathBuf,

    /// Override the project's total duration (seconds).
    #[arg(long)]
    duration: Option<f64>,
}

fn parse_aspect(s: &str) -> Result<AspectRatio, String> {
    AspectRatio::parse(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slidereel=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => ReelConfig::from_path(path)?,
        None => ReelConfig::default(),
    };
    match cli.cmd {
        Command::Generate(args) => cmd_generate(&cfg, args),
        Command::Plan(args) => cmd_plan(&cfg, args),
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Render(args) => cmd_render(&cfg, args),
    }
}

fn read_project(path: &Path) -> anyhow::Result<(Project, SlideDeck)> {
    let project = Project::from_path(path)?;
    let deck = project.to_deck(&project_base_dir(path))?;
    Ok((project, deck))
}

fn build_timeline(cfg: &ReelConfig, slides: usize, total_secs: f64) -> anyhow::Result<Timeline> {
    Ok(Timeline::build(
        slides,
        total_secs,
        cfg.transition_secs,
        cfg.fps()?,
    )?)
}

fn image_loader(cfg: &ReelConfig) -> anyhow::Result<ImageLoader> {
    let fetcher = DefaultFetcher::new(cfg.http_timeout())?;
    Ok(ImageLoader::new(Arc::new(fetcher), cfg.retry))
}

fn cmd_generate(cfg: &ReelConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("read script '{}'", args.script.display()))?;
    let template = args
        .image_template
        .unwrap_or_else(|| cfg.image_template.clone());

    let studio = Studio::new(
        Arc::new(SentenceSceneGenerator::default()),
        Arc::new(UrlTemplateSupplier::new(template, args.seed)?),
        args.seed,
    );
    let deck = studio.generate(&script, args.aspect)?;

    // Warn early instead of failing at render time.
    if let Err(e) = build_timeline(cfg, deck.len(), args.duration) {
        tracing::warn!(error = %e, "project duration will need adjusting before render");
    }

    Project::from_deck(&deck, args.aspect, args.duration).write_to(&args.out)?;
    eprintln!("wrote {} ({} slides)", args.out.display(), deck.len());
    Ok(())
}

fn cmd_plan(cfg: &ReelConfig, args: PlanArgs) -> anyhow::Result<()> {
    let (project, deck) = read_project(&args.project)?;
    let timeline = build_timeline(cfg, deck.len(), project.total_duration_secs)?;
    let json = serde_json::to_string_pretty(&timeline).context("serialize timeline")?;
    println!("{json}");
    Ok(())
}

fn cmd_frame(cfg: &ReelConfig, args: FrameArgs) -> anyhow::Result<()> {
    let (project, deck) = read_project(&args.project)?;
    let sources = deck.ready_sources()?;
    let timeline = build_timeline(cfg, deck.len(), project.total_duration_secs)?;
    if args.frame >= timeline.total_frames {
        anyhow::bail!(
            "frame {} is out of range (project has {} frames)",
            args.frame,
            timeline.total_frames
        );
    }

    let images = image_loader(cfg)?.load_all(&sources)?;
    let mut renderer = FrameRenderer::new(
        timeline,
        images,
        deck.transitions(),
        project.aspect_ratio.canvas(),
        cfg.render_opts(),
    )?;
    let frame = renderer.render_frame(FrameIndex(args.frame)).to_frame();

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(cfg: &ReelConfig, args: RenderArgs) -> anyhow::Result<()> {
    let (project, deck) = read_project(&args.project)?;
    let total_secs = args.duration.unwrap_or(project.total_duration_secs);

    let exporter = Exporter::new(
        image_loader(cfg)?,
        Arc::new(FfmpegProbe::detect()),
        cfg.export_opts()?,
    )?
    .with_progress({
        let last_decile = AtomicU64::new(0);
        move |p| {
            let decile = (p.fraction() * 10.0) as u64;
            if decile > last_decile.fetch_max(decile, Ordering::Relaxed) {
                tracing::info!(
                    frames_done = p.frames_done,
                    total_frames = p.total_frames,
                    "{}% rendered",
                    decile * 10
                );
            }
        }
    });

    let report = exporter.export_to_dir(
        &deck,
        &ExportJob::new(project.aspect_ratio, total_secs),
        &args.out_dir,
        &CancelToken::new(),
    )?;
    match &report.output {
        Some(path) => eprintln!(
            "wrote {} ({} frames, {}, {:.1}s)",
            path.display(),
            report.frames,
            report.format,
            report.elapsed.as_secs_f64()
        ),
        None => eprintln!("rendered {} frames", report.frames),
    }
    Ok(())
}

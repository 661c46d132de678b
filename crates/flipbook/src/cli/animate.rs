//! The `flipbook animate` command.

use clap::{Args, ValueEnum};
use flipbook_core::{
    CancelFlag, Config, Pipeline, PlaybackConfig, ResizePolicy, RunHooks, ScaleFactor,
    ScalePolicy,
};
use std::future::Future;
use std::path::{Path, PathBuf};

/// How frames are fitted to the target size.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Policy {
    /// Stretch every frame to exactly the target size
    Exact,
    /// Shrink to fit inside the target size, keeping aspect ratio
    Thumbnail,
}

impl From<Policy> for ResizePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Exact => ResizePolicy::Exact,
            Policy::Thumbnail => ResizePolicy::Thumbnail,
        }
    }
}

/// Arguments for the `animate` command.
#[derive(Args, Debug)]
pub struct AnimateArgs {
    /// Image files or directories, in playback order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Scale as a whole-number percentage of the first image's size
    #[arg(short, long)]
    pub size: Option<String>,

    /// Frames per second
    #[arg(short, long)]
    pub fps: Option<String>,

    /// Loop count (0 = forever)
    #[arg(long)]
    pub loops: Option<u16>,

    /// Resize policy
    #[arg(long, value_enum)]
    pub policy: Option<Policy>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output file name (overrides config)
    #[arg(long)]
    pub file_name: Option<String>,

    /// Delete everything in the output directory before running
    #[arg(long)]
    pub clean: bool,

    /// Also write each rescaled frame as a PNG into this directory
    #[arg(long)]
    pub frames_dir: Option<PathBuf>,

    /// Print a JSON summary of the artifact instead of its path
    #[arg(long)]
    pub json: bool,
}

/// Fold CLI overrides into `config` and resolve the run's scale and playback.
fn resolve(
    args: &AnimateArgs,
    config: &mut Config,
) -> anyhow::Result<(ScalePolicy, PlaybackConfig)> {
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(name) = &args.file_name {
        if name.is_empty() || name.contains(['/', '\\']) {
            anyhow::bail!("--file-name must be a bare file name, got {name:?}");
        }
        config.output.file_name = name.clone();
    }
    if let Some(policy) = args.policy {
        config.animation.resize_policy = policy.into();
    }

    let factor = match args.size.as_deref() {
        Some(size) => ScaleFactor::parse_percent(Some(size))?,
        None => ScaleFactor::from_percent(config.animation.scale_percent)?,
    };
    let playback = match args.fps.as_deref() {
        Some(fps) => PlaybackConfig::parse_fps(Some(fps))?,
        None => PlaybackConfig::new(config.animation.fps)?,
    }
    .with_loop_count(args.loops.unwrap_or(config.animation.loop_count));

    Ok((
        ScalePolicy::new(factor, config.animation.resize_policy),
        playback,
    ))
}

/// Execute the animate command.
pub async fn execute(args: AnimateArgs, mut config: Config) -> anyhow::Result<()> {
    let (scale, playback) = resolve(&args, &mut config)?;
    let pipeline = Pipeline::new(&config);

    let sources = pipeline.discover(&args.inputs)?;
    tracing::info!(
        "Animating {} image(s) at {} ({}), {} fps",
        sources.len(),
        scale.factor,
        scale.resize,
        playback.fps()
    );

    if args.clean {
        let out_dir = pipeline.store().dir();
        if let Some(source) = source_inside(out_dir, &sources) {
            anyhow::bail!(
                "--clean would delete source image {} inside {}",
                source.display(),
                out_dir.display()
            );
        }
        let removed = pipeline.store().clear_previous();
        tracing::info!("Removed {} previous file(s) from {}", removed, out_dir.display());
    }

    let cancel = CancelFlag::new();
    tokio::spawn(watch_interrupts(
        cancel.clone(),
        tokio::signal::ctrl_c,
        || {
            std::process::exit(130);
        },
    ));

    let progress = create_progress_bar(sources.len() as u64);
    let tick = progress.clone();
    let hooks = RunHooks::new()
        .with_cancel(cancel)
        .with_progress(move |done, _| tick.set_position(done as u64));

    let frames_dir = args.frames_dir.clone();
    let result = tokio::task::spawn_blocking(move || match frames_dir {
        Some(dir) => {
            let frames = pipeline.assemble(&sources, &scale, &hooks)?;
            let written = frames.save_to_dir(&dir)?;
            tracing::info!("Wrote {} frame(s) to {}", written.len(), dir.display());
            pipeline.finish(frames, &playback)
        }
        None => pipeline.run_with_hooks(&sources, &scale, &playback, &hooks),
    })
    .await?;
    progress.finish_and_clear();

    let artifact = result?;
    let summary = artifact.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.path.display());
    }
    Ok(())
}

/// Resolve `path` through symlinks and `..`, or make it absolute if it does
/// not exist yet.
fn resolve_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// First source that lives under `dir`, compared by resolved location.
fn source_inside<'a>(dir: &Path, sources: &'a [PathBuf]) -> Option<&'a PathBuf> {
    let dir = resolve_path(dir);
    sources.iter().find(|source| resolve_path(source).starts_with(&dir))
}

/// First interrupt cancels between frames; a second one calls `force_exit`.
async fn watch_interrupts<S, F>(cancel: CancelFlag, mut signal: S, force_exit: impl FnOnce())
where
    S: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    if signal().await.is_err() {
        return;
    }
    tracing::warn!("Interrupted, stopping after the current frame (Ctrl-C again to abort)");
    cancel.cancel();

    if signal().await.is_ok() {
        tracing::warn!("Interrupted again, exiting");
        force_exit();
    }
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames")
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}

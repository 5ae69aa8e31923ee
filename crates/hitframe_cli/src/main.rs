//! hitframe CLI
//!
//! Inspect, evaluate, play back, and retime sprite animation projects.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hitframe_animation::{Animator, InterpolationMode, PendingSpan};
use hitframe_core::Frame;
use hitframe_project::{Project, ProjectDocument};
use notify::{RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{mpsc, Arc};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod sample;

use config::HitframeConfig;

#[derive(Parser)]
#[command(name = "hitframe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sprite and hitbox animation project tool", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to hitframe.toml next to the project)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample project
    New {
        /// Project file to create
        path: PathBuf,

        /// Project name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// List objects, tracks, keyframes, and links
    Info {
        /// Project file
        file: PathBuf,
    },

    /// Print the value of a property at a frame
    Eval {
        /// Project file
        file: PathBuf,

        /// Object name
        #[arg(short, long)]
        object: String,

        /// Property name
        #[arg(short, long)]
        property: String,

        /// Frame to evaluate
        #[arg(short, long, allow_hyphen_values = true)]
        frame: Frame,
    },

    /// Run playback headless and print every frame
    Play {
        /// Project file
        file: PathBuf,

        /// Number of updates to run
        #[arg(short = 'n', long, default_value = "60")]
        frames: u32,

        /// Play towards earlier frames
        #[arg(short, long)]
        backward: bool,

        /// Override the playback rate
        #[arg(long)]
        fps: Option<u32>,

        /// Stop wrapping at the timeline bounds
        #[arg(long)]
        no_loop: bool,
    },

    /// Link the keyframes of a property between two frames
    Link {
        /// Project file
        file: PathBuf,

        /// Object name
        #[arg(short, long)]
        object: String,

        /// Property name
        #[arg(short, long)]
        property: String,

        /// Frame the span starts at
        #[arg(long, allow_hyphen_values = true)]
        from: Frame,

        /// Frame the span ends at
        #[arg(long, allow_hyphen_values = true)]
        to: Frame,

        /// Interpolation mode (see `hitframe modes`)
        #[arg(short, long, default_value = "linear")]
        mode: InterpolationMode,

        /// Evenly space progress over uneven keyframe gaps
        #[arg(long)]
        relative: bool,
    },

    /// Scale every keyframe's frame by a factor
    Retime {
        /// Project file
        file: PathBuf,

        /// Time scale factor
        #[arg(short, long)]
        factor: f32,

        /// Output file (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-summarise a project every time its file changes
    Watch {
        /// Project file
        file: PathBuf,
    },

    /// List interpolation modes
    Modes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config_override = cli.config.as_deref();

    match cli.command {
        Commands::New { path, name, force } => {
            let config = HitframeConfig::load(config_override, &path)?;
            cmd_new(&path, name.as_deref(), force, &config)
        }

        Commands::Info { file } => cmd_info(&file),

        Commands::Eval {
            file,
            object,
            property,
            frame,
        } => cmd_eval(&file, &object, &property, frame),

        Commands::Play {
            file,
            frames,
            backward,
            fps,
            no_loop,
        } => {
            let config = HitframeConfig::load(config_override, &file)?;
            cmd_play(&file, frames, backward, fps, no_loop, &config)
        }

        Commands::Link {
            file,
            object,
            property,
            from,
            to,
            mode,
            relative,
        } => {
            let config = HitframeConfig::load(config_override, &file)?;
            cmd_link(&file, &object, &property, (from, to), mode, relative, &config)
        }

        Commands::Retime {
            file,
            factor,
            output,
        } => {
            let config = HitframeConfig::load(config_override, &file)?;
            cmd_retime(&file, factor, output.as_deref(), &config)
        }

        Commands::Watch { file } => cmd_watch(&file),

        Commands::Modes => cmd_modes(),
    }
}

fn load_project(path: &Path) -> Result<Project> {
    Project::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn save_project(project: &Project, path: &Path, config: &HitframeConfig) -> Result<()> {
    ProjectDocument::from_project(project)
        .write(path, config.output.pretty)
        .with_context(|| format!("Failed to save {}", path.display()))
}

fn cmd_new(path: &Path, name: Option<&str>, force: bool, config: &HitframeConfig) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Pass --force to overwrite it.",
            path.display()
        );
    }

    let name = name
        .map(str::to_string)
        .or_else(|| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "untitled".to_string());

    let project = sample::sample_project(&name)?;
    save_project(&project, path, config)?;

    info!("Created project '{}' at {}", name, path.display());
    info!("");
    info!("Next steps:");
    info!("  hitframe info {}", path.display());
    info!("  hitframe play {}", path.display());
    Ok(())
}

fn cmd_info(file: &Path) -> Result<()> {
    let project = load_project(file)?;
    print_summary(&project);
    Ok(())
}

fn print_summary(project: &Project) {
    println!("{} ({} fps)", project.name, project.fps);
    match project.bounds() {
        Some((first, last)) => println!("  timeline: {first}..={last}"),
        None => println!("  timeline: empty"),
    }

    for object in project.objects() {
        println!("  {} {}", object.kind(), object.name());
        for track in object.properties().iter() {
            println!(
                "    {:<14} {:<6} {} keyframe(s), {} link(s)",
                track.name(),
                track.kind(),
                track.len(),
                track.link_count()
            );
            for link in track.links() {
                let frames = track.member_frames(link.id()).unwrap_or_default();
                println!(
                    "      link {:?} {}{}",
                    frames,
                    link.mode(),
                    if link.relative_progress() {
                        " (relative)"
                    } else {
                        ""
                    }
                );
            }
        }
    }
}

fn cmd_eval(file: &Path, object: &str, property: &str, frame: Frame) -> Result<()> {
    let project = load_project(file)?;
    let track = project.track(object, property)?;
    let sample = track.sample(frame);

    if sample.found {
        println!("{}", sample.value);
    } else {
        println!("{} (default)", sample.value);
    }
    Ok(())
}

fn cmd_play(
    file: &Path,
    updates: u32,
    backward: bool,
    fps: Option<u32>,
    no_loop: bool,
    config: &HitframeConfig,
) -> Result<()> {
    let mut project = load_project(file)?;
    let fps = fps.or(config.playback.fps).unwrap_or(project.fps);
    let step = config.step_seconds(fps);

    let mut animator = Animator::with_fps(fps);
    animator.set_looping(config.playback.looping && !no_loop);

    let changes = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&changes);
    animator.on_frame_changed(move |_| counter.set(counter.get() + 1));

    let start = match project.bounds() {
        Some((first, last)) => {
            if backward {
                last
            } else {
                first
            }
        }
        None => 0,
    };
    animator.set_frame(start, &mut project);
    print_frame(animator.current_frame(), &project);

    if backward {
        animator.play_backward();
    } else {
        animator.play_forward();
    }
    debug!(fps, step, looping = animator.looping(), "playback started");

    for _ in 0..updates {
        if animator.update(step, &mut project) {
            print_frame(animator.current_frame(), &project);
        }
    }
    animator.stop();

    info!("{} frame change(s) at {} fps", changes.get(), fps);
    Ok(())
}

fn print_frame(frame: Frame, project: &Project) {
    let mut line = format!("{frame:>5}");
    for object in project.objects() {
        for track in object.properties().iter() {
            line.push_str(&format!(
                "  {}.{}={}",
                object.name(),
                track.name(),
                track.cached_value()
            ));
        }
    }
    println!("{line}");
}

fn cmd_link(
    file: &Path,
    object: &str,
    property: &str,
    (from, to): (Frame, Frame),
    mode: InterpolationMode,
    relative: bool,
    config: &HitframeConfig,
) -> Result<()> {
    let mut project = load_project(file)?;
    let track = project.track_mut(object, property)?;

    let mut span = PendingSpan::begin(from, mode);
    span.drag_to(to);
    let Some(link) = span.commit(track)? else {
        anyhow::bail!("Cannot link a single frame ({from})");
    };
    if relative {
        track.set_relative_progress(link, true);
    }

    let frames = track.member_frames(link).unwrap_or_default();
    save_project(&project, file, config)?;
    info!("Linked {}.{} at {:?} with {}", object, property, frames, mode);
    Ok(())
}

fn cmd_retime(
    file: &Path,
    factor: f32,
    output: Option<&Path>,
    config: &HitframeConfig,
) -> Result<()> {
    if !(factor.is_finite() && factor > 0.0) {
        anyhow::bail!("Retime factor must be a positive number, got {}", factor);
    }

    let mut project = load_project(file)?;
    let before = project.keyframe_count();
    project.retime(factor);
    let after = project.keyframe_count();

    if after < before {
        warn!("{} keyframe(s) merged onto shared frames", before - after);
    }

    let output = output.unwrap_or(file);
    save_project(&project, output, config)?;
    info!(
        "Retimed {} by {} into {} (timeline {:?})",
        file.display(),
        factor,
        output.display(),
        project.bounds()
    );
    Ok(())
}

enum Reload {
    Loaded,
    Failed(String),
}

fn cmd_watch(file: &Path) -> Result<()> {
    let shared = Arc::new(Mutex::new(load_project(file)?));
    print_summary(&shared.lock());

    let (tx, rx) = mpsc::channel();
    let path = file.to_path_buf();
    let target = Arc::clone(&shared);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                warn!("Watch error: {}", e);
                return;
            }
        };
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return;
        }

        let message = match Project::load(&path) {
            Ok(project) => {
                *target.lock() = project;
                Reload::Loaded
            }
            Err(e) => Reload::Failed(e.to_string()),
        };
        // The receiver only goes away when the command exits
        let _ = tx.send(message);
    })
    .context("Failed to create file watcher")?;

    watcher
        .watch(file, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", file.display()))?;
    info!("Watching {} for changes (Ctrl+C to stop)", file.display());

    for message in rx {
        match message {
            Reload::Loaded => {
                info!("Reloaded {}", file.display());
                print_summary(&shared.lock());
            }
            Reload::Failed(error) => warn!("Reload failed, keeping previous version: {}", error),
        }
    }
    Ok(())
}

fn cmd_modes() -> Result<()> {
    for mode in InterpolationMode::ALL {
        println!("{}", mode);
    }
    println!("cubic-bezier(x1, y1, x2, y2)");
    Ok(())
}

// SYNOID Reel Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use tracing::{error, info, warn};

use synoid_reel::config::{self, ItemKind, Settings};
use synoid_reel::logging;
use synoid_reel::studio::image_tools::FrameRenderer;
use synoid_reel::studio::pipeline::plan_frames;
use synoid_reel::studio::voice::ElevenLabsClient;
use synoid_reel::studio::{health, ImageSource, Layout, ReelPipeline, ReelRequest};

#[derive(Parser)]
#[command(name = "synoid-reel")]
#[command(about = "SYNOID Reel: narrated quiz videos for vertical feeds", long_about = None)]
struct Cli {
    /// Append-only log file
    #[arg(long, global = true, default_value = "synoid_reel.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Single,
    Pair,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Single => Layout::Single,
            LayoutArg::Pair => Layout::Pair,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a quiz video from questions, a hook and images
    Generate {
        /// Settings document
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// JSON array of questions
        #[arg(short, long, default_value = "questions.json")]
        questions: PathBuf,

        /// JSON array of hook lines
        #[arg(long, default_value = "hooks.json")]
        hooks: PathBuf,

        /// Question images in order (two per question for the pair layout)
        #[arg(short, long, num_args = 1..)]
        images: Vec<PathBuf>,

        /// Use placeholder frames; with --images, only for images that fail to load
        #[arg(long)]
        create_placeholders: bool,

        #[arg(long, value_enum, default_value = "single")]
        layout: LayoutArg,

        /// Sound effect looped under pauses
        #[arg(long)]
        clock_audio: Option<PathBuf>,

        /// Output video path (defaults to output_settings)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Theme shown on an intro card
        #[arg(long)]
        theme: Option<String>,

        /// Closing card text (overrides card_settings.outro_text)
        #[arg(long)]
        outro: Option<String>,

        /// Hook text, bypassing the hooks file
        #[arg(long)]
        hook: Option<String>,

        /// Which hook from the hooks file to use
        #[arg(long, default_value = "0")]
        hook_index: usize,
    },

    /// Write placeholder frames for manual use
    Placeholders {
        #[arg(short = 'n', long)]
        count: usize,

        #[arg(long, value_enum, default_value = "single")]
        layout: LayoutArg,

        #[arg(long, default_value = "output")]
        out_dir: PathBuf,

        /// Settings document (only video_settings is read)
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
    },

    /// Validate settings and content, and look for ffmpeg
    Check {
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        #[arg(short, long, default_value = "questions.json")]
        questions: PathBuf,

        #[arg(long, default_value = "hooks.json")]
        hooks: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    let guard = match logging::init_tracing(&cli.log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: cannot open log file {}: {}", cli.log_file.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command).await {
        error!("❌ {:#}", e);
        eprintln!("Error: {:#}", e);
        drop(guard);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            config,
            questions,
            hooks,
            images,
            create_placeholders,
            layout,
            clock_audio,
            output,
            theme,
            outro,
            hook,
            hook_index,
        } => {
            let settings = Settings::load(&config)?;
            let questions = config::load_questions(&questions)?;
            let hook = config::resolve_hook(&hooks, hook.as_deref(), hook_index)?;
            let images = ImageSource::resolve(images, create_placeholders)?;

            let request = ReelRequest {
                questions,
                hook,
                images,
                layout: layout.into(),
                sound_effect: clock_audio,
                output: output.unwrap_or_else(|| settings.output.default_output_path()),
                theme,
                outro: outro.or_else(|| settings.cards.outro_text.clone()),
            };

            info!(
                "[MAIN] Generating {} questions -> {:?}",
                request.questions.len(),
                request.output
            );
            let client = ElevenLabsClient::new(&settings.voice).context("TTS client setup failed")?;
            let pipeline = ReelPipeline::new(&settings, client)?;
            let report = pipeline.run(&request).await?;

            println!("✅ Video saved: {}", report.output_path.display());
            println!("   Duration: {:.2}s", report.duration);
            println!("   Size:     {:.2} MB", report.size_mb);
        }

        Commands::Placeholders {
            count,
            layout,
            out_dir,
            config,
        } => {
            if count == 0 {
                bail!("--count must be at least 1");
            }
            let video = config::load_video_settings(&config)?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Cannot create {}", out_dir.display()))?;

            let jobs = plan_frames(count, &ImageSource::Placeholders, layout.into(), &out_dir)?;
            let frames = FrameRenderer::new(&video, false).render_all(&jobs)?;
            for frame in &frames {
                println!("{}", frame.path.display());
            }
            info!("[MAIN] ✅ {} placeholders written to {:?}", frames.len(), out_dir);
        }

        Commands::Check {
            config,
            questions,
            hooks,
        } => {
            let settings = Settings::load(&config)?;
            println!(
                "✅ Settings: {}x{} @ {}fps, voice {}",
                settings.video.width, settings.video.height, settings.video.fps, settings.voice.voice_id
            );

            let questions = config::load_questions(&questions)?;
            println!("✅ Questions: {}", questions.len());

            match config::load_content(&hooks, ItemKind::Hook) {
                Ok(items) if items.is_empty() => println!("⚠️  Hooks: none (pass --hook when generating)"),
                Ok(items) => println!("✅ Hooks: {}", items.len()),
                Err(e) => {
                    warn!("[MAIN] {}", e);
                    println!("⚠️  Hooks: {}", e);
                }
            }

            let missing = health::missing_tools().await;
            if !missing.is_empty() {
                bail!("Missing external tools: {}", missing.join(", "));
            }
            println!("✅ ffmpeg toolchain available");
        }
    }

    Ok(())
}

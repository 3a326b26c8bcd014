// Command-line front end for the download pipeline

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use omnistream::downloader::engines::{BrowserEngine, EngineSet, JDownloaderEngine, YtDlpEngine};
use omnistream::downloader::history::{FileHistory, MemoryHistory};
use omnistream::downloader::models::{DownloadFilter, EngineChoice};
use omnistream::downloader::orchestrator::{Orchestrator, PacingPolicy};
use omnistream::downloader::traits::HistoryStore;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Regular video downloads
    Video,
    /// Audio extraction (mp3)
    Audio,
    /// Short-form vertical content only
    ShortsOnly,
}

impl Mode {
    fn content_type(self) -> &'static str {
        match self {
            Mode::Video => "All Videos",
            Mode::Audio => "Audio Only",
            Mode::ShortsOnly => "Shorts Only",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Quality {
    Best,
    #[value(name = "1080p")]
    P1080,
    #[value(name = "720p")]
    P720,
    #[value(name = "480p")]
    P480,
}

impl Quality {
    fn label(self) -> &'static str {
        match self {
            Quality::Best => "Best Available",
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    Video,
    FileHost,
    Browser,
}

impl Engine {
    fn choice(self) -> EngineChoice {
        match self {
            Engine::Video => EngineChoice::VideoExtractor,
            Engine::FileHost => EngineChoice::FileHostManager,
            Engine::Browser => EngineChoice::BrowserAutomation,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "omnistream", version, about = "Personal media archiver")]
struct Cli {
    /// URLs to download
    #[arg(required = true)]
    urls: Vec<String>,

    /// Maximum number of items for bulk URLs
    #[arg(long)]
    max: Option<u32>,

    #[arg(long, value_enum, default_value = "video")]
    mode: Mode,

    #[arg(long, value_enum, default_value = "best")]
    quality: Quality,

    /// Earliest upload date ("2024-12-01", "last week", "last 5 days")
    #[arg(long)]
    date_from: Option<String>,

    /// Latest upload date
    #[arg(long)]
    date_to: Option<String>,

    /// Root directory for downloaded files
    #[arg(long, default_value = "downloads")]
    output: PathBuf,

    /// Persistent download history file; omit for in-memory history
    #[arg(long)]
    history: Option<PathBuf>,

    /// Force a specific engine instead of routing by URL
    #[arg(long, value_enum)]
    engine: Option<Engine>,

    /// Skip the anti-rate-limit delay between bulk downloads
    #[arg(long)]
    no_delay: bool,

    /// Re-download items already present in history
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omnistream=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let history: Arc<dyn HistoryStore> = match &cli.history {
        Some(path) => match FileHistory::open(path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("cannot open history file: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Arc::new(MemoryHistory::new()),
    };

    let filter = DownloadFilter {
        content_type: cli.mode.content_type().to_string(),
        quality: cli.quality.label().to_string(),
        max_downloads: cli.max,
        date_from: cli.date_from.clone(),
        date_to: cli.date_to.clone(),
        skip_existing: !cli.force,
        ..DownloadFilter::default()
    };

    let engines = EngineSet {
        video: Arc::new(YtDlpEngine::new()),
        file_host: Arc::new(JDownloaderEngine::new()),
        browser: Arc::new(BrowserEngine::new()),
    };

    let mut orchestrator = Orchestrator::new(engines, history, &cli.output);
    if cli.no_delay {
        orchestrator = orchestrator.with_pacing(PacingPolicy::disabled());
    }
    if let Some(engine) = cli.engine {
        orchestrator = orchestrator.with_engine_override(engine.choice());
    }

    let stop = orchestrator.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing current download");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let summary = orchestrator.run_batch(&cli.urls, &filter).await;

    for report in &summary.reports {
        let engine = report
            .engine
            .map(|e| e.as_str())
            .unwrap_or("-");
        info!(
            url = %report.url,
            engine,
            state = ?report.state,
            fallback = report.fallback_used,
            "{}",
            report.message
        );
        for warning in &report.warnings {
            info!(url = %report.url, "warning: {}", warning);
        }
    }
    info!(
        ok = summary.success_count,
        failed = summary.failure_count,
        skipped = summary.skipped_count,
        "batch finished"
    );

    if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

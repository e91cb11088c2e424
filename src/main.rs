use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scriptcast::batch::{self, BatchDriver};
use scriptcast::{AudioCache, Composer, Config, GoogleTts, RequestPacer, SegmentResolver};

/// scriptcast - render structured transcripts into narrated audio tracks
#[derive(Parser)]
#[command(name = "scriptcast", version, about)]
struct Cli {
    /// Project directory holding transcripts/, audio_lib/, and output/
    #[arg(short, long, env = "SCRIPTCAST_PROJECT_DIR", default_value = ".")]
    project_dir: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Delete all cached audio artifacts and reset the cache index
    ResetCache,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,scriptcast=info",
        1 => "info,scriptcast=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.project_dir)?;

    if let Some(Command::ResetCache) = cli.command {
        let mut cache = AudioCache::load(&config.audio_lib_dir)?;
        let deleted = cache.reset()?;
        println!("Deleted {deleted} audio artifacts and reset the cache index.");
        return Ok(());
    }

    // Both fatal startup checks run before any transcript is touched.
    let ffmpeg = batch::check_toolchain()?;
    let cache = AudioCache::load(&config.audio_lib_dir)?;

    // A missing credential is not fatal here: a fully cached batch needs no
    // synthesis calls. The client reports it on the first actual call.
    if config.api_key.is_none() {
        tracing::warn!(
            "no synthesis API key discovered; only cached audio can be rendered"
        );
    }

    let synthesizer = GoogleTts::new(
        config.api_key.clone(),
        config.voice.clone(),
        config.sample_rate,
        config.request_timeout,
    )?;
    let pacer = RequestPacer::new(config.queries_per_minute);
    let resolver =
        SegmentResolver::new(cache, Box::new(synthesizer), pacer, config.sample_rate);
    let composer = Composer::new(resolver, config.sample_rate);

    std::fs::create_dir_all(&config.transcripts_dir)?;
    let mut driver = BatchDriver::new(
        composer,
        config.transcripts_dir.clone(),
        config.output_dir.clone(),
        ffmpeg,
    );

    let summary = driver.run().await?;
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} transcripts failed",
            summary.failed,
            summary.failed + summary.rendered
        );
    }
    Ok(())
}

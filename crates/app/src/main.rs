//! Maskpaint - headless mask authoring
//!
//! Loads a source image, replays a JSON script of editor commands against an
//! editing session, then confirms the save: the mask is compressed, uploaded
//! and written next to the saved strokes.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use maskpaint_config::EditorConfig;
use maskpaint_ipc::{
    commands_from_json, event_to_json, strokes_from_json, strokes_to_json, SaveResult,
};
use maskpaint_upload::{LocalDirUpload, UploadBackend};
use painting::{CommandOutcome, EditorSession, FileImageLoader, ImageState};
use tracing::{debug, info, warn};

mod config;

use config::{ReplayClock, UploadTarget};

#[derive(Parser, Debug)]
#[command(name = "maskpaint", version)]
struct Cli {
    /// Source image the mask is drawn over.
    #[arg(long)]
    image: PathBuf,

    /// JSON array of editor commands to replay.
    #[arg(long)]
    commands: PathBuf,

    /// Output path for the lossless mask PNG.
    #[arg(long)]
    out: PathBuf,

    /// Previously saved strokes to resume from.
    #[arg(long)]
    strokes_in: Option<PathBuf>,

    /// Where to write the saved strokes.
    #[arg(long)]
    strokes_out: Option<PathBuf>,

    /// Simulated time between two commands, in milliseconds.
    #[arg(long, default_value_t = 16)]
    step_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(config::log_level_from_env())
        .init();

    let cli = Cli::parse();
    let editor_config = EditorConfig::from_env();
    info!(
        "Starting maskpaint: container {}x{}, budget {} bytes",
        editor_config.container_width, editor_config.container_height, editor_config.size_limit_bytes
    );

    let fallback_dir = cli
        .out
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    match UploadTarget::from_env(fallback_dir) {
        #[cfg(feature = "remote")]
        UploadTarget::Remote(url) => {
            info!("Uploading to {}", url);
            run(&cli, editor_config, maskpaint_upload::RemoteUpload::new(url)).await
        }
        #[cfg(not(feature = "remote"))]
        UploadTarget::Remote(url) => {
            Err(format!("Remote upload to {url} needs the `remote` feature").into())
        }
        UploadTarget::LocalDir(dir) => {
            info!("Storing upload in {}", dir.display());
            run(&cli, editor_config, LocalDirUpload::new(dir)).await
        }
    }
}

async fn run<B: UploadBackend>(
    cli: &Cli,
    editor_config: EditorConfig,
    mut uploader: B,
) -> Result<(), Box<dyn Error>> {
    let quiescence = editor_config.quiescence_delay();
    let mut session = EditorSession::new(editor_config);
    let mut clock = ReplayClock::new(Duration::from_millis(cli.step_ms));

    let loader = FileImageLoader::new();
    session
        .load_image(&loader, &cli.image.to_string_lossy())
        .await;
    if let ImageState::Failed(message) = session.image_state() {
        return Err(format!("Cannot load {}: {}", cli.image.display(), message).into());
    }

    if let Some(path) = &cli.strokes_in {
        let strokes = strokes_from_json(&tokio::fs::read_to_string(path).await?)?;
        info!("Resuming from {} saved strokes", strokes.len());
        session.load_strokes(strokes, clock.now())?;
    }

    let commands = commands_from_json(&tokio::fs::read_to_string(&cli.commands).await?)?;
    info!("Replaying {} commands", commands.len());

    let mut confirmed = None;
    for command in commands {
        let now = clock.tick();
        match session.apply(command, now)? {
            CommandOutcome::Applied => session.tick(now),
            CommandOutcome::ConfirmRequested => {
                confirmed = Some(session.confirm(&mut uploader, report_save).await);
            }
        }
        log_events(&mut session);
    }

    let result = match confirmed {
        Some(result) => result,
        None => {
            // Let the last quiescence window elapse, then save
            session.tick(clock.advance(quiescence));
            session.confirm(&mut uploader, report_save).await
        }
    };
    log_events(&mut session);

    match session.mask() {
        Some(mask) => {
            tokio::fs::write(&cli.out, mask.to_png_bytes()?).await?;
            info!(
                "Wrote {}x{} mask to {}",
                mask.width(),
                mask.height(),
                cli.out.display()
            );
        }
        None => warn!("No mask image produced, only strokes were saved"),
    }

    if let Some(path) = &cli.strokes_out {
        tokio::fs::write(path, strokes_to_json(&result.strokes)?).await?;
        info!("Wrote {} strokes to {}", result.strokes.len(), path.display());
    }

    Ok(())
}

fn report_save(result: SaveResult) {
    for warning in &result.warnings {
        warn!("Save warning ({:?}): {}", warning.kind, warning.message);
    }
    match &result.uploaded_mask_url {
        Some(url) => info!("Saved {} strokes, mask at {}", result.strokes.len(), url),
        None => info!("Saved {} strokes, mask not uploaded", result.strokes.len()),
    }
}

fn log_events(session: &mut EditorSession) {
    for event in session.drain_events() {
        match event_to_json(&event) {
            Ok(json) if json.len() <= 256 => debug!("event: {}", json),
            Ok(json) => {
                let head: String = json.chars().take(256).collect();
                debug!("event: {}...", head);
            }
            Err(e) => warn!("Cannot serialize event: {}", e),
        }
    }
}

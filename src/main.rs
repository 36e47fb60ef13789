mod audio;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod narration;
mod view;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Result;
use clap::Parser;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use audio::{AudioOutput, EspeakEngine, NullOutput};
use config::AppConfig;
use controller::AppController;
use model::{ApiClient, AppModel, FallbackData, PlaybackState};
use narration::NarrationPlayer;
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::parse();

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(api_url = %config.api_url, "=== ScanSpectrum Starting ===");

    let fallback = match &config.fallback_data {
        Some(path) => FallbackData::from_path(path)?,
        None => FallbackData::embedded()?,
    };
    let api = ApiClient::new(&config.api_url, config.timeout())?;
    tracing::debug!(base_url = %api.base_url(), timeout = ?config.timeout(), "Scan backend client ready");

    // The output stream is !Send and must outlive every narration clip
    let (_stream, output) = if config.mute {
        tracing::info!("Audio output disabled");
        (None, Arc::new(NullOutput::new("audio muted")) as Arc<dyn AudioOutput>)
    } else {
        audio::open_default_output()
    };
    let speech = Arc::new(EspeakEngine::new(config.speech_program.clone()));
    let narrator = NarrationPlayer::new(output, speech, reqwest::Client::new());
    let playback = narrator.subscribe();

    let model = Arc::new(AppModel::new());
    let controller = AppController::new(
        model.clone(),
        api,
        Arc::new(fallback),
        Arc::new(Mutex::new(narrator)),
    );

    let controller_for_init = controller.clone();
    tokio::spawn(async move {
        controller_for_init.check_backend().await;
        controller_for_init.load_library().await;
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller, playback).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("ScanSpectrum shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<AppModel>,
    controller: AppController<ApiClient>,
    playback: tokio::sync::watch::Receiver<PlaybackState>,
) -> io::Result<()> {
    loop {
        // Auto-clear notices after their lifetime
        controller.expire_notice(Instant::now()).await;

        // Skip the poll while a narration is being swapped in
        if let Ok(mut narrator) = controller.narrator.try_lock() {
            narrator.refresh();
        }

        let state = model.snapshot().await;
        let playback_state = playback.borrow().clone();

        terminal.draw(|f| {
            AppView::render(f, &state, &playback_state);
        })?;

        if state.should_quit {
            break;
        }

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}

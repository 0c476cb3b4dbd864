// ============================================================================
// MarketBar - Barre de cotations en terminal
// ============================================================================
// Affiche une barre d'état de tickers en haut du terminal :
// - statique pour 1 ou 2 tickers
// - en rotation quand un seul ticker est demandé
// - en défilement (marquee) à partir de 3 tickers
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Runtime tokio current_thread : tout le moteur tourne sur un seul thread
// 3. Thread clavier : la lecture bloquante de crossterm reste hors du runtime
// ============================================================================

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use marketbar::app::App;
use marketbar::config::{self, DEFAULT_SYMBOLS};
use marketbar::feed;
use marketbar::models::DisplaySettings;
use marketbar::provider::MarketStore;
use marketbar::ui::{events::spawn_event_reader, render, Event, TerminalHost};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/marketbar/logs
/// - macOS : ~/Library/Application Support/marketbar/logs
/// - Windows : C:\Users\<user>\AppData\Local\marketbar\logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("marketbar").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/marketbar/logs/marketbar.log.*
/// RUST_LOG=marketbar=trace marketbar
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "marketbar.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour marketbar, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketbar=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

/// Charge les réglages, ou les valeurs par défaut si le fichier est invalide
fn load_or_default(path: &std::path::Path) -> Result<DisplaySettings> {
    match config::load_settings(path) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            warn!(error = ?e, "Invalid settings, falling back to defaults");
            DisplaySettings::default().with_symbols(DEFAULT_SYMBOLS).validated()
        }
    }
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("MarketBar starting up");

    let path = config::settings_path();
    let settings = load_or_default(&path)?;
    let tickers = feed::sync_with_symbols(&[], &settings.symbols);
    let store = MarketStore::new(settings, tickers);

    // CONCEPT : Runtime mono-thread
    // - Le controller n'est jamais partagé entre threads
    // - Timers, notifications et touches sont traités dans l'ordre
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Échec de la création du runtime tokio")?;

    let (tx, keys) = mpsc::channel::<Event>(32);
    let reader = spawn_event_reader(tx);

    let result = runtime.block_on(run(store, path, keys));

    // Le thread clavier voit le channel fermé au prochain poll
    if reader.join().is_err() {
        error!("Keyboard thread panicked");
    }

    match &result {
        Ok(()) => info!("MarketBar shutting down"),
        Err(e) => error!(error = ?e, "MarketBar stopped on error"),
    }
    result
}

/// Lance le feed, configure la barre et fait tourner la boucle
async fn run(store: MarketStore, path: PathBuf, mut keys: mpsc::Receiver<Event>) -> Result<()> {
    let feed = tokio::spawn(feed::run_simulated_feed(store.clone()));

    let mut terminal = setup_terminal().context("Échec de l'initialisation du terminal")?;
    let mut app = App::new(store, TerminalHost, Some(path));

    // Sans barre, rien à afficher : erreur fatale
    if let Err(e) = app.start() {
        feed.abort();
        restore_terminal(&mut terminal)?;
        return Err(e);
    }

    let result = event_loop(&mut terminal, &mut app, &mut keys).await;

    app.stop();
    feed.abort();
    restore_terminal(&mut terminal)?;
    result
}

/// Boucle principale : dessine puis attend le prochain événement
async fn event_loop(
    terminal: &mut Term,
    app: &mut App<TerminalHost>,
    keys: &mut mpsc::Receiver<Event>,
) -> Result<()> {
    while app.is_running() {
        terminal.draw(|frame| render(frame, app))?;
        app.step(keys).await;
    }
    Ok(())
}

// ============================================================================
// Gestion du terminal
// ============================================================================

/// Passe le terminal en raw mode + alternate screen
fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;

    // Écran secondaire : l'écran précédent est restauré en sortie
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restaure le terminal dans son état d'origine
fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

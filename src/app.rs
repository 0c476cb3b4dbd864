// ============================================================================
// Structure : App
// ============================================================================
// Relie le moteur d'affichage au monde extérieur :
// - le provider (MarketStore) et le controller de la barre
// - les touches clavier, qui modifient les réglages
// - la boucle d'événements : notifications, touches, timers
//
// PATTERN : Application State
// - main.rs ne fait que dessiner et appeler step()
// - Toutes les modifications passent par les méthodes de App
//
// CONCEPT RUST : tokio::select!
// - Attend plusieurs futures, exécute la branche de la première prête
// - Les autres futures sont annulées (droppées) : aucun état partagé
// ============================================================================

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config;
use crate::display::{DisplayController, StatusHost};
use crate::models::DisplaySettings;
use crate::provider::MarketStore;
use crate::ui::events::{action_for, Event, KeyAction};

/// État principal de l'application
pub struct App<H: StatusHost> {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    store: MarketStore,
    controller: DisplayController<H>,

    /// Où sauvegarder les réglages modifiés au clavier (None : pas de sauvegarde)
    settings_path: Option<PathBuf>,
}

impl<H: StatusHost> App<H> {
    /// Crée l'application (la barre n'est pas encore configurée)
    pub fn new(store: MarketStore, host: H, settings_path: Option<PathBuf>) -> Self {
        Self {
            running: true,
            controller: DisplayController::new(store.clone(), host),
            store,
            settings_path,
        }
    }

    /// Configure la barre : une erreur ici est fatale
    pub fn start(&mut self) -> Result<()> {
        self.controller.configure(Instant::now())
    }

    /// Libère la barre
    pub fn stop(&mut self) {
        self.running = false;
        self.controller.teardown();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn store(&self) -> &MarketStore {
        &self.store
    }

    pub fn controller(&self) -> &DisplayController<H> {
        &self.controller
    }

    // ========================================================================
    // Boucle d'événements
    // ========================================================================

    /// Attend le prochain événement, le traite, puis fait avancer la barre
    ///
    /// Trois sources :
    /// - une notification du provider → on_update()
    /// - une touche → handle_key()
    /// - l'échéance d'un timer ou la prochaine image d'animation
    pub async fn step(&mut self, keys: &mut mpsc::Receiver<Event>) {
        let wake = self
            .controller
            .next_wake(Instant::now())
            .map(tokio::time::Instant::from_std);

        // CONCEPT RUST : Future conditionnelle
        // - Sans échéance, la branche timer ne doit jamais se résoudre
        let timer = async {
            match wake {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            update = self.controller.next_update() => match update {
                Some(reason) => self.controller.on_update(reason, Instant::now()),
                None => {
                    warn!("Provider closed, stopping");
                    self.running = false;
                }
            },
            key = keys.recv() => match key {
                Some(event) => self.handle_key(&event),
                None => {
                    info!("Keyboard channel closed, stopping");
                    self.running = false;
                }
            },
            _ = timer => {}
        }

        self.controller.advance(Instant::now());
    }

    // ========================================================================
    // Clavier
    // ========================================================================

    /// Applique l'action associée à une touche
    pub fn handle_key(&mut self, event: &Event) {
        let Some(action) = action_for(event) else {
            return;
        };
        debug!(?action, "Key action");

        match action {
            KeyAction::Quit => self.running = false,
            KeyAction::ToggleOneTicker => {
                self.change_settings(|s| s.with_only_one_ticker(!s.show_only_one_ticker))
            }
            KeyAction::ToggleTickerName => {
                self.change_settings(|s| s.with_ticker_name(!s.show_ticker_name))
            }
            KeyAction::TogglePercentage => self.change_settings(|s| {
                s.with_change_as_percentage(!s.show_change_as_percentage)
            }),
            KeyAction::TogglePremarket => {
                self.change_settings(|s| s.with_premarket_in_bar(!s.show_premarket_in_bar))
            }
            KeyAction::DropFirstTicker => self.drop_first_ticker(),
        }
    }

    /// Modifie les réglages dans le provider puis les sauvegarde
    fn change_settings<F>(&mut self, derive: F)
    where
        F: FnOnce(&DisplaySettings) -> DisplaySettings,
    {
        self.store.update_settings(derive);

        if let Some(path) = &self.settings_path {
            if let Err(e) = config::save_settings(path, &self.store.settings()) {
                warn!(error = ?e, "Failed to save settings");
            }
        }
    }

    /// Retire le premier ticker de la liste publiée
    ///
    /// Le feed le recrée au cycle suivant (il suit les symboles configurés).
    fn drop_first_ticker(&mut self) {
        let mut tickers = self.store.tickers();
        if tickers.is_empty() {
            return;
        }
        let removed = tickers.remove(0);
        info!(symbol = %removed.symbol, "Dropping ticker from provider");
        self.store.set_tickers(tickers);
    }
}

// ============================================================================
// Tests
// ============================================================================

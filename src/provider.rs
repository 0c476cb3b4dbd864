// ============================================================================
// Provider : réglages + tickers partagés
// ============================================================================
// MarketStore est le collaborateur injecté dans le moteur d'affichage :
// - lecture seule du snapshot courant (réglages, tickers)
// - deux flux de notifications sans payload : SettingsChanged, TickersChanged
//
// CONCEPTS RUST :
// 1. Arc<Mutex<T>> : état partagé entre la boucle d'affichage et le feed
// 2. tokio::sync::broadcast : chaque abonné reçoit chaque notification
// 3. Clone bon marché : cloner le store clone seulement les Arc/Sender
// ============================================================================

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{DisplaySettings, Ticker};

/// Capacité du canal de notifications
/// Un abonné en retard reçoit Lagged et reconstruit tout (voir controller)
pub const NOTIFICATION_CAPACITY: usize = 64;

/// Raison d'une mise à jour de l'affichage
///
/// Pas de payload : l'abonné relit l'état courant du store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// Nouveau snapshot de réglages
    SettingsChanged,

    /// Nouvelle liste de tickers (ou nouveaux prix)
    TickersChanged,
}

/// État interne protégé par le Mutex
#[derive(Debug)]
struct StoreState {
    settings: DisplaySettings,
    tickers: Vec<Ticker>,
    last_update: Option<DateTime<Utc>>,
}

/// Store partagé des réglages et des tickers
#[derive(Debug, Clone)]
pub struct MarketStore {
    state: Arc<Mutex<StoreState>>,
    notifier: broadcast::Sender<UpdateReason>,
}

impl MarketStore {
    /// Crée un store avec un état initial
    pub fn new(settings: DisplaySettings, tickers: Vec<Ticker>) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(StoreState {
                settings,
                tickers,
                last_update: None,
            })),
            notifier,
        }
    }

    /// Accès exclusif à l'état
    ///
    /// CONCEPT RUST : Mutex empoisonné
    /// - Si un thread a paniqué en tenant le lock, lock() retourne Err
    /// - L'état reste cohérent ici (remplacements atomiques), on le récupère
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot courant des réglages
    pub fn settings(&self) -> DisplaySettings {
        self.lock().settings.clone()
    }

    /// Snapshot courant des tickers (ordre du provider)
    pub fn tickers(&self) -> Vec<Ticker> {
        self.lock().tickers.clone()
    }

    /// Nombre de tickers actuellement disponibles
    pub fn ticker_count(&self) -> usize {
        self.lock().tickers.len()
    }

    /// Date de la dernière publication de tickers
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.lock().last_update
    }

    /// S'abonne aux notifications
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateReason> {
        self.notifier.subscribe()
    }

    /// Remplace entièrement les réglages et notifie SettingsChanged
    pub fn set_settings(&self, settings: DisplaySettings) {
        self.lock().settings = settings;
        self.notify(UpdateReason::SettingsChanged);
    }

    /// Dérive un nouveau snapshot des réglages courants et le publie
    pub fn update_settings<F>(&self, derive: F)
    where
        F: FnOnce(&DisplaySettings) -> DisplaySettings,
    {
        let next = derive(&self.settings());
        self.set_settings(next);
    }

    /// Remplace la liste de tickers et notifie TickersChanged
    pub fn set_tickers(&self, tickers: Vec<Ticker>) {
        {
            let mut state = self.lock();
            state.tickers = tickers;
            state.last_update = Some(Utc::now());
        }
        self.notify(UpdateReason::TickersChanged);
    }

    fn notify(&self, reason: UpdateReason) {
        // send() échoue seulement s'il n'y a aucun abonné : ce n'est pas une erreur
        match self.notifier.send(reason) {
            Ok(receivers) => debug!(?reason, receivers, "Notification sent"),
            Err(_) => debug!(?reason, "Notification dropped (no subscriber)"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

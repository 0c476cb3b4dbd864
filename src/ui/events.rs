// ============================================================================
// Gestion des événements clavier
// ============================================================================
// Lit les événements crossterm dans un thread dédié et les transmet à la
// boucle principale via un channel tokio.
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Channels : communication entre le thread clavier et la boucle async
// 3. blocking_send : envoyer depuis un thread std vers un channel tokio
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Rien ne s'est passé pendant le délai de poll
    Tick,
}

/// Actions déclenchées au clavier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    ToggleOneTicker,
    ToggleTickerName,
    TogglePercentage,
    TogglePremarket,
    /// Simule la disparition du premier ticker côté provider
    DropFirstTicker,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    poll_timeout: Duration,
}

impl EventHandler {
    /// Crée un nouveau gestionnaire d'événements
    pub fn new() -> Self {
        Self {
            poll_timeout: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend max 250ms
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.poll_timeout)? {
            match event::read()? {
                // Sur certains OS on reçoit Press ET Release : on garde Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Lance le thread de lecture du clavier
///
/// Le thread s'arrête dès que le récepteur est fermé.
pub fn spawn_event_reader(tx: mpsc::Sender<Event>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let events = EventHandler::new();
        loop {
            match events.next() {
                Ok(Event::Tick) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Ok(event) => {
                    if tx.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = ?e, "Failed to read terminal event");
                    break;
                }
            }
        }
        debug!("Event reader thread exiting");
    })
}

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
    } else {
        false
    }
}

/// Traduit une touche en action
///
/// CONCEPT RUST : Pattern matching avec if let
/// - Destructure Event::Key puis match sur le KeyCode
pub fn action_for(event: &Event) -> Option<KeyAction> {
    if is_quit_event(event) {
        return Some(KeyAction::Quit);
    }

    let Event::Key(key) = event else {
        return None;
    };

    match key.code {
        KeyCode::Char('o') | KeyCode::Char('O') => Some(KeyAction::ToggleOneTicker),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(KeyAction::ToggleTickerName),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(KeyAction::TogglePercentage),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(KeyAction::TogglePremarket),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(KeyAction::DropFirstTicker),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

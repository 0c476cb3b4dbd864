// ============================================================================
// Module : display
// ============================================================================
// Le moteur d'affichage de la barre d'état :
// (tickers, réglages, temps) → ce qui est affiché, et ce qui s'exécute ensuite
//
// Des feuilles vers la racine :
// - widget     : TickerWidget, unité d'affichage animable
// - surface    : traits de la barre fournie par l'hôte
// - session    : mode, jeton de chaîne, session courante
// - rotation   : scheduler du mode OneTicker
// - marquee    : scheduler du mode ManyTickers
// - controller : DisplayController, racine du moteur
// ============================================================================

pub mod controller;
pub mod marquee;
pub mod rotation;
pub mod session;
pub mod surface;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports pour simplifier les imports
pub use controller::DisplayController;
pub use session::Mode;
pub use surface::{StatusHost, StatusSurface};
pub use widget::{TickerWidget, WidgetFormat, WidgetId};

// ============================================================================
// Module : models
// ============================================================================
// Ce module contient les structures de données partagées par le moteur
// d'affichage et le provider : tickers et réglages
// ============================================================================

pub mod settings; // Réglages d'affichage (settings.rs)
pub mod ticker;   // Ticker et cotation (ticker.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use marketbar::models::ticker::Ticker;
// On peut faire : use marketbar::models::Ticker;
pub use settings::{DisplaySettings, DEFAULT_UPDATE_INTERVAL, MAX_TICKERS};
pub use ticker::{PremarketQuote, Ticker};

// ============================================================================
// Configuration : réglages persistés en JSON
// ============================================================================
// Emplacement par défaut :
// - Linux : ~/.config/marketbar/settings.json
// - macOS : ~/Library/Application Support/marketbar/settings.json
// - Windows : C:\Users\<user>\AppData\Roaming\marketbar\settings.json
//
// Un fichier absent n'est pas une erreur : on part des valeurs par défaut.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::DisplaySettings;

/// Symboles utilisés quand aucune watchlist n'est configurée
pub const DEFAULT_SYMBOLS: [&str; 3] = ["AAPL", "MSFT", "BTC-USD"];

/// Chemin du fichier de réglages
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marketbar")
        .join("settings.json")
}

/// Charge et valide les réglages
///
/// CONCEPT RUST : Context
/// - .context() ajoute un message lisible à l'erreur d'origine
/// - L'erreur finale garde toute la chaîne (I/O → parsing → validation)
pub fn load_settings(path: &Path) -> Result<DisplaySettings> {
    if !path.exists() {
        info!(path = %path.display(), "No settings file, using defaults");
        return DisplaySettings::default()
            .with_symbols(DEFAULT_SYMBOLS)
            .validated();
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Lecture impossible de {}", path.display()))?;
    let settings: DisplaySettings = serde_json::from_str(&raw)
        .with_context(|| format!("Réglages invalides dans {}", path.display()))?;

    debug!(path = %path.display(), symbols = settings.ticker_count(), "Settings loaded");
    settings.validated()
}

/// Sauvegarde les réglages (crée le répertoire si besoin)
pub fn save_settings(path: &Path, settings: &DisplaySettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Création impossible de {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(settings).context("Sérialisation des réglages")?;
    fs::write(path, json).with_context(|| format!("Écriture impossible de {}", path.display()))?;

    debug!(path = %path.display(), "Settings saved");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

// ============================================================================
// Structure : DisplaySettings
// ============================================================================
// Snapshot immuable des réglages d'affichage de la barre
//
// CONCEPTS RUST :
// 1. Valeur immuable : un nouveau snapshot remplace entièrement l'ancien
//    - Aucune mutation partielle côté moteur
//    - Les helpers with_*() retournent une NOUVELLE valeur
// 2. #[serde(default)] : les champs absents du JSON prennent la valeur Default
// ============================================================================

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Nombre maximal de tickers configurables
pub const MAX_TICKERS: usize = 10;

/// Intervalle de rafraîchissement des données par défaut (secondes)
pub const DEFAULT_UPDATE_INTERVAL: f64 = 30.0;

/// Réglages d'affichage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Symboles de la watchlist, dans l'ordre d'affichage
    pub symbols: Vec<String>,

    /// Fraîcheur des données en secondes (> 0)
    /// N'a aucun effet sur la cadence de rotation de la barre
    pub update_interval_seconds: f64,

    /// Affiche la variation en pourcentage plutôt qu'en absolu
    pub show_change_as_percentage: bool,

    /// Un seul ticker à la fois, en rotation
    pub show_only_one_ticker: bool,

    /// Affiche le nom du ticker à côté du symbole
    pub show_ticker_name: bool,

    /// Affiche la cotation pre-market dans la barre
    pub show_premarket_in_bar: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            update_interval_seconds: DEFAULT_UPDATE_INTERVAL,
            show_change_as_percentage: false,
            show_only_one_ticker: false,
            show_ticker_name: true,
            show_premarket_in_bar: false,
        }
    }
}

impl DisplaySettings {
    /// Nombre de tickers configurés
    pub fn ticker_count(&self) -> usize {
        self.symbols.len()
    }

    /// Retourne une copie avec la liste de symboles remplacée
    pub fn with_symbols<I, S>(&self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    /// Retourne une copie avec le mode "un seul ticker" modifié
    pub fn with_only_one_ticker(&self, enabled: bool) -> Self {
        Self {
            show_only_one_ticker: enabled,
            ..self.clone()
        }
    }

    /// Retourne une copie avec l'affichage du nom modifié
    pub fn with_ticker_name(&self, enabled: bool) -> Self {
        Self {
            show_ticker_name: enabled,
            ..self.clone()
        }
    }

    /// Retourne une copie avec le format de variation modifié
    pub fn with_change_as_percentage(&self, enabled: bool) -> Self {
        Self {
            show_change_as_percentage: enabled,
            ..self.clone()
        }
    }

    /// Retourne une copie avec l'affichage pre-market modifié
    pub fn with_premarket_in_bar(&self, enabled: bool) -> Self {
        Self {
            show_premarket_in_bar: enabled,
            ..self.clone()
        }
    }

    /// Vérifie et normalise un snapshot lu depuis l'extérieur
    ///
    /// CONCEPT RUST : Consommer self
    /// - self est "moved" dans la fonction puis retourné normalisé
    /// - Un intervalle invalide est une erreur, le reste est corrigé
    pub fn validated(mut self) -> Result<Self> {
        if !self.update_interval_seconds.is_finite() || self.update_interval_seconds <= 0.0 {
            bail!(
                "update_interval_seconds doit être > 0 (reçu {})",
                self.update_interval_seconds
            );
        }

        // Symboles : trim + majuscules, sans doublons ni vides
        let mut symbols: Vec<String> = Vec::with_capacity(self.symbols.len());
        for raw in &self.symbols {
            let symbol = raw.trim().to_uppercase();
            if !symbol.is_empty() && !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        if symbols.len() > MAX_TICKERS {
            warn!(count = symbols.len(), max = MAX_TICKERS, "Too many symbols, truncating");
            symbols.truncate(MAX_TICKERS);
        }

        self.symbols = symbols;
        Ok(self)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DisplaySettings::default();
        assert_eq!(settings.update_interval_seconds, 30.0);
        assert!(settings.show_ticker_name);
        assert!(!settings.show_only_one_ticker);
        assert!(!settings.show_change_as_percentage);
        assert!(!settings.show_premarket_in_bar);
        assert_eq!(settings.ticker_count(), 0);
    }

    #[test]
    fn test_with_helpers_do_not_mutate() {
        let base = DisplaySettings::default();
        let one = base.with_only_one_ticker(true);

        assert!(one.show_only_one_ticker);
        assert!(!base.show_only_one_ticker);
    }

    #[test]
    fn test_validated_normalizes_symbols() {
        let settings = DisplaySettings::default()
            .with_symbols([" aapl", "MSFT", "aapl", "", "tsla "])
            .validated()
            .unwrap();

        assert_eq!(settings.symbols, vec!["AAPL", "MSFT", "TSLA"]);
    }

    #[test]
    fn test_validated_truncates_to_max() {
        let symbols: Vec<String> = (0..15).map(|i| format!("T{}", i)).collect();
        let settings = DisplaySettings::default().with_symbols(symbols).validated().unwrap();

        assert_eq!(settings.ticker_count(), MAX_TICKERS);
        assert_eq!(settings.symbols[0], "T0");
    }

    #[test]
    fn test_validated_rejects_bad_interval() {
        let settings = DisplaySettings {
            update_interval_seconds: 0.0,
            ..DisplaySettings::default()
        };
        assert!(settings.validated().is_err());

        let settings = DisplaySettings {
            update_interval_seconds: f64::NAN,
            ..DisplaySettings::default()
        };
        assert!(settings.validated().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: DisplaySettings =
            serde_json::from_str(r#"{ "symbols": ["AAPL"], "show_only_one_ticker": true }"#).unwrap();

        assert_eq!(settings.symbols, vec!["AAPL"]);
        assert!(settings.show_only_one_ticker);
        assert_eq!(settings.update_interval_seconds, DEFAULT_UPDATE_INTERVAL);
    }
}

// ============================================================================
// Structure : Ticker
// ============================================================================
// Représente un symbole boursier tel que fourni par le provider de données
//
// CONCEPTS RUST :
// 1. #[derive(...)] : génère automatiquement l'implémentation de traits
//    - Debug : permet d'afficher la structure avec {:?}
//    - Clone : le moteur garde une copie (snapshot) des tickers
//    - PartialEq : permet de comparer deux tickers avec ==
//
// 2. Identité : deux tickers sont "le même" s'ils ont le même symbole
//    - Les prix changent, le symbole reste
//    - Voir same_symbol(), utilisé par la rotation
// ============================================================================

use serde::{Deserialize, Serialize};

/// Cotation hors séance (pre-market)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremarketQuote {
    /// Prix pre-market
    pub price: f64,

    /// Variation pre-market en pourcentage
    pub change_percent: f64,
}

/// Ticker représentant un symbole boursier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Symbole du ticker (ex: "AAPL", "BTC-USD") : identité du ticker
    pub symbol: String,

    /// Nom complet (ex: "Apple Inc.")
    pub name: String,

    /// Prix actuel (optionnel car peut ne pas être chargé)
    pub price: Option<f64>,

    /// Variation absolue depuis la clôture précédente
    pub change: Option<f64>,

    /// Variation en pourcentage depuis la clôture précédente
    pub change_percent: Option<f64>,

    /// Cotation pre-market, si disponible
    pub premarket: Option<PremarketQuote>,
}

impl Ticker {
    /// Constructeur : crée un Ticker sans cotation
    ///
    /// CONCEPT RUST : impl Into<String>
    /// - Accepte &str ou String sans forcer l'appelant à faire .to_string()
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price: None,
            change: None,
            change_percent: None,
            premarket: None,
        }
    }

    /// Crée un Ticker avec un prix et sa variation absolue
    ///
    /// Le pourcentage est déduit de la variation et du prix précédent.
    pub fn with_quote(symbol: impl Into<String>, name: impl Into<String>, price: f64, change: f64) -> Self {
        let mut ticker = Self::new(symbol, name);
        ticker.update_price(price, change);
        ticker
    }

    /// Met à jour le prix actuel et la variation
    pub fn update_price(&mut self, price: f64, change: f64) {
        let previous = price - change;
        self.price = Some(price);
        self.change = Some(change);
        self.change_percent = if previous.abs() > f64::EPSILON {
            Some(change / previous * 100.0)
        } else {
            None
        };
    }

    /// Définit la cotation pre-market
    pub fn set_premarket(&mut self, price: f64, change_percent: f64) {
        self.premarket = Some(PremarketQuote { price, change_percent });
    }

    /// Vrai si les deux tickers désignent le même instrument
    pub fn same_symbol(&self, other: &Ticker) -> bool {
        self.symbol == other.symbol
    }

    /// Variation choisie pour l'affichage (pourcentage ou absolue)
    pub fn display_change(&self, as_percentage: bool) -> Option<f64> {
        if as_percentage {
            self.change_percent
        } else {
            self.change
        }
    }

    /// Retourne true si le ticker est en hausse (ou stable)
    pub fn is_positive(&self) -> bool {
        self.change.map(|c| c >= 0.0).unwrap_or(true)
    }

    /// Formatte la valeur affichée dans la barre
    ///
    /// Format : "190.12 +1.23%" ou "190.12 +2.31" selon le réglage
    pub fn display_value(&self, as_percentage: bool) -> String {
        let price_str = match self.price {
            Some(price) => format!("{:.2}", price),
            None => "—".to_string(),
        };

        match self.display_change(as_percentage) {
            Some(change) if as_percentage => format!("{} {:+.2}%", price_str, change),
            Some(change) => format!("{} {:+.2}", price_str, change),
            None => price_str,
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

// ============================================================================
// Feed simulé de cotations
// ============================================================================
// La récupération des prix sur le réseau n'est pas le sujet de ce crate.
// Ce feed fait vivre le provider pour l'hôte terminal :
// - un ticker par symbole configuré, dans l'ordre des réglages
// - toutes les update_interval_seconds, les prix dérivent légèrement
// - chaque cycle publie TickersChanged
//
// Les réglages sont relus à chaque cycle : un nouvel intervalle ou une
// nouvelle watchlist s'appliquent au cycle suivant.
// ============================================================================

use std::time::Duration;

use tracing::{debug, info};

use crate::models::{Ticker, DEFAULT_UPDATE_INTERVAL};
use crate::provider::MarketStore;

/// Nom lisible des symboles les plus courants
fn known_name(symbol: &str) -> &str {
    match symbol {
        "AAPL" => "Apple Inc.",
        "MSFT" => "Microsoft",
        "TSLA" => "Tesla",
        "NVDA" => "NVIDIA",
        "GOOGL" => "Alphabet",
        "AMZN" => "Amazon",
        "BTC-USD" => "Bitcoin USD",
        "ETH-USD" => "Ethereum USD",
        other => other,
    }
}

/// Prix de départ déterministe, dérivé du symbole
fn base_price(symbol: &str) -> f64 {
    let seed: u32 = symbol.bytes().map(u32::from).sum();
    20.0 + f64::from(seed % 480)
}

/// Crée un ticker coté pour un symbole
pub fn seed_ticker(symbol: &str) -> Ticker {
    let mut ticker = Ticker::with_quote(symbol, known_name(symbol), base_price(symbol), 0.0);
    // Les cryptos n'ont pas de séance pre-market
    if !symbol.contains('-') {
        ticker.set_premarket(base_price(symbol), 0.0);
    }
    ticker
}

/// Aligne la liste de tickers sur les symboles configurés
///
/// Les cotations existantes sont conservées, les nouveaux symboles sont créés.
pub fn sync_with_symbols(current: &[Ticker], symbols: &[String]) -> Vec<Ticker> {
    symbols
        .iter()
        .map(|symbol| {
            current
                .iter()
                .find(|t| &t.symbol == symbol)
                .cloned()
                .unwrap_or_else(|| seed_ticker(symbol))
        })
        .collect()
}

/// Fait dériver les prix d'un pas
///
/// Dérive déterministe (sinusoïde décalée par ticker) : pas d'aléatoire.
pub fn drift(tickers: &[Ticker], step: u64) -> Vec<Ticker> {
    tickers
        .iter()
        .enumerate()
        .map(|(index, ticker)| {
            let mut next = ticker.clone();
            let base = base_price(&ticker.symbol);
            let phase = step as f64 * 0.7 + index as f64 * 1.3;
            let price = base * (1.0 + 0.02 * phase.sin());
            next.update_price(price, price - base);

            if let Some(premarket) = ticker.premarket {
                let pm_price = price * (1.0 + 0.002 * (phase * 1.7).cos());
                let pm_change = (pm_price - premarket.price) / premarket.price * 100.0;
                next.set_premarket(pm_price, pm_change);
            }
            next
        })
        .collect()
}

/// Boucle du feed : tourne jusqu'à l'annulation de la tâche
pub async fn run_simulated_feed(store: MarketStore) {
    info!("Simulated feed started");
    let mut step: u64 = 0;

    loop {
        let interval = Duration::try_from_secs_f64(store.settings().update_interval_seconds)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_UPDATE_INTERVAL));
        tokio::time::sleep(interval).await;

        step += 1;
        let current = sync_with_symbols(&store.tickers(), &store.settings().symbols);
        let next = drift(&current, step);
        debug!(step, count = next.len(), "Publishing simulated quotes");
        store.set_tickers(next);
    }
}

// ============================================================================
// Tests
// ============================================================================

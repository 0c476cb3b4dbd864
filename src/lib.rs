// ============================================================================
// MarketBar - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod app;      // État de l'application et boucle d'événements
pub mod config;   // Réglages persistés
pub mod display;  // Moteur d'affichage de la barre
pub mod feed;     // Feed simulé de cotations
pub mod models;   // Structures de données
pub mod provider; // Source des réglages et tickers
pub mod ui;       // Hôte terminal

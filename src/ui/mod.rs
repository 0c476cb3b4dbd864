// ============================================================================
// Module : ui
// ============================================================================
// L'hôte terminal : clavier, surface de la barre, rendu de l'écran
// ============================================================================

pub mod bar;    // Surface de la barre d'état en terminal
pub mod events; // Gestion des événements clavier
pub mod screen; // Rendu de l'écran

// Re-exports pour simplifier les imports
pub use bar::{TerminalBar, TerminalHost};
pub use events::{Event, EventHandler};
pub use screen::render;

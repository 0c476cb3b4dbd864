// ============================================================================
// Surface de la barre d'état (collaborateur externe)
// ============================================================================
// Le moteur ne dessine rien lui-même : il attache, met à jour et détache des
// widgets sur une surface fournie par l'hôte, et redimensionne la barre.
//
// CONCEPT RUST : Traits comme frontière
// - StatusHost : l'hôte qui peut (ou non) fournir une surface
// - StatusSurface : le conteneur mutable de la barre
// - Type associé : chaque hôte choisit son propre type de surface
// ============================================================================

use anyhow::Result;

use crate::display::widget::{TickerWidget, WidgetId};

/// Conteneur mutable de la barre d'état
pub trait StatusSurface {
    /// Ajoute un widget à la barre
    fn attach(&mut self, widget: &TickerWidget);

    /// Le widget a changé (position, opacité ou contenu)
    fn refresh(&mut self, widget: &TickerWidget);

    /// Retire un widget de la barre
    fn detach(&mut self, id: WidgetId);

    /// Redimensionne la barre (en cellules)
    fn set_width(&mut self, width: u16);
}

/// Hôte capable de fournir la surface de la barre
pub trait StatusHost {
    type Surface: StatusSurface;

    /// Acquiert la surface ; une erreur ici est fatale au démarrage
    fn acquire(&mut self) -> Result<Self::Surface>;
}

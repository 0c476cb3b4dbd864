// ============================================================================
// DisplaySession : état vivant du moteur d'affichage
// ============================================================================
// Une seule session existe à la fois. Elle contient :
// - le mode choisi (OneTicker, TwoOrFewer, ManyTickers)
// - les widgets actifs, dans l'ordre d'attachement
// - le scheduler qui pilote ces widgets (et donc l'éventuel timer)
// - le jeton de chaîne (ChainToken) qui identifie la génération courante
//
// CONCEPT : Arena + compteur de génération
// - Chaque reconstruction incrémente la génération
// - Un maillon de chaîne porte le jeton de SA génération
// - Un jeton périmé ne peut plus rien créer
// ============================================================================

use std::time::Instant;

use crate::display::marquee::MarqueeScheduler;
use crate::display::rotation::RotationScheduler;
use crate::display::surface::StatusSurface;
use crate::display::widget::{TickerWidget, WidgetFormat, WidgetId};
use crate::models::{DisplaySettings, Ticker};

// ============================================================================
// Mode d'affichage
// ============================================================================

/// Mode d'affichage de la barre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Un seul ticker, en rotation toutes les 10 secondes
    OneTicker,

    /// Un widget statique avec tous les tickers (au plus 2)
    TwoOrFewerTickers,

    /// Marquee animé (3 tickers ou plus)
    ManyTickers,
}

impl Mode {
    /// Choisit le mode à partir des réglages et du nombre de tickers
    ///
    /// - show_only_one_ticker → OneTicker, quel que soit le nombre
    /// - sinon plus de 2 tickers → ManyTickers
    /// - sinon → TwoOrFewerTickers
    pub fn select(settings: &DisplaySettings, ticker_count: usize) -> Self {
        if settings.show_only_one_ticker {
            Mode::OneTicker
        } else if ticker_count > 2 {
            Mode::ManyTickers
        } else {
            Mode::TwoOrFewerTickers
        }
    }
}

// ============================================================================
// Jeton de chaîne
// ============================================================================

/// Marqueur de génération d'une session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainToken(u64);

impl ChainToken {
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Distributeur d'identifiants de widgets (monotone, jamais réutilisé)
#[derive(Debug, Default)]
pub struct WidgetIds {
    next: u64,
}

impl WidgetIds {
    pub fn allocate(&mut self) -> WidgetId {
        self.next += 1;
        WidgetId(self.next)
    }
}

// ============================================================================
// Scheduler de la session
// ============================================================================

/// Ce qui pilote les widgets de la session
#[derive(Debug)]
pub enum Scheduler {
    /// Rien à piloter (TwoOrFewer, ou aucun ticker)
    Static,

    /// Rotation à intervalle fixe (OneTicker)
    Rotation(RotationScheduler),

    /// Chaîne de widgets défilants (ManyTickers)
    Marquee(MarqueeScheduler),
}

/// Session d'affichage en cours
#[derive(Debug)]
pub struct DisplaySession {
    pub mode: Mode,
    pub token: ChainToken,
    pub format: WidgetFormat,
    pub widgets: Vec<TickerWidget>,
    pub scheduler: Scheduler,
}

impl DisplaySession {
    pub fn new(mode: Mode, token: ChainToken, format: WidgetFormat) -> Self {
        Self {
            mode,
            token,
            format,
            widgets: Vec::new(),
            scheduler: Scheduler::Static,
        }
    }

    /// Prochaine échéance du timer de rotation, s'il y en a un
    pub fn pending_timer(&self) -> Option<Instant> {
        match &self.scheduler {
            Scheduler::Rotation(rotation) => Some(rotation.deadline()),
            _ => None,
        }
    }

    /// Vrai si un scheduler relit lui-même les tickers du provider
    ///
    /// Dépend du scheduler réellement lancé, pas du mode : une session
    /// OneTicker démarrée sans ticker reste Static et ne se rafraîchit pas.
    pub fn self_refreshing(&self) -> bool {
        !matches!(self.scheduler, Scheduler::Static)
    }

    /// Widget actif par identifiant
    pub fn widget(&self, id: WidgetId) -> Option<&TickerWidget> {
        self.widgets.iter().find(|w| w.id() == id)
    }
}

// ============================================================================
// Stage : accès contrôlé à la barre pour les schedulers
// ============================================================================
// CONCEPT RUST : Emprunts disjoints
// - Le Stage emprunte la surface, la liste de widgets et l'allocateur
// - Les schedulers n'ont jamais accès au controller lui-même
// - Toute mutation de la barre passe donc par ces quelques méthodes
// ============================================================================

/// Vue mutable sur la barre, prêtée aux schedulers
pub struct Stage<'a, S: StatusSurface> {
    pub surface: &'a mut S,
    pub widgets: &'a mut Vec<TickerWidget>,
    pub ids: &'a mut WidgetIds,
    pub format: WidgetFormat,
    pub now: Instant,
}

impl<'a, S: StatusSurface> Stage<'a, S> {
    /// Crée un widget, l'attache à la barre et retourne son identifiant
    pub fn spawn(&mut self, tickers: Vec<Ticker>, origin_x: f64, alpha: f64) -> WidgetId {
        let id = self.ids.allocate();
        let widget = TickerWidget::new(id, tickers, origin_x, self.format).with_alpha(alpha);
        self.surface.attach(&widget);
        self.widgets.push(widget);
        id
    }

    pub fn widget(&self, id: WidgetId) -> Option<&TickerWidget> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut TickerWidget> {
        self.widgets.iter_mut().find(|w| w.id() == id)
    }

    /// Pousse l'état courant d'un widget vers la barre
    pub fn refresh(&mut self, id: WidgetId) {
        if let Some(widget) = self.widgets.iter().find(|w| w.id() == id) {
            self.surface.refresh(widget);
        }
    }

    /// Retire un widget de la session et de la barre
    pub fn detach(&mut self, id: WidgetId) {
        if let Some(index) = self.widgets.iter().position(|w| w.id() == id) {
            self.widgets.remove(index);
            self.surface.detach(id);
        }
    }

    pub fn set_width(&mut self, width: u16) {
        self.surface.set_width(width);
    }
}

// ============================================================================
// Tests
// ============================================================================

// ============================================================================
// RotationScheduler : mode OneTicker
// ============================================================================
// Affiche un seul ticker à la fois et passe au suivant toutes les 10 secondes.
//
// La période de rotation est une constante d'affichage : elle ne dépend PAS
// de update_interval_seconds (qui règle la fraîcheur des données).
//
// À chaque tick :
// 1. On retrouve le ticker affiché dans la liste VIVANTE (par symbole)
// 2. Introuvable (retiré par le provider) → on ne fait rien pour ce tick
// 3. Sinon on passe à (index + 1) mod count et on redimensionne la barre
// ============================================================================

use std::time::{Duration, Instant};

use tracing::debug;

use crate::display::session::Stage;
use crate::display::surface::StatusSurface;
use crate::display::widget::WidgetId;
use crate::models::Ticker;

/// Période de rotation du mode OneTicker
pub const ROTATION_PERIOD: Duration = Duration::from_secs(10);

/// Timer répétitif piloté par l'horloge de la boucle
///
/// Les échéances manquées sont fusionnées en un seul déclenchement.
#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    period: Duration,
    next_fire: Instant,
}

impl RepeatingTimer {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_fire: now + period,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.next_fire
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_fire
    }

    /// Planifie la prochaine échéance strictement après `now`
    fn reschedule(&mut self, now: Instant) {
        if self.period.is_zero() {
            self.next_fire = now;
            return;
        }
        while self.next_fire <= now {
            self.next_fire += self.period;
        }
    }
}

/// Index du ticker suivant dans la liste vivante
///
/// None si le ticker courant n'est plus dans la liste (identité par symbole).
pub fn next_index(current: &Ticker, live: &[Ticker]) -> Option<usize> {
    let index = live.iter().position(|t| t.same_symbol(current))?;
    Some((index + 1) % live.len())
}

/// Scheduler de rotation
#[derive(Debug)]
pub struct RotationScheduler {
    widget: WidgetId,
    timer: RepeatingTimer,
}

impl RotationScheduler {
    /// Affiche le premier ticker et arme le timer
    ///
    /// Retourne None (rien à afficher, pas de timer) si la liste est vide.
    pub fn start<S: StatusSurface>(stage: &mut Stage<'_, S>, tickers: &[Ticker]) -> Option<Self> {
        let first = tickers.first()?.clone();
        let id = stage.spawn(vec![first], 0.0, 1.0);

        let width = stage.widget(id).map(|w| w.width()).unwrap_or(0);
        stage.set_width(width);

        debug!(widget = ?id, symbol = %tickers[0].symbol, "Rotation started");
        Some(Self {
            widget: id,
            timer: RepeatingTimer::new(ROTATION_PERIOD, stage.now),
        })
    }

    pub fn deadline(&self) -> Instant {
        self.timer.deadline()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.timer.is_due(now)
    }

    /// Un tick de rotation
    ///
    /// Retourne le symbole désormais affiché, ou None si le tick est ignoré.
    pub fn fire<S: StatusSurface>(&mut self, stage: &mut Stage<'_, S>, live: &[Ticker]) -> Option<String> {
        self.timer.reschedule(stage.now);

        let current = stage
            .widget(self.widget)
            .and_then(|w| w.tickers().first())
            .cloned()?;

        let Some(next) = next_index(&current, live) else {
            debug!(symbol = %current.symbol, "Displayed ticker no longer listed, skipping tick");
            return None;
        };

        let ticker = live[next].clone();
        let symbol = ticker.symbol.clone();
        let width = match stage.widget_mut(self.widget) {
            Some(widget) => {
                widget.set(ticker);
                widget.width()
            }
            None => return None,
        };

        stage.refresh(self.widget);
        stage.set_width(width);

        debug!(from = %current.symbol, to = %symbol, "Rotated ticker");
        Some(symbol)
    }
}

// ============================================================================
// Tests
// ============================================================================

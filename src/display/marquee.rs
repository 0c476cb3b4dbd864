// ============================================================================
// MarqueeScheduler : mode ManyTickers
// ============================================================================
// Une chaîne sans fin de widgets qui défilent de droite à gauche. Chaque
// widget affiche TOUTE la séquence de tickers, concaténée en une bande.
//
// - Maillon 0 : fondu d'entrée (alpha 0 → 1) sur count × 5 s
// - Maillon k+1 : créé à la fin de l'animation du maillon k, à
//   x = largeur du maillon k, puis défile jusqu'à x = 0 sur count × 10 s
//
// La chaîne n'est PAS une récursion de callbacks : chaque fin d'animation
// rend un Completion::ContinueChain(jeton) au controller, qui appelle
// continue_chain(). Un jeton d'une génération précédente est ignoré.
//
// Chaque nouveau maillon relit les tickers vivants : les prix du marquee se
// rafraîchissent à chaque cycle sans reconstruction complète.
// ============================================================================

use std::time::Duration;

use tracing::{debug, warn};

use crate::display::session::{ChainToken, Stage};
use crate::display::surface::StatusSurface;
use crate::display::widget::{Completion, WidgetId};
use crate::models::Ticker;

/// Durée du fondu d'entrée, par ticker
pub const ENTRY_SECONDS_PER_TICKER: u64 = 5;

/// Durée du défilement d'un maillon, par ticker
pub const SCROLL_SECONDS_PER_TICKER: u64 = 10;

/// Largeur fixe de la barre pendant le défilement (cellules)
pub const MARQUEE_BAR_WIDTH: u16 = 48;

/// Nombre maximal de maillons vivants (sortant + entrant)
pub const WINDOW: usize = 2;

/// Durée du fondu d'entrée pour `count` tickers
pub fn entry_duration(count: usize) -> Duration {
    Duration::from_secs(ENTRY_SECONDS_PER_TICKER * count as u64)
}

/// Durée de défilement d'un maillon pour `count` tickers
pub fn scroll_duration(count: usize) -> Duration {
    Duration::from_secs(SCROLL_SECONDS_PER_TICKER * count as u64)
}

/// Scheduler de la chaîne marquee
#[derive(Debug)]
pub struct MarqueeScheduler {
    token: ChainToken,
    links: u64,
}

impl MarqueeScheduler {
    /// Crée le premier maillon (fondu d'entrée)
    ///
    /// Retourne None si la liste est vide : pas de chaîne sans contenu.
    pub fn start<S: StatusSurface>(stage: &mut Stage<'_, S>, tickers: &[Ticker], token: ChainToken) -> Option<Self> {
        if tickers.is_empty() {
            return None;
        }

        stage.set_width(MARQUEE_BAR_WIDTH);
        let id = stage.spawn(tickers.to_vec(), 0.0, 0.0);
        let now = stage.now;
        if let Some(widget) = stage.widget_mut(id) {
            widget.fade_animation(
                1.0,
                entry_duration(tickers.len()),
                now,
                Some(Completion::ContinueChain(token)),
            );
        }

        debug!(widget = ?id, count = tickers.len(), generation = token.generation(), "Marquee started");
        Some(Self { token, links: 1 })
    }

    /// Nombre de maillons créés depuis le début de la chaîne
    pub fn links(&self) -> u64 {
        self.links
    }

    /// Fin d'animation d'un maillon : crée le suivant
    ///
    /// Retourne l'identifiant du nouveau maillon, ou None si rien n'est créé
    /// (jeton périmé, maillon inconnu, plus aucun ticker).
    pub fn continue_chain<S: StatusSurface>(
        &mut self,
        token: ChainToken,
        completed: WidgetId,
        stage: &mut Stage<'_, S>,
        live: &[Ticker],
    ) -> Option<WidgetId> {
        if token != self.token {
            debug!(
                stale = token.generation(),
                current = self.token.generation(),
                "Ignoring completion from superseded chain"
            );
            return None;
        }

        if live.is_empty() {
            warn!("No tickers left, marquee chain stalled");
            return None;
        }

        let origin_x = stage.widget(completed).map(|w| f64::from(w.width()))?;
        let id = stage.spawn(live.to_vec(), origin_x, 1.0);
        let now = stage.now;
        if let Some(widget) = stage.widget_mut(id) {
            widget.scroll_animation(scroll_duration(live.len()), now, Completion::ContinueChain(self.token));
        }

        // Fenêtre glissante : le plus ancien maillon est déjà sorti à gauche
        while stage.widgets.len() > WINDOW {
            let oldest = stage.widgets[0].id();
            stage.detach(oldest);
        }

        self.links += 1;
        debug!(widget = ?id, origin_x, links = self.links, "Marquee link scheduled");
        Some(id)
    }

    /// Colle le maillon sortant au bord gauche du maillon entrant
    pub fn follow<S: StatusSurface>(&self, stage: &mut Stage<'_, S>) {
        let count = stage.widgets.len();
        if count < WINDOW {
            return;
        }

        let moved = {
            let (head, tail) = stage.widgets.split_at_mut(count - 1);
            let incoming = &tail[0];
            let outgoing = &mut head[count - 2];
            let x = incoming.x() - f64::from(outgoing.width());
            if (outgoing.x() - x).abs() > f64::EPSILON {
                outgoing.set_x(x);
                Some(outgoing.id())
            } else {
                None
            }
        };

        if let Some(id) = moved {
            stage.refresh(id);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::display::session::WidgetIds;
    use crate::display::testing::{RecordingSurface, SurfaceOp};
    use crate::display::widget::WidgetFormat;

    fn tickers(symbols: &[&str]) -> Vec<Ticker> {
        symbols
            .iter()
            .map(|s| Ticker::with_quote(*s, *s, 100.0, 1.0))
            .collect()
    }

    #[test]
    fn test_durations_scale_with_count() {
        assert_eq!(entry_duration(4), Duration::from_secs(20));
        assert_eq!(scroll_duration(4), Duration::from_secs(40));
        assert_eq!(entry_duration(3), Duration::from_secs(15));
    }

    #[test]
    fn test_chain_links_and_window() {
        let t0 = Instant::now();
        let live = tickers(&["A", "B", "C", "D"]);
        let token = ChainToken::new(1);
        let mut surface = RecordingSurface::default();
        let mut widgets = Vec::new();
        let mut ids = WidgetIds::default();
        let mut stage = Stage {
            surface: &mut surface,
            widgets: &mut widgets,
            ids: &mut ids,
            format: WidgetFormat::default(),
            now: t0,
        };

        let mut marquee = MarqueeScheduler::start(&mut stage, &live, token).unwrap();
        let first = stage.widgets[0].id();
        let first_width = stage.widgets[0].width();
        assert_eq!(stage.widgets[0].alpha(), 0.0);
        assert_eq!(stage.widgets[0].animation_deadline(), Some(t0 + Duration::from_secs(20)));

        // Fin du fondu d'entrée → maillon 1 à x = largeur du maillon 0
        stage.now = t0 + Duration::from_secs(20);
        assert_eq!(stage.widgets[0].clone().step(stage.now), Some(Completion::ContinueChain(token)));
        let second = marquee.continue_chain(token, first, &mut stage, &live).unwrap();
        let link = stage.widget(second).unwrap();
        assert_eq!(link.x(), f64::from(first_width));
        assert_eq!(link.animation_deadline(), Some(stage.now + Duration::from_secs(40)));
        assert_eq!(stage.widgets.len(), 2);

        // Maillon 2 : le maillon 0 sort de la fenêtre
        stage.now += Duration::from_secs(40);
        let third = marquee.continue_chain(token, second, &mut stage, &live).unwrap();
        assert_eq!(stage.widgets.len(), WINDOW);
        assert!(stage.widget(first).is_none());
        assert!(stage.widget(third).is_some());
        assert_eq!(marquee.links(), 3);

        assert!(surface.ops.contains(&SurfaceOp::Width(MARQUEE_BAR_WIDTH)));
        assert!(surface.ops.contains(&SurfaceOp::Detach(first)));
    }

    #[test]
    fn test_stale_token_creates_nothing() {
        let live = tickers(&["A", "B", "C"]);
        let mut surface = RecordingSurface::default();
        let mut widgets = Vec::new();
        let mut ids = WidgetIds::default();
        let mut stage = Stage {
            surface: &mut surface,
            widgets: &mut widgets,
            ids: &mut ids,
            format: WidgetFormat::default(),
            now: Instant::now(),
        };

        let mut marquee = MarqueeScheduler::start(&mut stage, &live, ChainToken::new(2)).unwrap();
        let first = stage.widgets[0].id();

        assert!(marquee
            .continue_chain(ChainToken::new(1), first, &mut stage, &live)
            .is_none());
        assert_eq!(stage.widgets.len(), 1);
        assert_eq!(marquee.links(), 1);
    }

    #[test]
    fn test_new_link_reads_live_tickers() {
        let live = tickers(&["A", "B", "C"]);
        let token = ChainToken::new(1);
        let mut surface = RecordingSurface::default();
        let mut widgets = Vec::new();
        let mut ids = WidgetIds::default();
        let mut stage = Stage {
            surface: &mut surface,
            widgets: &mut widgets,
            ids: &mut ids,
            format: WidgetFormat::default(),
            now: Instant::now(),
        };

        let mut marquee = MarqueeScheduler::start(&mut stage, &live, token).unwrap();
        let first = stage.widgets[0].id();

        let refreshed = vec![
            Ticker::with_quote("A", "A", 150.0, 5.0),
            Ticker::with_quote("B", "B", 90.0, -1.0),
            Ticker::with_quote("C", "C", 10.0, 0.5),
            Ticker::with_quote("D", "D", 20.0, 0.5),
        ];
        let next = marquee.continue_chain(token, first, &mut stage, &refreshed).unwrap();
        let link = stage.widget(next).unwrap();

        assert_eq!(link.tickers(), refreshed.as_slice());
        assert_eq!(link.animation_deadline(), Some(stage.now + scroll_duration(4)));
    }

    #[test]
    fn test_empty_live_stalls_chain() {
        let live = tickers(&["A", "B", "C"]);
        let token = ChainToken::new(1);
        let mut surface = RecordingSurface::default();
        let mut widgets = Vec::new();
        let mut ids = WidgetIds::default();
        let mut stage = Stage {
            surface: &mut surface,
            widgets: &mut widgets,
            ids: &mut ids,
            format: WidgetFormat::default(),
            now: Instant::now(),
        };

        let mut marquee = MarqueeScheduler::start(&mut stage, &live, token).unwrap();
        let first = stage.widgets[0].id();

        assert!(marquee.continue_chain(token, first, &mut stage, &[]).is_none());
        assert!(MarqueeScheduler::start(&mut stage, &[], token).is_none());
    }

    #[test]
    fn test_follow_glues_outgoing_link() {
        let t0 = Instant::now();
        let live = tickers(&["A", "B", "C"]);
        let token = ChainToken::new(1);
        let mut surface = RecordingSurface::default();
        let mut widgets = Vec::new();
        let mut ids = WidgetIds::default();
        let mut stage = Stage {
            surface: &mut surface,
            widgets: &mut widgets,
            ids: &mut ids,
            format: WidgetFormat::default(),
            now: t0,
        };

        let mut marquee = MarqueeScheduler::start(&mut stage, &live, token).unwrap();
        let first = stage.widgets[0].id();
        let width = f64::from(stage.widgets[0].width());
        let second = marquee.continue_chain(token, first, &mut stage, &live).unwrap();

        // Mi-parcours du défilement
        let half = t0 + scroll_duration(3) / 2;
        stage.widget_mut(second).unwrap().step(half);
        marquee.follow(&mut stage);

        let incoming = stage.widget(second).unwrap().x();
        let outgoing = stage.widget(first).unwrap().x();
        assert!((incoming - width / 2.0).abs() < 1e-9);
        assert!((outgoing - (incoming - width)).abs() < 1e-9);
    }
}

// ============================================================================
// DisplayController : racine du moteur d'affichage
// ============================================================================
// Le controller possède la barre et la session courante. Il :
// - fait la première mise en page et s'abonne au provider (configure)
// - réagit aux notifications (on_update) en reconstruisant la session
// - fait avancer timers et animations (advance)
// - indique à la boucle quand se réveiller (next_wake)
//
// CONCEPT : Reconstruction (rebuild)
// 1. Annuler le timer et invalider la chaîne (nouvelle génération)
// 2. Retirer les widgets : fondu de sortie en mode ManyTickers, sinon immédiat
// 3. Relire réglages + tickers, choisir le mode
// 4. Déléguer au scheduler correspondant
//
// L'étape 1 a TOUJOURS lieu avant la création du moindre widget : aucun
// maillon d'une ancienne chaîne ne peut écrire sur la nouvelle session.
// ============================================================================

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, instrument, warn};

use crate::display::marquee::MarqueeScheduler;
use crate::display::rotation::RotationScheduler;
use crate::display::session::{ChainToken, DisplaySession, Mode, Scheduler, Stage, WidgetIds};
use crate::display::surface::{StatusHost, StatusSurface};
use crate::display::widget::{Completion, TickerWidget, WidgetFormat, WidgetId};
use crate::provider::{MarketStore, UpdateReason};

/// Durée du fondu de sortie des widgets retirés
pub const FADE_OUT_DURATION: Duration = Duration::from_secs(1);

/// Intervalle entre deux images pendant une animation
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Controller de la barre d'état
pub struct DisplayController<H: StatusHost> {
    store: MarketStore,
    host: H,
    surface: Option<H::Surface>,
    updates: Option<broadcast::Receiver<UpdateReason>>,
    session: Option<DisplaySession>,
    /// Widgets retirés en cours de fondu de sortie (hors session)
    retiring: Vec<TickerWidget>,
    ids: WidgetIds,
    generation: u64,
}

impl<H: StatusHost> DisplayController<H> {
    /// Crée le controller avec son provider et son hôte injectés
    pub fn new(store: MarketStore, host: H) -> Self {
        Self {
            store,
            host,
            surface: None,
            updates: None,
            session: None,
            retiring: Vec::new(),
            ids: WidgetIds::default(),
            generation: 0,
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    /// Première mise en page + abonnement aux notifications
    ///
    /// Échoue (fatal) si l'hôte ne peut pas fournir la surface de la barre.
    #[instrument(skip(self, now))]
    pub fn configure(&mut self, now: Instant) -> Result<()> {
        let surface = self
            .host
            .acquire()
            .context("Impossible d'acquérir la barre d'état")?;
        self.surface = Some(surface);

        self.rebuild(now);
        self.updates = Some(self.store.subscribe());

        info!(mode = ?self.mode(), "Display configured");
        Ok(())
    }

    /// Libère tout : timer, chaîne, widgets, abonnement
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.updates = None;

        let session = self.session.take();
        if let Some(surface) = self.surface.as_mut() {
            let session_widgets = session.into_iter().flat_map(|s| s.widgets);
            for widget in session_widgets.chain(self.retiring.drain(..)) {
                surface.detach(widget.id());
            }
        }
        self.retiring.clear();

        info!("Display torn down");
    }

    /// Attend la prochaine notification du provider
    ///
    /// Un abonné en retard (Lagged) reconstruit tout : aucune mise à jour perdue.
    /// Sans abonnement (avant configure / après teardown), ne se résout jamais.
    pub async fn next_update(&mut self) -> Option<UpdateReason> {
        let Some(updates) = self.updates.as_mut() else {
            return std::future::pending().await;
        };

        match updates.recv().await {
            Ok(reason) => Some(reason),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Lagged behind notifications, forcing full rebuild");
                Some(UpdateReason::SettingsChanged)
            }
            Err(RecvError::Closed) => None,
        }
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Réévalue l'affichage suite à une notification
    pub fn on_update(&mut self, reason: UpdateReason, now: Instant) {
        if reason == UpdateReason::TickersChanged && self.suppresses_ticker_update() {
            debug!(count = self.store.ticker_count(), "Ticker update suppressed, session self-refreshes");
            return;
        }

        debug!(?reason, "Rebuilding display");
        self.rebuild(now);
    }

    /// Règle de suppression : ≥ 3 tickers ET session qui relit déjà le provider
    ///
    /// Plus stricte que "≥ 3 tickers → ignoré" : une session statique
    /// (TwoOrFewer, ou OneTicker lancée sans ticker) n'a aucune boucle de
    /// rafraîchissement, elle est donc reconstruite même à partir de 3 tickers.
    /// Sinon une barre passée de 2 à 3 tickers resterait figée.
    fn suppresses_ticker_update(&self) -> bool {
        let self_refreshing = self
            .session
            .as_ref()
            .map(DisplaySession::self_refreshing)
            .unwrap_or(false);
        self.store.ticker_count() >= 3 && self_refreshing
    }

    fn rebuild(&mut self, now: Instant) {
        let Some(surface) = self.surface.as_mut() else {
            warn!("Rebuild requested before configure, ignoring");
            return;
        };

        // 1. Timer annulé + chaîne invalidée (le scheduler part avec la session)
        self.generation += 1;
        let token = ChainToken::new(self.generation);
        let previous = self.session.take();

        // 2. Retrait des widgets
        if let Some(previous) = previous {
            // Fondu seulement en quittant une session ManyTickers (> 2 tickers
            // au moment de son lancement), pas selon le nombre de tickers actuel
            let fade = previous.mode == Mode::ManyTickers;
            for mut widget in previous.widgets {
                widget.cancel_animation();
                if fade {
                    widget.fade_animation(0.0, FADE_OUT_DURATION, now, Some(Completion::Detach));
                    self.retiring.push(widget);
                } else {
                    surface.detach(widget.id());
                }
            }
        }

        // 3. Sélection du mode
        let settings = self.store.settings();
        let tickers = self.store.tickers();
        let mode = Mode::select(&settings, tickers.len());
        let format = WidgetFormat::from(&settings);
        let mut session = DisplaySession::new(mode, token, format);

        // 4. Délégation
        {
            let mut stage = Stage {
                surface,
                widgets: &mut session.widgets,
                ids: &mut self.ids,
                format,
                now,
            };

            session.scheduler = match mode {
                Mode::OneTicker => RotationScheduler::start(&mut stage, &tickers)
                    .map(Scheduler::Rotation)
                    .unwrap_or(Scheduler::Static),
                Mode::ManyTickers => MarqueeScheduler::start(&mut stage, &tickers, token)
                    .map(Scheduler::Marquee)
                    .unwrap_or(Scheduler::Static),
                Mode::TwoOrFewerTickers => {
                    if !tickers.is_empty() {
                        let id = stage.spawn(tickers.clone(), 0.0, 1.0);
                        let width = stage.widget(id).map(|w| w.width()).unwrap_or(0);
                        stage.set_width(width);
                    }
                    Scheduler::Static
                }
            };
        }

        info!(
            ?mode,
            count = tickers.len(),
            generation = self.generation,
            widgets = session.widgets.len(),
            "Display session started"
        );
        self.session = Some(session);
    }

    // ========================================================================
    // Horloge : timers et animations
    // ========================================================================

    /// Fait avancer timers et animations jusqu'à `now`
    pub fn advance(&mut self, now: Instant) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        // Widgets retirés : seul leur Completion de retrait peut se déclencher
        let mut index = 0;
        while index < self.retiring.len() {
            let completion = self.retiring[index].step(now);
            if completion == Some(Completion::Detach) {
                let widget = self.retiring.remove(index);
                surface.detach(widget.id());
            } else {
                surface.refresh(&self.retiring[index]);
                index += 1;
            }
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };

        // Animations de la session
        let mut completions: Vec<(WidgetId, Completion)> = Vec::new();
        for widget in session.widgets.iter_mut().filter(|w| w.is_animating()) {
            if let Some(completion) = widget.step(now) {
                completions.push((widget.id(), completion));
            }
            surface.refresh(widget);
        }

        let needs_live = completions
            .iter()
            .any(|(_, c)| matches!(c, Completion::ContinueChain(_)))
            || session.pending_timer().is_some_and(|deadline| now >= deadline);
        let live = if needs_live { self.store.tickers() } else { Vec::new() };

        let mut stage = Stage {
            surface,
            widgets: &mut session.widgets,
            ids: &mut self.ids,
            format: session.format,
            now,
        };

        match &mut session.scheduler {
            Scheduler::Rotation(rotation) => {
                if rotation.is_due(now) {
                    rotation.fire(&mut stage, &live);
                }
            }
            Scheduler::Marquee(marquee) => {
                for (completed, completion) in completions {
                    match completion {
                        Completion::ContinueChain(token) => {
                            marquee.continue_chain(token, completed, &mut stage, &live);
                        }
                        Completion::Detach => stage.detach(completed),
                    }
                }
                marquee.follow(&mut stage);
            }
            Scheduler::Static => {}
        }
    }

    /// Vrai si au moins un widget est en cours d'animation
    pub fn is_animating(&self) -> bool {
        self.retiring.iter().any(TickerWidget::is_animating)
            || self
                .session
                .as_ref()
                .map(|s| s.widgets.iter().any(TickerWidget::is_animating))
                .unwrap_or(false)
    }

    /// Prochain instant où la boucle doit appeler advance()
    ///
    /// - pendant une animation : l'image suivante (ou la fin, si plus tôt)
    /// - sinon : l'échéance du timer de rotation, s'il existe
    pub fn next_wake(&self, now: Instant) -> Option<Instant> {
        let timer = self.session.as_ref().and_then(DisplaySession::pending_timer);

        let animation_end = self
            .retiring
            .iter()
            .chain(self.session.iter().flat_map(|s| s.widgets.iter()))
            .filter_map(TickerWidget::animation_deadline)
            .min();
        let frame = animation_end.map(|end| end.min(now + FRAME_INTERVAL));

        match (timer, frame) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ========================================================================
    // Accesseurs
    // ========================================================================

    /// Mode de la session courante
    pub fn mode(&self) -> Option<Mode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn session(&self) -> Option<&DisplaySession> {
        self.session.as_ref()
    }

    /// Widgets actifs de la session courante
    pub fn active_widgets(&self) -> &[TickerWidget] {
        self.session.as_ref().map(|s| s.widgets.as_slice()).unwrap_or(&[])
    }

    /// Widgets en cours de retrait
    pub fn retiring_widgets(&self) -> &[TickerWidget] {
        &self.retiring
    }

    pub fn surface(&self) -> Option<&H::Surface> {
        self.surface.as_ref()
    }

    pub fn store(&self) -> &MarketStore {
        &self.store
    }

    /// Vrai si le controller est abonné au provider
    pub fn is_subscribed(&self) -> bool {
        self.updates.is_some()
    }
}

impl<H: StatusHost> Drop for DisplayController<H> {
    fn drop(&mut self) {
        if self.surface.is_some() && (self.session.is_some() || !self.retiring.is_empty()) {
            self.teardown();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::marquee::{entry_duration, scroll_duration, MARQUEE_BAR_WIDTH};
    use crate::display::rotation::ROTATION_PERIOD;
    use crate::display::testing::{RecordingHost, RecordingSurface, SurfaceOp};
    use crate::models::{DisplaySettings, Ticker};

    fn tickers(symbols: &[&str]) -> Vec<Ticker> {
        symbols
            .iter()
            .map(|s| Ticker::with_quote(*s, *s, 100.0, 1.0))
            .collect()
    }

    fn controller(settings: DisplaySettings, symbols: &[&str]) -> DisplayController<RecordingHost> {
        let store = MarketStore::new(settings, tickers(symbols));
        DisplayController::new(store, RecordingHost { available: true })
    }

    fn surface(controller: &DisplayController<RecordingHost>) -> &RecordingSurface {
        controller.surface().unwrap()
    }

    fn displayed(controller: &DisplayController<RecordingHost>) -> Vec<Vec<String>> {
        controller
            .active_widgets()
            .iter()
            .map(|w| w.tickers().iter().map(|t| t.symbol.clone()).collect())
            .collect()
    }

    #[test]
    fn test_configure_fails_without_surface() {
        let store = MarketStore::new(DisplaySettings::default(), tickers(&["AAPL"]));
        let mut controller = DisplayController::new(store, RecordingHost { available: false });

        let result = controller.configure(Instant::now());

        assert!(result.is_err());
        assert!(controller.mode().is_none());
        assert!(!controller.is_subscribed());
    }

    #[test]
    fn test_two_tickers_static_strip() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["AAPL", "MSFT"]);
        controller.configure(t0).unwrap();

        assert_eq!(controller.mode(), Some(Mode::TwoOrFewerTickers));
        assert_eq!(displayed(&controller), vec![vec!["AAPL", "MSFT"]]);
        assert!(controller.session().unwrap().pending_timer().is_none());
        assert!(!controller.is_animating());
        assert_eq!(controller.next_wake(t0), None);

        let width = controller.active_widgets()[0].width();
        assert_eq!(surface(&controller).width, width);
        assert!(controller.is_subscribed());
    }

    #[test]
    fn test_one_ticker_mode_uses_first_ticker() {
        let t0 = Instant::now();
        let settings = DisplaySettings::default().with_only_one_ticker(true);
        let mut controller = controller(settings, &["AAPL", "MSFT", "TSLA"]);
        controller.configure(t0).unwrap();

        assert_eq!(controller.mode(), Some(Mode::OneTicker));
        assert_eq!(displayed(&controller), vec![vec!["AAPL"]]);
        assert_eq!(controller.next_wake(t0), Some(t0 + ROTATION_PERIOD));

        controller.advance(t0 + ROTATION_PERIOD);
        assert_eq!(displayed(&controller), vec![vec!["MSFT"]]);
    }

    #[test]
    fn test_one_ticker_single_entry_wraps() {
        let t0 = Instant::now();
        let settings = DisplaySettings::default().with_only_one_ticker(true);
        let mut controller = controller(settings, &["AAPL"]);
        controller.configure(t0).unwrap();

        controller.advance(t0 + ROTATION_PERIOD);

        assert_eq!(displayed(&controller), vec![vec!["AAPL"]]);
    }

    #[test]
    fn test_rotation_not_before_period() {
        let t0 = Instant::now();
        let settings = DisplaySettings::default().with_only_one_ticker(true);
        let mut controller = controller(settings, &["AAPL", "MSFT"]);
        controller.configure(t0).unwrap();

        controller.advance(t0 + Duration::from_secs(9));

        assert_eq!(displayed(&controller), vec![vec!["AAPL"]]);
    }

    #[test]
    fn test_empty_tickers_render_nothing() {
        let t0 = Instant::now();
        for settings in [
            DisplaySettings::default(),
            DisplaySettings::default().with_only_one_ticker(true),
        ] {
            let mut controller = controller(settings, &[]);
            controller.configure(t0).unwrap();

            assert!(controller.active_widgets().is_empty());
            assert_ne!(controller.mode(), Some(Mode::ManyTickers));
            assert_eq!(controller.next_wake(t0), None);
            assert!(surface(&controller).attached.is_empty());
        }
    }

    #[test]
    fn test_marquee_timeline_for_four_tickers() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["A", "B", "C", "D"]);
        controller.configure(t0).unwrap();

        assert_eq!(controller.mode(), Some(Mode::ManyTickers));
        assert_eq!(surface(&controller).width, MARQUEE_BAR_WIDTH);
        let first = controller.active_widgets()[0].id();
        assert_eq!(
            controller.active_widgets()[0].animation_deadline(),
            Some(t0 + entry_duration(4))
        );
        assert_eq!(entry_duration(4), Duration::from_secs(20));

        // Fin du fondu d'entrée
        let t1 = t0 + Duration::from_secs(20);
        controller.advance(t1);
        assert_eq!(controller.active_widgets().len(), 2);
        let second = controller.active_widgets()[1].id();
        assert_eq!(
            controller.active_widgets()[1].animation_deadline(),
            Some(t1 + Duration::from_secs(40))
        );

        // Plusieurs cycles : la chaîne continue, fenêtre de 2
        let mut t = t1;
        for _ in 0..3 {
            t += scroll_duration(4);
            controller.advance(t);
            assert_eq!(controller.active_widgets().len(), 2);
        }

        let current: Vec<WidgetId> = controller.active_widgets().iter().map(|w| w.id()).collect();
        assert!(!current.contains(&first));
        assert!(!current.contains(&second));
        assert_eq!(surface(&controller).attached.len(), 2);
    }

    #[test]
    fn test_rebuild_cancels_previous_chain() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["A", "B", "C"]);
        controller.configure(t0).unwrap();
        controller.advance(t0 + entry_duration(3));
        let old: Vec<WidgetId> = controller.active_widgets().iter().map(|w| w.id()).collect();
        assert_eq!(old.len(), 2);

        // Nouveaux réglages : reconstruction en mode marquee
        let t1 = t0 + entry_duration(3) + Duration::from_secs(3);
        controller.store().set_settings(DisplaySettings::default().with_ticker_name(false));
        controller.on_update(UpdateReason::SettingsChanged, t1);

        let mark = surface(&controller).ops.len();
        let new_first = controller.active_widgets()[0].id();
        assert_eq!(controller.retiring_widgets().len(), 2);

        // On avance très loin : plusieurs cycles de la nouvelle chaîne
        let mut t = t1;
        for _ in 0..10 {
            t += Duration::from_secs(15);
            controller.advance(t);
        }

        // Les anciens widgets n'ont fait que s'estomper puis se détacher
        for id in &old {
            let ops = surface(&controller).ops_for_since(*id, mark);
            assert_eq!(ops.last(), Some(&SurfaceOp::Detach(*id)));
            assert!(ops
                .iter()
                .all(|op| matches!(op, SurfaceOp::Refresh(_) | SurfaceOp::Detach(_))));
        }
        assert!(controller.retiring_widgets().is_empty());

        // Tous les widgets créés depuis appartiennent à la nouvelle chaîne
        let attached = surface(&controller).attached_since(mark);
        assert!(attached.iter().all(|id| *id > new_first));
        assert!(!attached.is_empty());
    }

    #[test]
    fn test_fade_out_only_when_leaving_many_tickers() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["AAPL", "MSFT"]);
        controller.configure(t0).unwrap();
        let old = controller.active_widgets()[0].id();

        controller.store().set_settings(DisplaySettings::default().with_only_one_ticker(true));
        controller.on_update(UpdateReason::SettingsChanged, t0);

        // Retrait immédiat, pas de fondu
        assert!(controller.retiring_widgets().is_empty());
        assert!(!surface(&controller).attached.contains_key(&old));
        assert_eq!(controller.mode(), Some(Mode::OneTicker));
    }

    #[test]
    fn test_fade_out_when_leaving_marquee() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["A", "B", "C"]);
        controller.configure(t0).unwrap();
        let old = controller.active_widgets()[0].id();

        // Fondu d'entrée terminé : le premier maillon est opaque
        let t1 = t0 + entry_duration(3);
        controller.advance(t1);
        assert_eq!(controller.active_widgets()[0].alpha(), 1.0);

        controller.store().set_settings(DisplaySettings::default().with_only_one_ticker(true));
        controller.on_update(UpdateReason::SettingsChanged, t1);

        assert_eq!(controller.retiring_widgets().len(), 2);
        assert!(surface(&controller).attached.contains_key(&old));

        controller.advance(t1 + FADE_OUT_DURATION / 2);
        let alpha = surface(&controller).attached[&old].alpha;
        assert!(alpha < 1.0 && alpha > 0.0);

        controller.advance(t1 + FADE_OUT_DURATION);
        assert!(!surface(&controller).attached.contains_key(&old));
        assert!(controller.retiring_widgets().is_empty());
    }

    #[test]
    fn test_rebuild_cancels_rotation_timer() {
        let t0 = Instant::now();
        let settings = DisplaySettings::default().with_only_one_ticker(true);
        let mut controller = controller(settings, &["AAPL", "MSFT"]);
        controller.configure(t0).unwrap();

        controller.store().set_settings(DisplaySettings::default());
        controller.on_update(UpdateReason::SettingsChanged, t0 + Duration::from_secs(5));

        assert_eq!(controller.mode(), Some(Mode::TwoOrFewerTickers));
        assert_eq!(controller.next_wake(t0 + Duration::from_secs(5)), None);

        let mark = surface(&controller).ops.len();
        controller.advance(t0 + ROTATION_PERIOD * 3);
        assert_eq!(surface(&controller).ops.len(), mark);
    }

    #[test]
    fn test_ticker_update_suppressed_in_marquee() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["A", "B", "C"]);
        controller.configure(t0).unwrap();
        let before: Vec<WidgetId> = controller.active_widgets().iter().map(|w| w.id()).collect();
        let mark = surface(&controller).ops.len();

        controller.store().set_tickers(tickers(&["A", "B", "C", "D"]));
        controller.on_update(UpdateReason::TickersChanged, t0);

        let after: Vec<WidgetId> = controller.active_widgets().iter().map(|w| w.id()).collect();
        assert_eq!(before, after);
        assert_eq!(surface(&controller).ops.len(), mark);
    }

    #[test]
    fn test_ticker_update_rebuilds_below_three() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["AAPL", "MSFT"]);
        controller.configure(t0).unwrap();
        let before = controller.active_widgets()[0].id();

        let mut updated = tickers(&["AAPL", "MSFT"]);
        updated[0].update_price(120.0, 20.0);
        controller.store().set_tickers(updated);
        controller.on_update(UpdateReason::TickersChanged, t0);

        let widget = &controller.active_widgets()[0];
        assert_ne!(widget.id(), before);
        assert_eq!(widget.tickers()[0].price, Some(120.0));
    }

    #[test]
    fn test_ticker_growth_leaves_static_mode() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["AAPL", "MSFT"]);
        controller.configure(t0).unwrap();

        controller.store().set_tickers(tickers(&["AAPL", "MSFT", "TSLA"]));
        controller.on_update(UpdateReason::TickersChanged, t0);

        assert_eq!(controller.mode(), Some(Mode::ManyTickers));
    }

    #[test]
    fn test_one_ticker_started_empty_picks_up_tickers() {
        let t0 = Instant::now();
        let settings = DisplaySettings::default().with_only_one_ticker(true);
        let mut controller = controller(settings, &[]);
        controller.configure(t0).unwrap();
        assert!(controller.active_widgets().is_empty());
        assert!(controller.next_wake(t0).is_none());

        // Sans widget ni timer, la session ne se rafraîchit pas : on reconstruit
        controller.store().set_tickers(tickers(&["A", "B", "C"]));
        controller.on_update(UpdateReason::TickersChanged, t0);

        assert_eq!(controller.mode(), Some(Mode::OneTicker));
        assert_eq!(displayed(&controller), vec![vec!["A"]]);
        assert_eq!(controller.next_wake(t0), Some(t0 + ROTATION_PERIOD));

        controller.advance(t0 + ROTATION_PERIOD);
        assert_eq!(displayed(&controller), vec![vec!["B"]]);
    }

    #[test]
    fn test_rotation_follows_live_tickers_when_suppressed() {
        let t0 = Instant::now();
        let settings = DisplaySettings::default().with_only_one_ticker(true);
        let mut controller = controller(settings, &["A", "B", "C"]);
        controller.configure(t0).unwrap();

        // Réordonné par le provider : la notification est supprimée
        controller.store().set_tickers(tickers(&["C", "A", "B"]));
        controller.on_update(UpdateReason::TickersChanged, t0);
        assert_eq!(displayed(&controller), vec![vec!["A"]]);

        controller.advance(t0 + ROTATION_PERIOD);
        assert_eq!(displayed(&controller), vec![vec!["B"]]);
    }

    #[test]
    fn test_next_wake_during_animation() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["A", "B", "C"]);
        controller.configure(t0).unwrap();

        assert!(controller.is_animating());
        assert_eq!(controller.next_wake(t0), Some(t0 + FRAME_INTERVAL));
    }

    #[test]
    fn test_teardown_detaches_everything() {
        let t0 = Instant::now();
        let mut controller = controller(DisplaySettings::default(), &["A", "B", "C"]);
        controller.configure(t0).unwrap();
        controller.advance(t0 + entry_duration(3));

        controller.teardown();

        assert!(surface(&controller).attached.is_empty());
        assert!(controller.mode().is_none());
        assert!(!controller.is_subscribed());
        assert_eq!(controller.next_wake(t0), None);
    }

    #[tokio::test]
    async fn test_next_update_receives_notifications() {
        let mut controller = controller(DisplaySettings::default(), &["AAPL"]);
        controller.configure(Instant::now()).unwrap();

        controller.store().set_tickers(tickers(&["AAPL", "MSFT"]));

        assert_eq!(controller.next_update().await, Some(UpdateReason::TickersChanged));
    }

    #[tokio::test]
    async fn test_lagged_subscriber_forces_rebuild() {
        let mut controller = controller(DisplaySettings::default(), &["AAPL"]);
        controller.configure(Instant::now()).unwrap();

        for _ in 0..(crate::provider::NOTIFICATION_CAPACITY + 5) {
            controller.store().set_tickers(tickers(&["AAPL"]));
        }

        assert_eq!(controller.next_update().await, Some(UpdateReason::SettingsChanged));
    }
}

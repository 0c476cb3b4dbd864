// ============================================================================
// TickerWidget : unité d'affichage de la barre
// ============================================================================
// Un widget de taille fixe qui affiche un ou plusieurs tickers sur une ligne.
// Il sait :
// - mesurer sa largeur (en cellules de terminal) à partir de son contenu
// - être animé en opacité (fade) ou en position horizontale (scroll)
// - remplacer son contenu sur place (set)
//
// Le widget n'a AUCUN timer : c'est le controller qui le fait avancer avec
// step(now). Une animation terminée rend son Completion exactement une fois.
//
// CONCEPTS RATATUI :
// - Line / Span : composition de texte stylé
// - Line::width() : largeur d'affichage (unicode-aware)
// ============================================================================

use std::time::{Duration, Instant};

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::display::session::ChainToken;
use crate::models::{DisplaySettings, Ticker};

/// Identifiant unique d'un widget (jamais réutilisé)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u64);

/// Préférences de formatage extraites des réglages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WidgetFormat {
    pub show_name: bool,
    pub change_as_percentage: bool,
    pub show_premarket: bool,
}

impl From<&DisplaySettings> for WidgetFormat {
    fn from(settings: &DisplaySettings) -> Self {
        Self {
            show_name: settings.show_ticker_name,
            change_as_percentage: settings.show_change_as_percentage,
            show_premarket: settings.show_premarket_in_bar,
        }
    }
}

/// Ce qu'il faut faire quand une animation se termine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Créer le maillon suivant de la chaîne marquee (si le jeton est encore valide)
    ContinueChain(ChainToken),

    /// Détacher le widget de la barre (fin d'un fade-out de retrait)
    Detach,
}

/// Propriété animée
#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Fade { from: f64, to: f64 },
    Scroll { from: f64, to: f64 },
}

#[derive(Debug, Clone)]
struct Animation {
    motion: Motion,
    started: Instant,
    duration: Duration,
    on_complete: Option<Completion>,
}

impl Animation {
    /// Avancement entre 0.0 et 1.0
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn deadline(&self) -> Instant {
        self.started + self.duration
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Widget affichant une séquence de tickers
#[derive(Debug, Clone)]
pub struct TickerWidget {
    id: WidgetId,
    tickers: Vec<Ticker>,
    format: WidgetFormat,
    x: f64,
    alpha: f64,
    content: Line<'static>,
    animation: Option<Animation>,
}

impl TickerWidget {
    /// Crée un widget positionné à origin_x, complètement opaque
    pub fn new(id: WidgetId, tickers: Vec<Ticker>, origin_x: f64, format: WidgetFormat) -> Self {
        let content = render_content(&tickers, format);
        Self {
            id,
            tickers,
            format,
            x: origin_x,
            alpha: 1.0,
            content,
            animation: None,
        }
    }

    /// Même chose, mais avec une opacité initiale (0.0 pour un fade-in)
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Position horizontale courante (en cellules, peut être négative)
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Repositionne le widget sans animation
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Largeur rendue du widget en cellules
    pub fn width(&self) -> u16 {
        u16::try_from(self.content.width()).unwrap_or(u16::MAX)
    }

    /// Contenu stylé prêt à être dessiné
    pub fn content(&self) -> &Line<'static> {
        &self.content
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Instant de fin de l'animation en cours
    pub fn animation_deadline(&self) -> Option<Instant> {
        self.animation.as_ref().map(Animation::deadline)
    }

    /// Lance un fondu vers target_alpha
    ///
    /// Une animation déjà en cours est remplacée et son Completion est perdu.
    pub fn fade_animation(
        &mut self,
        target_alpha: f64,
        duration: Duration,
        now: Instant,
        on_complete: Option<Completion>,
    ) {
        self.animation = Some(Animation {
            motion: Motion::Fade {
                from: self.alpha,
                to: target_alpha.clamp(0.0, 1.0),
            },
            started: now,
            duration,
            on_complete,
        });
    }

    /// Lance un défilement de la position courante vers x = 0
    pub fn scroll_animation(&mut self, duration: Duration, now: Instant, on_complete: Completion) {
        self.animation = Some(Animation {
            motion: Motion::Scroll { from: self.x, to: 0.0 },
            started: now,
            duration,
            on_complete: Some(on_complete),
        });
    }

    /// Annule l'animation en cours SANS déclencher son Completion
    pub fn cancel_animation(&mut self) {
        self.animation = None;
    }

    /// Fait avancer l'animation jusqu'à `now`
    ///
    /// Retourne le Completion si l'animation vient de se terminer.
    /// CONCEPT RUST : Option::take()
    /// - take() vide l'Option : le Completion ne peut sortir qu'une fois
    pub fn step(&mut self, now: Instant) -> Option<Completion> {
        let (motion, progress) = {
            let animation = self.animation.as_ref()?;
            (animation.motion, animation.progress(now))
        };

        match motion {
            Motion::Fade { from, to } => self.alpha = lerp(from, to, progress),
            Motion::Scroll { from, to } => self.x = lerp(from, to, progress),
        }

        if progress < 1.0 {
            return None;
        }

        self.animation.take().and_then(|finished| finished.on_complete)
    }

    /// Remplace le contenu par un seul ticker et re-mesure la largeur
    pub fn set(&mut self, ticker: Ticker) {
        self.tickers = vec![ticker];
        self.content = render_content(&self.tickers, self.format);
    }
}

// ============================================================================
// Rendu du contenu
// ============================================================================

/// Compose la ligne affichée pour une séquence de tickers
///
/// Format par ticker : " AAPL Apple Inc. 190.12 +1.23% PM 191.00 +0.40% "
pub fn render_content(tickers: &[Ticker], format: WidgetFormat) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    for ticker in tickers {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            ticker.symbol.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));

        if format.show_name && !ticker.name.is_empty() {
            spans.push(Span::styled(
                format!(" {}", ticker.name),
                Style::default().fg(Color::Gray),
            ));
        }

        // Vert en hausse, rouge en baisse, gris sans données
        let value_style = match ticker.price {
            None => Style::default().fg(Color::DarkGray),
            Some(_) if ticker.is_positive() => Style::default().fg(Color::Green),
            Some(_) => Style::default().fg(Color::Red),
        };
        spans.push(Span::styled(
            format!(" {}", ticker.display_value(format.change_as_percentage)),
            value_style,
        ));

        if format.show_premarket {
            if let Some(premarket) = ticker.premarket {
                spans.push(Span::styled(
                    format!(" PM {:.2} {:+.2}%", premarket.price, premarket.change_percent),
                    Style::default().fg(Color::Yellow),
                ));
            }
        }

        spans.push(Span::raw(" "));
    }

    Line::from(spans)
}

// ============================================================================
// Tests
// ============================================================================

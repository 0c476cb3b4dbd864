// ============================================================================
// Écran : rendu de la barre et de l'aide
// ============================================================================
// Layout vertical :
// - la barre d'état (1 ligne, en haut, comme une barre de menus)
// - un panneau central : réglages courants et mode d'affichage
// - un footer avec les raccourcis clavier
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Block / Paragraph : bordures et texte formaté
// ============================================================================

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::display::session::{DisplaySession, Scheduler};
use crate::display::Mode;
use crate::models::DisplaySettings;
use crate::ui::bar::TerminalHost;

/// Dessine l'écran complet
pub fn render(frame: &mut Frame, app: &App<TerminalHost>) {
    let chunks = create_layout(frame.size());

    render_bar(frame, app, chunks[0]);
    render_status(frame, app, chunks[1]);
    render_footer(frame, chunks[2]);
}

/// Crée le layout principal (barre, contenu, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Barre : 1 ligne
            Constraint::Min(0),    // Statut : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

/// Dessine la barre d'état, alignée à droite comme dans une barre de menus
fn render_bar(frame: &mut Frame, app: &App<TerminalHost>, area: Rect) {
    let Some(bar) = app.controller().surface() else {
        return;
    };

    let line = bar.compose(area.width);
    let paragraph = Paragraph::new(line)
        .alignment(Alignment::Right)
        .style(Style::default().bg(Color::Black));

    frame.render_widget(paragraph, area);
}

/// Nombre de maillons créés par la chaîne marquee en cours
fn marquee_links(session: Option<&DisplaySession>) -> Option<u64> {
    match &session?.scheduler {
        Scheduler::Marquee(marquee) => Some(marquee.links()),
        _ => None,
    }
}

/// Libellé lisible d'un mode
fn mode_label(mode: Option<Mode>) -> &'static str {
    match mode {
        Some(Mode::OneTicker) => "Un ticker (rotation)",
        Some(Mode::TwoOrFewerTickers) => "Statique",
        Some(Mode::ManyTickers) => "Défilement (marquee)",
        None => "Inactif",
    }
}

fn on_off(enabled: bool) -> Span<'static> {
    if enabled {
        Span::styled("oui", Style::default().fg(Color::Green))
    } else {
        Span::styled("non", Style::default().fg(Color::DarkGray))
    }
}

/// Lignes de réglages affichées dans le panneau central
fn settings_lines(settings: &DisplaySettings) -> Vec<Line<'static>> {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));

    vec![
        Line::from(vec![label("  Un seul ticker [o] : "), on_off(settings.show_only_one_ticker)]),
        Line::from(vec![label("  Nom du ticker  [n] : "), on_off(settings.show_ticker_name)]),
        Line::from(vec![
            label("  Variation %    [p] : "),
            on_off(settings.show_change_as_percentage),
        ]),
        Line::from(vec![label("  Pre-market     [m] : "), on_off(settings.show_premarket_in_bar)]),
        Line::from(vec![
            label("  Intervalle         : "),
            Span::raw(format!("{}s", settings.update_interval_seconds)),
        ]),
    ]
}

/// Dessine le panneau de statut
fn render_status(frame: &mut Frame, app: &App<TerminalHost>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" MarketBar ");

    let store = app.store();
    let settings = store.settings();
    let controller = app.controller();

    let last_update = store
        .last_update()
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "jamais".to_string());

    let mut mode_line = vec![
        Span::styled("  Mode : ", Style::default().fg(Color::Gray)),
        Span::styled(
            mode_label(controller.mode()),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(links) = marquee_links(controller.session()) {
        mode_line.push(Span::styled(
            format!("  ({} maillons)", links),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut text = vec![
        Line::from(mode_line),
        Line::from(vec![
            Span::styled("  Tickers : ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} / {}", store.ticker_count(), settings.ticker_count())),
            Span::styled("   Mise à jour : ", Style::default().fg(Color::Gray)),
            Span::raw(last_update),
        ]),
        Line::from(""),
    ];
    text.extend(settings_lines(&settings));

    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}

/// Dessine le footer avec les raccourcis
fn render_footer(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };

    let text = Line::from(vec![
        key("o/n/p/m"),
        Span::raw(" Réglages  "),
        key("d"),
        Span::raw(" Retirer un ticker  "),
        key("q"),
        Span::raw(" Quitter"),
    ]);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

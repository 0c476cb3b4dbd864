// ============================================================================
// Barre d'état en terminal
// ============================================================================
// Implémente la surface de la barre pour l'hôte terminal :
// - TerminalHost::acquire() vérifie qu'un terminal est disponible
// - TerminalBar garde une copie des widgets attachés (position, opacité,
//   contenu) et compose la ligne à dessiner
//
// CONCEPTS RATATUI :
// - Span::styled_graphemes() : itère sur les graphèmes avec leur style
// - L'opacité n'existe pas en terminal : on la simule avec DIM / masquage
// ============================================================================

use anyhow::{bail, Context, Result};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use tracing::debug;

use crate::display::{StatusHost, StatusSurface, TickerWidget, WidgetId};

/// En dessous : widget invisible
const ALPHA_HIDDEN: f64 = 0.33;

/// En dessous : widget atténué
const ALPHA_DIM: f64 = 0.66;

/// Copie d'un widget tel qu'attaché à la barre
#[derive(Debug, Clone)]
struct BarItem {
    id: WidgetId,
    x: f64,
    alpha: f64,
    content: Line<'static>,
}

impl BarItem {
    fn from_widget(widget: &TickerWidget) -> Self {
        Self {
            id: widget.id(),
            x: widget.x(),
            alpha: widget.alpha(),
            content: widget.content().clone(),
        }
    }
}

/// Surface de la barre dessinée dans le terminal
#[derive(Debug, Default)]
pub struct TerminalBar {
    items: Vec<BarItem>,
    width: u16,
}

impl TerminalBar {
    /// Compose la ligne de la barre, tronquée à `max_width` cellules
    ///
    /// Les widgets sont dessinés dans l'ordre d'attachement : le plus récent
    /// recouvre les précédents.
    pub fn compose(&self, max_width: u16) -> Line<'static> {
        let width = usize::from(self.width.min(max_width));
        let mut cells: Vec<(String, Style)> = vec![(" ".to_string(), Style::default()); width];

        for item in &self.items {
            if item.alpha < ALPHA_HIDDEN {
                continue;
            }
            let dim = item.alpha < ALPHA_DIM;
            let mut column = item.x.round() as i64;

            for span in &item.content.spans {
                for grapheme in span.styled_graphemes(Style::default()) {
                    if column >= 0 && (column as usize) < width {
                        let style = if dim {
                            grapheme.style.add_modifier(Modifier::DIM)
                        } else {
                            grapheme.style
                        };
                        cells[column as usize] = (grapheme.symbol.to_string(), style);
                    }
                    column += 1;
                }
            }
        }

        Line::from(
            cells
                .into_iter()
                .map(|(symbol, style)| Span::styled(symbol, style))
                .collect::<Vec<_>>(),
        )
    }
}

impl StatusSurface for TerminalBar {
    fn attach(&mut self, widget: &TickerWidget) {
        self.items.push(BarItem::from_widget(widget));
    }

    fn refresh(&mut self, widget: &TickerWidget) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == widget.id()) {
            *item = BarItem::from_widget(widget);
        }
    }

    fn detach(&mut self, id: WidgetId) {
        self.items.retain(|item| item.id != id);
    }

    fn set_width(&mut self, width: u16) {
        self.width = width;
    }
}

/// Hôte terminal : fournit la barre si un terminal est disponible
#[derive(Debug, Default)]
pub struct TerminalHost;

impl StatusHost for TerminalHost {
    type Surface = TerminalBar;

    fn acquire(&mut self) -> Result<TerminalBar> {
        let (columns, rows) = crossterm::terminal::size().context("Terminal indisponible")?;
        if columns == 0 || rows == 0 {
            bail!("Terminal sans surface utilisable ({}x{})", columns, rows);
        }
        debug!(columns, rows, "Terminal bar acquired");
        Ok(TerminalBar::default())
    }
}

// ============================================================================
// Tests
// ============================================================================

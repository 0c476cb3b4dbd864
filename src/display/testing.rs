// ============================================================================
// Doublures de test pour la surface de la barre
// ============================================================================

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use crate::display::surface::{StatusHost, StatusSurface};
use crate::display::widget::{TickerWidget, WidgetId};

/// Opération enregistrée sur la surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Attach(WidgetId),
    Refresh(WidgetId),
    Detach(WidgetId),
    Width(u16),
}

/// État d'un widget tel que vu par la surface
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub symbols: Vec<String>,
    pub x: f64,
    pub alpha: f64,
    pub width: u16,
}

/// Surface qui enregistre tout ce qu'on lui fait
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
    pub attached: BTreeMap<WidgetId, Placed>,
    pub width: u16,
}

impl RecordingSurface {
    fn place(widget: &TickerWidget) -> Placed {
        Placed {
            symbols: widget.tickers().iter().map(|t| t.symbol.clone()).collect(),
            x: widget.x(),
            alpha: widget.alpha(),
            width: widget.width(),
        }
    }

    /// Identifiants attachés après l'opération n° `from`
    pub fn attached_since(&self, from: usize) -> Vec<WidgetId> {
        self.ops[from..]
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Attach(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Toutes les opérations touchant un widget donné, après l'opération n° `from`
    pub fn ops_for_since(&self, id: WidgetId, from: usize) -> Vec<SurfaceOp> {
        self.ops[from..]
            .iter()
            .filter(|op| match op {
                SurfaceOp::Attach(x) | SurfaceOp::Refresh(x) | SurfaceOp::Detach(x) => *x == id,
                SurfaceOp::Width(_) => false,
            })
            .cloned()
            .collect()
    }
}

impl StatusSurface for RecordingSurface {
    fn attach(&mut self, widget: &TickerWidget) {
        self.ops.push(SurfaceOp::Attach(widget.id()));
        self.attached.insert(widget.id(), Self::place(widget));
    }

    fn refresh(&mut self, widget: &TickerWidget) {
        self.ops.push(SurfaceOp::Refresh(widget.id()));
        if let Some(placed) = self.attached.get_mut(&widget.id()) {
            *placed = Self::place(widget);
        }
    }

    fn detach(&mut self, id: WidgetId) {
        self.ops.push(SurfaceOp::Detach(id));
        self.attached.remove(&id);
    }

    fn set_width(&mut self, width: u16) {
        self.ops.push(SurfaceOp::Width(width));
        self.width = width;
    }
}

/// Hôte de test, disponible ou non
#[derive(Debug)]
pub struct RecordingHost {
    pub available: bool,
}

impl StatusHost for RecordingHost {
    type Surface = RecordingSurface;

    fn acquire(&mut self) -> Result<RecordingSurface> {
        if !self.available {
            bail!("status bar button unavailable");
        }
        Ok(RecordingSurface::default())
    }
}

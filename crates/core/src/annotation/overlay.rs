//! Transient tooltips for selection mode.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vertical distance between the selection and its tooltip.
pub const TOOLTIP_OFFSET_Y: f64 = 20.0;

/// A text selection reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub text: String,
    /// Left edge of the selection's bounding box.
    pub x: f64,
    /// Bottom edge of the selection's bounding box.
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub id: Uuid,
    pub source_label: String,
    pub target_label: String,
    pub source_amount: Decimal,
    pub target_amount: Decimal,
    pub x: f64,
    pub y: f64,
}

/// Floating layer above the document. Never part of the document tree.
pub trait Overlay: Send + Sync {
    /// Show `tooltip`, replacing any tooltip currently shown.
    fn show(&self, tooltip: &Tooltip);

    /// Remove the tooltip `id` if it is still shown.
    fn dismiss(&self, id: Uuid);
}

/// Overlay for headless hosts.
#[derive(Clone, Default)]
pub struct NoOpOverlay;

impl Overlay for NoOpOverlay {
    fn show(&self, _tooltip: &Tooltip) {}

    fn dismiss(&self, _id: Uuid) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    Shown(Tooltip),
    Dismissed(Uuid),
}

/// Records overlay calls. Used by tests and by hosts that poll.
#[derive(Clone, Default)]
pub struct RecordingOverlay {
    events: Arc<Mutex<Vec<OverlayEvent>>>,
    visible: Arc<Mutex<Option<Tooltip>>>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OverlayEvent> {
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// The tooltip currently shown.
    pub fn visible(&self) -> Option<Tooltip> {
        self.visible
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl Overlay for RecordingOverlay {
    fn show(&self, tooltip: &Tooltip) {
        *self.visible.lock().unwrap_or_else(|p| p.into_inner()) = Some(tooltip.clone());
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(OverlayEvent::Shown(tooltip.clone()));
    }

    fn dismiss(&self, id: Uuid) {
        let mut visible = self.visible.lock().unwrap_or_else(|p| p.into_inner());
        if visible.as_ref().is_some_and(|t| t.id == id) {
            *visible = None;
        }
        self.events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(OverlayEvent::Dismissed(id));
    }
}

//! Screen-space UI element descriptions.
//!
//! These are plain data: nothing draws them yet.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Default element color, opaque mid grey.
pub const DEFAULT_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
pub const DEFAULT_SIZE: IVec2 = IVec2::new(100, 100);
pub const DEFAULT_CURSOR_SIZE: IVec2 = IVec2::new(10, 10);

/// What kind of widget an element is, with its kind-specific state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum WidgetKind {
    /// A plain colored rectangle.
    #[default]
    Panel,
    Text {
        text: String,
    },
    Slider {
        cursor_size: IVec2,
        /// Normalized cursor position, `0.0..=1.0`.
        value: f32,
    },
}

/// A rectangle in pixel coordinates, positioned relative to an anchor point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    pub anchor: IVec2,
    pub position: IVec2,
    pub size: IVec2,
    /// Linear RGBA.
    pub color: [f32; 4],
    pub kind: WidgetKind,
}

impl UiElement {
    fn with_kind(kind: WidgetKind) -> Self {
        Self {
            anchor: IVec2::ZERO,
            position: IVec2::ZERO,
            size: DEFAULT_SIZE,
            color: DEFAULT_COLOR,
            kind,
        }
    }

    pub fn panel() -> Self {
        Self::with_kind(WidgetKind::Panel)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(WidgetKind::Text { text: text.into() })
    }

    pub fn slider() -> Self {
        Self::with_kind(WidgetKind::Slider {
            cursor_size: DEFAULT_CURSOR_SIZE,
            value: 0.0,
        })
    }

    pub fn anchor(mut self, anchor: IVec2) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = IVec2::new(x, y);
        self
    }

    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.size = IVec2::new(width, height);
        self
    }

    pub fn color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Top-left corner in screen space.
    pub fn screen_position(&self) -> IVec2 {
        self.anchor + self.position
    }

    /// Slider value, or `None` for other widgets.
    pub fn value(&self) -> Option<f32> {
        match self.kind {
            WidgetKind::Slider { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Sets a slider's value, clamped to `0.0..=1.0`. No-op on other widgets.
    pub fn set_value(&mut self, new_value: f32) {
        if let WidgetKind::Slider { value, .. } = &mut self.kind {
            *value = new_value.clamp(0.0, 1.0);
        }
    }
}

impl Default for UiElement {
    fn default() -> Self {
        Self::panel()
    }
}

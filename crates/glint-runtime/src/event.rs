//! Signals a host feeds into the page

use glint_core::ElementId;
use serde::{Deserialize, Serialize};

/// Viewport, pointer and lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// Pointer moved, in viewport coordinates
    PointerMove { x: f32, y: f32 },
    /// First touch point moved
    TouchMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32 },
    /// Pointer entered an element (hover start)
    PointerEnter { element: ElementId },
    PointerLeave { element: ElementId },
    Click { element: ElementId },
    /// The document scrolled to a new offset
    Scroll { offset: f32 },
    Resize { width: f32, height: f32, dpr: f32 },
    /// The page finished loading
    Load,
    ReducedMotionChanged { reduced: bool },
    VisibilityChanged { visible: bool },
}

impl PageEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PageEvent::PointerMove { .. } => "pointer_move",
            PageEvent::TouchMove { .. } => "touch_move",
            PageEvent::PointerDown { .. } => "pointer_down",
            PageEvent::PointerEnter { .. } => "pointer_enter",
            PageEvent::PointerLeave { .. } => "pointer_leave",
            PageEvent::Click { .. } => "click",
            PageEvent::Scroll { .. } => "scroll",
            PageEvent::Resize { .. } => "resize",
            PageEvent::Load => "load",
            PageEvent::ReducedMotionChanged { .. } => "reduced_motion_changed",
            PageEvent::VisibilityChanged { .. } => "visibility_changed",
        }
    }
}

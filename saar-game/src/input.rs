//! Per-tick input intent sampled from the (external) input device layer.

use serde::{Deserialize, Serialize};

/// Boolean intent flags plus look delta for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputFrame {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    /// Mouse-look delta in device units `(dx, dy)`.
    #[serde(default)]
    pub look_delta: (f32, f32),
    /// Discrete interact trigger (edge, not held).
    #[serde(default)]
    pub interact: bool,
    /// Discrete flashlight toggle trigger.
    #[serde(default)]
    pub toggle_flashlight: bool,
}

impl InputFrame {
    /// No input at all.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            sprint: false,
            look_delta: (0.0, 0.0),
            interact: false,
            toggle_flashlight: false,
        }
    }

    /// Holding forward.
    #[must_use]
    pub const fn walking() -> Self {
        Self {
            forward: true,
            ..Self::idle()
        }
    }

    /// Holding forward with sprint.
    #[must_use]
    pub const fn sprinting() -> Self {
        Self {
            forward: true,
            sprint: true,
            ..Self::idle()
        }
    }

    /// True when any directional flag is held.
    ///
    /// Opposing flags (forward + backward) still count as intent.
    #[must_use]
    pub const fn has_movement(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    #[must_use]
    pub const fn with_interact(mut self) -> Self {
        self.interact = true;
        self
    }

    #[must_use]
    pub const fn with_flashlight_toggle(mut self) -> Self {
        self.toggle_flashlight = true;
        self
    }
}

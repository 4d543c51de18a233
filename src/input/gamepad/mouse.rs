//! Host-fed relative mouse state
//!
//! Gamepad libraries do not see the mouse, so the host window's event loop
//! pushes motion and button events into a [`MouseFeed`]. The gamepad backend
//! takes the accumulated delta once per poll.

use parking_lot::Mutex;
use std::sync::Arc;

use super::subsystem::{mouse_mask, RelativeMouseState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    fn mask(self) -> u32 {
        match self {
            Self::Left => mouse_mask::LEFT,
            Self::Middle => mouse_mask::MIDDLE,
            Self::Right => mouse_mask::RIGHT,
        }
    }
}

#[derive(Debug, Default)]
struct MouseAccumulator {
    dx: i32,
    dy: i32,
    buttons: u32,
    relative_mode: bool,
}

/// Cloneable handle shared between the host event loop and the gamepad backend
#[derive(Debug, Clone, Default)]
pub struct MouseFeed {
    inner: Arc<Mutex<MouseAccumulator>>,
}

impl MouseFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate relative motion (e.g. winit `DeviceEvent::MouseMotion`)
    pub fn motion(&self, dx: i32, dy: i32) {
        let mut state = self.inner.lock();
        state.dx = state.dx.saturating_add(dx);
        state.dy = state.dy.saturating_add(dy);
    }

    pub fn button(&self, button: MouseButton, pressed: bool) {
        let mut state = self.inner.lock();
        if pressed {
            state.buttons |= button.mask();
        } else {
            state.buttons &= !button.mask();
        }
    }

    /// Whether the adapter wants the cursor captured for mouse look
    pub fn relative_mode(&self) -> bool {
        self.inner.lock().relative_mode
    }

    pub(crate) fn set_relative_mode(&self, enabled: bool) {
        self.inner.lock().relative_mode = enabled;
    }

    /// Take the delta accumulated since the previous call; buttons stay held
    pub(crate) fn take(&self) -> RelativeMouseState {
        let mut state = self.inner.lock();
        RelativeMouseState {
            dx: std::mem::take(&mut state.dx),
            dy: std::mem::take(&mut state.dy),
            buttons: state.buttons,
        }
    }
}

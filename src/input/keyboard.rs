//! Keyboard-only input backend
//!
//! The host forwards raw scancodes (PC set 1, extended keys as `0x1xx`) to a
//! [`KeyFeed`]; each frame the held keys are folded into the pad. Stick
//! directions produce full deflection, and opposite directions cancel out.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::camera::CameraInput;
use crate::config::{AppConfig, KeyAction, KeyboardConfig};
use crate::input::ControllerApi;
use crate::pad::{buttons, ContPad};

// Stick directions live above the 16 pad button bits
const STICK_LEFT: u32 = 0x10000;
const STICK_RIGHT: u32 = 0x20000;
const STICK_DOWN: u32 = 0x40000;
const STICK_UP: u32 = 0x80000;

/// Default scancodes per action
const DEFAULT_BINDINGS: [(KeyAction, u32); 14] = [
    (KeyAction::StickUp, 0x0011),    // W
    (KeyAction::StickLeft, 0x001e),  // A
    (KeyAction::StickDown, 0x001f),  // S
    (KeyAction::StickRight, 0x0020), // D
    (KeyAction::A, 0x0026),          // L
    (KeyAction::B, 0x0033),          // ,
    (KeyAction::Z, 0x0025),          // K
    (KeyAction::Start, 0x0039),      // Space
    (KeyAction::L, 0x002a),          // Left Shift
    (KeyAction::R, 0x0036),          // Right Shift
    (KeyAction::CUp, 0x0148),
    (KeyAction::CDown, 0x0150),
    (KeyAction::CLeft, 0x014b),
    (KeyAction::CRight, 0x014d),
];

/// Internal mask bit driven by an action
pub fn action_mask(action: KeyAction) -> u32 {
    match action {
        KeyAction::A => buttons::A_BUTTON as u32,
        KeyAction::B => buttons::B_BUTTON as u32,
        KeyAction::Z => buttons::Z_TRIG as u32,
        KeyAction::Start => buttons::START_BUTTON as u32,
        KeyAction::L => buttons::L_TRIG as u32,
        KeyAction::R => buttons::R_TRIG as u32,
        KeyAction::CUp => buttons::U_CBUTTONS as u32,
        KeyAction::CDown => buttons::D_CBUTTONS as u32,
        KeyAction::CLeft => buttons::L_CBUTTONS as u32,
        KeyAction::CRight => buttons::R_CBUTTONS as u32,
        KeyAction::StickUp => STICK_UP,
        KeyAction::StickDown => STICK_DOWN,
        KeyAction::StickLeft => STICK_LEFT,
        KeyAction::StickRight => STICK_RIGHT,
    }
}

/// Scancode → mask table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    map: HashMap<u32, u32>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let map = DEFAULT_BINDINGS
            .iter()
            .map(|(action, scancode)| (*scancode, action_mask(*action)))
            .collect();
        Self { map }
    }
}

impl KeyBindings {
    /// Defaults, with every configured action's keys replaced by the configured ones
    pub fn from_config(config: &KeyboardConfig) -> Self {
        let mut bindings = Self::default();
        for (action, scancodes) in &config.bindings {
            let mask = action_mask(*action);
            bindings.map.retain(|_, bound| *bound != mask);
            for scancode in scancodes {
                bindings.map.insert(*scancode, mask);
            }
        }
        bindings
    }

    pub fn lookup(&self, scancode: u32) -> Option<u32> {
        self.map.get(&scancode).copied()
    }
}

#[derive(Debug, Default)]
struct KeyState {
    bindings: KeyBindings,
    /// Bound scancodes currently held
    down: HashSet<u32>,
}

/// Cloneable handle the host pushes key events into
#[derive(Debug, Clone, Default)]
pub struct KeyFeed {
    inner: Arc<Mutex<KeyState>>,
}

impl KeyFeed {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(KeyState { bindings, down: HashSet::new() })),
        }
    }

    /// Returns whether the scancode is bound (and so consumed)
    pub fn key_down(&self, scancode: u32) -> bool {
        let mut state = self.inner.lock();
        if state.bindings.lookup(scancode).is_none() {
            return false;
        }
        state.down.insert(scancode);
        true
    }

    pub fn key_up(&self, scancode: u32) -> bool {
        let mut state = self.inner.lock();
        if state.bindings.lookup(scancode).is_none() {
            return false;
        }
        state.down.remove(&scancode);
        true
    }

    /// Release everything, e.g. when the window loses focus
    pub fn all_keys_up(&self) {
        self.inner.lock().down.clear();
    }

    pub fn set_bindings(&self, bindings: KeyBindings) {
        let mut state = self.inner.lock();
        state.bindings = bindings;
        state.down.clear();
    }

    /// Union of the masks of every held key
    fn held(&self) -> u32 {
        let state = self.inner.lock();
        state
            .down
            .iter()
            .filter_map(|scancode| state.bindings.lookup(*scancode))
            .fold(0, |mask, bit| mask | bit)
    }
}

/// Keyboard backend reading from a [`KeyFeed`]
pub struct KeyboardBackend {
    feed: KeyFeed,
}

impl KeyboardBackend {
    pub fn new(feed: KeyFeed) -> Self {
        Self { feed }
    }
}

impl ControllerApi for KeyboardBackend {
    fn name(&self) -> &'static str {
        "keyboard"
    }

    fn init(&mut self, _camera: &CameraInput) {
        info!("Keyboard backend ready");
    }

    fn read(&mut self, pad: &mut ContPad, _camera: &mut CameraInput) {
        let down = self.feed.held();

        pad.press((down & 0xffff) as u16);

        match down & (STICK_LEFT | STICK_RIGHT) {
            STICK_LEFT => pad.stick_x = -128,
            STICK_RIGHT => pad.stick_x = 127,
            _ => {},
        }
        match down & (STICK_DOWN | STICK_UP) {
            STICK_DOWN => pad.stick_y = -128,
            STICK_UP => pad.stick_y = 127,
            _ => {},
        }
    }

    fn apply_config(&mut self, config: &AppConfig) {
        let bindings = KeyBindings::from_config(&config.keyboard);
        if self.feed.inner.lock().bindings != bindings {
            debug!("Reloading keyboard bindings");
            self.feed.set_bindings(bindings);
        }
    }
}

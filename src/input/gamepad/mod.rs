//! Gamepad input backend
//!
//! Polls the bound game controller and the relative mouse once per frame and
//! folds them into the legacy pad record:
//!
//! - mouse left/right/middle → B / A / Z
//! - Start, shoulders, A, B and D-Pad → digital buttons (D-Pad drives the C-buttons)
//! - right stick → C-buttons past half deflection, and raw values into [`CameraInput`]
//! - analog triggers → Z / R past the actuation threshold
//! - left stick → `stick_x`/`stick_y`, only outside the radial deadzone
//!
//! Every contribution is OR-ed into the mask; nothing is ever cleared here.

pub mod diagnostics;
pub mod gilrs_subsystem;
pub mod mouse;
pub mod platform;
pub mod subsystem;

#[cfg(test)]
mod tests;

use tracing::{debug, error, info, warn};

use crate::camera::CameraInput;
use crate::config::AppConfig;
use crate::input::ControllerApi;
use crate::pad::{buttons, ContPad};

pub use diagnostics::print_gamepad_diagnostics;
pub use gilrs_subsystem::GilrsSubsystem;
pub use mouse::{MouseButton, MouseFeed};
pub use platform::PlatformQuirks;
pub use subsystem::{InputSubsystem, PadAxis, PadButton, RelativeMouseState, SubsystemError};

/// Default left stick deadzone radius in raw axis units
pub const DEADZONE: u16 = 4960;

/// Right stick deflection past which a C-button is reported
pub const CBUTTON_THRESHOLD: i16 = 0x4000;

/// Analog trigger value past which Z / R are reported
pub const TRIGGER_THRESHOLD: i16 = 30 * 256;

/// Gamepad backend on top of the production gilrs subsystem
pub type GilrsBackend = GamepadBackend<GilrsSubsystem>;

/// Digital buttons read from the controller, in read order
const BUTTON_MAP: [(PadButton, u16); 9] = [
    (PadButton::Start, buttons::START_BUTTON),
    (PadButton::LeftShoulder, buttons::Z_TRIG),
    (PadButton::RightShoulder, buttons::R_TRIG),
    (PadButton::A, buttons::A_BUTTON),
    (PadButton::B, buttons::B_BUTTON),
    (PadButton::DPadLeft, buttons::L_CBUTTONS),
    (PadButton::DPadRight, buttons::R_CBUTTONS),
    (PadButton::DPadUp, buttons::U_CBUTTONS),
    (PadButton::DPadDown, buttons::D_CBUTTONS),
];

/// Pad buttons substituted by the mouse buttons
pub fn mouse_buttons_to_pad(mouse_buttons: u32) -> u16 {
    let mut mask = 0;
    if mouse_buttons & subsystem::mouse_mask::LEFT != 0 {
        mask |= buttons::B_BUTTON;
    }
    if mouse_buttons & subsystem::mouse_mask::RIGHT != 0 {
        mask |= buttons::A_BUTTON;
    }
    if mouse_buttons & subsystem::mouse_mask::MIDDLE != 0 {
        mask |= buttons::Z_TRIG;
    }
    mask
}

/// C-buttons implied by right stick deflection
///
/// Raw Y is negative when pushed up, and maps to C-up without inversion.
pub fn right_stick_cbuttons(rightx: i16, righty: i16) -> u16 {
    let mut mask = 0;
    if rightx < -CBUTTON_THRESHOLD {
        mask |= buttons::L_CBUTTONS;
    }
    if rightx > CBUTTON_THRESHOLD {
        mask |= buttons::R_CBUTTONS;
    }
    if righty < -CBUTTON_THRESHOLD {
        mask |= buttons::U_CBUTTONS;
    }
    if righty > CBUTTON_THRESHOLD {
        mask |= buttons::D_CBUTTONS;
    }
    mask
}

/// Digital buttons implied by the analog triggers
pub fn trigger_buttons(ltrig: i16, rtrig: i16) -> u16 {
    let mut mask = 0;
    if ltrig > TRIGGER_THRESHOLD {
        mask |= buttons::Z_TRIG;
    }
    if rtrig > TRIGGER_THRESHOLD {
        mask |= buttons::R_TRIG;
    }
    mask
}

/// Write the left stick into the pad when it leaves the deadzone
///
/// Returns whether the stick fields were written. Inside the deadzone the
/// caller's previous values are kept.
pub fn apply_left_stick(pad: &mut ContPad, leftx: i16, lefty: i16, deadzone: u16) -> bool {
    // -32768² still fits, and the sum of two stays below 2^32
    let square = |v: i16| (i32::from(v) * i32::from(v)) as u32;
    let magnitude_sq = square(leftx) + square(lefty);
    let deadzone_sq = u32::from(deadzone) * u32::from(deadzone);

    if magnitude_sq <= deadzone_sq {
        return false;
    }

    pad.stick_x = (leftx / 0x100) as i8;
    let stick_y = -i32::from(lefty) / 0x100;
    pad.stick_y = if stick_y == 128 { 127 } else { stick_y as i8 };
    true
}

/// Gamepad + relative mouse backend
///
/// Session state is `Uninitialized → Ready(unbound) ⇄ Ready(bound)`. A failed
/// init stays uninitialized and every read is a no-op.
pub struct GamepadBackend<S: InputSubsystem> {
    subsystem: S,
    quirks: PlatformQuirks,
    deadzone: u16,
    ready: bool,
    bound: Option<S::Handle>,
}

impl<S: InputSubsystem> GamepadBackend<S> {
    pub fn new(subsystem: S, quirks: PlatformQuirks, deadzone: u16) -> Self {
        Self {
            subsystem,
            quirks,
            deadzone,
            ready: false,
            bound: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether a controller is currently bound
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn deadzone(&self) -> u16 {
        self.deadzone
    }

    pub fn set_deadzone(&mut self, deadzone: u16) {
        self.deadzone = deadzone;
    }

    pub fn subsystem(&self) -> &S {
        &self.subsystem
    }

    pub fn subsystem_mut(&mut self) -> &mut S {
        &mut self.subsystem
    }

    /// Drop the bound controller if it has been unplugged
    fn release_detached(&mut self) {
        let detached = self
            .bound
            .as_ref()
            .is_some_and(|handle| !self.subsystem.is_attached(handle));

        if detached {
            if let Some(handle) = self.bound.take() {
                info!("🔌 Gamepad detached: {}", self.subsystem.controller_name(&handle));
                self.subsystem.close(handle);
            }
        }
    }

    /// Bind the first attached device recognized as a game controller
    fn bind_first_controller(&mut self) -> bool {
        for index in 0..self.subsystem.device_count() {
            if !self.subsystem.is_game_controller(index) {
                continue;
            }
            if let Some(handle) = self.subsystem.open(index) {
                info!(
                    "✅ Gamepad bound: {} (device {})",
                    self.subsystem.controller_name(&handle),
                    index
                );
                self.bound = Some(handle);
                return true;
            }
        }
        false
    }
}

impl<S: InputSubsystem> ControllerApi for GamepadBackend<S> {
    fn name(&self) -> &'static str {
        "gamepad"
    }

    fn init(&mut self, camera: &CameraInput) {
        for mapping in &self.quirks.mappings {
            if let Err(e) = self.subsystem.add_mapping(mapping) {
                warn!("Skipping controller mapping: {}", e);
            }
        }

        if let Err(e) = self.subsystem.init() {
            error!("Gamepad backend disabled: {}", e);
            return;
        }

        if camera.mouse_look {
            self.subsystem.set_relative_mouse_mode(true);
        }
        // Discard motion accumulated before the first poll
        self.subsystem.relative_mouse_state();

        self.ready = true;
        info!("Gamepad backend ready (deadzone {})", self.deadzone);
    }

    fn read(&mut self, pad: &mut ContPad, camera: &mut CameraInput) {
        if !self.ready {
            return;
        }

        self.subsystem.set_relative_mouse_mode(camera.mouse_look);
        self.subsystem.update();

        let mouse = self.subsystem.relative_mouse_state();
        camera.mouse_x = mouse.dx;
        camera.mouse_y = mouse.dy;
        pad.press(mouse_buttons_to_pad(mouse.buttons));

        self.release_detached();
        if self.bound.is_none() && !self.bind_first_controller() {
            return;
        }
        let Some(handle) = self.bound.as_ref() else {
            return;
        };

        for (button, mask) in BUTTON_MAP {
            if self.subsystem.button(handle, button) {
                pad.press(mask);
            }
        }

        let leftx = self.subsystem.axis(handle, PadAxis::LeftX);
        let mut lefty = self.subsystem.axis(handle, PadAxis::LeftY);
        let rightx = self.subsystem.axis(handle, PadAxis::RightX);
        let mut righty = self.subsystem.axis(handle, PadAxis::RightY);
        let ltrig = self.subsystem.axis(handle, PadAxis::TriggerLeft);
        let rtrig = self.subsystem.axis(handle, PadAxis::TriggerRight);

        if self.quirks.axis_overflow_fix {
            lefty = platform::fix_axis_overflow(lefty);
            righty = platform::fix_axis_overflow(righty);
        }

        camera.rightx = rightx;
        camera.righty = righty;

        pad.press(right_stick_cbuttons(rightx, righty));
        pad.press(trigger_buttons(ltrig, rtrig));

        apply_left_stick(pad, leftx, lefty, self.deadzone);
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.bound.take() {
            self.subsystem.close(handle);
        }
        if self.ready {
            debug!("Gamepad backend shut down");
        }
        self.ready = false;
    }

    fn apply_config(&mut self, config: &AppConfig) {
        if self.deadzone != config.input.deadzone {
            info!("Gamepad deadzone {} → {}", self.deadzone, config.input.deadzone);
            self.deadzone = config.input.deadzone;
        }
        self.quirks.axis_overflow_fix = config
            .input
            .axis_overflow_fix
            .unwrap_or_else(|| PlatformQuirks::current().axis_overflow_fix);
    }
}

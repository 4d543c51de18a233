//! GilRs-backed input subsystem
//!
//! Gamepads come from gilrs; relative mouse motion comes from a host-fed
//! [`MouseFeed`]. Axis values are converted to the SDL game-controller
//! convention expected by the pad mapping.
//!
//! gilrs' default event filters rescale sticks through their own deadzone and
//! drop small changes. They are disabled: the backend thresholds expect raw
//! readings, so only the hat-to-D-Pad conversion runs (see [`next_raw_event`]).

use gilrs::ev::filter::axis_dpad_to_button;
use gilrs::{
    Axis, Button, Event, EventType, Filter, GamepadId, Gilrs, GilrsBuilder, MappingSource,
};
use tracing::{debug, info};

use super::mouse::MouseFeed;
use super::subsystem::{
    validate_mapping, InputSubsystem, PadAxis, PadButton, RelativeMouseState, SubsystemError,
};

const AXIS_SCALE: f32 = 32767.0;

/// Scale a gilrs stick value (-1.0..=1.0) to a raw i16 axis
pub fn stick_to_raw(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * AXIS_SCALE) as i16
}

/// Scale a gilrs trigger value (0.0..=1.0) to the 0..=32767 trigger range
pub fn trigger_to_raw(value: f32) -> i16 {
    (value.clamp(0.0, 1.0) * AXIS_SCALE) as i16
}

/// gilrs builder options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Run gilrs' built-in dpad, jitter and deadzone filters
    pub default_filters: bool,
    /// Let gilrs apply events to its state on its own
    pub auto_update_state: bool,
}

/// Unfiltered axes; state is updated by [`next_raw_event`]
pub const RAW_OPTIONS: BuildOptions = BuildOptions {
    default_filters: false,
    auto_update_state: false,
};

impl BuildOptions {
    pub fn builder(self, mappings: &[String]) -> GilrsBuilder {
        let builder = GilrsBuilder::new()
            .with_default_filters(self.default_filters)
            .set_update_state(self.auto_update_state);

        mappings
            .iter()
            .fold(builder, |builder, mapping| builder.add_mappings(mapping))
    }
}

/// Pop the next event, converting hat D-Pads to buttons, and apply it to state
///
/// Dropped events are returned too, so callers drain until `None`.
pub fn next_raw_event(gilrs: &mut Gilrs) -> Option<Event> {
    let event = gilrs.next_event().filter_ev(&axis_dpad_to_button, gilrs)?;
    gilrs.update(&event);
    Some(event)
}

fn pad_button_to_gilrs(button: PadButton) -> Button {
    match button {
        PadButton::A => Button::South,
        PadButton::B => Button::East,
        PadButton::Start => Button::Start,
        PadButton::LeftShoulder => Button::LeftTrigger,
        PadButton::RightShoulder => Button::RightTrigger,
        PadButton::DPadUp => Button::DPadUp,
        PadButton::DPadDown => Button::DPadDown,
        PadButton::DPadLeft => Button::DPadLeft,
        PadButton::DPadRight => Button::DPadRight,
    }
}

/// Controller subsystem built on gilrs
pub struct GilrsSubsystem {
    gilrs: Option<Gilrs>,
    mappings: Vec<String>,
    mouse: MouseFeed,
}

impl GilrsSubsystem {
    pub fn new(mouse: MouseFeed) -> Self {
        Self {
            gilrs: None,
            mappings: Vec::new(),
            mouse,
        }
    }

    /// Connected gamepads in id order; positions are the device indices
    fn connected_ids(&self) -> Vec<GamepadId> {
        let mut ids: Vec<GamepadId> = match &self.gilrs {
            Some(gilrs) => gilrs.gamepads().map(|(id, _)| id).collect(),
            None => Vec::new(),
        };
        ids.sort_by_key(|id| usize::from(*id));
        ids
    }
}

impl InputSubsystem for GilrsSubsystem {
    type Handle = GamepadId;

    fn add_mapping(&mut self, mapping: &str) -> Result<(), SubsystemError> {
        if self.gilrs.is_some() {
            return Err(SubsystemError::Mapping(
                "mappings must be registered before init".to_string(),
            ));
        }
        validate_mapping(mapping)?;
        self.mappings.push(mapping.to_string());
        Ok(())
    }

    fn init(&mut self) -> Result<(), SubsystemError> {
        let gilrs = RAW_OPTIONS
            .builder(&self.mappings)
            .build()
            .map_err(|e| SubsystemError::Init(e.to_string()))?;

        info!("GilRs initialized ({} custom mapping(s))", self.mappings.len());
        self.gilrs = Some(gilrs);
        Ok(())
    }

    fn set_relative_mouse_mode(&mut self, enabled: bool) {
        self.mouse.set_relative_mode(enabled);
    }

    fn relative_mouse_state(&mut self) -> RelativeMouseState {
        self.mouse.take()
    }

    fn update(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };

        while let Some(Event { id, event, .. }) = next_raw_event(gilrs) {
            match event {
                EventType::Connected => debug!("Gamepad connected: {:?}", id),
                EventType::Disconnected => debug!("Gamepad disconnected: {:?}", id),
                _ => {},
            }
        }
        gilrs.inc();
    }

    fn device_count(&self) -> usize {
        self.connected_ids().len()
    }

    fn is_game_controller(&self, index: usize) -> bool {
        let (Some(gilrs), Some(id)) = (&self.gilrs, self.connected_ids().get(index).copied()) else {
            return false;
        };
        gilrs
            .connected_gamepad(id)
            .is_some_and(|gamepad| gamepad.mapping_source() != MappingSource::None)
    }

    fn open(&mut self, index: usize) -> Option<GamepadId> {
        self.connected_ids().get(index).copied()
    }

    fn is_attached(&self, handle: &GamepadId) -> bool {
        self.gilrs
            .as_ref()
            .is_some_and(|gilrs| gilrs.connected_gamepad(*handle).is_some())
    }

    fn close(&mut self, handle: GamepadId) {
        debug!("Released gamepad {:?}", handle);
    }

    fn controller_name(&self, handle: &GamepadId) -> String {
        self.gilrs
            .as_ref()
            .and_then(|gilrs| gilrs.connected_gamepad(*handle))
            .map(|gamepad| gamepad.name().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn button(&self, handle: &GamepadId, button: PadButton) -> bool {
        self.gilrs
            .as_ref()
            .and_then(|gilrs| gilrs.connected_gamepad(*handle))
            .is_some_and(|gamepad| gamepad.is_pressed(pad_button_to_gilrs(button)))
    }

    fn axis(&self, handle: &GamepadId, axis: PadAxis) -> i16 {
        let Some(gamepad) = self
            .gilrs
            .as_ref()
            .and_then(|gilrs| gilrs.connected_gamepad(*handle))
        else {
            return 0;
        };

        let trigger = |button: Button| {
            gamepad
                .button_data(button)
                .map_or(0, |data| trigger_to_raw(data.value()))
        };

        // gilrs reports stick Y positive when pushed up
        match axis {
            PadAxis::LeftX => stick_to_raw(gamepad.value(Axis::LeftStickX)),
            PadAxis::LeftY => stick_to_raw(-gamepad.value(Axis::LeftStickY)),
            PadAxis::RightX => stick_to_raw(gamepad.value(Axis::RightStickX)),
            PadAxis::RightY => stick_to_raw(-gamepad.value(Axis::RightStickY)),
            PadAxis::TriggerLeft => trigger(Button::LeftTrigger2),
            PadAxis::TriggerRight => trigger(Button::RightTrigger2),
        }
    }
}

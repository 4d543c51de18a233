//! Gamepad backend tests against a scripted subsystem

use super::*;
use crate::pad::buttons::*;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
struct FakeDevice {
    name: String,
    game_controller: bool,
    attached: bool,
    buttons: HashSet<PadButton>,
    axes: HashMap<PadAxis, i16>,
}

impl FakeDevice {
    fn controller(name: &str) -> Self {
        Self {
            name: name.to_string(),
            game_controller: true,
            attached: true,
            ..Default::default()
        }
    }

    fn joystick(name: &str) -> Self {
        Self {
            game_controller: false,
            ..Self::controller(name)
        }
    }
}

#[derive(Debug, Default)]
struct FakeSubsystem {
    fail_init: bool,
    initialized: bool,
    mappings: Vec<String>,
    relative_mode: Option<bool>,
    mouse: RelativeMouseState,
    mouse_queries: usize,
    updates: usize,
    devices: Vec<FakeDevice>,
    closed: Vec<usize>,
}

impl FakeSubsystem {
    fn with_devices(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    fn device_mut(&mut self, index: usize) -> &mut FakeDevice {
        &mut self.devices[index]
    }
}

impl InputSubsystem for FakeSubsystem {
    type Handle = usize;

    fn add_mapping(&mut self, mapping: &str) -> Result<(), SubsystemError> {
        subsystem::validate_mapping(mapping)?;
        self.mappings.push(mapping.to_string());
        Ok(())
    }

    fn init(&mut self) -> Result<(), SubsystemError> {
        if self.fail_init {
            return Err(SubsystemError::Init("no video device".to_string()));
        }
        self.initialized = true;
        Ok(())
    }

    fn set_relative_mouse_mode(&mut self, enabled: bool) {
        self.relative_mode = Some(enabled);
    }

    fn relative_mouse_state(&mut self) -> RelativeMouseState {
        self.mouse_queries += 1;
        let state = self.mouse;
        self.mouse.dx = 0;
        self.mouse.dy = 0;
        state
    }

    fn update(&mut self) {
        self.updates += 1;
    }

    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn is_game_controller(&self, index: usize) -> bool {
        let device = &self.devices[index];
        device.attached && device.game_controller
    }

    fn open(&mut self, index: usize) -> Option<usize> {
        Some(index)
    }

    fn is_attached(&self, handle: &usize) -> bool {
        self.devices[*handle].attached
    }

    fn close(&mut self, handle: usize) {
        self.closed.push(handle);
    }

    fn controller_name(&self, handle: &usize) -> String {
        self.devices[*handle].name.clone()
    }

    fn button(&self, handle: &usize, button: PadButton) -> bool {
        self.devices[*handle].buttons.contains(&button)
    }

    fn axis(&self, handle: &usize, axis: PadAxis) -> i16 {
        self.devices[*handle].axes.get(&axis).copied().unwrap_or(0)
    }
}

fn ready_backend(devices: Vec<FakeDevice>) -> GamepadBackend<FakeSubsystem> {
    let mut backend =
        GamepadBackend::new(FakeSubsystem::with_devices(devices), PlatformQuirks::none(), DEADZONE);
    backend.init(&CameraInput::default());
    assert!(backend.is_ready());
    backend
}

fn set_axes(backend: &mut GamepadBackend<FakeSubsystem>, axes: &[(PadAxis, i16)]) {
    let device = backend.subsystem_mut().device_mut(0);
    for (axis, value) in axes {
        device.axes.insert(*axis, *value);
    }
}

fn poll(backend: &mut GamepadBackend<FakeSubsystem>, pad: &mut ContPad, camera: &mut CameraInput) {
    backend.read(pad, camera);
}

#[test]
fn test_init_primes_mouse_and_honors_mouse_look() {
    let mut backend =
        GamepadBackend::new(FakeSubsystem::default(), PlatformQuirks::none(), DEADZONE);
    backend.subsystem_mut().mouse.dx = 500;

    backend.init(&CameraInput::new(true));

    assert!(backend.is_ready());
    assert!(backend.subsystem().initialized);
    assert_eq!(backend.subsystem().relative_mode, Some(true));
    assert_eq!(backend.subsystem().mouse_queries, 1);

    // The stale delta was consumed by init
    let mut pad = ContPad::default();
    let mut camera = CameraInput::new(true);
    poll(&mut backend, &mut pad, &mut camera);
    assert_eq!(camera.mouse_x, 0);
}

#[test]
fn test_init_leaves_mouse_mode_alone_without_mouse_look() {
    let backend = ready_backend(vec![]);
    assert_eq!(backend.subsystem().relative_mode, None);
}

#[test]
fn test_init_registers_platform_mappings() {
    let quirks = PlatformQuirks {
        mappings: vec![
            platform::SWITCH_CONTROLLER_MAPPING.to_string(),
            "garbage".to_string(),
        ],
        axis_overflow_fix: false,
    };
    let mut backend = GamepadBackend::new(FakeSubsystem::default(), quirks, DEADZONE);
    backend.init(&CameraInput::default());

    // The malformed mapping is skipped, init still succeeds
    assert!(backend.is_ready());
    assert_eq!(
        backend.subsystem().mappings,
        vec![platform::SWITCH_CONTROLLER_MAPPING.to_string()]
    );
}

#[test]
fn test_failed_init_makes_reads_no_ops() {
    let fake = FakeSubsystem {
        fail_init: true,
        mouse: RelativeMouseState { dx: 4, dy: 9, buttons: subsystem::mouse_mask::LEFT },
        devices: vec![FakeDevice::controller("Pad")],
        ..Default::default()
    };
    let mut backend = GamepadBackend::new(fake, PlatformQuirks::none(), DEADZONE);
    backend.init(&CameraInput::default());
    assert!(!backend.is_ready());
    assert!(!backend.subsystem().initialized);

    backend.subsystem_mut().device_mut(0).buttons.insert(PadButton::Start);
    backend.subsystem_mut().device_mut(0).axes.insert(PadAxis::RightX, 30000);

    let original_pad = ContPad { button: 0, stick_x: 12, stick_y: -7, errnum: 0 };
    let original_camera = CameraInput { rightx: 11, righty: -11, mouse_x: 1, mouse_y: 2, mouse_look: true };
    let mut pad = original_pad;
    let mut camera = original_camera;

    for _ in 0..5 {
        poll(&mut backend, &mut pad, &mut camera);
    }

    assert_eq!(pad, original_pad);
    assert_eq!(camera, original_camera);
    assert_eq!(backend.subsystem().updates, 0);
    assert!(!backend.is_bound());
}

#[test]
fn test_read_follows_runtime_mouse_look() {
    let mut backend = ready_backend(vec![]);
    let mut pad = ContPad::default();

    let mut camera = CameraInput::new(true);
    poll(&mut backend, &mut pad, &mut camera);
    assert_eq!(backend.subsystem().relative_mode, Some(true));

    camera.mouse_look = false;
    poll(&mut backend, &mut pad, &mut camera);
    assert_eq!(backend.subsystem().relative_mode, Some(false));
}

#[test]
fn test_mouse_buttons_without_controller() {
    let mut backend = ready_backend(vec![]);
    backend.subsystem_mut().mouse = RelativeMouseState {
        dx: -6,
        dy: 3,
        buttons: subsystem::mouse_mask::LEFT | subsystem::mouse_mask::MIDDLE,
    };

    let mut pad = ContPad::default();
    let mut camera = CameraInput::default();
    poll(&mut backend, &mut pad, &mut camera);

    assert_eq!(pad.button, B_BUTTON | Z_TRIG);
    assert_eq!((camera.mouse_x, camera.mouse_y), (-6, 3));
    assert!(!backend.is_bound());
    // Camera axes are untouched when nothing is bound
    assert_eq!((camera.rightx, camera.righty), (0, 0));
}

#[test]
fn test_mouse_right_button_is_a() {
    assert_eq!(mouse_buttons_to_pad(subsystem::mouse_mask::RIGHT), A_BUTTON);
    assert_eq!(mouse_buttons_to_pad(0), 0);
}

#[test]
fn test_left_mouse_button_sets_b_alongside_controller() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    backend.subsystem_mut().mouse.buttons = subsystem::mouse_mask::LEFT;
    backend.subsystem_mut().device_mut(0).buttons.insert(PadButton::A);

    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());

    assert_eq!(pad.button, A_BUTTON | B_BUTTON);
}

#[test]
fn test_digital_button_mapping() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    let cases = [
        (PadButton::Start, START_BUTTON),
        (PadButton::LeftShoulder, Z_TRIG),
        (PadButton::RightShoulder, R_TRIG),
        (PadButton::A, A_BUTTON),
        (PadButton::B, B_BUTTON),
        (PadButton::DPadLeft, L_CBUTTONS),
        (PadButton::DPadRight, R_CBUTTONS),
        (PadButton::DPadUp, U_CBUTTONS),
        (PadButton::DPadDown, D_CBUTTONS),
    ];

    for (button, expected) in cases {
        let device = backend.subsystem_mut().device_mut(0);
        device.buttons.clear();
        device.buttons.insert(button);

        let mut pad = ContPad::default();
        poll(&mut backend, &mut pad, &mut CameraInput::default());
        assert_eq!(pad.button, expected, "{:?}", button);
    }
}

#[test]
fn test_read_never_clears_existing_bits() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    backend.subsystem_mut().device_mut(0).buttons.insert(PadButton::Start);

    let mut pad = ContPad { button: L_TRIG | U_JPAD, ..Default::default() };
    poll(&mut backend, &mut pad, &mut CameraInput::default());

    assert_eq!(pad.button, L_TRIG | U_JPAD | START_BUTTON);
}

#[test]
fn test_binds_first_game_controller_in_index_order() {
    let mut backend = ready_backend(vec![
        FakeDevice::joystick("Flight Stick"),
        FakeDevice::controller("First Pad"),
        FakeDevice::controller("Second Pad"),
    ]);
    backend.subsystem_mut().device_mut(1).buttons.insert(PadButton::A);
    backend.subsystem_mut().device_mut(2).buttons.insert(PadButton::B);

    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());

    assert!(backend.is_bound());
    assert_eq!(pad.button, A_BUTTON);
}

#[test]
fn test_detach_rebinds_on_next_poll() {
    let mut backend = ready_backend(vec![
        FakeDevice::controller("First Pad"),
        FakeDevice::controller("Second Pad"),
    ]);
    backend.subsystem_mut().device_mut(0).buttons.insert(PadButton::A);
    backend.subsystem_mut().device_mut(1).buttons.insert(PadButton::B);

    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());
    assert_eq!(pad.button, A_BUTTON);

    backend.subsystem_mut().device_mut(0).attached = false;

    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());

    assert_eq!(backend.subsystem().closed, vec![0]);
    assert!(backend.is_bound());
    assert_eq!(pad.button, B_BUTTON);
}

#[test]
fn test_detach_without_replacement_unbinds() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());
    assert!(backend.is_bound());

    backend.subsystem_mut().device_mut(0).attached = false;
    backend.subsystem_mut().device_mut(0).buttons.insert(PadButton::Start);

    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());
    assert!(!backend.is_bound());
    assert_eq!(pad.button, 0);

    // Plugged back in
    backend.subsystem_mut().device_mut(0).attached = true;
    poll(&mut backend, &mut pad, &mut CameraInput::default());
    assert!(backend.is_bound());
    assert_eq!(pad.button, START_BUTTON);
}

#[test]
fn test_right_stick_published_every_poll() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    set_axes(&mut backend, &[(PadAxis::RightX, 100), (PadAxis::RightY, -200)]);

    let mut pad = ContPad::default();
    let mut camera = CameraInput::default();
    poll(&mut backend, &mut pad, &mut camera);

    assert_eq!((camera.rightx, camera.righty), (100, -200));
    assert_eq!(pad.button, 0);
}

#[test]
fn test_right_stick_cbutton_thresholds() {
    assert_eq!(right_stick_cbuttons(0x4001, 0), R_CBUTTONS);
    assert_eq!(right_stick_cbuttons(-0x4001, 0), L_CBUTTONS);
    assert_eq!(right_stick_cbuttons(0x4000, 0), 0);
    assert_eq!(right_stick_cbuttons(-0x4000, 0), 0);
    assert_eq!(right_stick_cbuttons(0, -0x4001), U_CBUTTONS);
    assert_eq!(right_stick_cbuttons(0, 0x4001), D_CBUTTONS);
    assert_eq!(right_stick_cbuttons(32767, -32768), R_CBUTTONS | U_CBUTTONS);
}

#[test]
fn test_trigger_thresholds() {
    assert_eq!(trigger_buttons(0, 7681), R_TRIG);
    assert_eq!(trigger_buttons(0, 7680), 0);
    assert_eq!(trigger_buttons(7681, 0), Z_TRIG);
    assert_eq!(trigger_buttons(7680, 7680), 0);
}

#[test]
fn test_triggers_through_read() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    set_axes(&mut backend, &[(PadAxis::TriggerRight, 7681), (PadAxis::TriggerLeft, 7680)]);

    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());
    assert_eq!(pad.button, R_TRIG);
}

#[test]
fn test_stick_inside_deadzone_keeps_previous_values() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    set_axes(&mut backend, &[(PadAxis::LeftX, 3000), (PadAxis::LeftY, -3000)]);

    let mut pad = ContPad { stick_x: 55, stick_y: -20, ..Default::default() };
    poll(&mut backend, &mut pad, &mut CameraInput::default());

    assert_eq!((pad.stick_x, pad.stick_y), (55, -20));
}

#[test]
fn test_stick_outside_deadzone_scales_and_inverts_y() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    set_axes(&mut backend, &[(PadAxis::LeftX, 12800), (PadAxis::LeftY, -25600)]);

    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());

    assert_eq!((pad.stick_x, pad.stick_y), (50, 100));
}

#[test]
fn test_stick_extremes() {
    let mut pad = ContPad::default();

    // Fully up: -(-32768) / 256 = 128, clamped to 127
    assert!(apply_left_stick(&mut pad, 0, -32768, DEADZONE));
    assert_eq!(pad.stick_y, 127);

    assert!(apply_left_stick(&mut pad, -32768, 32767, DEADZONE));
    assert_eq!((pad.stick_x, pad.stick_y), (-128, -127));

    assert!(apply_left_stick(&mut pad, -32768, -32768, DEADZONE));
    assert_eq!((pad.stick_x, pad.stick_y), (-128, 127));
}

#[test]
fn test_deadzone_boundary_is_exclusive() {
    let mut pad = ContPad::default();
    assert!(!apply_left_stick(&mut pad, DEADZONE as i16, 0, DEADZONE));
    assert!(apply_left_stick(&mut pad, DEADZONE as i16 + 1, 0, DEADZONE));
    assert_eq!(pad.stick_x, 19);
}

#[test]
fn test_deadzone_is_runtime_tunable() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    set_axes(&mut backend, &[(PadAxis::LeftX, 3000)]);

    let mut pad = ContPad::default();
    poll(&mut backend, &mut pad, &mut CameraInput::default());
    assert_eq!(pad.stick_x, 0);

    let mut config = AppConfig::default();
    config.input.deadzone = 1000;
    backend.apply_config(&config);
    assert_eq!(backend.deadzone(), 1000);

    poll(&mut backend, &mut pad, &mut CameraInput::default());
    assert_eq!(pad.stick_x, 11);
}

#[test]
fn test_axis_overflow_fix_applies_to_y_axes() {
    let quirks = PlatformQuirks { mappings: Vec::new(), axis_overflow_fix: true };
    let mut backend = GamepadBackend::new(
        FakeSubsystem::with_devices(vec![FakeDevice::controller("Browser Pad")]),
        quirks,
        DEADZONE,
    );
    backend.init(&CameraInput::default());
    set_axes(&mut backend, &[(PadAxis::LeftY, -32768), (PadAxis::RightY, -32768)]);

    let mut pad = ContPad::default();
    let mut camera = CameraInput::default();
    poll(&mut backend, &mut pad, &mut camera);

    assert_eq!(camera.righty, 32767);
    assert_eq!(pad.button & U_CBUTTONS, 0);
    assert_eq!(pad.button & D_CBUTTONS, D_CBUTTONS);
    assert_eq!(pad.stick_y, -127);
}

#[test]
fn test_axis_overflow_fix_off_keeps_sentinel() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    set_axes(&mut backend, &[(PadAxis::RightY, -32768)]);

    let mut camera = CameraInput::default();
    poll(&mut backend, &mut ContPad::default(), &mut camera);
    assert_eq!(camera.righty, -32768);
}

#[test]
fn test_shutdown_releases_controller() {
    let mut backend = ready_backend(vec![FakeDevice::controller("Pad")]);
    poll(&mut backend, &mut ContPad::default(), &mut CameraInput::default());
    assert!(backend.is_bound());

    backend.shutdown();
    assert!(!backend.is_ready());
    assert!(!backend.is_bound());
    assert_eq!(backend.subsystem().closed, vec![0]);

    let updates = backend.subsystem().updates;
    poll(&mut backend, &mut ContPad::default(), &mut CameraInput::default());
    assert_eq!(backend.subsystem().updates, updates);
}

proptest! {
    #[test]
    fn prop_deadzone_leaves_stick_untouched(
        x in -4960i16..=4960,
        y in -4960i16..=4960,
        sx in any::<i8>(),
        sy in any::<i8>(),
    ) {
        let inside = i32::from(x) * i32::from(x) + i32::from(y) * i32::from(y)
            <= i32::from(DEADZONE) * i32::from(DEADZONE);
        prop_assume!(inside);

        let mut pad = ContPad { stick_x: sx, stick_y: sy, ..Default::default() };
        prop_assert!(!apply_left_stick(&mut pad, x, y, DEADZONE));
        prop_assert_eq!((pad.stick_x, pad.stick_y), (sx, sy));
    }

    #[test]
    fn prop_outside_deadzone_scales(x in any::<i16>(), y in any::<i16>()) {
        let magnitude_sq = (i64::from(x) * i64::from(x)) + (i64::from(y) * i64::from(y));
        prop_assume!(magnitude_sq > i64::from(DEADZONE) * i64::from(DEADZONE));

        let mut pad = ContPad::default();
        prop_assert!(apply_left_stick(&mut pad, x, y, DEADZONE));
        prop_assert_eq!(i32::from(pad.stick_x), i32::from(x) / 256);
        prop_assert_eq!(i32::from(pad.stick_y), (-i32::from(y) / 256).min(127));
    }

    #[test]
    fn prop_cbuttons_only_past_threshold(x in -0x4000i16..=0x4000, y in -0x4000i16..=0x4000) {
        prop_assert_eq!(right_stick_cbuttons(x, y), 0);
    }
}

//! Controller and mouse subsystem seam
//!
//! Everything the gamepad backend needs from a native input library, phrased
//! in the SDL game-controller vocabulary the pad mapping was written against:
//! axes are raw `i16`, stick Y is positive when pushed down, triggers run
//! 0..=32767.

/// Relative mouse button bits reported by [`RelativeMouseState::buttons`]
pub mod mouse_mask {
    pub const LEFT: u32 = 1 << 0;
    pub const MIDDLE: u32 = 1 << 1;
    pub const RIGHT: u32 = 1 << 2;
}

/// Digital controller buttons the pad mapping reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    A,
    B,
    Start,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

/// Analog controller axes the pad mapping reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

/// Mouse motion since the previous query plus the held button mask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelativeMouseState {
    pub dx: i32,
    pub dy: i32,
    pub buttons: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum SubsystemError {
    #[error("input subsystem initialization failed: {0}")]
    Init(String),

    #[error("invalid controller mapping: {0}")]
    Mapping(String),
}

/// Native controller/mouse library as seen by the gamepad backend
pub trait InputSubsystem {
    /// Handle to an opened controller
    type Handle;

    /// Register an SDL-format mapping string; only valid before [`init`](Self::init)
    fn add_mapping(&mut self, mapping: &str) -> Result<(), SubsystemError>;

    fn init(&mut self) -> Result<(), SubsystemError>;

    fn set_relative_mouse_mode(&mut self, enabled: bool);

    /// Motion accumulated since the last call; resets the accumulator
    fn relative_mouse_state(&mut self) -> RelativeMouseState;

    /// Refresh cached controller state
    fn update(&mut self);

    /// Number of joystick-like devices, indexed `0..device_count()`
    fn device_count(&self) -> usize;

    fn is_game_controller(&self, index: usize) -> bool;

    fn open(&mut self, index: usize) -> Option<Self::Handle>;

    fn is_attached(&self, handle: &Self::Handle) -> bool;

    fn close(&mut self, handle: Self::Handle);

    fn controller_name(&self, handle: &Self::Handle) -> String;

    fn button(&self, handle: &Self::Handle, button: PadButton) -> bool;

    fn axis(&self, handle: &Self::Handle, axis: PadAxis) -> i16;
}

/// Check the `GUID,name,bindings...` shape of an SDL mapping string
pub fn validate_mapping(mapping: &str) -> Result<(), SubsystemError> {
    let mut fields = mapping.split(',');
    let guid = fields.next().unwrap_or_default();
    let name = fields.next().unwrap_or_default();

    if guid.len() != 32 || !guid.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SubsystemError::Mapping(format!(
            "GUID '{}' must be 32 hex digits",
            guid
        )));
    }
    if name.is_empty() {
        return Err(SubsystemError::Mapping("missing controller name".to_string()));
    }
    if fields.all(|binding| binding.is_empty()) {
        return Err(SubsystemError::Mapping(format!("'{}' has no bindings", name)));
    }

    Ok(())
}

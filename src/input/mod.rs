//! Input backends and the per-frame controller entry point
//!
//! Each backend implements [`ControllerApi`]. A [`ControllerSet`] owns the
//! backends selected at startup; every frame it clears the pad record and
//! lets each backend OR its contribution in, in registration order.

pub mod gamepad;
pub mod keyboard;
pub mod null;

use tracing::{debug, info};

use crate::camera::CameraInput;
use crate::config::{AppConfig, BackendKind};
use crate::pad::ContPad;

use gamepad::{GamepadBackend, GilrsSubsystem, MouseFeed, PlatformQuirks};
use keyboard::{KeyBindings, KeyFeed, KeyboardBackend};
use null::NullBackend;

/// An input backend feeding the legacy pad record
pub trait ControllerApi {
    fn name(&self) -> &'static str;

    /// Bring the backend up; failures are logged and leave the backend inert
    fn init(&mut self, camera: &CameraInput);

    /// OR this frame's input into `pad` and publish camera axes
    fn read(&mut self, pad: &mut ContPad, camera: &mut CameraInput);

    fn shutdown(&mut self) {}

    /// Pick up runtime-tunable settings after a config reload
    fn apply_config(&mut self, _config: &AppConfig) {}
}

/// Host-side handles for feeding window events to the backends
#[derive(Debug, Clone, Default)]
pub struct InputFeeds {
    pub mouse: MouseFeed,
    pub keys: KeyFeed,
}

impl InputFeeds {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            mouse: MouseFeed::new(),
            keys: KeyFeed::new(KeyBindings::from_config(&config.keyboard)),
        }
    }
}

/// Ordered set of backends read every frame
#[derive(Default)]
pub struct ControllerSet {
    backends: Vec<Box<dyn ControllerApi>>,
}

impl ControllerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the configured backends, wired to the given host feeds
    pub fn from_config(config: &AppConfig, feeds: &InputFeeds) -> Self {
        let mut set = Self::new();

        for kind in &config.input.backends {
            let backend: Box<dyn ControllerApi> = match kind {
                BackendKind::Gamepad => Box::new(GamepadBackend::new(
                    GilrsSubsystem::new(feeds.mouse.clone()),
                    PlatformQuirks::from_config(&config.input),
                    config.input.deadzone,
                )),
                BackendKind::Keyboard => Box::new(KeyboardBackend::new(feeds.keys.clone())),
                BackendKind::Null => Box::new(NullBackend),
            };
            set.push(backend);
        }

        set
    }

    pub fn push(&mut self, backend: Box<dyn ControllerApi>) {
        debug!("Registered input backend: {}", backend.name());
        self.backends.push(backend);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn init(&mut self, camera: &CameraInput) {
        for backend in &mut self.backends {
            backend.init(camera);
        }
        info!("Input backends initialized: {}", self.names().join(", "));
    }

    /// Collect one frame of input into a cleared pad
    pub fn read(&mut self, pad: &mut ContPad, camera: &mut CameraInput) {
        pad.reset();
        for backend in &mut self.backends {
            backend.read(pad, camera);
        }
    }

    pub fn apply_config(&mut self, config: &AppConfig) {
        for backend in &mut self.backends {
            backend.apply_config(config);
        }
    }

    pub fn shutdown(&mut self) {
        for backend in &mut self.backends {
            backend.shutdown();
        }
        info!("Input backends shut down");
    }
}

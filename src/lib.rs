//! contpad - gamepad and mouse adapter for a fixed-layout legacy controller pad
//!
//! Polls game controllers (via gilrs), relative mouse motion and keyboard
//! state once per frame and folds them into a [`ContPad`] record, publishing
//! raw right-stick and mouse values to a caller-owned [`CameraInput`].

pub mod camera;
pub mod config;
pub mod input;
pub mod monitor;
pub mod pad;

pub use camera::CameraInput;
pub use config::AppConfig;
pub use input::{ControllerApi, ControllerSet, InputFeeds};
pub use pad::ContPad;

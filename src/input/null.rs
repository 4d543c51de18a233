//! Backend that contributes nothing

use crate::camera::CameraInput;
use crate::input::ControllerApi;
use crate::pad::ContPad;

#[derive(Debug, Default)]
pub struct NullBackend;

impl ControllerApi for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn init(&mut self, _camera: &CameraInput) {}

    fn read(&mut self, _pad: &mut ContPad, _camera: &mut CameraInput) {}
}

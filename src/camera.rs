//! Camera input shared between the input backends and the camera module
//!
//! The caller owns one `CameraInput` and hands it to both the input backends
//! (which write the raw right stick and mouse delta) and the camera logic
//! (which reads them). Nothing here is global.

/// Raw camera-axis values published every poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraInput {
    /// Right stick X, raw i16 (negative = left)
    pub rightx: i16,
    /// Right stick Y, raw i16 (negative = up)
    pub righty: i16,
    /// Relative mouse motion since the previous poll
    pub mouse_x: i32,
    pub mouse_y: i32,
    /// Mouse drives the camera (relative mouse mode)
    pub mouse_look: bool,
}

impl CameraInput {
    pub fn new(mouse_look: bool) -> Self {
        Self {
            mouse_look,
            ..Default::default()
        }
    }
}

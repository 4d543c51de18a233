//! One-line rendering of a polled frame for the terminal monitor

use colored::*;

use crate::camera::CameraInput;
use crate::pad::ContPad;

/// Render pad and camera state, e.g. `[A Z] stick(-12, 127) cam(0, -4000) mouse(3, 0)`
pub fn format_frame(pad: &ContPad, camera: &CameraInput) -> String {
    let labels = pad.pressed_labels();
    let buttons = if labels.is_empty() {
        "[-]".dimmed().to_string()
    } else {
        format!("[{}]", labels.join(" ")).green().bold().to_string()
    };

    let mut line = format!(
        "{} stick({}, {}) cam({}, {})",
        buttons, pad.stick_x, pad.stick_y, camera.rightx, camera.righty
    );

    if camera.mouse_look || camera.mouse_x != 0 || camera.mouse_y != 0 {
        line.push_str(&format!(" mouse({}, {})", camera.mouse_x, camera.mouse_y).cyan().to_string());
    }

    line
}

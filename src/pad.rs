//! Legacy controller pad record
//!
//! Fixed-layout record the game engine reads once per frame: a 16-bit
//! digital button mask and two signed 8-bit stick axes.

/// Digital button bits of [`ContPad::button`]
pub mod buttons {
    pub const A_BUTTON: u16 = 0x8000;
    pub const B_BUTTON: u16 = 0x4000;
    pub const Z_TRIG: u16 = 0x2000;
    pub const START_BUTTON: u16 = 0x1000;
    pub const U_JPAD: u16 = 0x0800;
    pub const D_JPAD: u16 = 0x0400;
    pub const L_JPAD: u16 = 0x0200;
    pub const R_JPAD: u16 = 0x0100;
    pub const L_TRIG: u16 = 0x0020;
    pub const R_TRIG: u16 = 0x0010;
    pub const U_CBUTTONS: u16 = 0x0008;
    pub const D_CBUTTONS: u16 = 0x0004;
    pub const L_CBUTTONS: u16 = 0x0002;
    pub const R_CBUTTONS: u16 = 0x0001;

    /// Every named bit with its short label, in mask order
    pub const ALL: [(u16, &str); 14] = [
        (A_BUTTON, "A"),
        (B_BUTTON, "B"),
        (Z_TRIG, "Z"),
        (START_BUTTON, "START"),
        (U_JPAD, "D-UP"),
        (D_JPAD, "D-DOWN"),
        (L_JPAD, "D-LEFT"),
        (R_JPAD, "D-RIGHT"),
        (L_TRIG, "L"),
        (R_TRIG, "R"),
        (U_CBUTTONS, "C-UP"),
        (D_CBUTTONS, "C-DOWN"),
        (L_CBUTTONS, "C-LEFT"),
        (R_CBUTTONS, "C-RIGHT"),
    ];
}

/// Controller pad record owned by the caller and filled by input backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContPad {
    pub button: u16,
    pub stick_x: i8,
    pub stick_y: i8,
    pub errnum: u8,
}

impl ContPad {
    /// Clear all inputs before a new frame is collected
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// OR one or more button bits into the mask
    pub fn press(&mut self, mask: u16) {
        self.button |= mask;
    }

    pub fn is_pressed(&self, mask: u16) -> bool {
        self.button & mask == mask
    }

    /// Labels of every pressed button, in mask order
    pub fn pressed_labels(&self) -> Vec<&'static str> {
        buttons::ALL
            .iter()
            .filter(|(bit, _)| self.button & bit != 0)
            .map(|(_, label)| *label)
            .collect()
    }
}

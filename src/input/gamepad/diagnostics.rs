//! Gamepad diagnostics for troubleshooting detection and mapping issues

use gilrs::{Axis, Button, Event, EventType, MappingSource};
use std::thread;
use std::time::Duration;
use tracing::info;

use super::gilrs_subsystem::{next_raw_event, RAW_OPTIONS};
use super::platform::PlatformQuirks;

/// Print every detected gamepad and whether the adapter would bind it
///
/// Devices without a controller mapping are listed but never bound; the
/// output includes the GUID needed to write a mapping for them.
pub fn print_gamepad_diagnostics(quirks: &PlatformQuirks) {
    info!("=== Gamepad Diagnostics ===");
    info!("Platform: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    info!("Axis overflow fix: {}", if quirks.axis_overflow_fix { "on" } else { "off" });
    info!("Custom mappings: {}", quirks.mappings.len());

    // Same unfiltered setup as the backend, so the axes shown are what it reads
    let mut gilrs = match RAW_OPTIONS.builder(&quirks.mappings).build() {
        Ok(g) => {
            info!("✅ gilrs initialized successfully");
            g
        },
        Err(e) => {
            info!("❌ Failed to initialize GilRs: {}", e);
            info!("This may indicate missing system libraries or permissions issues.");
            return;
        },
    };

    info!("⏳ Waiting for gamepads to connect (3 seconds)...");

    let start = std::time::Instant::now();
    let wait_duration = Duration::from_secs(3);

    while start.elapsed() < wait_duration {
        while let Some(Event { event, .. }) = next_raw_event(&mut gilrs) {
            match event {
                EventType::Connected => info!("   📶 Gamepad connection detected..."),
                EventType::Disconnected => info!("   📵 Gamepad disconnection detected..."),
                _ => {},
            }
        }
        thread::sleep(Duration::from_millis(100));
    }

    let mut gamepads: Vec<_> = gilrs.gamepads().collect();
    gamepads.sort_by_key(|(id, _)| usize::from(*id));

    if gamepads.is_empty() {
        info!("⚠️  No gamepads detected");
        info!("   Please check the device is connected and readable by this user");
        return;
    }

    info!("✅ Found {} gamepad(s):", gamepads.len());

    let mut would_bind = None;
    for (index, (id, gamepad)) in gamepads.iter().enumerate() {
        let mapped = gamepad.mapping_source() != MappingSource::None;
        if mapped && would_bind.is_none() {
            would_bind = Some(index);
        }

        info!("📋 Device {} (gilrs {:?})", index, id);
        info!("   Name: \"{}\"", gamepad.name());
        info!("   Mapping source: {:?}", gamepad.mapping_source());
        info!("   GUID: {}", guid_hex(&gamepad.uuid()));

        let pressed: Vec<String> = [
            Button::South,
            Button::East,
            Button::Start,
            Button::LeftTrigger,
            Button::RightTrigger,
            Button::DPadUp,
            Button::DPadDown,
            Button::DPadLeft,
            Button::DPadRight,
        ]
        .iter()
        .filter(|button| gamepad.is_pressed(**button))
        .map(|button| format!("{:?}", button))
        .collect();
        if pressed.is_empty() {
            info!("   Buttons: (none pressed)");
        } else {
            info!("   Buttons: {}", pressed.join(", "));
        }

        for axis in [Axis::LeftStickX, Axis::LeftStickY, Axis::RightStickX, Axis::RightStickY] {
            let value = gamepad.value(axis);
            if value.abs() > 0.01 {
                info!("   {:?}: {:.3}", axis, value);
            }
        }
    }

    match would_bind {
        Some(index) => info!("🎮 The adapter would bind device {}", index),
        None => info!("⚠️  No device has a controller mapping; add one under input.mappings"),
    }
    info!("=== End Diagnostics ===");
}

/// SDL-style GUID string (32 lowercase hex digits)
pub fn guid_hex(uuid: &[u8; 16]) -> String {
    uuid.iter().map(|b| format!("{:02x}", b)).collect()
}

use cpal::traits::{DeviceTrait, HostTrait};

/// An input device as the settings page shows it. `id` is the position in
/// the host's input device list, which is what the controller stores.
#[derive(Clone, Debug, PartialEq)]
pub struct InputDevice {
    pub id: i32,
    pub name: String,
}

pub fn list_input_devices() -> Vec<InputDevice> {
    let host = cpal::default_host();
    match host.input_devices() {
        Ok(devices) => devices
            .enumerate()
            .map(|(i, d)| InputDevice { id: i as i32, name: device_name(&d) })
            .collect(),
        Err(e) => {
            log::warn!(target: "audio", "could not enumerate input devices: {e}");
            Vec::new()
        }
    }
}

/// Resolve a stored device id. -1, or an id that no longer exists, falls
/// back to the system default input.
pub(super) fn input_device(host: &cpal::Host, device_id: i32) -> Option<cpal::Device> {
    if device_id >= 0 {
        let found = host
            .input_devices()
            .ok()
            .and_then(|mut devices| devices.nth(device_id as usize));
        if found.is_some() {
            return found;
        }
        log::warn!(target: "audio", "input device {device_id} not found, using system default");
    }
    host.default_input_device()
}

#[allow(deprecated)]
pub(super) fn device_name(device: &cpal::Device) -> String {
    device.name().unwrap_or_else(|_| "unknown device".to_string())
}

/// Label for a stored id given the current device list.
pub fn describe(devices: &[InputDevice], device_id: i32) -> String {
    if device_id < 0 {
        return "System default".to_string();
    }
    devices
        .iter()
        .find(|d| d.id == device_id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| format!("Device #{device_id} (missing)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_handles_default_known_and_missing() {
        let devices = vec![
            InputDevice { id: 0, name: "Built-in Mic".into() },
            InputDevice { id: 1, name: "USB Headset".into() },
        ];
        assert_eq!(describe(&devices, -1), "System default");
        assert_eq!(describe(&devices, 1), "USB Headset");
        assert_eq!(describe(&devices, 4), "Device #4 (missing)");
    }
}

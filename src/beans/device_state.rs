use std::fmt;

/// `adb get-state` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Bootloader,
    Recovery,
    Sideload,
    Unknown(String),
}

impl DeviceState {
    pub fn parse(output: &str) -> DeviceState {
        match output.trim() {
            "device" => DeviceState::Device,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            "bootloader" => DeviceState::Bootloader,
            "recovery" => DeviceState::Recovery,
            "sideload" => DeviceState::Sideload,
            other => DeviceState::Unknown(other.to_string()),
        }
    }

    pub fn is_online(&self) -> bool {
        *self == DeviceState::Device
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Device => f.write_str("device"),
            DeviceState::Offline => f.write_str("offline"),
            DeviceState::Unauthorized => f.write_str("unauthorized"),
            DeviceState::Bootloader => f.write_str("bootloader"),
            DeviceState::Recovery => f.write_str("recovery"),
            DeviceState::Sideload => f.write_str("sideload"),
            DeviceState::Unknown(state) => f.write_str(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert!(DeviceState::parse("device\n").is_online());
        assert_eq!(DeviceState::parse("offline"), DeviceState::Offline);
        assert_eq!(
            DeviceState::parse("connecting"),
            DeviceState::Unknown("connecting".to_string())
        );
    }
}

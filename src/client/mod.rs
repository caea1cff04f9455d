pub mod adb_device;
pub mod apex;
pub mod device_config;
pub mod parse;
pub mod transfer;

pub use adb_device::{AdbDevice, ApkInstallOptions, ForwardGuard};
pub use apex::ApexInstallStage;
pub use device_config::DeviceConfig;

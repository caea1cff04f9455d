pub mod beans;
pub mod bridge;
pub mod client;
pub mod errors;
pub mod utils;

pub use beans::{
    AdbCommand, AndroidIntent, DeviceState, DiskSpace, FilesType, InstallPaths, PackageInfo,
};
pub use bridge::{AdbBridge, BridgeConfig, ProcessBridge};
pub use client::{AdbDevice, ApexInstallStage, ApkInstallOptions, DeviceConfig, ForwardGuard};
pub use errors::{AdbError, AdbResult, InstallError, InstallResult, RebootCause};
pub use utils::{adb_path, init_logger};

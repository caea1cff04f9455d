pub(crate) mod command;
pub(crate) mod device_state;
pub(crate) mod disk_space;
pub(crate) mod files_type;
pub(crate) mod intent;
pub(crate) mod package_info;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use command::AdbCommand;
pub use device_state::DeviceState;
pub use disk_space::DiskSpace;
pub use files_type::FilesType;
pub use intent::AndroidIntent;
pub use package_info::PackageInfo;

/// 设备上的目标路径 -> 本地源文件路径
pub type InstallPaths = BTreeMap<PathBuf, PathBuf>;

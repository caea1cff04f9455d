pub mod bridge_config;
pub mod process_bridge;

pub use bridge_config::BridgeConfig;
pub use process_bridge::ProcessBridge;

use crate::beans::AdbCommand;
use crate::errors::AdbResult;

/// 执行 adb 命令的能力.
///
/// `shell` 为 true 时命令在设备端 shell 中执行 (`adb -s <serial> shell <line>`),
/// 否则作为 adb 子命令执行 (`adb -s <serial> <args>`).
/// 命令以非零状态退出时返回 [`AdbError::CommandFailed`](crate::errors::AdbError::CommandFailed),
/// 除非 `ignore_failure` 为 true, 此时照常返回输出.
/// 返回的输出已去掉首尾空白.
pub trait AdbBridge {
    fn execute(
        &self,
        serial: &str,
        command: &AdbCommand,
        shell: bool,
        ignore_failure: bool,
    ) -> AdbResult<String>;

    /// 把应用设置为等待调试器的 `am` 命令
    fn am_set_debug_app_command(&self, package_name: &str) -> String {
        format!("am set-debug-app -w --persistent {}", package_name)
    }
}

impl<T: AdbBridge + ?Sized> AdbBridge for &T {
    fn execute(
        &self,
        serial: &str,
        command: &AdbCommand,
        shell: bool,
        ignore_failure: bool,
    ) -> AdbResult<String> {
        (**self).execute(serial, command, shell, ignore_failure)
    }

    fn am_set_debug_app_command(&self, package_name: &str) -> String {
        (**self).am_set_debug_app_command(package_name)
    }
}

impl<T: AdbBridge + ?Sized> AdbBridge for Box<T> {
    fn execute(
        &self,
        serial: &str,
        command: &AdbCommand,
        shell: bool,
        ignore_failure: bool,
    ) -> AdbResult<String> {
        (**self).execute(serial, command, shell, ignore_failure)
    }

    fn am_set_debug_app_command(&self, package_name: &str) -> String {
        (**self).am_set_debug_app_command(package_name)
    }
}

use crate::errors::{AdbError, AdbResult};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use which::which;

#[cfg(windows)]
const ADB_EXECUTE_FILE_NAME: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_EXECUTE_FILE_NAME: &str = "adb";

const EXODEVICE_ADB_PATH: &str = "EXODEVICE_ADB_PATH";

/// 查找 adb: 优先使用环境变量 `EXODEVICE_ADB_PATH`, 其次在 PATH 中查找
pub fn adb_path() -> AdbResult<PathBuf> {
    if let Ok(path) = std::env::var(EXODEVICE_ADB_PATH) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    which(ADB_EXECUTE_FILE_NAME).map_err(|e| AdbError::adb_not_found(e.to_string()))
}

/// 初始化日志输出, 重复调用不会报错
pub fn init_logger(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// 传输速率 (kB/s), 耗时为零时返回 0
pub fn transfer_rate_kbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    (bytes as f64 / 1024.0) / secs
}

use crate::errors::AdbResult;
use crate::utils::adb_path;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ADB_TIMEOUT: u64 = 300;

///
/// adb 可执行文件相关配置
/// adb_path: adb 路径, 为空时从环境变量或 PATH 中查找
/// timeout: 单条命令的超时时间 (秒), 默认值 300
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub adb_path: Option<PathBuf>,
    pub timeout: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            adb_path: None,
            timeout: DEFAULT_ADB_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    pub fn new<P: Into<PathBuf>>(adb_path: Option<P>, timeout: Option<u64>) -> Self {
        Self {
            adb_path: adb_path.map(Into::into),
            timeout: timeout.unwrap_or(DEFAULT_ADB_TIMEOUT),
        }
    }

    ///
    /// 设置超时时间
    pub fn set_timeout(&mut self, timeout: u64) {
        self.timeout = timeout;
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// 解析实际使用的 adb 路径
    pub fn resolve_adb_path(&self) -> AdbResult<PathBuf> {
        match &self.adb_path {
            Some(path) => Ok(path.clone()),
            None => adb_path(),
        }
    }
}

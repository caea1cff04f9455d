use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DEVICE_TMP_DIR: &str = "/data/local/tmp";
const DEFAULT_EXOPACKAGE_INSTALL_ROOT: &str = "/data/local/tmp/exopackage";
const DEFAULT_ROOT_POLL_ATTEMPTS: u32 = 3;
const DEFAULT_ROOT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_PUSH_COMPRESSION: &str = "brotli";

///
/// 设备会话相关配置
/// device_tmp_dir: 设备上的临时目录, 默认值 /data/local/tmp
/// exopackage_install_root: exopackage 文件在设备上的根目录
/// root_poll_attempts / root_poll_interval: `adb root` 之后等待 adbd 以 root 身份恢复的轮询次数与间隔
/// push_compression: `adb push -z` 使用的压缩算法, None 表示不压缩
/// local_tmp_dir: 本地临时文件所在目录, None 表示使用系统临时目录
#[derive(Clone, Debug)]
pub struct DeviceConfig {
    pub device_tmp_dir: String,
    pub exopackage_install_root: String,
    pub root_poll_attempts: u32,
    pub root_poll_interval: Duration,
    pub push_compression: Option<String>,
    pub local_tmp_dir: Option<PathBuf>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            device_tmp_dir: DEFAULT_DEVICE_TMP_DIR.to_string(),
            exopackage_install_root: DEFAULT_EXOPACKAGE_INSTALL_ROOT.to_string(),
            root_poll_attempts: DEFAULT_ROOT_POLL_ATTEMPTS,
            root_poll_interval: DEFAULT_ROOT_POLL_INTERVAL,
            push_compression: Some(DEFAULT_PUSH_COMPRESSION.to_string()),
            local_tmp_dir: None,
        }
    }
}

impl DeviceConfig {
    pub fn with_device_tmp_dir(mut self, dir: &str) -> Self {
        self.device_tmp_dir = dir.trim_end_matches('/').to_string();
        self
    }

    pub fn with_exopackage_install_root(mut self, root: &str) -> Self {
        self.exopackage_install_root = root.trim_end_matches('/').to_string();
        self
    }

    pub fn with_root_poll(mut self, attempts: u32, interval: Duration) -> Self {
        self.root_poll_attempts = attempts.max(1);
        self.root_poll_interval = interval;
        self
    }

    pub fn with_push_compression(mut self, compression: Option<&str>) -> Self {
        self.push_compression = compression.map(str::to_string);
        self
    }

    pub fn with_local_tmp_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.local_tmp_dir = Some(dir.into());
        self
    }

    /// 设备临时目录下的路径
    pub fn device_tmp_path(&self, name: &str) -> String {
        format!("{}/{}", self.device_tmp_dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.device_tmp_path("x.txt"), "/data/local/tmp/x.txt");
        assert_eq!(cfg.root_poll_attempts, 3);
        assert_eq!(cfg.push_compression.as_deref(), Some("brotli"));
    }

    #[test]
    fn test_builders() {
        let cfg = DeviceConfig::default()
            .with_device_tmp_dir("/sdcard/tmp/")
            .with_root_poll(0, Duration::ZERO)
            .with_push_compression(None);
        assert_eq!(cfg.device_tmp_path("a"), "/sdcard/tmp/a");
        assert_eq!(cfg.root_poll_attempts, 1);
        assert!(cfg.push_compression.is_none());
    }
}

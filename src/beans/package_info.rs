/// `pm path` 查询得到的包信息, 目前只有 `apk_path` 会被填充.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub apk_path: String,
    pub native_lib_path: String,
    pub version_code: String,
}

impl PackageInfo {
    pub fn new(apk_path: &str) -> PackageInfo {
        Self {
            apk_path: apk_path.to_string(),
            native_lib_path: "".to_string(),
            version_code: "".to_string(),
        }
    }

    /// 从 `pm path <pkg>` 的输出构造, 去掉 `package:` 前缀
    pub fn from_pm_path(output: &str) -> PackageInfo {
        let path = output.trim();
        Self::new(path.strip_prefix("package:").unwrap_or(path))
    }
}

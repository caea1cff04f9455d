use std::fmt;

const PLACEHOLDER: &str = "_";

/// `df -h /data` 报告的容量, 字段保持 df 的原始格式 (例如 `5.8G`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSpace {
    pub size: String,
    pub used: String,
    pub available: String,
}

impl DiskSpace {
    pub fn new(size: &str, used: &str, available: &str) -> DiskSpace {
        DiskSpace {
            size: size.to_string(),
            used: used.to_string(),
            available: available.to_string(),
        }
    }

    /// 查询失败时使用的占位值
    pub fn placeholder() -> DiskSpace {
        Self::new(PLACEHOLDER, PLACEHOLDER, PLACEHOLDER)
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }

    pub fn to_vec(&self) -> Vec<String> {
        vec![self.size.clone(), self.used.clone(), self.available.clone()]
    }
}

impl fmt::Display for DiskSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size={} used={} available={}",
            self.size, self.used, self.available
        )
    }
}

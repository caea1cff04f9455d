use std::fmt;
use std::str::FromStr;

/// 需要推送到设备上的文件种类.
///
/// 前三种会按目标目录打包成一个临时目录一次性推送, 其余种类逐个文件推送.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilesType {
    SecondaryDex,
    NativeLibrary,
    Resources,
    Other(String),
}

impl FilesType {
    pub fn is_batched(&self) -> bool {
        !matches!(self, FilesType::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilesType::SecondaryDex => "secondary_dex",
            FilesType::NativeLibrary => "native_library",
            FilesType::Resources => "resources",
            FilesType::Other(name) => name,
        }
    }
}

impl FromStr for FilesType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "secondary_dex" => FilesType::SecondaryDex,
            "native_library" => FilesType::NativeLibrary,
            "resources" => FilesType::Resources,
            other => FilesType::Other(other.to_string()),
        })
    }
}

impl From<&str> for FilesType {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(files_type) => files_type,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for FilesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

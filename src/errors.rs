use std::fmt;
use thiserror::Error;

/// adb 桥接层可能出现的错误类型
#[derive(Error, Debug)]
pub enum AdbError {
    /// 找不到 adb 可执行文件
    #[error("adb not found: {message}")]
    AdbNotFound { message: String },

    /// 命令以非零状态退出
    #[error("Command execution failed: {command}, reason: {reason}")]
    CommandFailed { command: String, reason: String },

    /// 超时错误
    #[error("Command timed out after {seconds} seconds: {command}")]
    Timeout { command: String, seconds: u64 },

    /// IO错误的包装
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anyhow错误的包装
    #[error("Anyhow error: {0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// 桥接层结果类型的别名
pub type AdbResult<T> = Result<T, AdbError>;

impl AdbError {
    pub fn adb_not_found<S: Into<String>>(message: S) -> Self {
        AdbError::AdbNotFound {
            message: message.into(),
        }
    }

    /// 创建命令执行失败错误
    pub fn command_failed<S1: Into<String>, S2: Into<String>>(command: S1, reason: S2) -> Self {
        AdbError::CommandFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout<S: Into<String>>(command: S, seconds: u64) -> Self {
        AdbError::Timeout {
            command: command.into(),
            seconds,
        }
    }

    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdbError::Timeout { .. } | AdbError::Io(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AdbError::AdbNotFound { .. } => "ADB_NOT_FOUND",
            AdbError::CommandFailed { .. } => "COMMAND_FAILED",
            AdbError::Timeout { .. } => "TIMEOUT",
            AdbError::Io(_) => "IO_ERROR",
            AdbError::Anyhow(_) => "ANYHOW_ERROR",
        }
    }
}

/// 需要重启设备的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootCause {
    /// 设备上已经存在一个 staged session
    AlreadyStaged,
    /// APEX 的 native lib 依赖发生了变化, --force-non-staged 无法生效
    NativeLibsChanged,
    /// 设备不支持 --force-non-staged
    SoftRebootUnavailable,
    /// stop/start 重启 framework 失败
    ServiceRestartFailed,
}

impl fmt::Display for RebootCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RebootCause::AlreadyStaged => "already staged",
            RebootCause::NativeLibsChanged => "native libs changed",
            RebootCause::SoftRebootUnavailable => "soft reboot unavailable",
            RebootCause::ServiceRestartFailed => "service restart failed",
        };
        f.write_str(name)
    }
}

/// 设备会话层的错误类型, 每一种都带有可以直接展示给用户的信息
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("{dir} is not writable on the device")]
    TempFolderNotWritable { dir: String },

    #[error("Reboot required ({cause}): {message}")]
    RebootRequired { cause: RebootCause, message: String },

    #[error("{message} {cause}")]
    AdbCommandFailed { message: String, cause: String },

    #[error("Unable to determine the device ABI")]
    DeviceAbiUnknown,

    #[error("Operation not supported: {operation}")]
    OperationNotSupported { operation: String },

    #[error("Failed to parse {what} from output {output:?}")]
    Parse { what: String, output: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 未被翻译的桥接层错误, 保留原始信息
    #[error(transparent)]
    Adb(#[from] AdbError),
}

pub type InstallResult<T> = Result<T, InstallError>;

impl InstallError {
    pub fn reboot_required<S: Into<String>>(cause: RebootCause, message: S) -> Self {
        InstallError::RebootRequired {
            cause,
            message: message.into(),
        }
    }

    pub fn adb_command_failed<S1: Into<String>, S2: Into<String>>(message: S1, cause: S2) -> Self {
        InstallError::AdbCommandFailed {
            message: message.into(),
            cause: cause.into(),
        }
    }

    pub fn operation_not_supported<S: Into<String>>(operation: S) -> Self {
        InstallError::OperationNotSupported {
            operation: operation.into(),
        }
    }

    pub fn parse<S1: Into<String>, S2: Into<String>>(what: S1, output: S2) -> Self {
        InstallError::Parse {
            what: what.into(),
            output: output.into(),
        }
    }

    pub fn is_reboot_required(&self) -> bool {
        matches!(self, InstallError::RebootRequired { .. })
    }

    /// 需要重启时返回具体原因
    pub fn reboot_cause(&self) -> Option<RebootCause> {
        match self {
            InstallError::RebootRequired { cause, .. } => Some(*cause),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            InstallError::TempFolderNotWritable { .. } => "TEMP_FOLDER_NOT_WRITABLE",
            InstallError::RebootRequired { .. } => "REBOOT_REQUIRED",
            InstallError::AdbCommandFailed { .. } => "ADB_COMMAND_FAILED",
            InstallError::DeviceAbiUnknown => "DEVICE_ABI_UNKNOWN",
            InstallError::OperationNotSupported { .. } => "OPERATION_NOT_SUPPORTED",
            InstallError::Parse { .. } => "PARSE_ERROR",
            InstallError::Io(_) => "IO_ERROR",
            InstallError::Adb(err) => err.error_code(),
        }
    }
}

/// 把桥接层的结果翻译成带有操作说明的安装错误
pub trait AdbResultExt<T> {
    fn catching<S: Into<String>>(self, message: S) -> InstallResult<T>;

    fn catching_with<F>(self, f: F) -> InstallResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> AdbResultExt<T> for AdbResult<T> {
    fn catching<S: Into<String>>(self, message: S) -> InstallResult<T> {
        self.map_err(|e| InstallError::adb_command_failed(message, e.to_string()))
    }

    fn catching_with<F>(self, f: F) -> InstallResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| InstallError::adb_command_failed(f(), e.to_string()))
    }
}

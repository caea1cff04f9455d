use crate::bridge::AdbBridge;
use crate::client::adb_device::{file_name, log_throughput, AdbDevice};
use crate::errors::{AdbError, AdbResultExt, InstallError, InstallResult, RebootCause};
use std::path::Path;
use std::thread::sleep;
use std::time::Instant;
use tracing::{debug, info, warn};

const STAGED_SESSION_ERROR: &str = "INSTALL_FAILED_VERIFICATION_FAILURE: Staged session ";
const NATIVE_LIBS_CHANGED_ERROR: &str =
    "INSTALL_FAILED_INTERNAL_ERROR: APEX installation failed: Set of native libs required";
const SOFT_REBOOT_FLAG: &str = "--force-non-staged";

/// APEX 安装过程中经过的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApexInstallStage {
    RootAcquired,
    CapabilityDetected { soft_reboot: bool },
    Installed { soft_reboot: bool },
    Active,
}

impl<B: AdbBridge> AdbDevice<B> {
    /// 安装 APEX 模块.
    ///
    /// 设备支持 `--force-non-staged` 时安装后通过 stop/start 重启 framework 使其生效,
    /// 否则返回 [`InstallError::RebootRequired`]. 设备报告的特定错误会被翻译成带有
    /// 具体原因的 RebootRequired, 其余错误作为 AdbCommandFailed 返回.
    pub fn install_apex(&self, apex: &Path) -> InstallResult<()> {
        let name = file_name(apex);
        let apex_path = std::path::absolute(apex)?.display().to_string();
        let start = Instant::now();

        let soft_reboot = match self.stage_apex(&apex_path) {
            Ok(soft_reboot) => soft_reboot,
            Err(e) => return Err(self.recover_apex_failure(&name, &apex_path, e)),
        };
        trace_stage(ApexInstallStage::Installed { soft_reboot });

        if !soft_reboot {
            return Err(InstallError::reboot_required(
                RebootCause::SoftRebootUnavailable,
                format!(
                    "{} is not available on device (is the device running an older build?); \
                     {} was installed successfully but will not be active until you run \
                     'adb reboot' on your device",
                    SOFT_REBOOT_FLAG, name
                ),
            ));
        }

        if self.shell("stop").and_then(|_| self.shell("start")).is_err() {
            return Err(InstallError::reboot_required(
                RebootCause::ServiceRestartFailed,
                format!(
                    "Failed to stop+start shell; {} was installed successfully but device will \
                     be in an unknown state until you run 'adb reboot'",
                    name
                ),
            ));
        }
        trace_stage(ApexInstallStage::Active);
        log_throughput(apex, &name, start);
        Ok(())
    }

    /// root -> 检测 soft reboot -> install, 返回设备是否支持 soft reboot
    fn stage_apex(&self, apex_path: &str) -> Result<bool, AdbError> {
        self.acquire_root()?;
        trace_stage(ApexInstallStage::RootAcquired);

        let soft_reboot = self
            .shell_ignore_failure("pm")?
            .contains(SOFT_REBOOT_FLAG);
        info!("Soft reboot available: {}", soft_reboot);
        trace_stage(ApexInstallStage::CapabilityDetected { soft_reboot });

        let mut args = vec!["install".to_string(), "--apex".to_string()];
        if soft_reboot {
            args.push(SOFT_REBOOT_FLAG.to_string());
        }
        args.push(apex_path.to_string());
        self.adb_command(args)?;
        Ok(soft_reboot)
    }

    /// `adb root` 会重启 adbd, 需要等它以 root 身份恢复
    fn acquire_root(&self) -> Result<(), AdbError> {
        self.adb_command("root")?;
        let attempts = self.config().root_poll_attempts;
        for attempt in 1..=attempts {
            match self.shell("whoami") {
                Ok(user) if user.trim() == "root" => return Ok(()),
                Ok(user) => debug!("whoami returned {:?} (attempt {})", user, attempt),
                Err(e) => debug!("adbd not back yet (attempt {}): {}", attempt, e),
            }
            if attempt < attempts {
                sleep(self.config().root_poll_interval);
            }
        }
        warn!(
            "adbd on {} did not come back as root after {} attempts",
            self.serial(),
            attempts
        );
        Ok(())
    }

    fn recover_apex_failure(&self, name: &str, apex_path: &str, error: AdbError) -> InstallError {
        let message = error.to_string();
        if message.contains(STAGED_SESSION_ERROR) {
            return InstallError::reboot_required(
                RebootCause::AlreadyStaged,
                "Device is already staged; You need to run 'adb reboot' on your device.",
            );
        }

        if message.contains(NATIVE_LIBS_CHANGED_ERROR) {
            // 不带 --force-non-staged 再装一次, 之后需要重启
            let retry = self
                .adb_command(&["install", "-d", "--apex", apex_path])
                .catching_with(|| format!("Failed to install {}.", name));
            if let Err(e) = retry {
                return e;
            }
            return InstallError::reboot_required(
                RebootCause::NativeLibsChanged,
                format!(
                    "Installed {} on device; however {} doesn't work when the native lib \
                     dependencies of an apex have changed. You need to run 'adb reboot' on \
                     your device to complete the install.",
                    name, SOFT_REBOOT_FLAG
                ),
            );
        }

        InstallError::adb_command_failed(format!("Failed to install {}.", name), message)
    }
}

fn trace_stage(stage: ApexInstallStage) {
    debug!("APEX install stage: {:?}", stage);
}

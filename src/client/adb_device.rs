use crate::beans::{AdbCommand, AndroidIntent, DeviceState, DiskSpace, PackageInfo};
use crate::bridge::AdbBridge;
use crate::client::device_config::DeviceConfig;
use crate::client::parse;
use crate::errors::{AdbResult, AdbResultExt, InstallError, InstallResult};
use crate::utils::transfer_rate_kbps;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

const INSTALLER_METHOD_NAME: &str = "adb_installer";

/// 安装 APK 时的选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ApkInstallOptions {
    /// 目前 adb install 总是安装到内部存储, 保留该选项只为兼容调用方
    pub install_via_sd: bool,
    pub quiet: bool,
    /// 安装前先确认设备临时目录可写
    pub verify_temp_writable: bool,
    /// 以 `--staged` 方式安装, 需要重启才会生效
    pub staged_install_mode: bool,
}

/// 端口转发句柄. 通过 adb 命令安装时不需要转发, drop 时什么也不做
#[derive(Debug, Default)]
pub struct ForwardGuard;

/// AdbDevice 绑定到一个设备序列号, 把安装/查询操作翻译成 adb 命令.
///
/// 除了序列号、桥接实现和配置之外不保存任何状态, 每个操作都可以由调用方单独重试.
/// 同一设备上的操作需要调用方自行串行化.
#[derive(Debug)]
pub struct AdbDevice<B: AdbBridge> {
    serial: String,
    bridge: B,
    config: DeviceConfig,
}

impl<B: AdbBridge> AdbDevice<B> {
    pub fn new(serial: &str, bridge: B) -> Self {
        Self::with_config(serial, bridge, DeviceConfig::default())
    }

    pub fn with_config(serial: &str, bridge: B, config: DeviceConfig) -> Self {
        Self {
            serial: serial.to_string(),
            bridge,
            config,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn installer_method_name(&self) -> &'static str {
        INSTALLER_METHOD_NAME
    }

    pub(crate) fn adb_command<C: Into<AdbCommand>>(&self, command: C) -> AdbResult<String> {
        self.bridge.execute(&self.serial, &command.into(), false, false)
    }

    pub(crate) fn shell<C: Into<AdbCommand>>(&self, command: C) -> AdbResult<String> {
        self.bridge.execute(&self.serial, &command.into(), true, false)
    }

    pub(crate) fn shell_ignore_failure<C: Into<AdbCommand>>(
        &self,
        command: C,
    ) -> AdbResult<String> {
        self.bridge.execute(&self.serial, &command.into(), true, true)
    }

    /// `push [-z <compression>] <local> <remote>`
    pub(crate) fn push_command(&self, local: &Path, remote: &str) -> AdbCommand {
        let mut args = vec!["push".to_string()];
        if let Some(compression) = &self.config.push_compression {
            args.push("-z".to_string());
            args.push(compression.clone());
        }
        args.push(local.display().to_string());
        args.push(remote.to_string());
        AdbCommand::Args(args)
    }

    /// 安装 APK, 返回后应用已经替换为新版本
    pub fn install_apk(&self, apk: &Path, options: ApkInstallOptions) -> InstallResult<()> {
        let name = file_name(apk);
        let start = Instant::now();
        if options.verify_temp_writable {
            self.verify_temp_writable()?;
        }
        let apk_path = std::path::absolute(apk)?;
        let mut args = vec!["install".to_string(), "-r".to_string(), "-d".to_string()];
        if options.staged_install_mode {
            args.push("--staged".to_string());
        }
        args.push(apk_path.display().to_string());
        self.adb_command(args)
            .catching_with(|| format!("Failed to install {}.", name))?;
        log_throughput(apk, &name, start);
        Ok(())
    }

    fn verify_temp_writable(&self) -> InstallResult<()> {
        let marker = self.config.device_tmp_path("exo-experiment");
        let result = self
            .shell(format!("echo exo > {}", marker))
            .and_then(|_| self.shell(format!("rm {}", marker)));
        if let Err(e) = result {
            error!("Failed to write to {}: {}", self.config.device_tmp_dir, e);
            return Err(InstallError::TempFolderNotWritable {
                dir: self.config.device_tmp_dir.clone(),
            });
        }
        Ok(())
    }

    pub fn stop_package(&self, package_name: &str) -> InstallResult<()> {
        self.shell(format!("am force-stop {}", package_name))
            .catching_with(|| format!("Failed to stop package {}.", package_name))?;
        Ok(())
    }

    /// 查询包的安装路径, 查询失败时返回 None
    pub fn get_package_info(&self, package_name: &str) -> Option<PackageInfo> {
        match self.shell(format!("pm path {}", package_name)) {
            Ok(output) => Some(PackageInfo::from_pm_path(&output)),
            Err(e) => {
                warn!("Failed to get package info for {}: {}", package_name, e);
                None
            }
        }
    }

    pub fn uninstall_package(&self, package_name: &str) -> InstallResult<()> {
        self.adb_command(format!("uninstall {}", package_name))
            .catching_with(|| format!("Failed to uninstall {}.", package_name))?;
        Ok(())
    }

    /// 读取设备上 APK 的 v1 签名摘要
    pub fn get_signature(&self, package_path: &str) -> InstallResult<String> {
        let entry = self.shell(format!(
            "unzip -l {} | grep -E -o 'META-INF/[A-Z]+\\.SF'",
            package_path
        ))?;
        let entry = entry.trim();
        let result = self.shell(format!(
            "unzip -p {} {} | grep -E 'SHA1-Digest-Manifest:|SHA-256-Digest-Manifest:'",
            package_path, entry
        ))?;
        parse::parse_signature_digest(&result)
    }

    pub fn mk_dir_p(&self, dir_path: &str) -> InstallResult<()> {
        self.shell(format!("umask 022 && mkdir -p {}", dir_path))
            .catching_with(|| format!("Failed to create dir {}.", dir_path))?;
        Ok(())
    }

    pub fn get_property(&self, name: &str) -> InstallResult<String> {
        self.shell(format!("getprop {}", name))
            .catching_with(|| format!("Failed to get property {}.", name))
    }

    pub fn get_device_abis(&self) -> InstallResult<Vec<String>> {
        let abilist = self.get_property("ro.product.cpu.abilist")?;
        if let Some(abis) = parse::parse_abi_list(&abilist) {
            return Ok(abis);
        }
        let abi = self.get_property("ro.product.cpu.abi")?;
        let abi2 = self.get_property("ro.product.cpu.abi2")?;
        parse::legacy_abis(&abi, &abi2).ok_or(InstallError::DeviceAbiUnknown)
    }

    pub fn kill_process(&self, _process_name: &str) -> InstallResult<()> {
        Err(InstallError::operation_not_supported("killProcess"))
    }

    pub fn get_window_manager_property(&self, _property_name: &str) -> InstallResult<String> {
        Err(InstallError::operation_not_supported("getWindowManagerProperty"))
    }

    /// 删除 exopackage 文件并卸载应用, 失败时返回 false
    pub fn uninstall_apk_from_device(&self, package_name: &str, keep_data: bool) -> bool {
        let result = self
            .shell(format!(
                "rm -rf {}/{}",
                self.config.exopackage_install_root, package_name
            ))
            .and_then(|_| {
                let keep = if keep_data { "-k " } else { "" };
                self.shell(format!("pm uninstall {}{}", keep, package_name))
            });
        match result {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to uninstall {}: {}", package_name, e);
                false
            }
        }
    }

    /// 安装中断后根目录下的文件夹可能缺少执行权限, 安装开始前统一修复
    pub fn fix_root_dir(&self, root_dir: &str) -> InstallResult<()> {
        info!("Fixing root dir {}", root_dir);
        self.shell(format!("find {} -type d -exec chmod a+x {{}} +", root_dir))
            .catching_with(|| format!("Failed to fix root dir {}.", root_dir))?;
        Ok(())
    }

    pub fn set_debug_app_package_name(&self, package_name: Option<&str>) -> InstallResult<bool> {
        if let Some(package_name) = package_name {
            self.shell(self.bridge.am_set_debug_app_command(package_name))?;
        }
        Ok(true)
    }

    /// 查询 /data 分区容量, 失败时返回占位值
    pub fn get_disk_space(&self) -> DiskSpace {
        let result = self
            .shell("df -h /data | awk '{print $2, $3, $4}'")
            .map_err(InstallError::from)
            .and_then(|output| parse::parse_disk_space(&output));
        match result {
            Ok(space) => space,
            Err(e) => {
                warn!("Failed to get disk space: {}", e);
                DiskSpace::placeholder()
            }
        }
    }

    pub fn is_emulator(&self) -> InstallResult<bool> {
        if parse::is_local_transport(&self.serial) {
            return Ok(true);
        }
        Ok(self.get_property("ro.kernel.qemu")? == "1")
    }

    ///
    /// 与 命令 adb get-state 相同
    pub fn get_state(&self) -> InstallResult<DeviceState> {
        let output = self.adb_command("get-state")?;
        Ok(DeviceState::parse(&output))
    }

    pub fn is_online(&self) -> InstallResult<bool> {
        Ok(self.get_state()?.is_online())
    }

    /// 写入 build_uuid.txt, 失败不影响安装结果
    pub fn install_build_uuid_file(
        &self,
        data_root: &Path,
        package_name: &str,
        build_uuid: &str,
    ) -> bool {
        let destination = data_root.join(package_name).display().to_string();
        let result = self
            .shell(format!("umask 022 && mkdir -p {}", destination))
            .and_then(|_| {
                self.shell(format!(
                    "echo {} > {}/build_uuid.txt",
                    build_uuid, destination
                ))
            });
        if let Err(e) = result {
            warn!(
                "Failed to install build_uuid.txt file on {}: {}",
                self.serial, e
            );
        }
        true
    }

    pub fn device_start_intent(&self, intent: Option<&AndroidIntent>) -> InstallResult<String> {
        let Some(intent) = intent else {
            return Ok(String::new());
        };
        self.shell(intent.am_start_command())
            .catching("Failed to start intent.")?;
        Ok(String::new())
    }

    pub fn create_forward(&self) -> ForwardGuard {
        ForwardGuard
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn log_throughput(file: &Path, name: &str, start: Instant) {
    let elapsed = start.elapsed();
    let size = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
    info!(
        "Installed {} ({} bytes) in {:.3} s ({:.1} kB/s)",
        name,
        size,
        elapsed.as_secs_f64(),
        transfer_rate_kbps(size, elapsed)
    );
}

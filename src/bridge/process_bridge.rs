use crate::beans::AdbCommand;
use crate::bridge::{AdbBridge, BridgeConfig};
use crate::errors::{AdbError, AdbResult};
use anyhow::Context;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 通过启动 adb 进程执行命令的 [`AdbBridge`] 实现
#[derive(Debug, Clone)]
pub struct ProcessBridge {
    adb: PathBuf,
    config: BridgeConfig,
}

struct ProcessOutput {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
}

impl ProcessBridge {
    pub fn new(config: BridgeConfig) -> AdbResult<Self> {
        let adb = config.resolve_adb_path()?;
        Ok(Self { adb, config })
    }

    /// 使用默认配置, adb 路径由 [`crate::utils::adb_path`] 查找
    pub fn from_env() -> AdbResult<Self> {
        Self::new(BridgeConfig::default())
    }

    pub fn adb_path(&self) -> &PathBuf {
        &self.adb
    }

    fn build_args(serial: &str, command: &AdbCommand, shell: bool) -> Vec<String> {
        let mut args = vec!["-s".to_string(), serial.to_string()];
        if shell {
            args.push("shell".to_string());
            args.push(command.to_shell_line());
        } else {
            args.extend(command.to_args());
        }
        args
    }

    fn run(&self, args: &[String], command_line: &str) -> AdbResult<ProcessOutput> {
        let mut child = Command::new(&self.adb)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn {:?}", self.adb))?;

        // 两个管道都要并行读取, 否则输出较多的子进程会在管道写满后阻塞直到超时
        let stdout = child.stdout.take().context("Failed to capture stdout")?;
        let stderr = child.stderr.take().context("Failed to capture stderr")?;
        let stdout_handle = drain(stdout);
        let stderr_handle = drain(stderr);

        // 超时只约束 adb 进程本身, 它派生的子进程若仍持有管道, 读取线程会留在后台直到管道关闭
        let exit_code = match wait_with_timeout(&mut child, self.config.timeout_duration()) {
            Ok(Some(code)) => code,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AdbError::timeout(command_line, self.config.timeout));
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AdbError::Io(err));
            }
        };

        let stdout_bytes = stdout_handle.join().unwrap_or_default();
        let stderr_bytes = stderr_handle.join().unwrap_or_default();
        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&stdout_bytes).to_string(),
            stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
            exit_code,
        })
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::<u8>::new();
        let _ = reader.read_to_end(&mut buffer);
        buffer
    })
}

/// 返回 `Ok(None)` 表示超时
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<Option<i32>>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status.code()));
        }
        if start.elapsed() > timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn combined_output(output: &ProcessOutput) -> String {
    let stdout = output.stdout.trim();
    let stderr = output.stderr.trim();
    match (stdout.is_empty(), stderr.is_empty()) {
        (_, true) => stdout.to_string(),
        (true, false) => stderr.to_string(),
        (false, false) => format!("{}\n{}", stdout, stderr),
    }
}

impl AdbBridge for ProcessBridge {
    fn execute(
        &self,
        serial: &str,
        command: &AdbCommand,
        shell: bool,
        ignore_failure: bool,
    ) -> AdbResult<String> {
        let args = Self::build_args(serial, command, shell);
        let command_line = format!(
            "{}{}",
            if shell { "shell " } else { "" },
            command.get_command()
        );
        debug!("adb -s {} {}", serial, command_line);
        let output = self.run(&args, &command_line)?;
        if output.exit_code == Some(0) {
            return Ok(output.stdout.trim().to_string());
        }
        if ignore_failure {
            return Ok(combined_output(&output));
        }
        let reason = match output.exit_code {
            Some(code) => format!("exit code {}: {}", code, combined_output(&output)),
            None => format!("terminated by signal: {}", combined_output(&output)),
        };
        Err(AdbError::command_failed(command_line, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_shell_args() {
        let args = ProcessBridge::build_args(
            "emulator-5554",
            &AdbCommand::from("cat /data/local/tmp/x | xargs rm -f"),
            true,
        );
        assert_eq!(
            args,
            vec![
                "-s",
                "emulator-5554",
                "shell",
                "cat /data/local/tmp/x | xargs rm -f"
            ]
        );
    }

    #[test]
    fn test_build_subcommand_args_keep_spaces() {
        let command = AdbCommand::from(vec![
            "install".to_string(),
            "-r".to_string(),
            "/tmp/my app.apk".to_string(),
        ]);
        let args = ProcessBridge::build_args("serial", &command, false);
        assert_eq!(args, vec!["-s", "serial", "install", "-r", "/tmp/my app.apk"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_mapping() {
        let failing = ProcessBridge::new(BridgeConfig::new(Some("false"), Some(10))).unwrap();
        let err = failing
            .execute("serial", &AdbCommand::from("whoami"), true, false)
            .unwrap_err();
        assert!(matches!(err, AdbError::CommandFailed { .. }));
        assert!(err.to_string().contains("shell whoami"));

        let ignored = failing
            .execute("serial", &AdbCommand::from("pm"), true, true)
            .unwrap();
        assert_eq!(ignored, "");

        let passing = ProcessBridge::new(BridgeConfig::new(Some("true"), Some(10))).unwrap();
        assert_eq!(
            passing
                .execute("serial", &AdbCommand::from("get-state"), false, false)
                .unwrap(),
            ""
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_adb() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-adb");
        // 不用 exec, sleep 作为孙进程继续持有输出管道
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let bridge = ProcessBridge::new(BridgeConfig::new(Some(&script), Some(1))).unwrap();
        let start = Instant::now();
        let err = bridge
            .execute("serial", &AdbCommand::from("whoami"), true, false)
            .unwrap_err();

        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(matches!(err, AdbError::Timeout { seconds: 1, .. }));
        assert_eq!(err.to_string(), "Command timed out after 1 seconds: shell whoami");
    }
}

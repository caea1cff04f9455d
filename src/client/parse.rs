//! 解析 adb 命令输出的纯函数, 都是按行处理的文本格式.

use crate::beans::DiskSpace;
use crate::errors::{InstallError, InstallResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

static LINE_ENDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").unwrap());

/// Genymotion 之类通过本地网络连接的设备, 例如 127.0.0.1:15562
static LOCAL_TRANSPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+\.\d+\.\d+:\d+").unwrap());

/// 解析 `ls -R <root>` 的输出, 返回相对于 `root` 的文件路径 (不含目录).
///
/// 以 `:` 结尾的行开始一个新的目录, 其余行是当前目录下的条目.
pub fn parse_ls_recursive(root: &Path, output: &str) -> InstallResult<BTreeSet<PathBuf>> {
    let mut paths: HashSet<PathBuf> = HashSet::new();
    let mut dirs: HashSet<PathBuf> = HashSet::new();
    let mut current_dir: Option<PathBuf> = None;

    for line in LINE_ENDING.split(output).filter(|l| !l.is_empty()) {
        if let Some(dir) = line.strip_suffix(':') {
            let relative = Path::new(dir)
                .strip_prefix(root)
                .map_err(|_| InstallError::parse(format!("directory under {:?}", root), line))?
                .to_path_buf();
            dirs.insert(relative.clone());
            current_dir = Some(relative);
        } else {
            let dir = current_dir
                .as_ref()
                .ok_or_else(|| InstallError::parse("directory header", output))?;
            paths.insert(dir.join(line));
        }
    }

    Ok(paths.difference(&dirs).cloned().collect())
}

/// 解析 `df -h /data | awk '{print $2, $3, $4}'` 的输出, 第一行是表头
pub fn parse_disk_space(output: &str) -> InstallResult<DiskSpace> {
    let line = output
        .lines()
        .nth(1)
        .ok_or_else(|| InstallError::parse("disk space", output))?;
    let mut parts = line.trim().splitn(3, ' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(size), Some(used), Some(available)) => Ok(DiskSpace::new(size, used, available)),
        _ => Err(InstallError::parse("disk space", output)),
    }
}

/// 从 `SHA1-Digest-Manifest: xxx` 这样的行中取出摘要
pub fn parse_signature_digest(output: &str) -> InstallResult<String> {
    match output.split_once(':') {
        Some((_, digest)) => Ok(digest.trim().to_string()),
        None => Err(InstallError::parse("signature digest", output)),
    }
}

/// 把 `ro.product.cpu.abilist` 按逗号拆开, 属性为空时返回 None
pub fn parse_abi_list(abilist: &str) -> Option<Vec<String>> {
    let abilist = abilist.trim();
    if abilist.is_empty() {
        return None;
    }
    Some(abilist.split(',').map(str::to_string).collect())
}

/// 旧版设备的 `ro.product.cpu.abi` 与 `ro.product.cpu.abi2`, 只保留非空的值
// 过滤掉空值而不是保留空值, 两个属性都为空时才返回 None
pub fn legacy_abis(abi: &str, abi2: &str) -> Option<Vec<String>> {
    let abis: Vec<String> = [abi, abi2]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if abis.is_empty() {
        None
    } else {
        Some(abis)
    }
}

/// 和 adb 一致, 把所有本地传输 (相对于 USB) 的设备都当作模拟器
pub fn is_local_transport(serial: &str) -> bool {
    LOCAL_TRANSPORT.is_match(serial)
}

use crate::beans::{FilesType, InstallPaths};
use crate::bridge::AdbBridge;
use crate::client::adb_device::{file_name, AdbDevice};
use crate::client::parse;
use crate::errors::{AdbResult, AdbResultExt, InstallError, InstallResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::{Builder, NamedTempFile, TempDir};
use tracing::{debug, info, warn};

impl<B: AdbBridge> AdbDevice<B> {
    /// 递归列出 `root` 下的所有文件, 返回相对于 `root` 的路径
    pub fn list_dir_recursive(&self, root: &Path) -> InstallResult<BTreeSet<PathBuf>> {
        let output = self
            .shell(format!("ls -R {}", root.display()))
            .catching_with(|| format!("Failed to list path {}.", root.display()))?;
        parse::parse_ls_recursive(root, &output)
    }

    /// 删除 `dir_path` 下的一批文件.
    ///
    /// 文件列表先写入本地清单再推送到设备, 由设备端的 xargs 一次性删除.
    /// 本地和设备上的清单无论成功与否都会被清理.
    pub fn rm_files<I, S>(&self, dir_path: &str, files_to_delete: I) -> InstallResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start = Instant::now();
        let targets: Vec<String> = files_to_delete
            .into_iter()
            .map(|f| Path::new(dir_path).join(f.as_ref()).display().to_string())
            .collect();
        let count = targets.len();

        let manifest = self.local_temp_file("files_to_delete", ".txt")?;
        let manifest_name = file_name(manifest.path());
        let remote_manifest = self.config().device_tmp_path(&manifest_name);

        let result = self.push_and_delete(&manifest, &targets, &remote_manifest);

        drop(manifest);
        if let Err(e) = self.shell(format!("rm -f {}", remote_manifest)) {
            warn!("Failed to remove {} from device: {}", remote_manifest, e);
        }

        result.catching_with(|| format!("Failed delete {} files from {}.", count, dir_path))?;
        info!(
            "Deleted {} files from {} in {:.3} seconds.",
            count,
            dir_path,
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn push_and_delete(
        &self,
        manifest: &NamedTempFile,
        targets: &[String],
        remote_manifest: &str,
    ) -> AdbResult<()> {
        let mut file = manifest.as_file();
        file.write_all(targets.join("\n").as_bytes())?;
        file.flush()?;
        self.adb_command(self.push_command(manifest.path(), &self.config().device_tmp_dir))?;
        self.shell(format!("cat {} | xargs rm -f", remote_manifest))?;
        Ok(())
    }

    /// 把一批文件安装到设备上, `install_paths` 是 设备路径 -> 本地路径 的映射.
    ///
    /// secondary_dex / native_library / resources 按目标目录分组: 每个目录先在本地
    /// 复制出一个临时目录 (adb 不支持符号链接), 再用一次 push 推送整个目录, 比逐个文件推送快得多.
    /// 其它种类逐个文件推送.
    pub fn install_files(
        &self,
        files_type: &FilesType,
        install_paths: &InstallPaths,
    ) -> InstallResult<()> {
        debug!(
            "{}: [{}]",
            files_type,
            install_paths
                .iter()
                .map(|(dest, src)| {
                    format!("{} -> {}", parent_of(src).display(), parent_of(dest).display())
                })
                .collect::<BTreeSet<String>>()
                .into_iter()
                .collect::<Vec<String>>()
                .join("\n\t")
        );
        let start = Instant::now();
        if files_type.is_batched() {
            self.install_files_batched(install_paths)?;
        } else {
            for (destination, source) in install_paths {
                debug!("\tPushing {} to {}", source.display(), destination.display());
                self.adb_command(vec![
                    "push".to_string(),
                    source.display().to_string(),
                    destination.display().to_string(),
                ])
                .catching_with(|| {
                    format!(
                        "Failed to push {} to {}.",
                        source.display(),
                        destination.display()
                    )
                })?;
            }
        }
        info!(
            "{}: Transferred {} files in {:.3} seconds",
            files_type,
            install_paths.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn install_files_batched(&self, install_paths: &InstallPaths) -> InstallResult<()> {
        // TempDir 在离开作用域时删除, 失败路径也一样
        let staging = self.stage_by_directory(install_paths)?;
        for (destination, temp_dir) in &staging {
            self.push_staged_dir(destination, temp_dir.path())?;
        }
        Ok(())
    }

    /// 每个目标目录对应一个本地临时目录, 文件以目标文件名复制进去
    fn stage_by_directory(
        &self,
        install_paths: &InstallPaths,
    ) -> InstallResult<BTreeMap<PathBuf, TempDir>> {
        let mut staging: BTreeMap<PathBuf, TempDir> = BTreeMap::new();
        for destination in install_paths.keys() {
            let dir = parent_of(destination).to_path_buf();
            if staging.contains_key(&dir) {
                continue;
            }
            let prefix = format!("{}_", file_name(&dir));
            let temp_dir = self.local_temp_dir(&prefix)?;
            staging.insert(dir, temp_dir);
        }

        for (destination, source) in install_paths {
            let temp_dir = &staging[parent_of(destination)];
            let name = destination.file_name().ok_or_else(|| {
                InstallError::parse("destination file name", destination.display().to_string())
            })?;
            fs::copy(source, temp_dir.path().join(name))?;
        }
        Ok(staging)
    }

    fn push_staged_dir(&self, destination: &Path, temp_dir: &Path) -> InstallResult<()> {
        let temp_name = file_name(temp_dir);
        let remote_temp = self.config().device_tmp_path(&temp_name);
        let destination = destination.display().to_string();
        let result = self
            .adb_command(self.push_command(temp_dir, &self.config().device_tmp_dir))
            .and_then(|_| self.shell(format!("mv {}/* {}", remote_temp, destination)))
            // 可写的 dex 文件会导致部分应用启动失败
            .and_then(|_| self.shell(format!("chmod 644 {}/*", destination)))
            .and_then(|_| self.shell(format!("rm -rf {}", remote_temp)));
        result.catching_with(|| {
            format!("Failed to push {} to {}.", temp_dir.display(), destination)
        })?;
        Ok(())
    }

    fn local_temp_dir(&self, prefix: &str) -> InstallResult<TempDir> {
        let mut builder = Builder::new();
        builder.prefix(prefix);
        let dir = match &self.config().local_tmp_dir {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    fn local_temp_file(&self, prefix: &str, suffix: &str) -> InstallResult<NamedTempFile> {
        let mut builder = Builder::new();
        builder.prefix(prefix).suffix(suffix);
        let file = match &self.config().local_tmp_dir {
            Some(root) => builder.tempfile_in(root)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

mod common;

use common::ScriptedBridge;
use exodevice::{AdbDevice, DeviceConfig, FilesType, InstallPaths};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SERIAL: &str = "emulator-5554";
const EXO_ROOT: &str = "/data/local/tmp/exopackage/com.example";

struct Fixture {
    sources: TempDir,
    staging_root: TempDir,
    paths: InstallPaths,
}

/// 两个目标目录, 三个文件
fn fixture() -> Fixture {
    let sources = tempfile::tempdir().unwrap();
    let staging_root = tempfile::tempdir().unwrap();
    let mut paths = InstallPaths::new();
    for (dest, name) in [
        ("secondary-dex/secondary-1.dex.jar", "a.dex.jar"),
        ("secondary-dex/secondary-2.dex.jar", "b.dex.jar"),
        ("native-libs/armeabi-v7a/libfoo.so", "libfoo.so"),
    ] {
        let source = sources.path().join(name);
        fs::write(&source, name).unwrap();
        paths.insert(PathBuf::from(EXO_ROOT).join(dest), source);
    }
    Fixture {
        sources,
        staging_root,
        paths,
    }
}

fn device<'a>(bridge: &'a ScriptedBridge, staging_root: &Path) -> AdbDevice<&'a ScriptedBridge> {
    let config = DeviceConfig::default().with_local_tmp_dir(staging_root);
    AdbDevice::with_config(SERIAL, bridge, config)
}

fn staging_entries(root: &Path) -> usize {
    fs::read_dir(root).unwrap().count()
}

#[test]
fn test_batched_push_one_dir_per_destination() {
    let fx = fixture();
    let bridge = ScriptedBridge::new();
    device(&bridge, fx.staging_root.path())
        .install_files(&FilesType::SecondaryDex, &fx.paths)
        .unwrap();

    let pushes = bridge.pushes();
    assert_eq!(pushes.len(), 2);
    for push in &pushes {
        assert_eq!(push.args[1..3], ["-z".to_string(), "brotli".to_string()]);
        assert_eq!(push.args.last().unwrap(), "/data/local/tmp");
        assert_eq!(push.source_existed, Some(true));
    }
    // 推送时临时目录以目标目录名为前缀
    let pushed_names: Vec<String> = pushes
        .iter()
        .map(|p| {
            Path::new(&p.args[p.args.len() - 2])
                .file_name()
                .unwrap()
                .to_string_lossy()
                .to_string()
        })
        .collect();
    assert!(pushed_names[0].starts_with("armeabi-v7a_"));
    assert!(pushed_names[1].starts_with("secondary-dex_"));

    let commands = bridge.commands();
    assert!(commands.contains(&format!(
        "shell mv /data/local/tmp/{}/* {}/secondary-dex",
        pushed_names[1], EXO_ROOT
    )));
    assert!(commands.contains(&format!("shell chmod 644 {}/secondary-dex/*", EXO_ROOT)));
    assert!(commands.contains(&format!("shell rm -rf /data/local/tmp/{}", pushed_names[1])));

    assert_eq!(staging_entries(fx.staging_root.path()), 0);
}

#[test]
fn test_batched_push_stages_files_under_destination_names() {
    let fx = fixture();
    let bridge = ScriptedBridge::new();
    device(&bridge, fx.staging_root.path())
        .install_files(&FilesType::NativeLibrary, &fx.paths)
        .unwrap();

    // 复制完成后源文件保持不变
    assert_eq!(fs::read_to_string(fx.sources.path().join("libfoo.so")).unwrap(), "libfoo.so");
    assert_eq!(bridge.count_matching("shell chmod 644"), 2);
}

#[test]
fn test_batched_push_failure_still_removes_temp_dirs() {
    let fx = fixture();
    let bridge = ScriptedBridge::new().adb_fail("push", "adb: error: failed to copy");
    let err = device(&bridge, fx.staging_root.path())
        .install_files(&FilesType::Resources, &fx.paths)
        .unwrap_err();

    assert_eq!(err.error_code(), "ADB_COMMAND_FAILED");
    assert!(err.to_string().starts_with("Failed to push "));
    assert_eq!(bridge.pushes().len(), 1);
    assert_eq!(staging_entries(fx.staging_root.path()), 0);
}

#[test]
fn test_batched_remote_move_failure_is_reported() {
    let fx = fixture();
    let bridge = ScriptedBridge::new().shell_fail("mv ", "mv: No such file or directory");
    let err = device(&bridge, fx.staging_root.path())
        .install_files(&FilesType::SecondaryDex, &fx.paths)
        .unwrap_err();

    assert!(err.to_string().contains("No such file or directory"));
    assert_eq!(bridge.count_matching("chmod"), 0);
    assert_eq!(staging_entries(fx.staging_root.path()), 0);
}

#[test]
fn test_other_files_pushed_one_by_one() {
    let fx = fixture();
    let bridge = ScriptedBridge::new();
    device(&bridge, fx.staging_root.path())
        .install_files(&FilesType::from("modular_dex"), &fx.paths)
        .unwrap();

    let pushes = bridge.pushes();
    assert_eq!(pushes.len(), 3);
    for push in &pushes {
        assert_eq!(push.args.len(), 3);
    }
    assert_eq!(
        pushes[0].args[2],
        format!("{}/native-libs/armeabi-v7a/libfoo.so", EXO_ROOT)
    );
    assert_eq!(bridge.count_matching("shell"), 0);
    assert_eq!(staging_entries(fx.staging_root.path()), 0);
}

#[test]
fn test_single_push_failure_names_source_and_destination() {
    let fx = fixture();
    let bridge = ScriptedBridge::new().adb_fail("libfoo.so", "adb: error: connection reset");
    let err = device(&bridge, fx.staging_root.path())
        .install_files(&FilesType::from("modular_dex"), &fx.paths)
        .unwrap_err();

    let display = err.to_string();
    assert!(display.contains("libfoo.so"));
    assert!(display.contains("connection reset"));
}

#[test]
fn test_push_without_compression() {
    let fx = fixture();
    let bridge = ScriptedBridge::new();
    let config = DeviceConfig::default()
        .with_local_tmp_dir(fx.staging_root.path())
        .with_push_compression(None);
    AdbDevice::with_config(SERIAL, &bridge, config)
        .install_files(&FilesType::SecondaryDex, &fx.paths)
        .unwrap();

    for push in bridge.pushes() {
        assert_eq!(push.args.len(), 3);
    }
}

//! # xtask
//!
//! card-motion workspace 的本地检查脚本。
//!
//! - `check-all`: fmt / clippy / test 三项门禁
//! - `cov-core`, `cov-workspace`: 基于 cargo-llvm-cov 的 HTML 覆盖率报告
//! - `timeline-check`: 校验 `timelines/` 下的时间轴配置

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use card_motion::TimelineConfig;
use walkdir::WalkDir;

/// 默认的时间轴配置目录（相对于 workspace root）
const TIMELINES_DIR: &str = "timelines";

const COVERAGE_REPORT: &str = "target/llvm-cov/html/index.html";

/// 运行一条 cargo 命令，非零退出视为失败
fn cargo(args: &[&str]) -> anyhow::Result<()> {
    let line = format!("cargo {}", args.join(" "));
    eprintln!("\n==> {line}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("`{line}` exited with {status}");
    }
    Ok(())
}

/// 运行覆盖率前确认 cargo-llvm-cov 已安装
fn coverage(args: &[&str]) -> anyhow::Result<()> {
    let installed = Command::new("cargo")
        .args(["llvm-cov", "--version"])
        .status()
        .is_ok_and(|status| status.success());
    if !installed {
        anyhow::bail!(
            "找不到 cargo-llvm-cov，覆盖率命令需要：\n  \
             cargo install cargo-llvm-cov\n  \
             rustup component add llvm-tools-preview"
        );
    }

    let mut full = vec!["llvm-cov"];
    full.extend_from_slice(args);
    full.extend_from_slice(&["--all-features", "--html"]);
    cargo(&full)?;

    eprintln!("\n覆盖率报告: {COVERAGE_REPORT}");
    Ok(())
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("xtask: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            cargo(&["fmt", "--all", "--", "--check"])?;
            cargo(&["clippy", "--workspace", "--all-targets"])?;
            cargo(&["test", "--workspace"])?;
        }
        "cov-core" => coverage(&["-p", "card-motion"])?,
        // xtask 本身不计入
        "cov-workspace" => coverage(&["--workspace", "--exclude", "xtask"])?,
        "timeline-check" => timeline_check(args.next().as_deref())?,
        "help" | "-h" | "--help" => print_help(),
        other => anyhow::bail!("未知命令 `{other}`，运行 `cargo xtask help` 查看可用命令"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"cargo xtask <command>

  check-all              fmt --check, clippy, test（整个 workspace）
  cov-core               card-motion 单独的覆盖率报告
  cov-workspace          除 xtask 外所有 crate 的覆盖率报告
  timeline-check [path]  校验时间轴配置；缺省扫描 timelines/，也可指定文件或目录
                         报告 JSON 错误和倒序的阶段偏移

.cargo/config.toml 中为每个命令定义了同名别名，例如 `cargo check-all`。
"#
    );
}

/// 执行时间轴配置检查
fn timeline_check(path: Option<&str>) -> anyhow::Result<()> {
    let root = match path {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(TIMELINES_DIR),
    };
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定配置路径",
            root.display()
        );
    }

    let files = collect_timeline_files(&root)?;
    if files.is_empty() {
        eprintln!("未找到时间轴配置文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个时间轴配置...\n", files.len());

    let mut errors = 0;
    for file in &files {
        match check_timeline_file(file) {
            Ok(config) => eprintln!(
                "[OK] {}: 选择 {}ms / 取消 {}ms / 步长 {}ms",
                file.display(),
                config.complete_ms,
                config.deselect_ms,
                config.stagger_step_ms
            ),
            Err(e) => {
                eprintln!("[ERROR] {}: {e}", file.display());
                errors += 1;
            }
        }
    }

    eprintln!();
    if errors > 0 {
        anyhow::bail!("{errors} 个时间轴配置存在错误");
    }
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集路径下的所有 .json 文件（路径本身是文件时直接返回）
fn collect_timeline_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn check_timeline_file(file: &Path) -> anyhow::Result<TimelineConfig> {
    let content = std::fs::read_to_string(file)?;
    Ok(TimelineConfig::from_json(&content)?)
}

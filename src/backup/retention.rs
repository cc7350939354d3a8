// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backup::BackupError;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// 产物名称模式：`<name>_<YYYYMMDD_HHMMSS>`加可选的归档扩展名
static ARTIFACT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.+)_(?P<ts>\d{8}_\d{6})(?P<ext>\.zip|\.tar\.gz)?$")
        .expect("artifact pattern is a valid regex")
});

/// 目录中一个可识别的备份产物
#[derive(Debug, Clone, PartialEq, Eq)]
struct Artifact {
    path: PathBuf,
    timestamp: NaiveDateTime,
}

/// 删除超出保留数量的旧备份
///
/// 按嵌在文件名里的时间戳排序（而不是文件系统mtime，
/// 后者会被复制和时钟漂移弄脏），保留最新的`retention_count`个，
/// 其余删除。不匹配命名模式的条目一律忽略，幂等。
///
/// # 参数
///
/// * `backup_dir` - 仓库的备份目录
/// * `repo_name` - 仓库名称，只有该名称的产物参与清理
/// * `retention_count` - 保留的产物数量
///
/// # 返回值
///
/// * `Ok(usize)` - 删除的产物数量
/// * `Err(BackupError::Retention)` - 目录无法列出
pub fn enforce(
    backup_dir: &Path,
    repo_name: &str,
    retention_count: usize,
) -> Result<usize, BackupError> {
    let mut artifacts = list_artifacts(backup_dir, repo_name)?;
    if artifacts.len() <= retention_count {
        return Ok(0);
    }

    // Newest first; everything past the retention window goes
    artifacts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut removed = 0;
    for stale in &artifacts[retention_count..] {
        let result = if stale.path.is_dir() {
            std::fs::remove_dir_all(&stale.path)
        } else {
            std::fs::remove_file(&stale.path)
        };
        match result {
            Ok(()) => {
                info!("Removed old backup: {}", stale.path.display());
                removed += 1;
            }
            Err(e) => {
                error!("Failed to remove old backup {}: {}", stale.path.display(), e);
            }
        }
    }

    Ok(removed)
}

/// 列出目录中属于该仓库的备份产物
fn list_artifacts(backup_dir: &Path, repo_name: &str) -> Result<Vec<Artifact>, BackupError> {
    let entries = std::fs::read_dir(backup_dir)
        .map_err(|e| BackupError::Retention(format!("failed to list backup dir: {}", e)))?;

    let mut artifacts = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(caps) = ARTIFACT_PATTERN.captures(name) else {
            continue;
        };
        if &caps["name"] != repo_name {
            continue;
        }
        let Ok(timestamp) = NaiveDateTime::parse_from_str(&caps["ts"], "%Y%m%d_%H%M%S") else {
            continue;
        };
        artifacts.push(Artifact {
            path: entry.path(),
            timestamp,
        });
    }

    Ok(artifacts)
}

#[cfg(test)]
#[path = "retention_test.rs"]
mod tests;

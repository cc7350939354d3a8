// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backup::BackupError;
use crate::domain::models::repo::BackupFormat;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// 产出一个备份产物
///
/// 同步阻塞函数，调用方应放在阻塞线程池上执行。产物先写到
/// 以`.tmp-`为前缀的临时名字，成功后原子地重命名到最终路径，
/// 失败时清理临时文件，最终路径上永远不会出现half-written的产物。
/// `.git`目录不进入产物。
///
/// # 参数
///
/// * `source` - 已克隆好的仓库工作树
/// * `dest_dir` - 产物所在目录
/// * `backup_name` - 产物基础名，形如`<repo>_<YYYYMMDD_HHMMSS>`
/// * `format` - 归档格式
///
/// # 返回值
///
/// * `Ok(PathBuf)` - 产物的最终路径
/// * `Err(BackupError::Archive)` - I/O失败
pub fn produce(
    source: &Path,
    dest_dir: &Path,
    backup_name: &str,
    format: BackupFormat,
) -> Result<PathBuf, BackupError> {
    if !source.is_dir() {
        return Err(BackupError::Archive(format!(
            "source tree missing: {}",
            source.display()
        )));
    }

    let file_name = match format.extension() {
        Some(ext) => format!("{}.{}", backup_name, ext),
        None => backup_name.to_string(),
    };
    let final_path = dest_dir.join(&file_name);
    let tmp_path = dest_dir.join(format!(".tmp-{}", file_name));

    remove_path(&tmp_path);

    let written = match format {
        BackupFormat::Folder => copy_tree(source, &tmp_path),
        BackupFormat::Zip => write_zip(source, &tmp_path),
        BackupFormat::Targz => write_targz(source, &tmp_path),
    };

    if let Err(e) = written {
        remove_path(&tmp_path);
        return Err(e);
    }

    std::fs::rename(&tmp_path, &final_path).map_err(|e| {
        remove_path(&tmp_path);
        BackupError::Archive(format!("failed to publish artifact: {}", e))
    })?;

    Ok(final_path)
}

/// 计算文件或目录树的总字节数
pub fn artifact_size(path: &Path) -> i64 {
    if path.is_file() {
        return path.metadata().map(|m| m.len() as i64).unwrap_or(0);
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len() as i64)
        .sum()
}

fn remove_path(path: &Path) {
    // Best-effort cleanup of temporary state
    if path.is_dir() {
        let _ = std::fs::remove_dir_all(path);
    } else if path.exists() {
        let _ = std::fs::remove_file(path);
    }
}

fn io_err(context: &str, e: impl std::fmt::Display) -> BackupError {
    BackupError::Archive(format!("{}: {}", context, e))
}

/// 遍历工作树，跳过.git
fn tree_entries(source: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(source)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(|e| e.ok())
}

fn copy_tree(source: &Path, dest: &Path) -> Result<(), BackupError> {
    for entry in tree_entries(source) {
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io_err("bad entry path", e))?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| io_err("create dir", e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_err("create dir", e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| io_err("copy file", e))?;
        }
    }
    Ok(())
}

fn write_zip(source: &Path, dest: &Path) -> Result<(), BackupError> {
    let file = File::create(dest).map_err(|e| io_err("create zip", e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in tree_entries(source) {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io_err("bad entry path", e))?;
        let name = rel.to_string_lossy().replace('\\', "/");
        writer
            .start_file(name, options)
            .map_err(|e| io_err("zip entry", e))?;
        let mut input = File::open(entry.path()).map_err(|e| io_err("open file", e))?;
        io::copy(&mut input, &mut writer).map_err(|e| io_err("zip write", e))?;
    }

    writer.finish().map_err(|e| io_err("finish zip", e))?;
    Ok(())
}

fn write_targz(source: &Path, dest: &Path) -> Result<(), BackupError> {
    let file = File::create(dest).map_err(|e| io_err("create tar.gz", e))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in tree_entries(source) {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io_err("bad entry path", e))?;
        builder
            .append_path_with_name(entry.path(), rel)
            .map_err(|e| io_err("tar entry", e))?;
    }

    let encoder = builder.into_inner().map_err(|e| io_err("finish tar", e))?;
    encoder.finish().map_err(|e| io_err("finish gzip", e))?;
    Ok(())
}

#[cfg(test)]
#[path = "archiver_test.rs"]
mod tests;

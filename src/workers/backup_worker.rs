// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backup::fetcher::SourceFetcher;
use crate::backup::{archiver, retention, BackupError};
use crate::domain::models::job::BackupJob;
use crate::domain::models::repo::Repo;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::repo_repository::RepoRepository;
use crate::workers::executor::RunningGuard;
use chrono::Utc;
use metrics::{counter, histogram};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tracing::{error, info, warn};

/// 遗留克隆目录的清理阈值
const STALE_CLONE_AGE: Duration = Duration::from_secs(3600);

/// 备份工作器
///
/// 执行单个备份任务的完整流水线：获取 → 归档 → 保留清理，
/// 并把结果写回任务记录。任何一步失败都把任务标记为Failed
/// 并保留既有产物；保留清理失败只记日志，不影响任务结果。
pub struct BackupWorker<R, J>
where
    R: RepoRepository + 'static,
    J: JobRepository + 'static,
{
    repo_repo: Arc<R>,
    job_repo: Arc<J>,
    fetcher: Arc<dyn SourceFetcher>,
    backup_root: PathBuf,
}

impl<R, J> BackupWorker<R, J>
where
    R: RepoRepository + 'static,
    J: JobRepository + 'static,
{
    /// 创建新的备份工作器实例
    ///
    /// # 参数
    ///
    /// * `repo_repo` - 备份仓库存储
    /// * `job_repo` - 任务记录存储
    /// * `fetcher` - 源获取器
    /// * `backup_root` - 备份存储根目录
    pub fn new(
        repo_repo: Arc<R>,
        job_repo: Arc<J>,
        fetcher: Arc<dyn SourceFetcher>,
        backup_root: PathBuf,
    ) -> Self {
        Self {
            repo_repo,
            job_repo,
            fetcher,
            backup_root,
        }
    }

    /// 仓库的备份目录：`<root>/user_<user_id>/<name>`
    pub fn repo_backup_dir(&self, repo: &Repo) -> PathBuf {
        self.backup_root
            .join(format!("user_{}", repo.user_id))
            .join(&repo.name)
    }

    /// 执行一次备份任务直到终态
    ///
    /// 互斥凭据在整个执行期间被持有，函数返回（或panic）时
    /// 自动释放，仓库回到Idle
    pub async fn execute(&self, repo: Repo, job: BackupJob, _guard: RunningGuard) {
        let started = Instant::now();
        info!("Starting backup for repository {} ({})", repo.name, repo.id);

        // Due-date advancement happens at job start: a failed run waits
        // for the next full interval instead of retrying every tick
        if let Err(e) = self
            .repo_repo
            .set_last_backup(repo.id, Utc::now().into())
            .await
        {
            error!("Failed to record last backup time for {}: {}", repo.id, e);
        }

        let outcome = self.run_pipeline(&repo).await;
        let elapsed = started.elapsed();
        histogram!("backup_job_duration_seconds").record(elapsed.as_secs_f64());

        let updated = match outcome {
            Ok((artifact, size)) => {
                counter!("backup_jobs_completed_total").increment(1);
                info!(
                    "Backup completed for {} in {:.1}s: {}",
                    repo.name,
                    elapsed.as_secs_f64(),
                    artifact.display()
                );
                job.complete(artifact.to_string_lossy().to_string(), size)
            }
            Err(e) => {
                counter!("backup_jobs_failed_total").increment(1);
                error!("Backup failed for repository {}: {}", repo.name, e);
                job.fail(e.to_string())
            }
        };

        match updated {
            Ok(job) => {
                if let Err(e) = self.job_repo.update(&job).await {
                    error!("Failed to persist job {} outcome: {}", job.id, e);
                }
            }
            Err(e) => error!("Illegal job state transition: {}", e),
        }
    }

    /// 删除仓库的全部备份产物，尽力而为
    pub async fn remove_artifacts(&self, repo: &Repo) {
        let dir = self.repo_backup_dir(repo);
        if !dir.exists() {
            return;
        }
        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            warn!("Failed to remove backup dir {}: {}", dir.display(), e);
        }
    }

    /// 流水线本体：获取 → 归档 → 保留清理
    ///
    /// # 返回值
    ///
    /// * `Ok((artifact, size))` - 产物路径与字节数
    /// * `Err(BackupError)` - 终止流水线的错误
    async fn run_pipeline(&self, repo: &Repo) -> Result<(PathBuf, i64), BackupError> {
        let repo_dir = self.repo_backup_dir(repo);
        tokio::fs::create_dir_all(&repo_dir)
            .await
            .map_err(|e| BackupError::Archive(format!("failed to create backup dir: {}", e)))?;

        self.sweep_stale_clones(&repo_dir).await;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let backup_name = format!("{}_{}", repo.name, timestamp);
        let clone_dir = repo_dir.join(format!(".tmp-clone-{}", timestamp));

        let fetched = self
            .fetcher
            .fetch(&repo.url, repo.access_token.as_deref(), &clone_dir)
            .await;

        let produced = match fetched {
            Ok(()) => {
                let source = clone_dir.clone();
                let dest = repo_dir.clone();
                let name = backup_name.clone();
                let format = repo.format;
                tokio::task::spawn_blocking(move || archiver::produce(&source, &dest, &name, format))
                    .await
                    .map_err(|e| BackupError::Archive(format!("archive task panicked: {}", e)))
                    .and_then(|r| r)
            }
            Err(e) => Err(e),
        };

        // The transient clone is always discarded, success or not
        if clone_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&clone_dir).await {
                warn!("Failed to clean up clone dir {}: {}", clone_dir.display(), e);
            }
        }

        let artifact = produced?;

        // Retention is non-fatal: the primary artifact already exists
        let dir = repo_dir.clone();
        let name = repo.name.clone();
        let keep = repo.retention_count.max(1) as usize;
        match tokio::task::spawn_blocking(move || retention::enforce(&dir, &name, keep)).await {
            Ok(Ok(removed)) if removed > 0 => {
                info!("Retention removed {} old backups of {}", removed, repo.name)
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Retention cleanup failed for {}: {}", repo.name, e),
            Err(e) => error!("Retention task panicked for {}: {}", repo.name, e),
        }

        let size_path = artifact.clone();
        let size = tokio::task::spawn_blocking(move || archiver::artifact_size(&size_path))
            .await
            .unwrap_or(0);

        Ok((artifact, size))
    }

    /// 清理遗留的克隆目录
    ///
    /// 进程异常退出可能留下`.tmp-clone-*`，超过一小时的直接删除
    async fn sweep_stale_clones(&self, repo_dir: &std::path::Path) {
        let Ok(mut entries) = tokio::fs::read_dir(repo_dir).await else {
            return;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(".tmp-clone-") {
                continue;
            }
            let age = entry
                .metadata()
                .await
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|m| SystemTime::now().duration_since(m).ok());
            if matches!(age, Some(age) if age > STALE_CLONE_AGE) {
                info!("Cleaning up stale clone dir: {}", entry.path().display());
                if let Err(e) = tokio::fs::remove_dir_all(entry.path()).await {
                    warn!("Failed to remove stale clone dir: {}", e);
                }
            }
        }
    }
}

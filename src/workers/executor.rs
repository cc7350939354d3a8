// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::BackupJob;
use crate::domain::models::repo::{DomainError, Repo};
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::repo_repository::{RepoRepository, RepositoryError};
use crate::schedule::evaluator;
use crate::workers::backup_worker::BackupWorker;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info};
use uuid::Uuid;

/// 执行器错误类型
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// 该仓库已有任务在执行，手动触发被拒绝而不是排队
    #[error("A backup is already running for this repository")]
    AlreadyRunning,

    /// 仓库不存在
    #[error("Repository not found")]
    NotFound,

    /// 仓库层错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// 领域错误
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// 单仓库互斥的占位凭据
///
/// 持有期间该仓库处于Running状态，释放（包括panic展开）时
/// 仓库回到Idle，可再次被调度
pub struct RunningGuard {
    running: Arc<DashMap<Uuid, ()>>,
    repo_id: Uuid,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.remove(&self.repo_id);
    }
}

/// 任务执行器
///
/// 调度核心的运行时引擎：评估哪些仓库到期、为到期仓库派发
/// 备份流水线，并保证每个仓库同一时刻至多一个在途任务。
/// 不同仓库的流水线彼此并发，互不阻塞；到期但被占用的仓库
/// 本轮跳过，下一轮重新评估，不排队。
pub struct JobExecutor<R, J>
where
    R: RepoRepository + 'static,
    J: JobRepository + 'static,
{
    repo_repo: Arc<R>,
    job_repo: Arc<J>,
    worker: Arc<BackupWorker<R, J>>,
    running: Arc<DashMap<Uuid, ()>>,
}

impl<R, J> JobExecutor<R, J>
where
    R: RepoRepository + 'static,
    J: JobRepository + 'static,
{
    /// 创建新的任务执行器实例
    ///
    /// # 参数
    ///
    /// * `repo_repo` - 备份仓库存储
    /// * `job_repo` - 任务记录存储
    /// * `worker` - 备份流水线工作器
    pub fn new(repo_repo: Arc<R>, job_repo: Arc<J>, worker: Arc<BackupWorker<R, J>>) -> Self {
        Self {
            repo_repo,
            job_repo,
            worker,
            running: Arc::new(DashMap::new()),
        }
    }

    /// 该仓库当前是否有在途任务
    pub fn is_running(&self, repo_id: Uuid) -> bool {
        self.running.contains_key(&repo_id)
    }

    /// 原子地占用一个仓库
    ///
    /// # 返回值
    ///
    /// * `Some(RunningGuard)` - 占用成功
    /// * `None` - 该仓库已被占用
    fn try_claim(&self, repo_id: Uuid) -> Option<RunningGuard> {
        use dashmap::mapref::entry::Entry;
        match self.running.entry(repo_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(RunningGuard {
                    running: self.running.clone(),
                    repo_id,
                })
            }
        }
    }

    /// 评估并派发全部到期任务
    ///
    /// 每轮时钟滴答调用一次：遍历所有激活仓库，把到期且空闲的
    /// 仓库交给流水线执行后立即返回，不等待任何任务完成。
    /// 单个仓库的派发失败只影响它自己。
    ///
    /// # 参数
    ///
    /// * `now` - 当前时刻
    ///
    /// # 返回值
    ///
    /// * `Ok(usize)` - 本轮派发的任务数量
    /// * `Err(ExecutorError)` - 仓库列表无法读取
    pub async fn run_due_jobs(&self, now: DateTime<Utc>) -> Result<usize, ExecutorError> {
        let repos = self.repo_repo.list_active().await?;

        let mut dispatched = 0;
        for repo in repos {
            let last_run = repo.last_backup_at.map(|t| t.with_timezone(&Utc));
            if !evaluator::is_due(&repo.schedule, last_run, now) {
                continue;
            }

            let Some(guard) = self.try_claim(repo.id) else {
                debug!("Repository {} still running, skipped this tick", repo.id);
                continue;
            };

            match self.dispatch(repo, guard).await {
                Ok(_) => dispatched += 1,
                Err(e) => error!("Failed to dispatch due backup: {}", e),
            }
        }

        Ok(dispatched)
    }

    /// 手动触发一次备份
    ///
    /// 绕过到期评估直接派发。仓库已有在途任务时返回
    /// `AlreadyRunning`，不排队。
    ///
    /// # 参数
    ///
    /// * `repo_id` - 目标仓库ID
    ///
    /// # 返回值
    ///
    /// * `Ok(BackupJob)` - 已创建并开始执行的任务记录
    /// * `Err(ExecutorError)` - 仓库不存在或已在执行
    pub async fn trigger_now(&self, repo_id: Uuid) -> Result<BackupJob, ExecutorError> {
        let repo = self
            .repo_repo
            .find_by_id(repo_id)
            .await?
            .ok_or(ExecutorError::NotFound)?;

        let guard = self.try_claim(repo.id).ok_or(ExecutorError::AlreadyRunning)?;
        self.dispatch(repo, guard).await
    }

    /// 删除仓库，等待在途任务结束后一并清除备份产物
    ///
    /// 删除本身也要占用该仓库的执行名额：拿到`RunningGuard`之后
    /// 才移除数据行和备份产物，期间调度与手动触发都无法为该仓库
    /// 派发新任务。
    ///
    /// # 参数
    ///
    /// * `repo_id` - 目标仓库ID
    /// * `max_wait` - 等待在途任务的上限，超时则拒绝删除
    pub async fn delete_repo(&self, repo_id: Uuid, max_wait: Duration) -> Result<(), ExecutorError> {
        let repo = self
            .repo_repo
            .find_by_id(repo_id)
            .await?
            .ok_or(ExecutorError::NotFound)?;

        let deadline = tokio::time::Instant::now() + max_wait;
        let _guard = loop {
            if let Some(guard) = self.try_claim(repo_id) {
                break guard;
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ExecutorError::AlreadyRunning);
            }
            sleep(Duration::from_millis(250)).await;
        };

        self.repo_repo.delete(repo_id).await?;
        self.worker.remove_artifacts(&repo).await;
        info!("Repository {} deleted", repo_id);
        Ok(())
    }

    /// 创建任务记录并派发流水线
    ///
    /// 任务以Running状态落库后在独立的tokio任务上执行，
    /// 调用方立即拿回任务记录
    async fn dispatch(&self, repo: Repo, guard: RunningGuard) -> Result<BackupJob, ExecutorError> {
        let job = BackupJob::new(repo.id, repo.user_id).start()?;
        let job = self.job_repo.create(&job).await?;

        counter!("backup_jobs_dispatched_total").increment(1);
        info!("Dispatching backup job {} for repository {}", job.id, repo.id);

        let worker = self.worker.clone();
        let spawned_job = job.clone();
        tokio::spawn(async move {
            worker.execute(repo, spawned_job, guard).await;
        });

        Ok(job)
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;

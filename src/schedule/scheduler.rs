// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::repo_repository::RepoRepository;
use crate::workers::executor::JobExecutor;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{error, info};

/// 调度器活性状态
///
/// 记录最近一次滴答的时刻，供健康检查判断调度循环是否还活着
#[derive(Debug, Default)]
pub struct SchedulerStatus {
    last_tick: AtomicI64,
}

impl SchedulerStatus {
    /// 记录一次滴答
    pub fn beat(&self) {
        self.last_tick.store(Utc::now().timestamp(), Ordering::Relaxed);
    }

    /// 最近一次滴答是否在给定窗口内
    pub fn alive_within(&self, window_secs: i64) -> bool {
        let last = self.last_tick.load(Ordering::Relaxed);
        last > 0 && Utc::now().timestamp() - last <= window_secs
    }
}

/// 备份调度器
///
/// 单个进程级定时循环：每个滴答把当前时刻交给执行器做一轮
/// 到期评估与派发。循环本身从不等待任务完成，也不因单个
/// 仓库的失败而停止。
pub struct BackupScheduler<R, J>
where
    R: RepoRepository + 'static,
    J: JobRepository + 'static,
{
    executor: Arc<JobExecutor<R, J>>,
    status: Arc<SchedulerStatus>,
    tick: Duration,
}

impl<R, J> BackupScheduler<R, J>
where
    R: RepoRepository + 'static,
    J: JobRepository + 'static,
{
    /// 创建新的备份调度器实例
    ///
    /// # 参数
    ///
    /// * `executor` - 任务执行器
    /// * `tick` - 滴答间隔
    pub fn new(executor: Arc<JobExecutor<R, J>>, tick: Duration) -> Self {
        Self {
            executor,
            status: Arc::new(SchedulerStatus::default()),
            tick,
        }
    }

    /// 调度器的活性状态句柄
    pub fn status(&self) -> Arc<SchedulerStatus> {
        self.status.clone()
    }

    /// 启动调度循环
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(&self) -> JoinHandle<()> {
        let executor = self.executor.clone();
        let status = self.status.clone();
        let tick = self.tick;

        tokio::spawn(async move {
            info!("Backup scheduler started, tick every {:?}", tick);
            let mut interval = interval(tick);

            loop {
                interval.tick().await;
                status.beat();

                match executor.run_due_jobs(Utc::now()).await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Scheduler tick dispatched {} backup jobs", count);
                        }
                    }
                    Err(e) => {
                        error!("Scheduler tick failed: {}", e);
                    }
                }
            }
        })
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum::Extension;
use axum_test::TestServer;
use gitvaultrs::backup::fetcher::SourceFetcher;
use gitvaultrs::backup::verify::GithubVerifier;
use gitvaultrs::backup::BackupError;
use gitvaultrs::config::settings::Settings;
use gitvaultrs::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use gitvaultrs::infrastructure::repositories::repo_repo_impl::RepoRepositoryImpl;
use gitvaultrs::presentation::routes;
use gitvaultrs::schedule::scheduler::SchedulerStatus;
use gitvaultrs::workers::backup_worker::BackupWorker;
use gitvaultrs::workers::executor::JobExecutor;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// 本地源获取器
///
/// 不访问网络，直接在目标目录写入固定内容；
/// 地址包含`unreachable`时模拟克隆失败
pub struct LocalFetcher;

#[async_trait]
impl SourceFetcher for LocalFetcher {
    async fn fetch(
        &self,
        url: &str,
        _token: Option<&str>,
        dest: &Path,
    ) -> Result<(), BackupError> {
        if url.contains("unreachable") {
            return Err(BackupError::Fetch("could not resolve host".to_string()));
        }
        std::fs::create_dir_all(dest).map_err(|e| BackupError::Fetch(e.to_string()))?;
        std::fs::write(dest.join("README.md"), "integration fixture")
            .map_err(|e| BackupError::Fetch(e.to_string()))?;
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub repo_repo: Arc<RepoRepositoryImpl>,
    pub job_repo: Arc<JobRepositoryImpl>,
    pub executor: Arc<JobExecutor<RepoRepositoryImpl, JobRepositoryImpl>>,
    pub scheduler_status: Arc<SchedulerStatus>,
    pub backup_root: TempDir,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_github("https://api.github.com").await
}

/// 构建测试应用
///
/// 使用内存SQLite和本地源获取器，GitHub API地址可指向mock服务
pub async fn create_test_app_with_github(github_api_base: &str) -> TestApp {
    // A single connection keeps the in-memory database alive and shared
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).sqlx_logging(false);
    let db = Arc::new(Database::connect(opt).await.expect("sqlite connect"));
    Migrator::up(db.as_ref(), None).await.expect("migrations");

    let repo_repo = Arc::new(RepoRepositoryImpl::new(db.clone()));
    let job_repo = Arc::new(JobRepositoryImpl::new(db.clone()));

    let backup_root = TempDir::new().expect("tempdir");
    let worker = Arc::new(BackupWorker::new(
        repo_repo.clone(),
        job_repo.clone(),
        Arc::new(LocalFetcher),
        backup_root.path().to_path_buf(),
    ));
    let executor = Arc::new(JobExecutor::new(
        repo_repo.clone(),
        job_repo.clone(),
        worker,
    ));

    let mut settings = Settings::new().expect("settings");
    settings.backup.delete_wait_secs = 2;
    let settings = Arc::new(settings);

    let verifier = Arc::new(GithubVerifier::new(github_api_base.to_string()));
    let scheduler_status = Arc::new(SchedulerStatus::default());

    let app = routes::routes()
        .layer(Extension(repo_repo.clone()))
        .layer(Extension(job_repo.clone()))
        .layer(Extension(executor.clone()))
        .layer(Extension(verifier))
        .layer(Extension(scheduler_status.clone()))
        .layer(Extension(settings));

    let server = TestServer::new(app).expect("test server");

    TestApp {
        server,
        db,
        repo_repo,
        job_repo,
        executor,
        scheduler_status,
        backup_root,
    }
}

/// 等待仓库的在途任务结束
pub async fn wait_idle(app: &TestApp, repo_id: uuid::Uuid) {
    for _ in 0..500 {
        if !app.executor.is_running(repo_id) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("backup for {} never finished", repo_id);
}

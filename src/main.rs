// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Extension;
use gitvaultrs::backup::fetcher::GitFetcher;
use gitvaultrs::backup::verify::GithubVerifier;
use gitvaultrs::config::settings::Settings;
use gitvaultrs::infrastructure::database::connection;
use gitvaultrs::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use gitvaultrs::infrastructure::repositories::repo_repo_impl::RepoRepositoryImpl;
use gitvaultrs::presentation::routes;
use gitvaultrs::schedule::scheduler::BackupScheduler;
use gitvaultrs::utils::telemetry;
use gitvaultrs::workers::backup_worker::BackupWorker;
use gitvaultrs::workers::executor::JobExecutor;
use migration::{Migrator, MigratorTrait};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting gitvaultrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    gitvaultrs::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr);

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize Components
    let repo_repo = Arc::new(RepoRepositoryImpl::new(db.clone()));
    let job_repo = Arc::new(JobRepositoryImpl::new(db.clone()));
    let verifier = Arc::new(GithubVerifier::new(settings.github.api_base.clone()));

    let backup_root = PathBuf::from(&settings.backup.root_dir);
    std::fs::create_dir_all(&backup_root)?;
    let worker = Arc::new(BackupWorker::new(
        repo_repo.clone(),
        job_repo.clone(),
        Arc::new(GitFetcher),
        backup_root,
    ));
    let executor = Arc::new(JobExecutor::new(
        repo_repo.clone(),
        job_repo.clone(),
        worker,
    ));

    // 5. Start the backup scheduler
    let scheduler = BackupScheduler::new(
        executor.clone(),
        Duration::from_secs(settings.scheduler.tick_secs),
    );
    let scheduler_status = scheduler.status();
    scheduler.start();
    info!(
        "Backup scheduler started, tick every {}s",
        settings.scheduler.tick_secs
    );

    // 6. Start HTTP server
    let app = routes::routes()
        .layer(Extension(repo_repo))
        .layer(Extension(job_repo))
        .layer(Extension(executor))
        .layer(Extension(verifier))
        .layer(Extension(scheduler_status))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

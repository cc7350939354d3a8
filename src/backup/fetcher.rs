// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::backup::BackupError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// 源获取器特质
///
/// 将远端仓库的当前状态获取到本地临时目录。每次执行都是
/// 全新的浅克隆，上游删除或重写的历史会如实反映；目标目录
/// 若残留上一次的克隆会先被丢弃，避免脏状态。
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// 获取远端仓库到指定目录
    ///
    /// # 参数
    ///
    /// * `url` - 克隆地址
    /// * `token` - 访问令牌，私有仓库需要
    /// * `dest` - 目标目录，已存在时先删除
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 克隆成功
    /// * `Err(BackupError::Authentication)` - 凭证无效
    /// * `Err(BackupError::Fetch)` - 网络不可达、仓库不存在或超时
    async fn fetch(&self, url: &str, token: Option<&str>, dest: &Path)
        -> Result<(), BackupError>;
}

/// 基于git2的源获取器
///
/// 在阻塞线程池上执行libgit2浅克隆（depth=1）
pub struct GitFetcher;

impl GitFetcher {
    /// 为私有仓库构造带令牌的克隆地址
    ///
    /// `https://github.com/user/repo` 改写为
    /// `https://<token>@github.com/user/repo`
    fn clone_url(url: &str, token: Option<&str>) -> String {
        match token {
            Some(token) if !token.trim().is_empty() => {
                if let Some(rest) = url.strip_prefix("https://github.com/") {
                    format!("https://{}@github.com/{}", token, rest)
                } else {
                    url.to_string()
                }
            }
            _ => url.to_string(),
        }
    }

    /// 把git2错误归类为认证错误或获取错误
    ///
    /// 令牌可能出现在libgit2的错误消息里（URL的一部分），
    /// 在归类前先抹掉
    fn classify(err: git2::Error, token: Option<&str>) -> BackupError {
        let mut message = err.message().to_string();
        if let Some(token) = token {
            if !token.is_empty() {
                message = message.replace(token, "***");
            }
        }

        let lowered = message.to_lowercase();
        let is_auth = err.code() == git2::ErrorCode::Auth
            || lowered.contains("authentication")
            || lowered.contains("401")
            || lowered.contains("403");

        if is_auth {
            BackupError::Authentication(message)
        } else {
            BackupError::Fetch(message)
        }
    }
}

#[async_trait]
impl SourceFetcher for GitFetcher {
    async fn fetch(
        &self,
        url: &str,
        token: Option<&str>,
        dest: &Path,
    ) -> Result<(), BackupError> {
        // Discard any stale clone so deleted upstream history is reflected
        if dest.exists() {
            tokio::fs::remove_dir_all(dest)
                .await
                .map_err(|e| BackupError::Fetch(format!("failed to clear clone dir: {}", e)))?;
        }

        let clone_url = Self::clone_url(url, token);
        let target: PathBuf = dest.to_path_buf();
        let owned_token = token.map(|t| t.to_string());

        let result = tokio::task::spawn_blocking(move || {
            let mut fetch_options = git2::FetchOptions::new();
            fetch_options.depth(1);

            let mut builder = git2::build::RepoBuilder::new();
            builder.fetch_options(fetch_options);
            builder.clone(&clone_url, &target).map(|_| ())
        })
        .await
        .map_err(|e| BackupError::Fetch(format!("clone task panicked: {}", e)))?;

        match result {
            Ok(()) => {
                info!("Repository cloned to {}", dest.display());
                Ok(())
            }
            Err(err) => Err(Self::classify(err, owned_token.as_deref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_url_embeds_token() {
        assert_eq!(
            GitFetcher::clone_url("https://github.com/a/b.git", Some("tok123")),
            "https://tok123@github.com/a/b.git"
        );
        assert_eq!(
            GitFetcher::clone_url("https://github.com/a/b.git", None),
            "https://github.com/a/b.git"
        );
        // Blank tokens are treated as absent
        assert_eq!(
            GitFetcher::clone_url("https://github.com/a/b.git", Some("  ")),
            "https://github.com/a/b.git"
        );
        // Non-GitHub URLs are left untouched
        assert_eq!(
            GitFetcher::clone_url("https://gitlab.com/a/b.git", Some("tok")),
            "https://gitlab.com/a/b.git"
        );
    }

    #[test]
    fn test_classify_redacts_token() {
        let err = git2::Error::from_str("remote rejected https://tok123@github.com/a/b.git");
        let classified = GitFetcher::classify(err, Some("tok123"));
        let message = classified.to_string();
        assert!(!message.contains("tok123"), "{}", message);
        assert!(message.contains("***"));
    }

    #[test]
    fn test_classify_auth_keywords() {
        let err = git2::Error::from_str("authentication required for repository");
        assert!(matches!(
            GitFetcher::classify(err, None),
            BackupError::Authentication(_)
        ));

        let err = git2::Error::from_str("failed to resolve address");
        assert!(matches!(
            GitFetcher::classify(err, None),
            BackupError::Fetch(_)
        ));
    }
}

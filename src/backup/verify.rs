// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use url::Url;

/// 访问校验错误类型
#[derive(Error, Debug)]
pub enum VerifyError {
    /// 不是合法的GitHub仓库地址
    #[error("Invalid GitHub repository URL")]
    InvalidUrl,

    /// 仓库不存在或凭证不足
    #[error("Repository access failed: {0}")]
    AccessDenied(String),

    /// 请求GitHub API失败
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// GitHub仓库访问校验器
///
/// 录入仓库前的预检：解析克隆地址，调用GitHub REST API确认
/// 当前凭证（或匿名访问）能读到仓库
#[derive(Clone)]
pub struct GithubVerifier {
    client: Client,
    api_base: String,
}

impl Default for GithubVerifier {
    fn default() -> Self {
        Self::new("https://api.github.com".to_string())
    }
}

impl GithubVerifier {
    /// 创建新的校验器实例
    ///
    /// # 参数
    ///
    /// * `api_base` - GitHub API基地址，测试时可指向本地
    pub fn new(api_base: String) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("gitvaultrs/0.1.0"),
        );
        Self {
            client: Client::builder()
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
            api_base,
        }
    }

    /// 校验仓库可达性
    ///
    /// # 参数
    ///
    /// * `repo_url` - 克隆地址，必须指向github.com
    /// * `token` - 访问令牌，公共仓库可省略
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 仓库的完整名称（owner/repo）
    /// * `Err(VerifyError)` - 地址非法或无法访问
    pub async fn verify(&self, repo_url: &str, token: Option<&str>) -> Result<String, VerifyError> {
        let (owner, name) = parse_github_url(repo_url)?;

        let mut request = self
            .client
            .get(format!("{}/repos/{}/{}", self.api_base, owner, name));
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => {
                let body: serde_json::Value = response.json().await?;
                let full_name = body["full_name"]
                    .as_str()
                    .unwrap_or(&format!("{}/{}", owner, name))
                    .to_string();
                Ok(full_name)
            }
            StatusCode::NOT_FOUND => Err(VerifyError::AccessDenied(
                "repository not found or token lacks access".to_string(),
            )),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(VerifyError::AccessDenied(
                "token rejected by GitHub".to_string(),
            )),
            other => Err(VerifyError::AccessDenied(format!(
                "unexpected status {}",
                other
            ))),
        }
    }
}

/// 从克隆地址解析出owner和仓库名
fn parse_github_url(repo_url: &str) -> Result<(String, String), VerifyError> {
    let parsed = Url::parse(repo_url).map_err(|_| VerifyError::InvalidUrl)?;
    if parsed.host_str().map(|h| h.to_lowercase()) != Some("github.com".to_string()) {
        return Err(VerifyError::InvalidUrl);
    }

    let mut segments = parsed
        .path_segments()
        .ok_or(VerifyError::InvalidUrl)?
        .filter(|s| !s.is_empty());
    let owner = segments.next().ok_or(VerifyError::InvalidUrl)?.to_string();
    let name = segments
        .next()
        .ok_or(VerifyError::InvalidUrl)?
        .trim_end_matches(".git")
        .to_string();

    Ok((owner, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_url() {
        assert_eq!(
            parse_github_url("https://github.com/rust-lang/rust.git").unwrap(),
            ("rust-lang".to_string(), "rust".to_string())
        );
        assert_eq!(
            parse_github_url("https://github.com/a/b/").unwrap(),
            ("a".to_string(), "b".to_string())
        );
        assert!(parse_github_url("https://gitlab.com/a/b").is_err());
        assert!(parse_github_url("https://github.com/onlyowner").is_err());
        assert!(parse_github_url("not a url").is_err());
    }
}

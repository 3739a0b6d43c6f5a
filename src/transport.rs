//! HTTP トランスポートの抽象化と reqwest 実装。
//!
//! 接続管理・TLS・タイムアウトはトランスポート側の責務で、コアは関与しない。

use crate::error::ProdaError;
use crate::response::parse_body;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::error;

/// HttpResponse はステータスコードと解析済みボディの組を表す。
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

/// HttpTransport は PRODA への HTTP 送信を抽象化する（テスト用に差し替え可能）。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// JSON ボディ付きの PUT を送信する。
    async fn put_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<HttpResponse, ProdaError>;

    /// フォームエンコードされたボディで POST を送信する。
    async fn post_form(
        &self,
        url: &str,
        params: &[(&'static str, &str)],
    ) -> Result<HttpResponse, ProdaError>;
}

/// reqwest ベースのデフォルト HTTP トランスポート。
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// 指定タイムアウトを持つ HTTP クライアントを内部で生成する。
    pub fn new(timeout_secs: u64) -> Result<Self, ProdaError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProdaError::Http(e.to_string()))?;
        Ok(Self { http_client })
    }

    async fn read_response(response: reqwest::Response) -> Result<HttpResponse, ProdaError> {
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            error!(error = %e, "レスポンスボディの読み込みに失敗しました");
            ProdaError::Http(e.to_string())
        })?;
        Ok(HttpResponse {
            status,
            body: parse_body(&text),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn put_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<HttpResponse, ProdaError> {
        let mut request = self.http_client.put(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.json(body).send().await.map_err(|e| {
            error!(error = %e, url = %url, "PRODA への PUT リクエストに失敗しました");
            ProdaError::Http(e.to_string())
        })?;

        Self::read_response(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        params: &[(&'static str, &str)],
    ) -> Result<HttpResponse, ProdaError> {
        let response = self
            .http_client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "PRODA への POST リクエストに失敗しました");
                ProdaError::Http(e.to_string())
            })?;

        Self::read_response(response).await
    }
}

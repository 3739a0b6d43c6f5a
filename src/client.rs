//! PRODA クライアントのトレイトと HTTP 実装。
//!
//! 各操作は「リクエスト組み立て → 送信 → レスポンス解釈」を 1 回ずつ行う。
//! 再試行やトークンのキャッシュはしない。

use crate::config::{ProdaConfig, UrlParams, UrlTemplate};
use crate::context::ClientContext;
use crate::error::ProdaError;
use crate::id::{IdGenerator, UuidGenerator};
use crate::request::{
    build_access_token_request, build_device_activation_request, build_device_refresh_request,
    DeviceRequest, HEADER_CORRELATION_ID, HEADER_MESSAGE_ID,
};
use crate::response::{interpret_access_token_response, interpret_device_activation_response};
use crate::transport::{HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

#[cfg(feature = "mock")]
use mockall::automock;

/// ProdaClient は PRODA のデバイスアクティベーションとアクセストークン取得を提供するトレイト。
///
/// `HttpProdaClient` がデフォルト実装。テスト時は `MockProdaClient` が使用可能。
#[cfg_attr(feature = "mock", automock)]
#[async_trait]
pub trait ProdaClient: Send + Sync {
    /// ワンタイムコードでデバイスをアクティベートし、JWK を登録する。
    async fn activate_device(&self, ctx: &ClientContext) -> Result<Value, ProdaError>;

    /// デバイスに登録済みの鍵を新しい JWK で置き換える。
    async fn refresh_device(&self, ctx: &ClientContext) -> Result<Value, ProdaError>;

    /// 署名済みアサーションを提示してアクセストークンを取得する。
    ///
    /// 署名に失敗した場合はネットワーク呼び出しを行わずにエラーを返す。
    async fn get_access_token(&self, ctx: &ClientContext) -> Result<Value, ProdaError>;
}

/// HttpProdaClient は `HttpTransport` を使った ProdaClient の実装。
///
/// 設定以外の状態を持たない。
pub struct HttpProdaClient {
    config: ProdaConfig,
    transport: Arc<dyn HttpTransport>,
    ids: Arc<dyn IdGenerator>,
}

impl HttpProdaClient {
    /// reqwest トランスポートを使う HttpProdaClient を生成する。
    pub fn new(config: ProdaConfig) -> Result<Self, ProdaError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout_secs)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// カスタムトランスポートを使う HttpProdaClient を生成する。
    pub fn with_transport(config: ProdaConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            ids: Arc::new(UuidGenerator),
        }
    }

    /// メッセージ ID / 相関 ID の生成元を差し替える。
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &ProdaConfig {
        &self.config
    }

    async fn send_device_request(
        &self,
        operation: &'static str,
        url: &str,
        request: DeviceRequest,
    ) -> Result<Value, ProdaError> {
        debug!(
            operation,
            url = %url,
            message_id = request.header(HEADER_MESSAGE_ID).unwrap_or_default(),
            correlation_id = request.header(HEADER_CORRELATION_ID).unwrap_or_default(),
            "PRODA デバイス API を呼び出します"
        );

        let response = self
            .transport
            .put_json(url, &request.headers, &request.body)
            .await?;

        interpret_device_activation_response(response.status, response.body).map_err(|e| {
            error!(
                operation,
                status = response.status,
                code = e.error_code().unwrap_or("-"),
                error = %e,
                "PRODA デバイス API がエラーを返しました"
            );
            e
        })
    }
}

#[async_trait]
impl ProdaClient for HttpProdaClient {
    async fn activate_device(&self, ctx: &ClientContext) -> Result<Value, ProdaError> {
        let url = self.config.resolve_url(
            UrlTemplate::ActivateDevice,
            &UrlParams {
                device_name: &ctx.device_name,
                org_id: &ctx.organisation_id,
            },
        )?;
        let request = build_device_activation_request(ctx, self.ids.as_ref());
        let result = self
            .send_device_request("activate_device", &url, request)
            .await?;

        debug!(device_name = %ctx.device_name, "デバイスをアクティベートしました");
        Ok(result)
    }

    async fn refresh_device(&self, ctx: &ClientContext) -> Result<Value, ProdaError> {
        let url = self.config.resolve_url(
            UrlTemplate::RefreshDeviceKey,
            &UrlParams {
                device_name: &ctx.device_name,
                org_id: &ctx.organisation_id,
            },
        )?;
        let request = build_device_refresh_request(ctx, self.ids.as_ref());
        let result = self
            .send_device_request("refresh_device", &url, request)
            .await?;

        debug!(device_name = %ctx.device_name, "デバイス鍵をリフレッシュしました");
        Ok(result)
    }

    async fn get_access_token(&self, ctx: &ClientContext) -> Result<Value, ProdaError> {
        let url = self
            .config
            .resolve_url(UrlTemplate::AuthorisationServiceRequest, &UrlParams::default())?;

        // iat と exp は同じ時刻から計算する
        let now = Utc::now().timestamp();
        let request = build_access_token_request(ctx, now).map_err(|e| {
            error!(device_name = %ctx.device_name, error = %e, "JWT アサーションの署名に失敗しました");
            e
        })?;

        debug!(
            client_id = %ctx.client_id,
            device_name = %ctx.device_name,
            algorithm = %ctx.algorithm,
            url = %url,
            "JWT Bearer フローでアクセストークンを取得します"
        );

        let response = self
            .transport
            .post_form(&url, &request.form_params())
            .await?;

        let result = interpret_access_token_response(response.status, response.body).map_err(|e| {
            error!(
                status = response.status,
                code = e.error_code().unwrap_or("-"),
                error = %e,
                "アクセストークン取得に失敗しました"
            );
            e
        })?;

        debug!(client_id = %ctx.client_id, "アクセストークンを取得しました");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProdaUrls;
    use crate::error_code::{AccessTokenFailure, DeviceActivationFailure};
    use crate::request::JWT_BEARER_GRANT_TYPE;
    use crate::test_support::test_key;
    use crate::transport::HttpResponse;
    use serde_json::json;
    use std::sync::Mutex;

    /// 送信内容を記録し、固定レスポンスを返すトランスポート。
    #[derive(Default)]
    struct RecordingTransport {
        response: Option<HttpResponse>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    #[derive(Debug, Clone)]
    struct RecordedCall {
        method: &'static str,
        url: String,
        headers: Vec<(&'static str, String)>,
        body: Value,
        form: Vec<(String, String)>,
    }

    impl RecordingTransport {
        fn responding(status: u16, body: Value) -> Arc<Self> {
            Arc::new(Self {
                response: Some(HttpResponse { status, body }),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        fn reply(&self) -> Result<HttpResponse, ProdaError> {
            self.response
                .clone()
                .ok_or_else(|| ProdaError::Http("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn put_json(
            &self,
            url: &str,
            headers: &[(&'static str, String)],
            body: &Value,
        ) -> Result<HttpResponse, ProdaError> {
            self.calls.lock().unwrap().push(RecordedCall {
                method: "PUT",
                url: url.to_string(),
                headers: headers.to_vec(),
                body: body.clone(),
                form: Vec::new(),
            });
            self.reply()
        }

        async fn post_form(
            &self,
            url: &str,
            params: &[(&'static str, &str)],
        ) -> Result<HttpResponse, ProdaError> {
            self.calls.lock().unwrap().push(RecordedCall {
                method: "POST",
                url: url.to_string(),
                headers: Vec::new(),
                body: Value::Null,
                form: params
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            });
            self.reply()
        }
    }

    fn make_config() -> ProdaConfig {
        ProdaConfig::new(ProdaUrls {
            activate_device: "https://proda.test/{version}/devices/{device_name}/jwk".to_string(),
            refresh_device_key: "https://proda.test/{version}/orgs/{org_id}/devices/{device_name}/jwk"
                .to_string(),
            authorisation_service_request: "https://proda.test/token".to_string(),
        })
    }

    fn make_ctx() -> ClientContext {
        ClientContext::new("DEV1", "ORG123", "client-1")
            .with_one_time_activation_code("ABC999")
            .with_json_web_key(test_key().jwk())
            .with_private_key(&test_key().private_pem)
            .with_token_audience("tcsi")
    }

    fn header<'a>(call: &'a RecordedCall, name: &str) -> Option<&'a str> {
        call.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn test_activate_device_success() {
        let transport = RecordingTransport::responding(200, json!({"deviceStatus": "ACTIVE"}));
        let client = HttpProdaClient::with_transport(make_config(), transport.clone());

        let result = client.activate_device(&make_ctx()).await.unwrap();
        assert_eq!(result, json!({"deviceStatus": "ACTIVE"}));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "PUT");
        assert_eq!(calls[0].url, "https://proda.test/v1/devices/DEV1/jwk");
        assert_eq!(calls[0].body["orgId"], "ORG123");
        assert_eq!(calls[0].body["otac"], "ABC999");
        assert_eq!(calls[0].body["key"], test_key().jwk());
        assert_eq!(header(&calls[0], "dhs-auditId"), Some("ORG123"));
        assert!(header(&calls[0], "Authorization").is_none());
    }

    #[tokio::test]
    async fn test_activate_device_classified_error() {
        let body = json!({"errors": {"code": "DE.7", "message": "invalid otac"}});
        let transport = RecordingTransport::responding(400, body.clone());
        let client = HttpProdaClient::with_transport(make_config(), transport);

        let err = client.activate_device(&make_ctx()).await.unwrap_err();
        assert_eq!(
            err.device_activation_failure(),
            Some(DeviceActivationFailure::InvalidActivationCode)
        );
        assert_eq!(err.response_body(), Some(&body));
    }

    #[tokio::test]
    async fn test_refresh_device_sends_bare_jwk_with_bearer() {
        let transport = RecordingTransport::responding(200, json!({"keyExpiry": "2027-01-01"}));
        let client = HttpProdaClient::with_transport(make_config(), transport.clone());
        let ctx = make_ctx().with_access_token("current-token");

        client.refresh_device(&ctx).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].url, "https://proda.test/v1/orgs/ORG123/devices/DEV1/jwk");
        assert_eq!(calls[0].body, test_key().jwk());
        assert_eq!(header(&calls[0], "Authorization"), Some("Bearer current-token"));
    }

    #[tokio::test]
    async fn test_refresh_device_unclassified_error() {
        let transport = RecordingTransport::responding(500, json!({"message": "boom"}));
        let client = HttpProdaClient::with_transport(make_config(), transport);

        let err = client.refresh_device(&make_ctx()).await.unwrap_err();
        assert_eq!(
            err.device_activation_failure(),
            Some(DeviceActivationFailure::Unclassified)
        );
    }

    #[tokio::test]
    async fn test_get_access_token_success() {
        let token_body = json!({"access_token": "at", "token_type": "bearer", "expires_in": 3600});
        let transport = RecordingTransport::responding(200, token_body.clone());
        let client = HttpProdaClient::with_transport(make_config(), transport.clone());

        let result = client.get_access_token(&make_ctx()).await.unwrap();
        assert_eq!(result, token_body);

        let calls = transport.calls();
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].url, "https://proda.test/token");
        assert_eq!(
            calls[0].form[0],
            ("grant_type".to_string(), JWT_BEARER_GRANT_TYPE.to_string())
        );
        assert_eq!(calls[0].form[1].0, "assertion");
        assert_eq!(calls[0].form[2], ("client_id".to_string(), "client-1".to_string()));
    }

    #[tokio::test]
    async fn test_get_access_token_classified_errors() {
        for (code, expected) in [
            ("mapping_error", AccessTokenFailure::MappingError),
            ("device_error", AccessTokenFailure::DeviceError),
            ("invalid_grant", AccessTokenFailure::Unclassified),
        ] {
            let transport = RecordingTransport::responding(400, json!({"error": code}));
            let client = HttpProdaClient::with_transport(make_config(), transport);
            let err = client.get_access_token(&make_ctx()).await.unwrap_err();
            assert_eq!(err.access_token_failure(), Some(expected));
        }
    }

    #[tokio::test]
    async fn test_get_access_token_signing_error_before_network() {
        let transport = RecordingTransport::responding(200, json!({}));
        let client = HttpProdaClient::with_transport(make_config(), transport.clone());
        let ctx = ClientContext::new("DEV1", "ORG123", "client-1").with_token_audience("tcsi");

        let err = client.get_access_token(&ctx).await.unwrap_err();
        assert!(matches!(err, ProdaError::Signing(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_propagated() {
        let transport = Arc::new(RecordingTransport::default());
        let client = HttpProdaClient::with_transport(make_config(), transport);

        let err = client.activate_device(&make_ctx()).await.unwrap_err();
        assert!(matches!(err, ProdaError::Http(_)));
    }

    #[tokio::test]
    async fn test_custom_id_generator() {
        struct FixedIds;
        impl IdGenerator for FixedIds {
            fn generate(&self) -> String {
                "fixed".to_string()
            }
        }

        let transport = RecordingTransport::responding(200, json!({}));
        let client = HttpProdaClient::with_transport(make_config(), transport.clone())
            .with_id_generator(Arc::new(FixedIds));
        client.activate_device(&make_ctx()).await.unwrap();

        let calls = transport.calls();
        assert_eq!(header(&calls[0], "dhs-messageId"), Some("urn:uuid:fixed"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = make_config();
        config.urls.activate_device = String::new();
        assert!(matches!(
            HttpProdaClient::new(config),
            Err(ProdaError::Config(_))
        ));
    }

    #[test]
    fn test_new_client_success() {
        let client = HttpProdaClient::new(make_config()).unwrap();
        assert_eq!(client.config().api_version, "v1");
    }
}

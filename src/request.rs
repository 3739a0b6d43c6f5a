//! 各操作のリクエスト（ヘッダー・ボディ・フォームパラメータ）を組み立てる。
//!
//! ここでの副作用は ID 生成（乱数）と呼び出し側が渡す時刻のみで、
//! ネットワーク I/O やログ出力は行わない。入力値の検証もしない。
//! 不正な値はそのまま送信され、ブローカー側のエラーコードとして返ってくる。

use crate::assertion::sign_assertion;
use crate::context::ClientContext;
use crate::error::ProdaError;
use crate::id::{urn_uuid, IdGenerator};
use serde_json::{json, Value};

/// JWT Bearer グラント (RFC 7523) の grant_type。
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// dhs-auditIdType / dhs-subjectIdType に入る識別子種別。
pub const PRODA_ORG_ID_TYPE: &str = "http://humanservices.gov.au/PRODA/org";

pub const HEADER_AUDIT_ID: &str = "dhs-auditId";
pub const HEADER_AUDIT_ID_TYPE: &str = "dhs-auditIdType";
pub const HEADER_SUBJECT_ID: &str = "dhs-subjectId";
pub const HEADER_SUBJECT_ID_TYPE: &str = "dhs-subjectIdType";
pub const HEADER_PRODUCT_ID: &str = "dhs-productId";
pub const HEADER_MESSAGE_ID: &str = "dhs-messageId";
pub const HEADER_CORRELATION_ID: &str = "dhs-correlationId";

/// DeviceRequest はデバイスアクティベーション / リフレッシュの PUT リクエストを表す。
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRequest {
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

impl DeviceRequest {
    /// ヘッダー値を名前で引く。名前は大文字小文字を区別しない。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// AccessTokenRequest はトークンエンドポイントに送るフォームパラメータを表す。
///
/// JSON ではなく `application/x-www-form-urlencoded` で送信する。
#[derive(Clone, PartialEq, Eq)]
pub struct AccessTokenRequest {
    pub grant_type: String,
    pub assertion: String,
    pub client_id: String,
}

impl AccessTokenRequest {
    pub fn form_params(&self) -> [(&'static str, &str); 3] {
        [
            ("grant_type", self.grant_type.as_str()),
            ("assertion", self.assertion.as_str()),
            ("client_id", self.client_id.as_str()),
        ]
    }
}

// アサーションは再利用可能な資格情報なので Debug に出さない
impl std::fmt::Debug for AccessTokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenRequest")
            .field("grant_type", &self.grant_type)
            .field("assertion", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// デバイス系 API 共通のヘッダーを組み立てる。
///
/// メッセージ ID と相関 ID は呼び出しごとに新しく生成する。
pub fn device_headers(ctx: &ClientContext, ids: &dyn IdGenerator) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        ("Accept-Encoding", "gzip,deflate".to_string()),
        ("Content-Type", "application/json".to_string()),
        (HEADER_AUDIT_ID, ctx.organisation_id.clone()),
        (HEADER_AUDIT_ID_TYPE, PRODA_ORG_ID_TYPE.to_string()),
        (HEADER_SUBJECT_ID, ctx.device_name.clone()),
        (HEADER_SUBJECT_ID_TYPE, PRODA_ORG_ID_TYPE.to_string()),
        (HEADER_PRODUCT_ID, ctx.client_id.clone()),
        (HEADER_MESSAGE_ID, urn_uuid(ids)),
        (HEADER_CORRELATION_ID, urn_uuid(ids)),
    ];

    if let Some(token) = ctx.bearer_token() {
        headers.push(("Authorization", format!("Bearer {token}")));
    }

    headers
}

/// デバイスアクティベーションのリクエストを組み立てる。
///
/// ボディは `{"orgId", "otac", "key"}`。
pub fn build_device_activation_request(
    ctx: &ClientContext,
    ids: &dyn IdGenerator,
) -> DeviceRequest {
    DeviceRequest {
        headers: device_headers(ctx, ids),
        body: json!({
            "orgId": ctx.organisation_id,
            "otac": ctx.one_time_activation_code,
            "key": ctx.json_web_key,
        }),
    }
}

/// デバイス鍵リフレッシュのリクエストを組み立てる。ボディは JWK そのもの。
pub fn build_device_refresh_request(ctx: &ClientContext, ids: &dyn IdGenerator) -> DeviceRequest {
    DeviceRequest {
        headers: device_headers(ctx, ids),
        body: ctx.json_web_key.clone(),
    }
}

/// アクセストークン取得のフォームパラメータを組み立てる。
///
/// `now` 時点で新しいアサーションに署名する。
pub fn build_access_token_request(
    ctx: &ClientContext,
    now: i64,
) -> Result<AccessTokenRequest, ProdaError> {
    Ok(AccessTokenRequest {
        grant_type: JWT_BEARER_GRANT_TYPE.to_string(),
        assertion: sign_assertion(ctx, now)?,
        client_id: ctx.client_id.clone(),
    })
}

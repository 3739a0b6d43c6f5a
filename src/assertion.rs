//! PRODA トークンエンドポイントに提示する自己発行 JWT アサーション。
//!
//! Claims:
//!  - `iss`       = 組織 ID
//!  - `sub`       = デバイス名
//!  - `aud`       = `https://proda.humanservices.gov.au`
//!  - `token.aud` = 依拠当事者のオーディエンス文字列
//!  - `iat`       = 発行時刻
//!  - `exp`       = 発行時刻 + 3600 秒
//!
//! Headers:
//!  - `alg` = RS256 / RS384 / RS512
//!  - `kid` = デバイス名

use crate::context::ClientContext;
use crate::error::ProdaError;
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// アサーションの `aud` に固定で入る PRODA の識別子。
pub const PRODA_AUDIENCE: &str = "https://proda.humanservices.gov.au";

/// アサーションの有効期間（秒）。
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// AssertionClaims は JWT アサーションの Claims を表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    #[serde(rename = "token.aud")]
    pub token_aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    /// `now` を発行時刻として Claims を組み立てる。`exp` は常に `iat + 3600`。
    ///
    /// `exp` が i64 に収まらない場合は `ProdaError::Signing` を返す。
    pub fn new(ctx: &ClientContext, token_audience: &str, now: i64) -> Result<Self, ProdaError> {
        let exp = now.checked_add(ASSERTION_LIFETIME_SECS).ok_or_else(|| {
            ProdaError::Signing(format!("発行時刻 {now} から有効期限を計算できません"))
        })?;
        Ok(Self {
            iss: ctx.organisation_id.clone(),
            sub: ctx.device_name.clone(),
            aud: PRODA_AUDIENCE.to_string(),
            token_aud: token_audience.to_string(),
            iat: now,
            exp,
        })
    }
}

/// 署名済み JWT アサーションを生成する。
///
/// 呼び出しごとに新しく生成し、キャッシュはしない。
///
/// # エラー
///
/// 秘密鍵が未設定・不正、依拠当事者のオーディエンスが未設定、または `now` から
/// 有効期限を計算できない場合は `ProdaError::Signing` を返す。
pub fn sign_assertion(ctx: &ClientContext, now: i64) -> Result<String, ProdaError> {
    let private_key = ctx
        .private_key
        .as_ref()
        .ok_or_else(|| ProdaError::Signing("秘密鍵が設定されていません".to_string()))?;

    let token_audience = ctx
        .token_audience
        .as_deref()
        .filter(|aud| !aud.is_empty())
        .ok_or_else(|| {
            ProdaError::Signing("token.aud (依拠当事者オーディエンス) が設定されていません".to_string())
        })?;

    let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())
        .map_err(|e| ProdaError::Signing(format!("RSA 秘密鍵を読み込めません: {e}")))?;

    let mut header = Header::new(ctx.algorithm.to_jwt_algorithm());
    header.kid = Some(ctx.device_name.clone());

    let claims = AssertionClaims::new(ctx, token_audience, now)?;

    encode(&header, &claims, &key).map_err(|e| ProdaError::Signing(e.to_string()))
}

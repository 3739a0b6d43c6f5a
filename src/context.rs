//! 1 回の操作に必要なクライアント情報。

use crate::error::ProdaError;
use secrecy::{Secret, SecretString};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// SigningAlgorithm は JWT アサーションの署名アルゴリズムを表す。
///
/// PRODA が受け付けるのは RSA + SHA-2 の 3 種類のみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    #[default]
    Rs256,
    Rs384,
    Rs512,
}

impl SigningAlgorithm {
    /// JWT ヘッダーの `alg` に入る名前を返す。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
        }
    }

    pub(crate) fn to_jwt_algorithm(self) -> jsonwebtoken::Algorithm {
        match self {
            Self::Rs256 => jsonwebtoken::Algorithm::RS256,
            Self::Rs384 => jsonwebtoken::Algorithm::RS384,
            Self::Rs512 => jsonwebtoken::Algorithm::RS512,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = ProdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(Self::Rs256),
            "RS384" => Ok(Self::Rs384),
            "RS512" => Ok(Self::Rs512),
            other => Err(ProdaError::Signing(format!(
                "未対応の署名アルゴリズムです: {other}"
            ))),
        }
    }
}

/// ClientContext は 1 回の操作に渡す設定値を保持する。
///
/// 呼び出し側が `with_*` で組み立て、操作関数には参照で渡す。操作中に変更されることはない。
///
/// ```
/// use proda_client::{ClientContext, SigningAlgorithm};
///
/// let ctx = ClientContext::new("DEV1", "ORG123", "client-1")
///     .with_one_time_activation_code("ABC999")
///     .with_algorithm(SigningAlgorithm::Rs384);
/// assert_eq!(ctx.device_name, "DEV1");
/// ```
#[derive(Clone, Default)]
pub struct ClientContext {
    /// PRODA 上のデバイス名。JWT の `sub` と `kid` にも使われる。
    pub device_name: String,

    /// 組織 ID (RA 番号)。JWT の `iss` にも使われる。
    pub organisation_id: String,

    /// PRODA から払い出されたクライアント ID (dhs-productId)。
    pub client_id: String,

    /// デバイスアクティベーション用のワンタイムコード。
    pub one_time_activation_code: String,

    /// 既存のアクセストークン。空でなければ Authorization ヘッダーに載せる。
    pub access_token: Option<String>,

    /// PEM 形式の RSA 秘密鍵。
    pub private_key: Option<SecretString>,

    pub algorithm: SigningAlgorithm,

    /// デバイスに紐付ける公開鍵の JWK 表現。
    pub json_web_key: Value,

    /// 依拠当事者 (relying party) のオーディエンス文字列。JWT の `token.aud` になる。
    pub token_audience: Option<String>,
}

impl ClientContext {
    /// 識別子 3 つを指定して ClientContext を生成する。残りは空で初期化される。
    pub fn new(device_name: &str, organisation_id: &str, client_id: &str) -> Self {
        Self {
            device_name: device_name.to_string(),
            organisation_id: organisation_id.to_string(),
            client_id: client_id.to_string(),
            json_web_key: Value::Null,
            ..Default::default()
        }
    }

    /// ワンタイムアクティベーションコードを設定する。
    pub fn with_one_time_activation_code(mut self, code: &str) -> Self {
        self.one_time_activation_code = code.to_string();
        self
    }

    /// 既存のアクセストークンを設定する。
    pub fn with_access_token(mut self, access_token: &str) -> Self {
        self.access_token = Some(access_token.to_string());
        self
    }

    /// PEM 形式の秘密鍵を設定する。`SecretString` に包んで保持する。
    pub fn with_private_key(mut self, pem: &str) -> Self {
        self.private_key = Some(Secret::new(pem.to_string()));
        self
    }

    /// 署名アルゴリズムを設定する。
    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// デバイスに登録する公開鍵の JWK を設定する。
    pub fn with_json_web_key(mut self, jwk: Value) -> Self {
        self.json_web_key = jwk;
        self
    }

    /// `token.aud` に入れる依拠当事者のオーディエンスを設定する。
    pub fn with_token_audience(mut self, audience: &str) -> Self {
        self.token_audience = Some(audience.to_string());
        self
    }

    /// Authorization ヘッダーに載せるべきアクセストークンを返す。空文字列は未設定とみなす。
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

// アクセストークンと秘密鍵を Debug 出力に含めない
impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("device_name", &self.device_name)
            .field("organisation_id", &self.organisation_id)
            .field("client_id", &self.client_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("algorithm", &self.algorithm)
            .field("token_audience", &self.token_audience)
            .finish_non_exhaustive()
    }
}

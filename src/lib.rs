//! proda-client: PRODA (オーストラリア政府の B2B 認証ブローカー) クライアントライブラリ。
//!
//! デバイスアクティベーション / 鍵リフレッシュと、RSA 署名した JWT Bearer アサーションによる
//! アクセストークン取得を提供する。ブローカーが返すエラーコードは型付きの失敗種別に変換する。
//!
//! # 使い方
//!
//! ```ignore
//! use proda_client::{ClientContext, HttpProdaClient, ProdaClient, ProdaConfig};
//!
//! let config = ProdaConfig::load("config/proda.yaml")?;
//! let client = HttpProdaClient::new(config)?;
//!
//! let ctx = ClientContext::new("DEV1", "ORG123", "my-client-id")
//!     .with_one_time_activation_code("ABC999")
//!     .with_json_web_key(jwk)
//!     .with_private_key(&private_key_pem)
//!     .with_token_audience("tcsi.audience");
//!
//! client.activate_device(&ctx).await?;
//! let token = client.get_access_token(&ctx).await?;
//! ```

pub mod assertion;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod error_code;
pub mod id;
pub mod request;
pub mod response;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use assertion::{sign_assertion, AssertionClaims};
pub use client::{HttpProdaClient, ProdaClient};
pub use config::{ProdaConfig, ProdaUrls, UrlParams, UrlTemplate};
pub use context::{ClientContext, SigningAlgorithm};
pub use error::ProdaError;
pub use error_code::{AccessTokenFailure, DeviceActivationFailure};
pub use id::{IdGenerator, UuidGenerator};
pub use request::{
    build_access_token_request, build_device_activation_request, build_device_refresh_request,
    AccessTokenRequest, DeviceRequest,
};
pub use response::{interpret_access_token_response, interpret_device_activation_response};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(feature = "mock")]
pub use client::MockProdaClient;

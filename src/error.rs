//! PRODA クライアントのエラー定義。

use crate::error_code::{AccessTokenFailure, DeviceActivationFailure};
use serde_json::Value;

/// ProdaError は PRODA クライアントの処理で発生するエラーを表す。
///
/// ブローカーが返した失敗は `DeviceActivation` / `AccessToken` に分類され、
/// どちらもレスポンスボディをそのまま保持する。
#[derive(thiserror::Error, Debug)]
pub enum ProdaError {
    /// デバイスアクティベーション / リフレッシュが失敗した。
    #[error("デバイスアクティベーション失敗 ({kind}): {body}")]
    DeviceActivation {
        kind: DeviceActivationFailure,
        body: Value,
    },

    /// アクセストークン取得が失敗した。
    #[error("アクセストークン取得失敗 ({kind}): {body}")]
    AccessToken { kind: AccessTokenFailure, body: Value },

    /// JWT アサーションの署名に失敗した。ネットワーク呼び出し前に発生する。
    #[error("JWT 署名失敗: {0}")]
    Signing(String),

    /// HTTP リクエストに失敗した。
    #[error("HTTP リクエスト失敗: {0}")]
    Http(String),

    /// 設定が不正。
    #[error("設定エラー: {0}")]
    Config(String),
}

impl ProdaError {
    /// ブローカー由来のエラーであればレスポンスボディを返す。
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            Self::DeviceActivation { body, .. } | Self::AccessToken { body, .. } => Some(body),
            _ => None,
        }
    }

    /// デバイス系の失敗であれば失敗種別を返す。
    pub fn device_activation_failure(&self) -> Option<DeviceActivationFailure> {
        match self {
            Self::DeviceActivation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// アクセストークン系の失敗であれば失敗種別を返す。
    pub fn access_token_failure(&self) -> Option<AccessTokenFailure> {
        match self {
            Self::AccessToken { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// 分類できたブローカーエラーの PRODA エラーコードを返す。
    ///
    /// `Unclassified` やブローカー以外のエラーは `None`。
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::DeviceActivation { kind, .. } => kind.code(),
            Self::AccessToken { kind, .. } => kind.code(),
            _ => None,
        }
    }
}

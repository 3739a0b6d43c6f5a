//! PRODA が返すエラーコードと失敗種別の対応表。
//!
//! デバイスアクティベーション系とアクセストークン系の 2 系統があり、互いに重複しない。
//! どちらもコンパイル時に確定する定数表で、実行時に変更されることはない。

use std::fmt;

/// DeviceActivationFailure はデバイスアクティベーション / リフレッシュの失敗種別を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceActivationFailure {
    /// DE.2: 組織が見つからない。
    OrganisationNotFound,
    /// DE.4: デバイスが見つからない。
    DeviceNotFound,
    /// DE.5: デバイスが不正な状態にある。
    DeviceInInvalidState,
    /// DE.7: ワンタイムアクティベーションコードが無効。
    InvalidActivationCode,
    /// DE.9: 組織が有効化されていない。
    OrganisationNotActive,
    /// JWK.1: JWK を解析できない。
    JwkParseError,
    /// JWK.2: JWK のアルゴリズムが不正。
    JwkInvalidAlgorithm,
    /// JWK.8: JWK の用途 (use) が不正。
    JwkInvalidKeyUse,
    /// JWK.9: 過去に使用された鍵。
    JwkKeyInHistory,
    /// 111: 入力値検証エラー。
    InputValidationError,
    /// 既知のコードに該当しない失敗。
    Unclassified,
}

/// デバイスアクティベーション系のエラーコード表。
pub const DEVICE_ACTIVATION_ERROR_CODES: [(&str, DeviceActivationFailure); 10] = [
    ("DE.2", DeviceActivationFailure::OrganisationNotFound),
    ("DE.4", DeviceActivationFailure::DeviceNotFound),
    ("DE.5", DeviceActivationFailure::DeviceInInvalidState),
    ("DE.7", DeviceActivationFailure::InvalidActivationCode),
    ("DE.9", DeviceActivationFailure::OrganisationNotActive),
    ("JWK.1", DeviceActivationFailure::JwkParseError),
    ("JWK.2", DeviceActivationFailure::JwkInvalidAlgorithm),
    ("JWK.8", DeviceActivationFailure::JwkInvalidKeyUse),
    ("JWK.9", DeviceActivationFailure::JwkKeyInHistory),
    ("111", DeviceActivationFailure::InputValidationError),
];

impl DeviceActivationFailure {
    /// エラーコードから失敗種別を引く。未知のコードは `None`。
    pub fn from_code(code: &str) -> Option<Self> {
        DEVICE_ACTIVATION_ERROR_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
    }

    /// 対応する PRODA のエラーコードを返す。`Unclassified` は `None`。
    pub fn code(self) -> Option<&'static str> {
        DEVICE_ACTIVATION_ERROR_CODES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(code, _)| *code)
    }
}

impl fmt::Display for DeviceActivationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OrganisationNotFound => "organisation not found",
            Self::DeviceNotFound => "device not found",
            Self::DeviceInInvalidState => "device in invalid state",
            Self::InvalidActivationCode => "invalid activation code",
            Self::OrganisationNotActive => "organisation not active",
            Self::JwkParseError => "jwk parse error",
            Self::JwkInvalidAlgorithm => "jwk invalid algorithm",
            Self::JwkInvalidKeyUse => "jwk invalid key use",
            Self::JwkKeyInHistory => "jwk key in history",
            Self::InputValidationError => "input validation error",
            Self::Unclassified => "unclassified device activation error",
        };
        f.write_str(s)
    }
}

/// AccessTokenFailure はアクセストークン取得の失敗種別を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessTokenFailure {
    /// mapping_error
    MappingError,
    /// device_error
    DeviceError,
    /// 既知のコードに該当しない失敗。
    Unclassified,
}

/// アクセストークン系のエラーコード表。
pub const ACCESS_TOKEN_ERROR_CODES: [(&str, AccessTokenFailure); 2] = [
    ("mapping_error", AccessTokenFailure::MappingError),
    ("device_error", AccessTokenFailure::DeviceError),
];

impl AccessTokenFailure {
    /// エラーコードから失敗種別を引く。未知のコードは `None`。
    pub fn from_code(code: &str) -> Option<Self> {
        ACCESS_TOKEN_ERROR_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
    }

    /// 対応するエラーコードを返す。`Unclassified` は `None`。
    pub fn code(self) -> Option<&'static str> {
        ACCESS_TOKEN_ERROR_CODES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(code, _)| *code)
    }
}

impl fmt::Display for AccessTokenFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MappingError => "access token mapping error",
            Self::DeviceError => "access token device error",
            Self::Unclassified => "unclassified access token error",
        };
        f.write_str(s)
    }
}

//! HTTP レスポンスを成功ペイロードか型付きの失敗に分類する。
//!
//! 状態遷移は `Received -> {Success, Classified, Unclassified}` の 1 段のみで、
//! 再試行や中間状態は持たない。

use crate::error::ProdaError;
use crate::error_code::{AccessTokenFailure, DeviceActivationFailure};
use serde_json::Value;

/// レスポンスボディ文字列を JSON として解釈する。
///
/// 空なら `Null`、JSON として解釈できなければ元の文字列を `Value::String` で保持する。
pub fn parse_body(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// エラーコードの値を文字列で取り出す。数値コード (例: 111) も文字列化して扱う。
fn code_as_string(code: &Value) -> Option<String> {
    match code {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// デバイス系エラーボディから `errors.code` を取り出す。
///
/// `errors` はオブジェクト (`{"code": ...}`) でも配列 (`[{"code": ...}]`) でもよい。
/// 配列の場合は先頭要素のコードを使う。空の `errors` はコードなしとみなす。
fn device_error_code(body: &Value) -> Option<String> {
    let errors = body.as_object()?.get("errors")?;
    let code = match errors {
        Value::Object(map) if !map.is_empty() => map.get("code")?,
        Value::Array(items) => items.first()?.get("code")?,
        _ => return None,
    };
    code_as_string(code)
}

/// デバイスアクティベーション / リフレッシュのレスポンスを解釈する。
///
/// 2xx ならボディをそのまま返す。それ以外は既知のエラーコードに対応する失敗種別、
/// 該当しなければ `DeviceActivationFailure::Unclassified` で失敗する。
pub fn interpret_device_activation_response(status: u16, body: Value) -> Result<Value, ProdaError> {
    if is_success(status) {
        return Ok(body);
    }

    let kind = device_error_code(&body)
        .and_then(|code| DeviceActivationFailure::from_code(&code))
        .unwrap_or(DeviceActivationFailure::Unclassified);

    Err(ProdaError::DeviceActivation { kind, body })
}

/// アクセストークン取得のレスポンスを解釈する。
///
/// 失敗時はトップレベルの `error` をアクセストークン系のコード表と照合する。
pub fn interpret_access_token_response(status: u16, body: Value) -> Result<Value, ProdaError> {
    if is_success(status) {
        return Ok(body);
    }

    let kind = body
        .as_object()
        .and_then(|map| map.get("error"))
        .and_then(Value::as_str)
        .and_then(AccessTokenFailure::from_code)
        .unwrap_or(AccessTokenFailure::Unclassified);

    Err(ProdaError::AccessToken { kind, body })
}

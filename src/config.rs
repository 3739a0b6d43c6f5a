//! PRODA クライアントの設定構造体。

use crate::error::ProdaError;
use serde::{Deserialize, Serialize};

/// api_version のデフォルト値。
fn default_api_version() -> String {
    "v1".to_string()
}

/// timeout_secs のデフォルト値（10 秒）。
fn default_timeout_secs() -> u64 {
    10
}

/// ProdaUrls は PRODA の各エンドポイントの URL テンプレートを保持する。
///
/// テンプレートには `{version}`、`{device_name}`、`{org_id}` のプレースホルダーを使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProdaUrls {
    /// 例: `https://vnd.proda.humanservices.gov.au/piaweb/api/b2b/{version}/devices/{device_name}/jwk`
    pub activate_device: String,

    /// 例: `https://vnd.proda.humanservices.gov.au/piaweb/api/b2b/{version}/orgs/{org_id}/devices/{device_name}/jwk`
    pub refresh_device_key: String,

    /// 例: `https://vnd.proda.humanservices.gov.au/mga/sps/oauth/oauth20/token`
    pub authorisation_service_request: String,
}

/// UrlTemplate は解決対象のテンプレート名を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlTemplate {
    ActivateDevice,
    RefreshDeviceKey,
    AuthorisationServiceRequest,
}

/// UrlParams はテンプレートに埋め込む値を表す。
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlParams<'a> {
    pub device_name: &'a str,
    pub org_id: &'a str,
}

/// ProdaConfig は PRODA クライアントの設定を表す。
///
/// YAML から serde でデシリアライズ可能。
///
/// ```yaml
/// urls:
///   activate_device: https://proda.example/piaweb/api/b2b/{version}/devices/{device_name}/jwk
///   refresh_device_key: https://proda.example/piaweb/api/b2b/{version}/orgs/{org_id}/devices/{device_name}/jwk
///   authorisation_service_request: https://proda.example/mga/sps/oauth/oauth20/token
/// timeout_secs: 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProdaConfig {
    pub urls: ProdaUrls,

    /// デバイス系 API のバージョン（デフォルト: `v1`）。
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// HTTP タイムアウト秒数（デフォルト: 10 秒）。
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProdaConfig {
    /// URL テンプレートを指定して ProdaConfig を生成する。
    ///
    /// `api_version` と `timeout_secs` はデフォルト値が使用される。
    pub fn new(urls: ProdaUrls) -> Self {
        Self {
            urls,
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// API バージョンを設定する。
    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    /// タイムアウト秒数を設定する。
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// YAML 文字列から設定を読み込み、検証する。
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ProdaError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| ProdaError::Config(format!("YAML の解析に失敗しました: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// YAML ファイルから設定を読み込む。
    pub fn load(path: &str) -> Result<Self, ProdaError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| ProdaError::Config(format!("{path} を読み込めません: {e}")))?;
        Self::from_yaml_str(&yaml)
    }

    /// 設定値のバリデーション。
    pub fn validate(&self) -> Result<(), ProdaError> {
        if self.urls.activate_device.is_empty() {
            return Err(ProdaError::Config("urls.activate_device is required".into()));
        }
        if self.urls.refresh_device_key.is_empty() {
            return Err(ProdaError::Config("urls.refresh_device_key is required".into()));
        }
        if self.urls.authorisation_service_request.is_empty() {
            return Err(ProdaError::Config(
                "urls.authorisation_service_request is required".into(),
            ));
        }
        if self.api_version.is_empty() {
            return Err(ProdaError::Config("api_version is required".into()));
        }
        Ok(())
    }

    /// テンプレートのプレースホルダーを埋めて URL を返す。
    ///
    /// # エラー
    ///
    /// テンプレートに未知のプレースホルダーがある場合は `ProdaError::Config` を返す。
    /// 埋め込む値（デバイス名・組織 ID）は検証せずそのまま使う。
    pub fn resolve_url(
        &self,
        template: UrlTemplate,
        params: &UrlParams<'_>,
    ) -> Result<String, ProdaError> {
        let raw = match template {
            UrlTemplate::ActivateDevice => &self.urls.activate_device,
            UrlTemplate::RefreshDeviceKey => &self.urls.refresh_device_key,
            UrlTemplate::AuthorisationServiceRequest => &self.urls.authorisation_service_request,
        };

        // テンプレートを 1 回だけ走査する。埋め込んだ値は再走査しない
        let mut url = String::with_capacity(raw.len());
        let mut rest = raw.as_str();
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            url.push_str(&rest[..start]);
            let value = match &rest[start + 1..start + len] {
                "version" => self.api_version.as_str(),
                "device_name" => params.device_name,
                "org_id" => params.org_id,
                other => {
                    return Err(ProdaError::Config(format!(
                        "URL テンプレートに未知のプレースホルダー {{{other}}} があります: {raw}"
                    )))
                }
            };
            url.push_str(value);
            rest = &rest[start + len + 1..];
        }
        url.push_str(rest);

        Ok(url)
    }
}

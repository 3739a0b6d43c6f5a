use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::DecodingKey;
use proda_client::{ClientContext, ProdaConfig, ProdaUrls};
use rand::rngs::OsRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use std::sync::OnceLock;

pub struct TestKey {
    pub private_pem: String,
    pub n: String,
    pub e: String,
}

impl TestKey {
    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_rsa_components(&self.n, &self.e).unwrap()
    }

    pub fn jwk(&self) -> Value {
        json!({
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "kid": "DEV1",
            "n": self.n,
            "e": self.e,
        })
    }
}

pub fn test_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public_key = private_key.to_public_key();
        TestKey {
            private_pem: private_key.to_pkcs1_pem(LineEnding::LF).unwrap().to_string(),
            n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        }
    })
}

/// モックサーバーを向いた設定を返す。
pub fn make_config(base_url: &str) -> ProdaConfig {
    ProdaConfig::new(ProdaUrls {
        activate_device: format!("{base_url}/piaweb/api/b2b/{{version}}/devices/{{device_name}}/jwk"),
        refresh_device_key: format!(
            "{base_url}/piaweb/api/b2b/{{version}}/orgs/{{org_id}}/devices/{{device_name}}/jwk"
        ),
        authorisation_service_request: format!("{base_url}/mga/sps/oauth/oauth20/token"),
    })
    .with_timeout_secs(5)
}

pub fn make_ctx() -> ClientContext {
    ClientContext::new("DEV1", "ORG123", "CLIENT1")
        .with_one_time_activation_code("ABC999")
        .with_json_web_key(test_key().jwk())
        .with_private_key(&test_key().private_pem)
        .with_token_audience("tcsi.test.audience")
}

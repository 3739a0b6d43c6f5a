//! テスト用の RSA 鍵ペア。

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::DecodingKey;
use rand::rngs::OsRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use std::sync::OnceLock;

pub(crate) struct TestKey {
    pub private_pem: String,
    pub private_pkcs8_pem: String,
    pub public_pem: String,
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

/// 鍵生成は遅いのでテストプロセス全体で 1 つを使い回す。
pub(crate) fn test_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public_key = private_key.to_public_key();
        TestKey {
            private_pem: private_key.to_pkcs1_pem(LineEnding::LF).unwrap().to_string(),
            private_pkcs8_pem: private_key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            public_pem: public_key.to_public_key_pem(LineEnding::LF).unwrap(),
            n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        }
    })
}

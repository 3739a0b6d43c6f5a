use uuid::Uuid;

/// IdGenerator はメッセージ ID / 相関 ID の生成元を表す。
///
/// 生成する値は呼び出しごとに一意でなければならない。
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// UUID v4 で ID を生成するデフォルト実装。
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `urn:uuid:` 接頭辞付きの新しい ID を返す。
pub fn urn_uuid(ids: &dyn IdGenerator) -> String {
    format!("urn:uuid:{}", ids.generate())
}

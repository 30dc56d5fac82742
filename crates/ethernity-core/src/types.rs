/*!
 * Ethernity Types
 *
 * Tipos comuns usados em toda a workspace Ethernity
 */

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Identificador opaco de uma entidade monitorada (protocolo, vault, pool).
///
/// Unicidade e normalização de caixa são responsabilidade de quem cria a chave;
/// veja [`crate::utils::canonical_address`] para endereços.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Severidade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Categoria do alerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Suspicious,
    Exploit,
    Unknown,
    Informational,
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCategory::Suspicious => write!(f, "suspicious"),
            AlertCategory::Exploit => write!(f, "exploit"),
            AlertCategory::Unknown => write!(f, "unknown"),
            AlertCategory::Informational => write!(f, "informational"),
        }
    }
}

/// Alerta emitido por um detector.
///
/// Imutável depois de criado: os detectores entregam o registro ao chamador
/// e não guardam referência alguma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub title: String,
    pub description: String,
    pub alert_id: String,
    pub severity: Severity,
    pub category: AlertCategory,
    pub metadata: BTreeMap<String, String>,
}

impl AlertRecord {
    /// Cria um alerta sem metadados
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        alert_id: impl Into<String>,
        severity: Severity,
        category: AlertCategory,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            alert_id: alert_id.into(),
            severity,
            category,
            metadata: BTreeMap::new(),
        }
    }

    /// Adiciona um par de metadados
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Chamada de contrato já decodificada por um colaborador externo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCall {
    pub method_name: String,
    pub target_address: String,
}

impl DecodedCall {
    pub fn new(method_name: impl Into<String>, target_address: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            target_address: target_address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_from_info_to_critical() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn alert_metadata_is_sorted_by_key() {
        let alert = AlertRecord::new("t", "d", "id-1", Severity::Low, AlertCategory::Suspicious)
            .with_metadata("tracker", "1")
            .with_metadata("pps", "2");
        let keys: Vec<_> = alert.metadata.keys().cloned().collect();
        assert_eq!(keys, vec!["pps".to_string(), "tracker".to_string()]);
    }

    #[test]
    fn alert_serializes_lowercase_enums() {
        let alert = AlertRecord::new("t", "d", "id-1", Severity::High, AlertCategory::Unknown);
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["severity"], "high");
        assert_eq!(json["category"], "unknown");
    }

    #[test]
    fn key_borrows_as_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(Key::from("pool1"), 1);
        assert_eq!(map.get("pool1"), Some(&1));
    }
}

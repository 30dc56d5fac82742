use crate::errors::{DetectorError, Result};
use ethernity_core::{AlertCategory, Severity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Método observado e a severidade do alerta quando chamado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedMethod {
    pub name: String,
    /// Quando ausente, usa a severidade da política `method_call`
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl WatchedMethod {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity: Some(severity),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity: None,
        }
    }
}

/// Contrato observado pelo detector de assinaturas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedContract {
    pub address: String,
    pub methods: Vec<WatchedMethod>,
}

/// Tipo de alerta emitido pelo pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    MethodCall,
    ValueDecreased,
    SwiftChange,
    FailureRate,
}

/// Identidade e classificação de um tipo de alerta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub alert_id: String,
    pub title: String,
    pub severity: Severity,
    pub category: AlertCategory,
}

impl AlertPolicy {
    pub fn new(
        alert_id: impl Into<String>,
        title: impl Into<String>,
        severity: Severity,
        category: AlertCategory,
    ) -> Self {
        Self {
            alert_id: alert_id.into(),
            title: title.into(),
            severity,
            category,
        }
    }
}

/// Tabela de políticas, uma por [`AlertKind`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPolicies {
    pub method_call: AlertPolicy,
    pub value_decreased: AlertPolicy,
    pub swift_change: AlertPolicy,
    pub failure_rate: AlertPolicy,
}

impl AlertPolicies {
    pub fn get(&self, kind: AlertKind) -> &AlertPolicy {
        match kind {
            AlertKind::MethodCall => &self.method_call,
            AlertKind::ValueDecreased => &self.value_decreased,
            AlertKind::SwiftChange => &self.swift_change,
            AlertKind::FailureRate => &self.failure_rate,
        }
    }

    pub fn set(&mut self, kind: AlertKind, policy: AlertPolicy) {
        match kind {
            AlertKind::MethodCall => self.method_call = policy,
            AlertKind::ValueDecreased => self.value_decreased = policy,
            AlertKind::SwiftChange => self.swift_change = policy,
            AlertKind::FailureRate => self.failure_rate = policy,
        }
    }
}

impl Default for AlertPolicies {
    fn default() -> Self {
        Self {
            method_call: AlertPolicy::new(
                "ETHERNITY-METHOD-1",
                "Watched method called",
                Severity::Low,
                AlertCategory::Suspicious,
            ),
            value_decreased: AlertPolicy::new(
                "Yearn-8-1",
                "Value Tracker",
                Severity::High,
                AlertCategory::Unknown,
            ),
            swift_change: AlertPolicy::new(
                "Yearn-8-2",
                "Value Tracker",
                Severity::High,
                AlertCategory::Unknown,
            ),
            failure_rate: AlertPolicy::new(
                "ETHERNITY-FAILED-TXS-1",
                "High volume of failed transactions",
                Severity::High,
                AlertCategory::Suspicious,
            ),
        }
    }
}

/// Configuração do pipeline de detectores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// Duração da janela deslizante de falhas, em minutos
    pub window_minutes: u64,
    /// Variação relativa acima da qual uma mudança é considerada brusca
    pub swift_change_threshold: Decimal,
    /// Alerta quando a contagem na janela for estritamente maior que este valor
    pub failure_threshold: usize,
    pub watched_contracts: Vec<WatchedContract>,
    pub alerts: AlertPolicies,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            window_minutes: 60,
            swift_change_threshold: Decimal::new(1, 1), // 0.1
            failure_threshold: 10,
            watched_contracts: Vec::new(),
            alerts: AlertPolicies::default(),
        }
    }
}

impl SentinelConfig {
    /// Cria um builder para a configuração
    pub fn builder() -> SentinelConfigBuilder {
        SentinelConfigBuilder::default()
    }

    /// Lê a configuração de um documento JSON; campos ausentes usam o default
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DetectorError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.swift_change_threshold.is_sign_negative() {
            return Err(DetectorError::InvalidConfig(format!(
                "swift_change_threshold negativo: {}",
                self.swift_change_threshold
            )));
        }
        for contract in &self.watched_contracts {
            if contract.address.trim().is_empty() {
                return Err(DetectorError::InvalidConfig(
                    "contrato observado sem endereço".to_string(),
                ));
            }
            if contract.methods.is_empty() {
                return Err(DetectorError::InvalidConfig(format!(
                    "contrato {} sem métodos observados",
                    contract.address
                )));
            }
        }
        Ok(())
    }
}

/// Builder para configuração do pipeline
#[derive(Debug, Default)]
pub struct SentinelConfigBuilder {
    config: SentinelConfig,
}

impl SentinelConfigBuilder {
    /// Define a janela de contagem de falhas
    pub fn window_minutes(mut self, minutes: u64) -> Self {
        self.config.window_minutes = minutes;
        self
    }

    /// Define o limiar de variação brusca
    pub fn swift_change_threshold(mut self, threshold: Decimal) -> Self {
        self.config.swift_change_threshold = threshold;
        self
    }

    /// Define o limite de falhas por janela
    pub fn failure_threshold(mut self, threshold: usize) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    /// Adiciona um contrato observado
    pub fn watch(mut self, address: impl Into<String>, methods: Vec<WatchedMethod>) -> Self {
        self.config.watched_contracts.push(WatchedContract {
            address: address.into(),
            methods,
        });
        self
    }

    /// Substitui a política de um tipo de alerta
    pub fn alert_policy(mut self, kind: AlertKind, policy: AlertPolicy) -> Self {
        self.config.alerts.set(kind, policy);
        self
    }

    /// Constrói e valida a configuração
    pub fn build(self) -> Result<SentinelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

use ethernity_core::Key;
use rust_decimal::Decimal;
use thiserror::Error;

/// Erros que podem ocorrer durante a detecção
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectorError {
    /// Valor anterior igual a zero; a variação relativa não é definida
    #[error("divisão por zero ao comparar '{key}': valor anterior era 0, novo valor {value}")]
    DivisionByZero { key: Key, value: Decimal },

    /// Configuração inconsistente
    #[error("configuração inválida: {0}")]
    InvalidConfig(String),

    /// Falha de um colaborador externo (RPC, decodificação)
    #[error(transparent)]
    Provider(#[from] ethernity_core::Error),
}

/// Falha associada a uma sub-observação específica.
///
/// Não interrompe o processamento das demais sub-observações do mesmo evento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationFailure {
    pub key: Key,
    pub error: DetectorError,
}

/// Resultado padrão da crate
pub type Result<T> = std::result::Result<T, DetectorError>;

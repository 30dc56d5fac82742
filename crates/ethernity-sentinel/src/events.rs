use ethernity_core::{utils::seconds_to_ms, DecodedCall, Key};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Transação observada, com a chamada já decodificada quando a ABI é conhecida.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub hash: String,
    pub timestamp_ms: u64,
    /// Endereços envolvidos na transação (remetente, destino, logs)
    pub addresses: Vec<String>,
    pub call: Option<DecodedCall>,
}

/// Valor de uma entidade dentro de um bloco (ex.: price-per-share de um vault).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubObservation {
    pub key: Key,
    pub value: Decimal,
}

impl SubObservation {
    pub fn new(key: impl Into<Key>, value: Decimal) -> Self {
        Self { key: key.into(), value }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockEvent {
    pub number: u64,
    pub timestamp_ms: u64,
    /// Processadas estritamente na ordem em que foram fornecidas
    pub observations: Vec<SubObservation>,
}

/// Ocorrência de falha (ex.: transação revertida) atribuída a um protocolo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEvent {
    pub key: Key,
    pub hash: String,
    pub timestamp_ms: u64,
}

impl FailureEvent {
    pub fn new(key: impl Into<Key>, hash: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            key: key.into(),
            hash: hash.into(),
            timestamp_ms,
        }
    }

    /// Cria o evento a partir do timestamp do bloco, em segundos.
    pub fn from_block_timestamp(key: impl Into<Key>, hash: impl Into<String>, seconds: u64) -> Self {
        Self::new(key, hash, seconds_to_ms(seconds))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChainEvent {
    Transaction(TransactionEvent),
    Block(BlockEvent),
    Failure(FailureEvent),
}

impl ChainEvent {
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            ChainEvent::Transaction(tx) => tx.timestamp_ms,
            ChainEvent::Block(block) => block.timestamp_ms,
            ChainEvent::Failure(failure) => failure.timestamp_ms,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ChainEvent::Transaction(_) => "transaction",
            ChainEvent::Block(_) => "block",
            ChainEvent::Failure(_) => "failure",
        }
    }
}

/// Barramento de eventos sobre canais [`tokio::sync::mpsc`] limitados.
pub struct EventBus<T> {
    sender: mpsc::Sender<T>,
}

impl<T> EventBus<T> {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { sender: tx }, rx)
    }

    pub fn sender(&self) -> mpsc::Sender<T> {
        self.sender.clone()
    }
}

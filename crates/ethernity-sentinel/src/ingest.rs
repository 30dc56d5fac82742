//! Adaptadores entre os colaboradores externos e os eventos do pipeline.
//! Toda chamada de rede acontece aqui, antes do evento chegar ao
//! [`DetectorPipeline`](crate::DetectorPipeline).

use crate::errors::ObservationFailure;
use crate::events::{BlockEvent, SubObservation, TransactionEvent};
use ethernity_core::traits::{CallDecoder, ValueProvider};
use ethernity_core::Key;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Transação crua recebida do runtime de varredura
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub hash: String,
    pub to: String,
    pub input: Vec<u8>,
    pub timestamp_ms: u64,
    pub addresses: Vec<String>,
}

/// Decodifica transações cruas em [`TransactionEvent`]
pub struct TransactionIngestor {
    decoder: Arc<dyn CallDecoder>,
}

impl TransactionIngestor {
    pub fn new(decoder: Arc<dyn CallDecoder>) -> Self {
        Self { decoder }
    }

    /// Calldata sem ABI conhecida vira `call: None`
    pub fn decode(&self, raw: RawTransaction) -> TransactionEvent {
        let call = self.decoder.decode(&raw.to, &raw.input);
        TransactionEvent {
            hash: raw.hash,
            timestamp_ms: raw.timestamp_ms,
            addresses: raw.addresses,
            call,
        }
    }
}

/// Bloco montado a partir do provider, com as chaves que falharam
#[derive(Debug, Clone)]
pub struct PolledBlock {
    pub event: BlockEvent,
    pub failures: Vec<ObservationFailure>,
}

/// Consulta o valor corrente de cada chave e monta o [`BlockEvent`] correspondente
pub struct BlockIngestor {
    provider: Arc<dyn ValueProvider>,
}

impl BlockIngestor {
    pub fn new(provider: Arc<dyn ValueProvider>) -> Self {
        Self { provider }
    }

    /// Consulta as chaves em sequência, preservando a ordem de `keys`.
    ///
    /// Uma chave cujo provider falha é omitida do bloco e reportada em
    /// [`PolledBlock::failures`]; as demais seguem normalmente.
    pub async fn poll(&self, block_number: u64, timestamp_ms: u64, keys: &[Key]) -> PolledBlock {
        let mut observations = Vec::with_capacity(keys.len());
        let mut failures = Vec::new();
        for key in keys {
            match self.provider.value_at(key, block_number).await {
                Ok(value) => observations.push(SubObservation {
                    key: key.clone(),
                    value,
                }),
                Err(e) => {
                    warn!(key = %key, block = block_number, "falha ao consultar valor: {}", e);
                    failures.push(ObservationFailure {
                        key: key.clone(),
                        error: e.into(),
                    });
                }
            }
        }
        PolledBlock {
            event: BlockEvent {
                number: block_number,
                timestamp_ms,
                observations,
            },
            failures,
        }
    }
}

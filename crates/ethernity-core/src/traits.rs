/*!
 * Ethernity Traits
 *
 * Contratos dos colaboradores externos consumidos pelos detectores
 */

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{DecodedCall, Key};
use rust_decimal::Decimal;

/// Decodificador de calldata (ABI). A decodificação em si fica fora da workspace.
pub trait CallDecoder: Send + Sync {
    /// Decodifica a chamada enviada a `to`.
    ///
    /// Retorna `None` quando o calldata não corresponde a nenhuma ABI conhecida;
    /// isso não é um erro.
    fn decode(&self, to: &str, input: &[u8]) -> Option<DecodedCall>;
}

/// Provedor do valor numérico corrente de uma entidade (ex.: price-per-share de um vault)
#[async_trait]
pub trait ValueProvider: Send + Sync {
    /// Obtém o valor de `key` na altura de bloco informada
    async fn value_at(&self, key: &Key, block_number: u64) -> Result<Decimal>;
}

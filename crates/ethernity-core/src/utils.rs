/*!
 * Ethernity Utils
 *
 * Utilitários comuns usados em toda a workspace Ethernity
 */

use crate::error::{Error, Result};
use ethereum_types::{Address, U256};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Converte uma string hexadecimal para Address
pub fn hex_to_address(hex: &str) -> Option<Address> {
    let hex_str = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")).unwrap_or(hex);
    Address::from_str(hex_str).ok()
}

/// Formata um Address para exibição
pub fn format_address(address: &Address) -> String {
    format!("0x{:x}", address)
}

/// Forma canônica de um endereço para comparação.
///
/// Endereços de 20 bytes válidos são reformatados em minúsculas com prefixo `0x`;
/// qualquer outra string é apenas aparada e convertida para minúsculas.
pub fn canonical_address(raw: &str) -> String {
    let trimmed = raw.trim();
    match hex_to_address(trimmed) {
        Some(address) => format_address(&address),
        None => trimmed.to_lowercase(),
    }
}

/// Compara dois endereços ignorando caixa e formatação
pub fn same_address(a: &str, b: &str) -> bool {
    canonical_address(a) == canonical_address(b)
}

/// Converte timestamp de bloco (segundos) para milissegundos
pub fn seconds_to_ms(seconds: u64) -> u64 {
    seconds.saturating_mul(1000)
}

/// Converte um U256 com `decimals` casas para Decimal.
///
/// Falha quando o valor não cabe na mantissa de 96 bits do Decimal.
pub fn u256_to_decimal(amount: &U256, decimals: u32) -> Result<Decimal> {
    if amount.bits() > 96 {
        return Err(Error::OutOfRange(amount.to_string()));
    }
    let mantissa = amount.low_u128() as i128;
    Decimal::try_from_i128_with_scale(mantissa, decimals)
        .map_err(|e| Error::OutOfRange(format!("{} (escala {}): {}", amount, decimals, e)))
}

/*!
 * Ethernity Core
 * 
 * Tipos e utilitários compartilhados para a workspace Ethernity:
 * modelo de alertas, chaves de entidades monitoradas e os contratos
 * dos colaboradores externos (decodificação de chamadas e leitura de valores).
 */

pub mod types;
pub mod traits;
pub mod utils;
pub mod error;

// Re-exportações públicas
pub use error::Error;
pub use types::*;

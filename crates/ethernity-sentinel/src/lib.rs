/*!
 * Ethernity Sentinel
 *
 * Detectores de fluxo com estado para agentes de monitoramento:
 * correspondência de assinaturas de métodos, regressão/variação de valores
 * monotônicos e contagem de falhas em janela deslizante.
 */

mod config;
mod errors;
mod events;
mod ingest;
mod pipeline;
mod signature_matcher;
mod sliding_window;
mod value_tracker;

pub use config::*;
pub use errors::*;
pub use events::*;
pub use ingest::*;
pub use pipeline::*;
pub use signature_matcher::*;
pub use sliding_window::*;
pub use value_tracker::*;

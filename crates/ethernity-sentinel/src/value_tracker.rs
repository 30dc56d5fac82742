use crate::errors::{DetectorError, Result};
use dashmap::DashMap;
use ethernity_core::Key;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Resultado de uma comparação entre duas amostras consecutivas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueOutcome {
    /// O valor, que deveria apenas crescer, diminuiu
    Decreased { value: Decimal, previous: Decimal },
    /// A variação relativa excedeu o limiar configurado
    SwiftChange {
        value: Decimal,
        previous: Decimal,
        change: Decimal,
    },
}

impl ValueOutcome {
    pub fn value(&self) -> Decimal {
        match self {
            ValueOutcome::Decreased { value, .. } | ValueOutcome::SwiftChange { value, .. } => *value,
        }
    }

    pub fn previous(&self) -> Decimal {
        match self {
            ValueOutcome::Decreased { previous, .. }
            | ValueOutcome::SwiftChange { previous, .. } => *previous,
        }
    }
}

/// Guarda o último valor observado por chave e compara cada nova amostra
/// com a imediatamente anterior.
///
/// A comparação é estritamente par a par: uma série de pequenas quedas gera um
/// `Decreased` por passo, nunca uma queda acumulada.
pub struct ValueTracker {
    threshold: Decimal,
    values: DashMap<Key, Decimal>,
}

impl ValueTracker {
    /// `threshold` é a fração de variação relativa acima da qual `SwiftChange` dispara
    pub fn new(threshold: Decimal) -> Self {
        Self {
            threshold,
            values: DashMap::new(),
        }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Registra `value` para `key` e retorna os desvios em relação à amostra anterior.
    ///
    /// A primeira observação de uma chave nunca gera resultado. O valor guardado é
    /// substituído sempre, inclusive quando a comparação falha com
    /// [`DetectorError::DivisionByZero`].
    pub fn observe(&self, key: &Key, value: Decimal) -> Result<Vec<ValueOutcome>> {
        // troca atômica dentro do shard da chave
        let previous = match self.values.insert(key.clone(), value) {
            Some(previous) => previous,
            None => return Ok(Vec::new()),
        };
        self.compare(key, previous, value)
    }

    fn compare(&self, key: &Key, previous: Decimal, value: Decimal) -> Result<Vec<ValueOutcome>> {
        if previous.is_zero() {
            return Err(DetectorError::DivisionByZero {
                key: key.clone(),
                value,
            });
        }

        let mut outcomes = Vec::with_capacity(2);
        if value < previous {
            outcomes.push(ValueOutcome::Decreased { value, previous });
        }

        // diferença ou quociente fora da faixa do Decimal: variação certamente acima do limiar
        let ratio = value
            .checked_sub(previous)
            .and_then(|delta| delta.checked_div(previous));
        match ratio {
            Some(ratio) => {
                let change = ratio.abs();
                if change > self.threshold {
                    outcomes.push(ValueOutcome::SwiftChange {
                        value,
                        previous,
                        change,
                    });
                }
            }
            None => outcomes.push(ValueOutcome::SwiftChange {
                value,
                previous,
                change: Decimal::MAX,
            }),
        }
        Ok(outcomes)
    }

    /// Último valor registrado para `key`
    pub fn last_value(&self, key: &str) -> Option<Decimal> {
        self.values.get(key).map(|v| *v)
    }

    /// Descarta o histórico de `key`; a próxima observação volta a ser a primeira
    pub fn forget(&self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn tracked_keys(&self) -> usize {
        self.values.len()
    }
}

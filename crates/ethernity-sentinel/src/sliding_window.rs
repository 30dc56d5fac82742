use dashmap::DashMap;
use ethernity_core::Key;

/// Ocorrência registrada na janela de um protocolo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedEvent {
    pub key: Key,
    pub hash: String,
    pub timestamp_ms: u64,
}

/// Contador por chave de ocorrências dentro de uma janela deslizante de tempo.
///
/// O tempo avança apenas com os timestamps dos próprios eventos; nenhum relógio
/// global é consultado, então uma sequência gravada sempre produz as mesmas contagens.
/// Cada chave fica em um shard próprio do [`DashMap`], de modo que chaves
/// diferentes podem ser atualizadas em paralelo.
pub struct SlidingWindowCounter {
    window_ms: u64,
    windows: DashMap<Key, Vec<TimestampedEvent>>,
}

impl SlidingWindowCounter {
    /// Cria um contador com janela de `window_minutes` minutos
    pub fn new(window_minutes: u64) -> Self {
        Self::with_window_ms(window_minutes.saturating_mul(60 * 1000))
    }

    pub fn with_window_ms(window_ms: u64) -> Self {
        Self {
            window_ms,
            windows: DashMap::new(),
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Registra uma ocorrência e retorna quantas permanecem na janela.
    ///
    /// Entradas com `timestamp_ms <= timestamp_ms - window` são descartadas. O filtro
    /// avalia cada entrada individualmente, então uma inserção fora de ordem
    /// não deixa entradas vencidas para trás.
    pub fn record(&self, key: &Key, hash: &str, timestamp_ms: u64) -> usize {
        let window_ms = self.window_ms;
        let mut entries = self.windows.entry(key.clone()).or_default();
        // janela zero mantém somente a entrada recém inserida
        if window_ms == 0 {
            entries.clear();
        }
        entries.push(TimestampedEvent {
            key: key.clone(),
            hash: hash.to_string(),
            timestamp_ms,
        });
        if window_ms > 0 {
            // equivalente a `e.timestamp_ms > timestamp_ms - window_ms` sem underflow
            entries.retain(|e| e.timestamp_ms.saturating_add(window_ms) > timestamp_ms);
        }
        entries.len()
    }

    /// Hashes retidos para `key`, na ordem de inserção.
    ///
    /// Reflete a última chamada a [`record`](Self::record); não faz poda.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.windows
            .get(key)
            .map(|entries| entries.iter().map(|e| e.hash.clone()).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, key: &str) -> usize {
        self.windows.get(key).map(|e| e.len()).unwrap_or(0)
    }

    /// Remove todo o estado de `key`
    pub fn forget(&self, key: &str) -> bool {
        self.windows.remove(key).is_some()
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60 * 1000;

    #[test]
    fn counts_events_inside_window() {
        let counter = SlidingWindowCounter::new(5);
        let key = Key::from("pool1");
        assert_eq!(counter.record(&key, "0x01", 0), 1);
        assert_eq!(counter.record(&key, "0x02", MIN), 2);
        assert_eq!(counter.record(&key, "0x03", 2 * MIN), 3);
        assert_eq!(counter.list("pool1"), vec!["0x01", "0x02", "0x03"]);
    }

    #[test]
    fn lower_boundary_is_exclusive() {
        let counter = SlidingWindowCounter::new(5);
        let key = Key::from("pool1");
        counter.record(&key, "0x01", 0);
        counter.record(&key, "0x02", 60_000);
        // entrada em t=0 fica exatamente em current - window e sai
        assert_eq!(counter.record(&key, "0x03", 300_000), 2);
        assert_eq!(counter.list("pool1"), vec!["0x02", "0x03"]);
    }

    #[test]
    fn far_event_resets_count() {
        let counter = SlidingWindowCounter::new(1);
        let key = Key::from("pool1");
        for i in 0..10 {
            counter.record(&key, &format!("0x{i}"), i * 1000);
        }
        assert_eq!(counter.count("pool1"), 10);
        assert_eq!(counter.record(&key, "0xff", 100 * MIN), 1);
        assert_eq!(counter.list("pool1"), vec!["0xff"]);
    }

    #[test]
    fn duplicate_hashes_are_kept() {
        let counter = SlidingWindowCounter::new(5);
        let key = Key::from("pool1");
        counter.record(&key, "0xaa", 1000);
        assert_eq!(counter.record(&key, "0xaa", 2000), 2);
        assert_eq!(counter.list("pool1"), vec!["0xaa", "0xaa"]);
    }

    #[test]
    fn zero_window_keeps_only_latest() {
        let counter = SlidingWindowCounter::new(0);
        let key = Key::from("pool1");
        assert_eq!(counter.record(&key, "0x01", 1000), 1);
        assert_eq!(counter.record(&key, "0x02", 1000), 1);
        assert_eq!(counter.record(&key, "0x03", 2000), 1);
        assert_eq!(counter.list("pool1"), vec!["0x03"]);
    }

    #[test]
    fn out_of_order_insert_is_pruned_by_own_timestamp() {
        let counter = SlidingWindowCounter::new(5);
        let key = Key::from("pool1");
        counter.record(&key, "0x01", 10 * MIN);
        // chegada atrasada: já está fora da janela de quem chegou antes,
        // mas a poda usa o timestamp corrente
        assert_eq!(counter.record(&key, "0x02", 6 * MIN), 2);
        assert_eq!(counter.record(&key, "0x03", 12 * MIN), 2);
        assert_eq!(counter.list("pool1"), vec!["0x01", "0x03"]);
    }

    #[test]
    fn keys_are_independent() {
        let counter = SlidingWindowCounter::new(5);
        counter.record(&Key::from("a"), "0x01", 0);
        counter.record(&Key::from("a"), "0x02", 1);
        assert_eq!(counter.record(&Key::from("b"), "0x03", 2), 1);
        assert_eq!(counter.tracked_keys(), 2);
        assert!(counter.list("unknown").is_empty());
        assert!(counter.forget("a"));
        assert_eq!(counter.count("a"), 0);
    }

    #[test]
    fn early_timestamps_do_not_underflow() {
        let counter = SlidingWindowCounter::new(60);
        let key = Key::from("pool1");
        assert_eq!(counter.record(&key, "0x01", 0), 1);
        assert_eq!(counter.record(&key, "0x02", 5), 2);
        assert_eq!(counter.record(&key, "0x03", 59 * MIN), 3);
    }
}

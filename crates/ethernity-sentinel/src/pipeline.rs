use crate::config::{AlertKind, SentinelConfig};
use crate::errors::{ObservationFailure, Result};
use crate::events::{BlockEvent, ChainEvent, FailureEvent, TransactionEvent};
use crate::signature_matcher::SignatureMatcher;
use crate::sliding_window::SlidingWindowCounter;
use crate::value_tracker::{ValueOutcome, ValueTracker};
use ethernity_core::{AlertRecord, DecodedCall, Key, Severity};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Alertas e falhas produzidos por um evento, na ordem de processamento
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    pub alerts: Vec<AlertRecord>,
    pub failures: Vec<ObservationFailure>,
}

impl PipelineOutput {
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty() && self.failures.is_empty()
    }

    pub fn into_alerts(self) -> Vec<AlertRecord> {
        self.alerts
    }
}

/// Orquestra os detectores sobre cada evento recebido.
///
/// O pipeline não guarda estado próprio: janelas e valores ficam nos detectores,
/// endereçados por [`Key`].
pub struct DetectorPipeline {
    config: SentinelConfig,
    matchers: Vec<SignatureMatcher>,
    tracker: ValueTracker,
    counter: SlidingWindowCounter,
}

impl DetectorPipeline {
    pub fn new(config: SentinelConfig) -> Result<Self> {
        config.validate()?;
        let default_severity = config.alerts.method_call.severity;
        let matchers = config
            .watched_contracts
            .iter()
            .map(|c| SignatureMatcher::new(&c.address, c.methods.clone(), default_severity))
            .collect();
        Ok(Self {
            tracker: ValueTracker::new(config.swift_change_threshold),
            counter: SlidingWindowCounter::new(config.window_minutes),
            matchers,
            config,
        })
    }

    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ValueTracker {
        &self.tracker
    }

    pub fn counter(&self) -> &SlidingWindowCounter {
        &self.counter
    }

    /// Processa um evento e retorna os alertas na ordem das sub-observações.
    ///
    /// Falhas de um detector ficam em [`PipelineOutput::failures`] e não
    /// interrompem as demais sub-observações.
    pub fn process(&self, event: &ChainEvent) -> PipelineOutput {
        debug!(kind = event.kind(), timestamp_ms = event.timestamp_ms(), "processando evento");
        let mut output = PipelineOutput::default();
        match event {
            ChainEvent::Transaction(tx) => self.process_transaction(tx, &mut output),
            ChainEvent::Block(block) => self.process_block(block, &mut output),
            ChainEvent::Failure(failure) => self.process_failure(failure, &mut output),
        }
        for alert in &output.alerts {
            info!(alert_id = %alert.alert_id, severity = %alert.severity, "{}", alert.description);
        }
        output
    }

    fn process_transaction(&self, tx: &TransactionEvent, output: &mut PipelineOutput) {
        // calldata não decodificado não é erro, apenas não corresponde
        let call = match &tx.call {
            Some(call) => call,
            None => return,
        };
        for matcher in &self.matchers {
            // endereços envolvidos só filtram quando o host os preencheu
            if !tx.addresses.is_empty() && !matcher.involved_in(&tx.addresses) {
                continue;
            }
            if let Some(severity) = matcher.match_call(Some(call)) {
                output.alerts.push(self.method_alert(tx, call, matcher.address(), severity));
            }
        }
    }

    fn process_block(&self, block: &BlockEvent, output: &mut PipelineOutput) {
        for obs in &block.observations {
            match self.tracker.observe(&obs.key, obs.value) {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        output.alerts.push(self.value_alert(&obs.key, block.number, &outcome));
                    }
                }
                Err(error) => {
                    warn!(key = %obs.key, block = block.number, "falha ao comparar valor: {}", error);
                    output.failures.push(ObservationFailure {
                        key: obs.key.clone(),
                        error,
                    });
                }
            }
        }
    }

    fn process_failure(&self, failure: &FailureEvent, output: &mut PipelineOutput) {
        let count = self
            .counter
            .record(&failure.key, &failure.hash, failure.timestamp_ms);
        debug!(key = %failure.key, count, "falha registrada");
        if count > self.config.failure_threshold {
            output.alerts.push(self.failure_rate_alert(&failure.key, count));
        }
    }

    fn method_alert(
        &self,
        tx: &TransactionEvent,
        call: &DecodedCall,
        address: &str,
        severity: Severity,
    ) -> AlertRecord {
        let policy = self.config.alerts.get(AlertKind::MethodCall);
        AlertRecord::new(
            &policy.title,
            format!("{} function called on {}", call.method_name, address),
            &policy.alert_id,
            severity,
            policy.category,
        )
        .with_metadata("method", &call.method_name)
        .with_metadata("address", address)
        .with_metadata("transaction", &tx.hash)
    }

    fn value_alert(&self, key: &Key, block_number: u64, outcome: &ValueOutcome) -> AlertRecord {
        let (kind, reason) = match outcome {
            ValueOutcome::Decreased { .. } => (AlertKind::ValueDecreased, "Decrease in value"),
            ValueOutcome::SwiftChange { .. } => (AlertKind::SwiftChange, "Very swift change"),
        };
        let policy = self.config.alerts.get(kind);
        let alert = AlertRecord::new(
            &policy.title,
            format!("{}: {}", key, reason),
            &policy.alert_id,
            policy.severity,
            policy.category,
        )
        .with_metadata("key", key.as_str())
        .with_metadata("block", block_number.to_string())
        .with_metadata("value", outcome.value().normalize().to_string())
        .with_metadata("previous", outcome.previous().normalize().to_string());
        match outcome {
            ValueOutcome::SwiftChange { change, .. } => {
                alert.with_metadata("change", change.normalize().to_string())
            }
            ValueOutcome::Decreased { .. } => alert,
        }
    }

    fn failure_rate_alert(&self, key: &Key, count: usize) -> AlertRecord {
        let policy = self.config.alerts.get(AlertKind::FailureRate);
        let transactions = self.counter.list(key.as_str());
        AlertRecord::new(
            &policy.title,
            format!(
                "{} failed transactions for {} in the last {} minutes",
                count, key, self.config.window_minutes
            ),
            &policy.alert_id,
            policy.severity,
            policy.category,
        )
        .with_metadata("key", key.as_str())
        .with_metadata("count", count.to_string())
        .with_metadata("threshold", self.config.failure_threshold.to_string())
        .with_metadata("window_minutes", self.config.window_minutes.to_string())
        .with_metadata("transactions", transactions.join(","))
    }

    /// Consome [`ChainEvent`]s de `rx` e encaminha cada [`PipelineOutput`] para `tx`.
    pub async fn process_stream(
        &self,
        mut rx: mpsc::Receiver<ChainEvent>,
        tx: mpsc::Sender<PipelineOutput>,
    ) {
        while let Some(event) = rx.recv().await {
            let output = self.process(&event);
            if tx.send(output).await.is_err() {
                debug!("receptor de alertas encerrado");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WatchedMethod;
    use crate::events::SubObservation;
    use ethernity_core::AlertCategory;
    use rust_decimal_macros::dec;

    fn pipeline() -> DetectorPipeline {
        let config = SentinelConfig::builder()
            .window_minutes(5)
            .failure_threshold(2)
            .watch("0xAA", vec![WatchedMethod::new("set_rewards", Severity::Low)])
            .build()
            .unwrap();
        DetectorPipeline::new(config).unwrap()
    }

    fn tx(call: Option<DecodedCall>, addresses: Vec<&str>) -> ChainEvent {
        ChainEvent::Transaction(TransactionEvent {
            hash: "0xdead".to_string(),
            timestamp_ms: 0,
            addresses: addresses.into_iter().map(String::from).collect(),
            call,
        })
    }

    #[test]
    fn method_call_raises_suspicious_alert() {
        let p = pipeline();
        let out = p.process(&tx(Some(DecodedCall::new("set_rewards", "0xaa")), vec!["0xAa"]));
        assert_eq!(out.alerts.len(), 1);
        let alert = &out.alerts[0];
        assert_eq!(alert.category, AlertCategory::Suspicious);
        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.metadata["method"], "set_rewards");
        assert_eq!(alert.metadata["transaction"], "0xdead");
    }

    #[test]
    fn uninvolved_contract_is_skipped() {
        let p = pipeline();
        let out = p.process(&tx(Some(DecodedCall::new("set_rewards", "0xaa")), vec!["0xbb"]));
        assert!(out.is_empty());
        assert!(p.process(&tx(None, vec![])).is_empty());
    }

    #[test]
    fn block_alerts_follow_observation_order() {
        let p = pipeline();
        let block = |n, a, b| {
            ChainEvent::Block(BlockEvent {
                number: n,
                timestamp_ms: n * 12_000,
                observations: vec![SubObservation::new("A", a), SubObservation::new("B", b)],
            })
        };
        assert!(p.process(&block(1, dec!(100), dec!(50))).is_empty());
        let out = p.process(&block(2, dec!(90), dec!(80)));
        let ids: Vec<_> = out.alerts.iter().map(|a| a.alert_id.as_str()).collect();
        assert_eq!(ids, vec!["Yearn-8-1", "Yearn-8-2"]);
        assert_eq!(out.alerts[0].metadata["key"], "A");
        assert_eq!(out.alerts[1].metadata["key"], "B");
        assert_eq!(out.alerts[1].metadata["change"], "0.6");
    }

    #[test]
    fn division_by_zero_does_not_stop_block() {
        let p = pipeline();
        let block = |a, b| {
            ChainEvent::Block(BlockEvent {
                number: 1,
                timestamp_ms: 0,
                observations: vec![SubObservation::new("A", a), SubObservation::new("B", b)],
            })
        };
        p.process(&block(dec!(0), dec!(100)));
        let out = p.process(&block(dec!(5), dec!(50)));
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].key, Key::from("A"));
        assert_eq!(out.alerts.len(), 2);
        assert!(out.alerts.iter().all(|a| a.metadata["key"] == "B"));
    }

    #[test]
    fn extreme_values_do_not_abort_block() {
        let p = pipeline();
        let block = |a| {
            ChainEvent::Block(BlockEvent {
                number: 1,
                timestamp_ms: 0,
                observations: vec![SubObservation::new("A", a), SubObservation::new("B", dec!(7))],
            })
        };
        p.process(&block(rust_decimal::Decimal::MAX));
        let out = p.process(&block(dec!(-1)));
        assert!(out.failures.is_empty());
        assert_eq!(out.alerts.len(), 2);
        assert_eq!(out.alerts[1].metadata["change"], rust_decimal::Decimal::MAX.to_string());
        assert_eq!(p.tracker().last_value("B"), Some(dec!(7)));
    }

    #[test]
    fn failure_rate_alert_lists_transactions() {
        let p = pipeline();
        let fail = |hash: &str, secs| {
            ChainEvent::Failure(FailureEvent::from_block_timestamp("pool1", hash, secs))
        };
        assert!(p.process(&fail("0x01", 0)).is_empty());
        assert!(p.process(&fail("0x02", 10)).is_empty());
        let out = p.process(&fail("0x03", 20));
        assert_eq!(out.alerts.len(), 1);
        assert_eq!(out.alerts[0].metadata["count"], "3");
        assert_eq!(out.alerts[0].metadata["transactions"], "0x01,0x02,0x03");
    }
}

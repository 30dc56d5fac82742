use crate::config::WatchedMethod;
use ethernity_core::utils::{canonical_address, same_address};
use ethernity_core::{DecodedCall, Severity};
use std::collections::{HashMap, HashSet};

/// Verifica se uma chamada decodificada atinge um método observado em um contrato observado.
///
/// `None` representa calldata que não pôde ser decodificado e nunca corresponde.
pub fn matches(
    call: Option<&DecodedCall>,
    watched_address: &str,
    watched_methods: &HashSet<String>,
) -> bool {
    match call {
        Some(call) => {
            same_address(&call.target_address, watched_address)
                && watched_methods.contains(&call.method_name)
        }
        None => false,
    }
}

/// Matcher de um contrato observado, com a severidade configurada por método.
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    address: String,
    methods: HashMap<String, Severity>,
}

impl SignatureMatcher {
    /// Métodos sem severidade própria recebem `default_severity`
    pub fn new(
        address: &str,
        methods: impl IntoIterator<Item = WatchedMethod>,
        default_severity: Severity,
    ) -> Self {
        Self {
            address: canonical_address(address),
            methods: methods
                .into_iter()
                .map(|m| (m.name, m.severity.unwrap_or(default_severity)))
                .collect(),
        }
    }

    /// Endereço observado, já canônico
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn method_names(&self) -> HashSet<String> {
        self.methods.keys().cloned().collect()
    }

    /// Severidade do método chamado quando a chamada corresponde
    pub fn match_call(&self, call: Option<&DecodedCall>) -> Option<Severity> {
        let call = call?;
        if canonical_address(&call.target_address) != self.address {
            return None;
        }
        self.methods.get(&call.method_name).copied()
    }

    pub fn matches(&self, call: Option<&DecodedCall>) -> bool {
        self.match_call(call).is_some()
    }

    /// Indica se o contrato aparece entre os endereços envolvidos na transação
    pub fn involved_in<'a>(&self, addresses: impl IntoIterator<Item = &'a String>) -> bool {
        addresses
            .into_iter()
            .any(|a| canonical_address(a) == self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watched() -> HashSet<String> {
        ["set_rewards".to_string()].into_iter().collect()
    }

    #[test]
    fn matches_case_insensitive_address() {
        let call = DecodedCall::new("set_rewards", "0xAA");
        assert!(matches(Some(&call), "0xaa", &watched()));
    }

    #[test]
    fn other_method_does_not_match() {
        let call = DecodedCall::new("withdraw", "0xAA");
        assert!(!matches(Some(&call), "0xaa", &watched()));
    }

    #[test]
    fn other_address_does_not_match() {
        let call = DecodedCall::new("set_rewards", "0xAB");
        assert!(!matches(Some(&call), "0xaa", &watched()));
    }

    #[test]
    fn absent_decode_is_no_match() {
        assert!(!matches(None, "0xaa", &watched()));
    }

    #[test]
    fn matcher_returns_method_severity() {
        let gauge = "0xBC0D9B2f2a23fA1f1F0eC9f4A0B6A39B6C0b7D94";
        let matcher = SignatureMatcher::new(
            gauge,
            vec![
                WatchedMethod::new("set_rewards", Severity::Low),
                WatchedMethod::new("kill_me", Severity::High),
                WatchedMethod::named("commit_transfer_ownership"),
            ],
            Severity::Medium,
        );
        let call = DecodedCall::new("kill_me", gauge.to_lowercase());
        assert_eq!(matcher.match_call(Some(&call)), Some(Severity::High));
        assert!(!matcher.matches(Some(&DecodedCall::new("deposit", gauge))));
        assert!(matcher.involved_in(&vec![gauge.to_uppercase().replace("0X", "0x")]));
        assert_eq!(
            matcher.match_call(Some(&DecodedCall::new("commit_transfer_ownership", gauge))),
            Some(Severity::Medium)
        );
        assert_eq!(matcher.method_names().len(), 3);
    }
}

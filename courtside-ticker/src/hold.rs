//! Operator holds per court.
//!
//! Written by the operator surface, read on every score emission by the court
//! schedulers. Courts never explicitly held read as "no hold".

use dashmap::DashMap;

/// Reason stored when the operator gives none.
pub const DEFAULT_HOLD_REASON: &str = "MANUAL";

/// Concurrent map from court id to hold reason.
#[derive(Debug, Default)]
pub struct HoldRegistry {
    holds: DashMap<String, String>,
}

impl HoldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `court_id`, returning the reason actually stored.
    ///
    /// A blank court id is ignored and yields `None`. A blank reason is stored
    /// as [`DEFAULT_HOLD_REASON`].
    pub fn set(&self, court_id: &str, reason: &str) -> Option<String> {
        let court_id = court_id.trim();
        if court_id.is_empty() {
            return None;
        }

        let reason = match reason.trim() {
            "" => DEFAULT_HOLD_REASON.to_string(),
            reason => reason.to_string(),
        };
        self.holds.insert(court_id.to_string(), reason.clone());
        Some(reason)
    }

    /// Release `court_id`. Returns `false` only for a blank court id.
    pub fn clear(&self, court_id: &str) -> bool {
        let court_id = court_id.trim();
        if court_id.is_empty() {
            return false;
        }

        self.holds.remove(court_id);
        true
    }

    pub fn reason(&self, court_id: &str) -> Option<String> {
        self.holds.get(court_id).map(|entry| entry.value().clone())
    }

    pub fn is_held(&self, court_id: &str) -> bool {
        self.holds.contains_key(court_id)
    }

    /// Every current hold, sorted by court id.
    pub fn held_courts(&self) -> Vec<(String, String)> {
        let mut holds: Vec<(String, String)> = self
            .holds
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        holds.sort();
        holds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;

    #[test]
    fn test_unknown_court_is_not_held() {
        let registry = HoldRegistry::new();
        assert!(!registry.is_held("C1"));
        assert_eq!(registry.reason("C1"), None);
    }

    #[rstest]
    #[case("INJURY", "INJURY")]
    #[case("  rain delay ", "rain delay")]
    #[case("", DEFAULT_HOLD_REASON)]
    #[case("   ", DEFAULT_HOLD_REASON)]
    fn test_set_normalizes_reason(#[case] reason: &str, #[case] expected: &str) {
        let registry = HoldRegistry::new();
        assert_eq!(registry.set("C1", reason).as_deref(), Some(expected));
        assert_eq!(registry.reason("C1").as_deref(), Some(expected));
    }

    #[test]
    fn test_blank_court_is_ignored() {
        let registry = HoldRegistry::new();
        assert_eq!(registry.set(" ", "INJURY"), None);
        assert!(!registry.clear(""));
        assert!(registry.held_courts().is_empty());
    }

    #[test]
    fn test_set_and_clear_are_idempotent() {
        let registry = HoldRegistry::new();
        registry.set("C1", "INJURY");
        registry.set("C1", "INJURY");
        assert_eq!(registry.held_courts(), vec![("C1".to_string(), "INJURY".to_string())]);

        assert!(registry.clear("C1"));
        assert!(registry.clear("C1"));
        assert!(!registry.is_held("C1"));
    }

    #[test]
    fn test_concurrent_writers() {
        let registry = Arc::new(HoldRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let court = format!("C{}", i % 2);
                    registry.set(&court, "WEATHER");
                    if i % 4 == 0 {
                        registry.clear(&court);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for (court, reason) in registry.held_courts() {
            assert!(court == "C0" || court == "C1");
            assert_eq!(reason, "WEATHER");
        }
    }
}

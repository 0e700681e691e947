//! Prometheus-backed registry used for a single scrape.

use std::collections::HashMap;

use prometheus::{self, GaugeVec, Opts, Registry, TextEncoder};

/// A gauge without variable labels that only shows up in the exposition
/// once it has been set.
///
/// A plain `prometheus::Gauge` always renders (as `0` when untouched), which
/// would hide a failed query behind a plausible value. Backing the gauge by a
/// label-less vector keeps the series absent until a task writes it.
#[derive(Clone)]
pub struct ScalarGauge(GaugeVec);

impl ScalarGauge {
    pub fn set(&self, value: f64) {
        let no_labels: [&str; 0] = [];
        self.0.with_label_values(&no_labels).set(value);
    }
}

/// Fresh registry plus the constant labels every instrument receives.
pub struct ScrapeRegistry {
    registry: Registry,
    const_labels: HashMap<String, String>,
}

impl ScrapeRegistry {
    pub fn new(const_labels: &HashMap<String, String>) -> Self {
        Self {
            registry: Registry::new(),
            const_labels: const_labels.clone(),
        }
    }

    fn opts(&self, name: &str, help: &str) -> Opts {
        Opts::new(name, help).const_labels(self.const_labels.clone())
    }

    /// Creates and registers a gauge vector partitioned by `labels`.
    pub fn gauge_vec(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<GaugeVec, prometheus::Error> {
        let gauge = GaugeVec::new(self.opts(name, help), labels)?;
        self.registry.register(Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    /// Creates and registers a gauge without variable labels.
    pub fn gauge(&self, name: &str, help: &str) -> Result<ScalarGauge, prometheus::Error> {
        self.gauge_vec(name, help, &[]).map(ScalarGauge)
    }

    /// Encodes every series written so far in the text exposition format.
    ///
    /// Families without any written series are skipped.
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> HashMap<String, String> {
        HashMap::from([("network".to_string(), "mainnet".to_string())])
    }

    #[test]
    fn const_labels_are_attached_to_every_series() {
        let registry = ScrapeRegistry::new(&labels());
        let supply = registry
            .gauge_vec("cosmos_general_supply_total", "Total supply", &["denom"])
            .expect("register supply");

        supply.with_label_values(&["uatom"]).set(5_000_000.0);

        let text = registry.gather_text().expect("encode");
        assert!(text.contains(r#"cosmos_general_supply_total{denom="uatom",network="mainnet"} 5000000"#));
    }

    #[test]
    fn unset_gauges_are_absent_from_output() {
        let registry = ScrapeRegistry::new(&HashMap::new());
        let bonded = registry
            .gauge("cosmos_general_bonded_tokens", "Bonded tokens")
            .expect("register bonded");
        registry
            .gauge("cosmos_general_not_bonded_tokens", "Not bonded tokens")
            .expect("register not bonded");

        bonded.set(42.0);

        let text = registry.gather_text().expect("encode");
        assert!(text.contains("cosmos_general_bonded_tokens 42"));
        assert!(!text.contains("cosmos_general_not_bonded_tokens"));
    }

    #[test]
    fn registries_do_not_share_series() {
        let first = ScrapeRegistry::new(&HashMap::new());
        let second = ScrapeRegistry::new(&HashMap::new());
        let a = first
            .gauge_vec("cosmos_wallet_balance", "Balance", &["address"])
            .expect("register first");
        second
            .gauge_vec("cosmos_wallet_balance", "Balance", &["address"])
            .expect("register second");

        a.with_label_values(&["cosmos1first"]).set(1.0);

        assert!(first.gather_text().expect("encode").contains("cosmos1first"));
        assert!(second.gather_text().expect("encode").is_empty());
    }

    #[test]
    fn duplicate_names_fail_registration() {
        let registry = ScrapeRegistry::new(&HashMap::new());
        registry.gauge("cosmos_status_peers", "Peers").expect("first");
        assert!(registry.gauge("cosmos_status_peers", "Peers").is_err());
    }
}

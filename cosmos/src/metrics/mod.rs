//! Per-request Prometheus registries.
//!
//! Every scrape builds its own [`ScrapeRegistry`], registers the gauges of
//! its endpoint into it, fills them and renders the text exposition. Nothing
//! is shared between requests, so series from one scrape can never leak into
//! another.
//!
//! Typical usage in a handler:
//!
//! ```ignore
//! let registry = ScrapeRegistry::new(&const_labels);
//! let supply = registry.gauge_vec("cosmos_general_supply_total", "Total supply", &["denom"])?;
//! supply.with_label_values(&["uatom"]).set(5_000_000.0);
//! let body = registry.gather_text()?;
//! ```

pub mod registry;

pub use registry::{ScalarGauge, ScrapeRegistry};

pub use prometheus::{Error as MetricsError, GaugeVec, TEXT_FORMAT as CONTENT_TYPE};

// Metrics module
// Prometheus counters for quizzes served and dictionary traffic

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    /// Verb quizzes served, labelled by `sentence` = found | none
    verb_quizzes: IntCounterVec,
    /// PONS lookups, labelled by `source` = cache | api | error
    pons_lookups: IntCounterVec,
    /// Failed calls to external services, labelled by `service`
    upstream_errors: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new_custom(Some("vocab_quiz".to_string()), None)
            .context("Failed to create metrics registry")?;

        let verb_quizzes = IntCounterVec::new(
            Opts::new("verb_quizzes_total", "Verb quizzes served"),
            &["sentence"],
        )?;
        let pons_lookups = IntCounterVec::new(
            Opts::new("pons_lookups_total", "PONS dictionary lookups by source"),
            &["source"],
        )?;
        let upstream_errors = IntCounterVec::new(
            Opts::new("upstream_errors_total", "Failed calls to external services"),
            &["service"],
        )?;

        registry.register(Box::new(verb_quizzes.clone()))?;
        registry.register(Box::new(pons_lookups.clone()))?;
        registry.register(Box::new(upstream_errors.clone()))?;

        Ok(Self {
            registry,
            verb_quizzes,
            pons_lookups,
            upstream_errors,
        })
    }

    pub fn record_verb_quiz(&self, with_sentence: bool) {
        let label = if with_sentence { "found" } else { "none" };
        self.verb_quizzes.with_label_values(&[label]).inc();
    }

    pub fn record_pons_lookup(&self, source: &str) {
        self.pons_lookups.with_label_values(&[source]).inc();
    }

    pub fn record_upstream_error(&self, service: &str) {
        self.upstream_errors.with_label_values(&[service]).inc();
    }

    /// Render all counters in the Prometheus text format.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not UTF-8")
    }
}

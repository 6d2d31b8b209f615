//! Telemetry capability for agent runs.
//!
//! The chains take an explicit `&dyn Tracer` instead of reaching for a
//! lazily-initialized global client. Disabled telemetry is a no-op
//! implementation of the same interface, so orchestration code never
//! branches on "is tracing configured".

use tracing::info;

/// Span sink for agent phases (`plan`, `patch`, `verdict`, ...).
pub trait Tracer {
    fn span(&self, name: &str, metadata: &[(&str, &str)]);
}

/// Discards all spans.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn span(&self, _name: &str, _metadata: &[(&str, &str)]) {}
}

/// Emits spans as structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn span(&self, name: &str, metadata: &[(&str, &str)]) {
        info!(target: "autodev::trace", span = name, ?metadata, "agent span");
    }
}

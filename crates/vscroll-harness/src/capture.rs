#![forbid(unsafe_code)]

//! Tracing capture for asserting on the engine's spans and log events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

/// A captured span with its fields and parent.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: String,
    pub fields: HashMap<String, String>,
    pub parent_name: Option<String>,
}

/// A captured log event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub target: String,
    pub message: Option<String>,
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct Records {
    spans: Vec<CapturedSpan>,
    events: Vec<CapturedEvent>,
}

/// Layer recording every span creation and event.
struct CaptureLayer {
    records: Arc<Mutex<Records>>,
}

/// Handle to read what was captured.
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    records: Arc<Mutex<Records>>,
}

impl CaptureHandle {
    /// All spans, in creation order.
    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.lock().spans.clone()
    }

    /// Spans named `name`.
    pub fn spans_named(&self, name: &str) -> Vec<CapturedSpan> {
        self.lock()
            .spans
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }

    /// All events, in emission order.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.lock().events.clone()
    }

    /// Events at exactly `level`.
    pub fn events_at(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Whether any event at `level` has a message containing `needle`.
    pub fn has_message(&self, level: tracing::Level, needle: &str) -> bool {
        self.events_at(level)
            .iter()
            .any(|e| e.message.as_deref().is_some_and(|m| m.contains(needle)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for CaptureLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);

        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());

        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .spans
            .push(CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields: visitor.0.into_iter().collect(),
                parent_name,
            });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.remove("message");
        let metadata = event.metadata();

        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .push(CapturedEvent {
                level: *metadata.level(),
                target: metadata.target().to_string(),
                message,
                fields,
            });
    }
}

/// Run `f` under a capturing subscriber and return its result with the
/// captured records.
pub fn with_captured_tracing<F, R>(f: F) -> (R, CaptureHandle)
where
    F: FnOnce() -> R,
{
    let records = Arc::new(Mutex::new(Records::default()));
    let layer = CaptureLayer {
        records: Arc::clone(&records),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, CaptureHandle { records })
}

//! Tracing layer that streams generation progress to a host UI.
//!
//! Events whose target belongs to a chronicle crate are converted into
//! [`GenerationEvent`]s and pushed into an unbounded channel, so the host can
//! render progress and toasts without parsing log lines.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Target prefix shared by every chronicle crate.
pub const CHRONICLE_TARGET_PREFIX: &str = "chronicle";

/// Event data sent to the host.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GenerationEvent {
    /// Event target (e.g. "chronicle_application::issue::panel_workflow")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    pub message: String,
    /// Structured fields of the event (e.g. category, panel_id, epoch)
    pub fields: HashMap<String, Value>,
    /// Fields of the enclosing span, if any
    pub span: HashMap<String, Value>,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl GenerationEvent {
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Forwards chronicle events to a channel.
pub struct GenerationEventLayer {
    sender: mpsc::UnboundedSender<GenerationEvent>,
}

impl GenerationEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<GenerationEvent>) -> Self {
        Self { sender }
    }

    /// Creates a layer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GenerationEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

/// Span fields, stored in the span's extensions when it is created.
struct SpanFields(HashMap<String, Value>);

impl<S> Layer<S> for GenerationEventLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if !attrs.metadata().target().starts_with(CHRONICLE_TARGET_PREFIX) {
            return;
        }
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        span.extensions_mut().insert(SpanFields(fields));
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(CHRONICLE_TARGET_PREFIX) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let span = ctx
            .event_span(event)
            .and_then(|span| {
                span.extensions()
                    .get::<SpanFields>()
                    .map(|stored| stored.0.clone())
            })
            .unwrap_or_default();

        let message = fields
            .remove("message")
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();

        let generation_event = GenerationEvent {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message,
            fields,
            span,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // A dropped receiver only means nobody is listening any more
        let _ = self.sender.send(generation_event);
    }
}

/// Collects tracing fields into JSON values.
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

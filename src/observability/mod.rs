//! Observability for the schema engine
//!
//! Lifecycle events are emitted through `tracing` under the `docschema`
//! target. The library never installs a subscriber; the embedding
//! application decides where events go.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on outputs
//! 3. Rejections log at WARN, everything else at DEBUG
//! 4. Context travels as separate structured fields, never a rendered string

mod events;

pub use events::Event;

/// Structured context attached to an event
///
/// Unset fields are left out of the emitted event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fields<'a> {
    /// Dotted path the event concerns
    pub path: Option<&'a str>,
    /// Failure reason for rejections
    pub reason: Option<&'a str>,
    /// Normalization mode (`full`, `partial` or `update`)
    pub mode: Option<&'a str>,
    /// Number of items involved (properties, keys, unique paths)
    pub count: Option<usize>,
}

impl<'a> Fields<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: &'a str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn reason(mut self, reason: &'a str) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn mode(mut self, mode: &'a str) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, Fields::new());
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: Fields<'_>) {
    let count = fields.count.map(|c| c as u64);
    if event.is_rejection() {
        tracing::warn!(
            target: "docschema",
            event = event.as_str(),
            path = fields.path,
            reason = fields.reason,
            mode = fields.mode,
            count,
        );
    } else {
        tracing::debug!(
            target: "docschema",
            event = event.as_str(),
            path = fields.path,
            reason = fields.reason,
            mode = fields.mode,
            count,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event as TracingEvent, Metadata, Subscriber};

    type Recorded = Arc<Mutex<Vec<(String, String)>>>;

    /// Keeps every field of every event it sees.
    struct Recorder(Recorded);

    struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.0.push((field.name().to_string(), value.to_string()));
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl Subscriber for Recorder {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.target() == "docschema"
        }

        fn new_span(&self, _: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }

        fn record(&self, _: &Id, _: &Record<'_>) {}

        fn record_follows_from(&self, _: &Id, _: &Id) {}

        fn event(&self, event: &TracingEvent<'_>) {
            let mut recorded = self.0.lock().unwrap();
            event.record(&mut FieldVisitor(&mut recorded));
        }

        fn enter(&self, _: &Id) {}

        fn exit(&self, _: &Id) {}
    }

    fn capture(f: impl FnOnce()) -> Vec<(String, String)> {
        let recorded = Recorded::default();
        tracing::subscriber::with_default(Recorder(recorded.clone()), f);
        let out = recorded.lock().unwrap().clone();
        out
    }

    fn get<'a>(recorded: &'a [(String, String)], key: &str) -> Option<&'a str> {
        recorded
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_fields_builder() {
        let fields = Fields::new().path("title").mode("full").count(3);
        assert_eq!(fields.path, Some("title"));
        assert_eq!(fields.mode, Some("full"));
        assert_eq!(fields.count, Some(3));
        assert_eq!(fields.reason, None);
    }

    #[test]
    fn test_fields_are_separate_keys() {
        let recorded = capture(|| {
            log_event_with_fields(
                Event::DocumentRejected,
                Fields::new()
                    .path("profile.username")
                    .reason("is required")
                    .mode("partial"),
            );
        });

        assert_eq!(get(&recorded, "event"), Some("DOCUMENT_REJECTED"));
        assert_eq!(get(&recorded, "path"), Some("profile.username"));
        assert_eq!(get(&recorded, "reason"), Some("is required"));
        assert_eq!(get(&recorded, "mode"), Some("partial"));
        assert_eq!(get(&recorded, "count"), None);
        assert_eq!(get(&recorded, "fields"), None);
    }

    #[test]
    fn test_count_is_numeric() {
        let recorded = capture(|| {
            log_event_with_fields(Event::SchemaBuilt, Fields::new().count(4));
        });
        assert_eq!(get(&recorded, "count"), Some("4"));
        assert_eq!(get(&recorded, "path"), None);
    }

    #[test]
    fn test_log_event() {
        // No subscriber installed: must be a silent no-op
        log_event(Event::SchemaBuilt);
        log_event_with_fields(Event::DocumentRejected, Fields::new().path("title"));
    }
}

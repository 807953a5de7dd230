use std::fmt::{Debug, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::event::Event;
use tracing::field::{Field, Visit};
use tracing::{span, Id, Level, Metadata, Subscriber};

/// Prints events at or above `max_level` to stderr, one line each. Stdout is reserved for
/// packet-out lines.
pub struct StderrSubscriber {
    ids: AtomicUsize,
    max_level: Level,
}

impl StderrSubscriber {
    pub fn new(max_level: Level) -> Self {
        StderrSubscriber {
            ids: AtomicUsize::new(1),
            max_level,
        }
    }
}

// https://docs.rs/tracing/0.1/tracing/subscriber/trait.Subscriber.html
impl Subscriber for StderrSubscriber {
    // More verbose levels compare greater
    fn enabled(&self, metadata: &Metadata) -> bool {
        *metadata.level() <= self.max_level
    }

    // Spans only need distinct ids; their fields are not printed
    fn new_span(&self, _span: &span::Attributes) -> Id {
        let id = self.ids.fetch_add(1, Ordering::Relaxed);
        Id::from_u64(id as u64)
    }

    fn record(&self, _span: &Id, _values: &span::Record) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        eprintln!(
            "{:>5} {}: {}{}",
            metadata.level(),
            metadata.target(),
            visitor.message,
            visitor.fields
        );
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        // Writing to a String cannot fail
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

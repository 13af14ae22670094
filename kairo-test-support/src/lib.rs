//! Shared test utilities used across kairo crates.

pub mod ci;

pub mod tracing {
    //! A recording layer that captures closed spans and emitted events so
    //! tests can assert on instrumentation.

    use std::{
        collections::HashMap,
        fmt,
        sync::{Arc, Mutex, MutexGuard, PoisonError},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    };
    use tracing_subscriber::{Layer, layer::Context, prelude::*, registry::LookupSpan};

    /// A closed span with its name and the fields recorded over its lifetime.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the callsite metadata.
        pub name: String,
        /// Field values rendered as strings.
        pub fields: HashMap<String, String>,
    }

    impl SpanRecord {
        /// Returns a field value, if the span recorded it.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    /// An emitted event with its level, target and fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target, usually the emitting module path.
        pub target: String,
        /// Field values rendered as strings; the message is under `message`.
        pub fields: HashMap<String, String>,
    }

    #[derive(Default)]
    struct Journal {
        spans: Vec<SpanRecord>,
        events: Vec<EventRecord>,
    }

    /// Layer that journals spans (on close) and events (on emission).
    ///
    /// Clones share one journal, so a clone kept by the test observes what
    /// the installed copy records.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        journal: Arc<Mutex<Journal>>,
    }

    impl RecordingLayer {
        /// Runs `body` with a fresh recording subscriber installed for the
        /// current thread and returns its output together with the layer.
        ///
        /// # Examples
        /// ```
        /// use kairo_test_support::tracing::RecordingLayer;
        ///
        /// let ((), layer) = RecordingLayer::capture(|| {
        ///     let span = tracing::info_span!("core.demo", answer = 42);
        ///     let _guard = span.enter();
        ///     tracing::info!(ok = true, "inside");
        /// });
        /// let span = layer.span_named("core.demo").expect("span recorded");
        /// assert_eq!(span.field("answer"), Some("42"));
        /// assert_eq!(layer.events().len(), 1);
        /// ```
        pub fn capture<T>(body: impl FnOnce() -> T) -> (T, Self) {
            let layer = Self::default();
            let subscriber = tracing_subscriber::registry().with(layer.clone());
            let output = tracing::subscriber::with_default(subscriber, body);
            (output, layer)
        }

        /// Returns the closed spans in completion order.
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.lock().spans.clone()
        }

        /// Returns the emitted events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.lock().events.clone()
        }

        /// Returns the first closed span called `name`.
        #[must_use]
        pub fn span_named(&self, name: &str) -> Option<SpanRecord> {
            self.lock().spans.iter().find(|span| span.name == name).cloned()
        }

        /// Returns the events emitted at `level`.
        #[must_use]
        pub fn events_at(&self, level: Level) -> Vec<EventRecord> {
            self.lock()
                .events
                .iter()
                .filter(|event| event.level == level)
                .cloned()
                .collect()
        }

        fn lock(&self) -> MutexGuard<'_, Journal> {
            // A panicking test thread must not hide what was recorded.
            self.journal.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Fields gathered for a span that is still open.
    struct OpenSpan {
        name: &'static str,
        fields: HashMap<String, String>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut open = OpenSpan {
                name: attrs.metadata().name(),
                fields: HashMap::new(),
            };
            attrs.record(&mut Collector(&mut open.fields));
            span.extensions_mut().insert(open);
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            if let Some(span) = ctx.span(id)
                && let Some(open) = span.extensions_mut().get_mut::<OpenSpan>()
            {
                values.record(&mut Collector(&mut open.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(open) = ctx
                .span(&id)
                .and_then(|span| span.extensions_mut().remove::<OpenSpan>())
            else {
                return;
            };
            self.lock().spans.push(SpanRecord {
                name: open.name.to_owned(),
                fields: open.fields,
            });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut Collector(&mut fields));
            let metadata = event.metadata();
            self.lock().events.push(EventRecord {
                level: *metadata.level(),
                target: metadata.target().to_owned(),
                fields,
            });
        }
    }

    /// Renders strings verbatim and everything else through `Debug`.
    struct Collector<'a>(&'a mut HashMap<String, String>);

    impl Visit for Collector<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_owned(), value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_owned(), format!("{value:?}"));
        }
    }
}

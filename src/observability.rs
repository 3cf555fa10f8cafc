use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("sparkchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("sparkchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("sparkchat.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("sparkchat.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("sparkchat.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("sparkchat.stream.bytes");
pub(crate) static STREAM_TTFB: Moments = Moments::new("sparkchat.stream.ttfb_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("sparkchat.session.turns");
pub(crate) static SESSION_MODEL_ERRORS: Counter = Counter::new("sparkchat.session.model_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_TTFB);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_MODEL_ERRORS);
}

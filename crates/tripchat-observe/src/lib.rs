//! Tracing setup for Tripchat: structured `fmt` logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;

//! Runtime-backed implementations of the timing ports.

mod sleeper;

pub use sleeper::TokioSleeper;

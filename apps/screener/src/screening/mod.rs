// Deterministic screening tools: term normalization, candidate scoring, and
// interview-question cleanup. All pure and synchronous — the driver may call
// them from any poll loop, and a retried pause re-invokes them safely.

pub mod handlers;
pub mod models;
pub mod normalize;
pub mod questions;
pub mod scoring;

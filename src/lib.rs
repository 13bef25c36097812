//! Aeris - multi-source air quality acquisition pipeline
//!
//! Answers one question reliably and cheaply: what is the current air
//! quality at this coordinate, in a canonical shape, without hammering
//! upstream providers. Several unreliable, heterogeneously-shaped sources
//! are composed into one dependable read through a freshness-checked cache
//! and an ordered fallback chain ending in deterministic synthetic data.

pub mod config;
pub mod geocode;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod reading;
pub mod store;

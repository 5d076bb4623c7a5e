//! Pantry stock form built with Larder widgets.
//!
//! The same component tree runs headlessly in the native binary and in the
//! browser through the `web` feature.

pub mod app;

#[cfg(feature = "web")]
mod web;

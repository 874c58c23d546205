//! `glassybites` command-line studio.
//!
//! Loads configuration and the saved API key, runs a batch through the
//! pipeline and renders the resulting storyboard cards.

pub mod commands;
pub mod config;
pub mod credentials;
pub mod progress;
pub mod render;

//! GlassyBites studio event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`StudioEvent`]: timestamped envelope around a [`StudioEventKind`].

pub mod bus;

pub use bus::{EventBus, StudioEvent, StudioEventKind};

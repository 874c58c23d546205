//! Storyboard creative template and response parsing.
//!
//! The slot set (which scenes the remote model must fill, in which
//! order, with which fallback titles) is carried by a
//! [`StoryboardTemplate`] value so it can change without touching the
//! orchestration code.

mod response;
mod template;

pub use response::{parse_storyboard, strip_code_fence, StoryboardParseError};
pub use template::{BiteSlotSpec, SlotSpec, StoryboardTemplate};

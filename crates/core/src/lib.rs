//! GlassyBites domain types and pure storyboard logic.
//!
//! Nothing in this crate performs I/O. The remote call lives in
//! `glassybites-gemini`; state management and orchestration live in
//! `glassybites-pipeline`.

pub mod error;
pub mod food_list;
pub mod project;
pub mod storyboard;
pub mod types;

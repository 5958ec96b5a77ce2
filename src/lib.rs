//! Core of an interactive diagram editor: the authoritative shape/link
//! store with its geometric algorithms (depth-aware hit-testing, marquee
//! selection, grouping, port re-anchoring) and the per-tool pointer state
//! machines that drive them. Painting, menus, and dialogs live in the host
//! view, which reads the store through [`store::DiagramStore`] and the
//! [`tools::Editor`] accessors.

pub mod error;
pub mod model;
pub mod store;
pub mod tools;

pub use error::ToolError;
pub use store::{ChangeEvent, DiagramStore};
pub use tools::{Editor, ToolMode};

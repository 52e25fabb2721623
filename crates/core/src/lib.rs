//! Domain model and pure logic for Panelsmith comic projects.
//!
//! Everything in this crate is synchronous and side-effect free: the
//! persisted document types, page layout rules, reference-character
//! matching, the prior-panel context window and input validation.

pub mod context;
pub mod error;
pub mod layout;
pub mod model;
pub mod reference;
pub mod template;
pub mod types;
pub mod validation;

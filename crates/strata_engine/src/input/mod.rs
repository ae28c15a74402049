//! Pointer interaction components
//!
//! Hit-testing belongs to the platform layer; the core only tracks which
//! entities react together when one of them is clicked.

pub mod clickable;

pub use clickable::ClickableComponent;

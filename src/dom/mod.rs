//! In-memory page document.
//!
//! Page components (translator, switchers, FAQ, contact form) operate on this
//! tree instead of a browser DOM, so their behaviour is the same whether the
//! tree is mirrored into a real page or inspected in tests.

mod document;
mod element;

pub use document::Document;
pub use element::{Content, Element, NodeId};

/// Class that hides page content until the first translation pass finishes.
pub const LOADING_CLASS: &str = "i18n-loading";

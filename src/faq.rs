//! FAQ accordion.

use crate::dom::{Document, NodeId};

pub const ITEM_CLASS: &str = "faq-item";
pub const QUESTION_CLASS: &str = "faq-question";
pub const OPEN_CLASS: &str = "open";
pub const TOGGLE_ICON_CLASS: &str = "faq-toggle-icon";

const ICON_OPEN: &str = "↑";
const ICON_CLOSED: &str = "↓";

/// Open or close the FAQ item containing `question`.
///
/// Returns the new open state, or `None` when `question` is not inside an
/// FAQ item.
pub fn toggle(document: &mut Document, question: NodeId) -> Option<bool> {
    let item = document.closest_with_class(question, ITEM_CLASS)?;
    let open = document.get_mut(item)?.toggle_class(OPEN_CLASS);

    if let Some(el) = document.get_mut(question) {
        el.set_attribute("aria-expanded", if open { "true" } else { "false" });
    }
    if let Some(icon) = document.find_descendant_with_class(question, TOGGLE_ICON_CLASS) {
        if let Some(el) = document.get_mut(icon) {
            el.set_text(if open { ICON_OPEN } else { ICON_CLOSED });
        }
    }

    Some(open)
}

//! Language switcher widgets.
//!
//! Two markup styles exist on the site:
//!
//! - Modern: `#languageBtn` with `.flag` and `.lang-text` spans, a
//!   `#languageDropdown` menu and `.language-option` entries carrying `data-lang`
//! - Legacy: `.lang-selector` buttons (with a `.globe-icon`) each paired with a
//!   `.lang-list` menu of `<a>` options labelled by language name
//!
//! Widgets never reference each other. Each one re-renders from the service's
//! current language whenever the page runtime forwards a change.

use crate::dom::{Document, NodeId};
use crate::i18n::{I18n, I18nError, LanguageCode};
use std::sync::Arc;
use tracing::{debug, warn};

pub const ACTIVE_CLASS: &str = "active";

pub const MODERN_BUTTON_ID: &str = "languageBtn";
pub const MODERN_DROPDOWN_ID: &str = "languageDropdown";
pub const MODERN_OPTION_CLASS: &str = "language-option";
pub const MODERN_CONTAINER_CLASS: &str = "language-switcher";

pub const LEGACY_SELECTOR_CLASS: &str = "lang-selector";
pub const LEGACY_LIST_CLASS: &str = "lang-list";
pub const LEGACY_WRAPPER_CLASS: &str = "lang-dropdown-wrapper";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitcherStyle {
    Modern,
    Legacy,
}

pub struct LanguageSwitcher {
    style: SwitcherStyle,
    i18n: Arc<I18n>,
}

impl LanguageSwitcher {
    pub fn new(style: SwitcherStyle, i18n: Arc<I18n>) -> Self {
        Self { style, i18n }
    }

    pub fn modern(i18n: Arc<I18n>) -> Self {
        Self::new(SwitcherStyle::Modern, i18n)
    }

    pub fn legacy(i18n: Arc<I18n>) -> Self {
        Self::new(SwitcherStyle::Legacy, i18n)
    }

    pub fn style(&self) -> SwitcherStyle {
        self.style
    }

    /// Whether the document contains this widget's markup.
    pub fn is_present(&self, document: &Document) -> bool {
        match self.style {
            SwitcherStyle::Modern => {
                document.get_element_by_id(MODERN_BUTTON_ID).is_some()
                    && document.get_element_by_id(MODERN_DROPDOWN_ID).is_some()
            }
            SwitcherStyle::Legacy => !document.query_class(LEGACY_SELECTOR_CLASS).is_empty(),
        }
    }

    /// Language chosen by a legacy option label.
    pub fn language_for_label(label: &str) -> LanguageCode {
        let label = label.trim();
        if label.contains("Arabic") || label.contains("العربية") {
            LanguageCode::Ar
        } else {
            LanguageCode::En
        }
    }

    /// Switch to `code` and close the dropdown.
    pub async fn select(
        &self,
        code: &str,
        document: &mut Document,
    ) -> Result<LanguageCode, I18nError> {
        let result = self.i18n.set_language(code, document).await;
        self.close_dropdown(document);
        if let Ok(language) = result {
            self.render(document, language);
        }
        result
    }

    /// Handle a click on one of this widget's option elements.
    ///
    /// Modern options name their language in `data-lang`; legacy options are
    /// matched by label. Returns `None` when `option` is not an option of
    /// this widget.
    pub async fn select_option(
        &self,
        option: NodeId,
        document: &mut Document,
    ) -> Option<Result<LanguageCode, I18nError>> {
        let code = match self.style {
            SwitcherStyle::Modern => {
                let el = document.get(option)?;
                if !el.has_class(MODERN_OPTION_CLASS) {
                    return None;
                }
                el.get_attribute("data-lang")?.to_string()
            }
            SwitcherStyle::Legacy => {
                let el = document.get(option)?;
                if el.tag() != "a" || document.closest_with_class(option, LEGACY_LIST_CLASS).is_none()
                {
                    return None;
                }
                Self::language_for_label(el.text()).code().to_string()
            }
        };

        debug!("Language option selected: {}", code);
        Some(self.select(&code, document).await)
    }

    /// Show the current language on the widget.
    pub fn render(&self, document: &mut Document, language: LanguageCode) {
        match self.style {
            SwitcherStyle::Modern => {
                let Some(button) = document.get_element_by_id(MODERN_BUTTON_ID) else {
                    return;
                };
                let flag = document.find_descendant_with_class(button, "flag");
                let text = document.find_descendant_with_class(button, "lang-text");
                let (Some(flag), Some(text)) = (flag, text) else {
                    warn!("Language button is missing its flag or label");
                    return;
                };
                if let Some(el) = document.get_mut(flag) {
                    el.set_text(language.flag());
                }
                if let Some(el) = document.get_mut(text) {
                    el.set_text(language.short_label());
                }
            }
            SwitcherStyle::Legacy => {
                // Child elements (the globe icon) are untouched by set_text.
                let label = format!(" {}", language.short_label());
                for selector in document.query_class(LEGACY_SELECTOR_CLASS) {
                    if let Some(el) = document.get_mut(selector) {
                        el.set_text(&label);
                    }
                }
            }
        }
    }

    /// Toggle the dropdown of the selector at `index`. Legacy widgets close
    /// every other list; modern widgets have a single dropdown.
    pub fn toggle_dropdown(&self, document: &mut Document, index: usize) -> bool {
        match self.style {
            SwitcherStyle::Modern => document
                .get_element_by_id(MODERN_DROPDOWN_ID)
                .and_then(|id| document.get_mut(id))
                .map(|el| el.toggle_class(ACTIVE_CLASS))
                .unwrap_or(false),
            SwitcherStyle::Legacy => {
                let mut opened = false;
                for (i, list) in document.query_class(LEGACY_LIST_CLASS).into_iter().enumerate() {
                    let Some(el) = document.get_mut(list) else { continue };
                    if i == index {
                        opened = el.toggle_class(ACTIVE_CLASS);
                    } else {
                        el.remove_class(ACTIVE_CLASS);
                    }
                }
                opened
            }
        }
    }

    pub fn close_dropdown(&self, document: &mut Document) {
        for list in self.dropdowns(document) {
            if let Some(el) = document.get_mut(list) {
                el.remove_class(ACTIVE_CLASS);
            }
        }
    }

    /// Close the dropdown when a click lands outside the widget.
    pub fn handle_document_click(&self, document: &mut Document, target: NodeId) {
        let container = match self.style {
            SwitcherStyle::Modern => MODERN_CONTAINER_CLASS,
            SwitcherStyle::Legacy => LEGACY_WRAPPER_CLASS,
        };
        if document.closest_with_class(target, container).is_none() {
            self.close_dropdown(document);
        }
    }

    pub fn is_open(&self, document: &Document) -> bool {
        self.dropdowns(document)
            .into_iter()
            .any(|id| document.get(id).is_some_and(|el| el.has_class(ACTIVE_CLASS)))
    }

    fn dropdowns(&self, document: &Document) -> Vec<NodeId> {
        match self.style {
            SwitcherStyle::Modern => document.get_element_by_id(MODERN_DROPDOWN_ID).into_iter().collect(),
            SwitcherStyle::Legacy => document.query_class(LEGACY_LIST_CLASS),
        }
    }
}

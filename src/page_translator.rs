//! Page translation: rewrites marked elements from the active dictionary.
//!
//! Markup declares bindings with attributes:
//!
//! - `data-i18n="key.path"`: replace the element's text
//! - `data-i18n-prefix="..."`: literal text placed before the translation
//! - `data-i18n-html="true"`: render the translation as markup instead of text
//! - `data-i18n-placeholder="key.path"`: replace the `placeholder` attribute
//!
//! Older pages have an unmarked footer of `.nav-column` blocks. Those columns
//! and their links are recognised by their English or Arabic label instead.

use crate::dom::{Document, NodeId, LOADING_CLASS};
use crate::i18n::{translator_or_identity, Translate};
use std::sync::Arc;
use tracing::debug;

pub const I18N_ATTR: &str = "data-i18n";
pub const PREFIX_ATTR: &str = "data-i18n-prefix";
pub const HTML_ATTR: &str = "data-i18n-html";
pub const PLACEHOLDER_ATTR: &str = "data-i18n-placeholder";
pub const NAV_COLUMN_CLASS: &str = "nav-column";

/// A legacy footer column, found by its `h4` heading.
struct FooterColumn {
    key: &'static str,
    labels: [&'static str; 2],
    links: &'static [FooterLink],
}

/// A link inside a legacy footer column, found by label or `href`.
struct FooterLink {
    key: &'static str,
    labels: [&'static str; 2],
    href: Option<&'static str>,
}

static FOOTER_COLUMNS: [FooterColumn; 2] = [
    FooterColumn {
        key: "footer.resources",
        labels: ["Resources", "الموارد"],
        links: &[
            FooterLink {
                key: "footer.aboutUs",
                labels: ["About us", "من نحن"],
                href: None,
            },
            FooterLink {
                key: "footer.contactUs",
                labels: ["Contact us", "اتصل بنا"],
                href: None,
            },
            FooterLink {
                key: "footer.faq",
                labels: ["FAQ", "الأسئلة الشائعة"],
                href: None,
            },
        ],
    },
    FooterColumn {
        key: "footer.solutions",
        labels: ["Solutions", "الحلول"],
        links: &[
            FooterLink {
                key: "common.pricing",
                labels: ["Pricing", "الأسعار"],
                href: Some("dashboard.html"),
            },
            FooterLink {
                key: "common.getStarted",
                labels: ["Get Started", "ابدأ"],
                href: Some("form.html"),
            },
        ],
    },
];

/// How a resolved translation is written into its element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    Text { prefix: String },
    Markup,
    Placeholder,
}

/// One marker found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub node: NodeId,
    pub key: String,
    pub mode: RenderMode,
}

/// Outcome of one translation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationPass {
    /// Bindings whose key resolved and were written
    pub applied: usize,
    /// Keys that did not resolve; their elements were left unchanged
    pub unresolved: Vec<String>,
    /// Whether the page title was replaced
    pub title_applied: bool,
    /// Legacy footer headings and links rewritten
    pub footer_applied: usize,
}

pub struct PageTranslator {
    translator: Arc<dyn Translate>,
}

impl PageTranslator {
    /// A translator backed by `translator`, or by the identity translator
    /// (which leaves every element unchanged) when none is available.
    pub fn new(translator: Option<Arc<dyn Translate>>) -> Self {
        Self {
            translator: translator_or_identity(translator),
        }
    }

    /// Page name derived from a document path: last segment without its
    /// extension, `index` for an empty segment.
    pub fn page_name(path: &str) -> String {
        let file = path.rsplit('/').next().unwrap_or_default();
        let name = file.split('.').next().unwrap_or_default();
        if name.is_empty() {
            "index".to_string()
        } else {
            name.to_string()
        }
    }

    /// Every marker in the document, in document order. Text/markup bindings
    /// come before placeholder bindings.
    pub fn bindings(document: &Document) -> Vec<Binding> {
        let mut bindings = Vec::new();

        for node in document.query_attribute(I18N_ATTR) {
            let Some(el) = document.get(node) else { continue };
            let Some(key) = el.get_attribute(I18N_ATTR) else { continue };
            let mode = if el.get_attribute(HTML_ATTR) == Some("true") {
                RenderMode::Markup
            } else {
                RenderMode::Text {
                    prefix: el.get_attribute(PREFIX_ATTR).unwrap_or_default().to_string(),
                }
            };
            bindings.push(Binding {
                node,
                key: key.to_string(),
                mode,
            });
        }

        for node in document.query_attribute(PLACEHOLDER_ATTR) {
            if let Some(key) = document.get(node).and_then(|el| el.get_attribute(PLACEHOLDER_ATTR)) {
                bindings.push(Binding {
                    node,
                    key: key.to_string(),
                    mode: RenderMode::Placeholder,
                });
            }
        }

        bindings
    }

    /// Translate the whole page and reveal it.
    ///
    /// Safe to run repeatedly: output depends only on the markers and the
    /// dictionary, never on the text a previous pass wrote.
    pub fn translate_all(&self, document: &mut Document) -> TranslationPass {
        let mut pass = TranslationPass {
            title_applied: self.translate_title(document),
            ..TranslationPass::default()
        };

        for binding in Self::bindings(document) {
            let translation = self.translator.t(&binding.key);
            if translation.is_empty() || translation == binding.key {
                pass.unresolved.push(binding.key);
                continue;
            }

            let Some(el) = document.get_mut(binding.node) else { continue };
            match &binding.mode {
                RenderMode::Text { prefix } => el.set_text(&format!("{}{}", prefix, translation)),
                RenderMode::Markup => el.set_markup(&translation),
                RenderMode::Placeholder => el.set_attribute("placeholder", &translation),
            }
            pass.applied += 1;
        }
        pass.footer_applied = self.translate_legacy_footer(document);

        document.document_element_mut().remove_class(LOADING_CLASS);
        debug!(
            "Translated page '{}' ({}): {} applied, {} unresolved",
            Self::page_name(document.path()),
            self.translator.language(),
            pass.applied,
            pass.unresolved.len()
        );
        pass
    }

    /// Replace the document title with `<page>.pageTitle` when it resolves.
    fn translate_title(&self, document: &mut Document) -> bool {
        let key = format!("{}.pageTitle", Self::page_name(document.path()));
        let title = self.translator.t(&key);
        if title.is_empty() || title == key {
            return false;
        }
        document.set_title(&title);
        true
    }

    /// Rewrite `.nav-column` footers that predate the markers. Returns how
    /// many headings and links were written.
    fn translate_legacy_footer(&self, document: &mut Document) -> usize {
        let mut applied = 0;

        for column in document.query_class(NAV_COLUMN_CLASS) {
            let nodes = document.descendants(column);
            let Some(heading) = nodes.iter().copied().find(|&id| has_tag(document, id, "h4")) else {
                continue;
            };
            let label = own_text(document, heading);
            let Some(group) = FOOTER_COLUMNS.iter().find(|c| c.labels.contains(&label.as_str()))
            else {
                continue;
            };
            applied += usize::from(self.write_text(document, heading, group.key));

            let links: Vec<NodeId> = nodes
                .into_iter()
                .filter(|&id| has_tag(document, id, "a"))
                .collect();
            for link in links {
                let label = own_text(document, link);
                let href = document
                    .get(link)
                    .and_then(|el| el.get_attribute("href"))
                    .map(str::to_string);
                let matched = group.links.iter().find(|entry| {
                    entry.labels.contains(&label.as_str())
                        || (entry.href.is_some() && entry.href == href.as_deref())
                });
                if let Some(entry) = matched {
                    applied += usize::from(self.write_text(document, link, entry.key));
                }
            }
        }
        applied
    }

    /// Set `node`'s text to the translation of `key` if it resolves.
    fn write_text(&self, document: &mut Document, node: NodeId, key: &str) -> bool {
        let translation = self.translator.t(key);
        if translation.is_empty() || translation == key {
            return false;
        }
        match document.get_mut(node) {
            Some(el) => {
                el.set_text(&translation);
                true
            }
            None => false,
        }
    }
}

fn has_tag(document: &Document, node: NodeId, tag: &str) -> bool {
    document.get(node).is_some_and(|el| el.tag() == tag)
}

fn own_text(document: &Document, node: NodeId) -> String {
    document
        .get(node)
        .map(|el| el.text().trim().to_string())
        .unwrap_or_default()
}

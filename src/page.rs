//! Page runtime: owns the document and wires the i18n service to the
//! translator and widgets.
//!
//! Components never call each other. The runtime drains i18n events and
//! re-renders in a fixed order: the page translator first, then each
//! switcher in registration order, then the client home account panel.

use crate::auth::AuthClient;
use crate::client_home::{Account, ClientHome};
use crate::dom::{Document, NodeId, LOADING_CLASS};
use crate::faq;
use crate::i18n::{I18n, I18nError, I18nEvent, LanguageCode, Translate};
use crate::page_translator::{PageTranslator, TranslationPass};
use crate::switcher::{LanguageSwitcher, SwitcherStyle};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

pub struct Page {
    document: Document,
    i18n: Arc<I18n>,
    translator: PageTranslator,
    switchers: Vec<LanguageSwitcher>,
    client_home: ClientHome,
    events: broadcast::Receiver<I18nEvent>,
    last_pass: Option<TranslationPass>,
}

impl Page {
    /// Take over `document`. Content is hidden until the first translation
    /// pass.
    pub fn new(mut document: Document, i18n: Arc<I18n>) -> Self {
        document.document_element_mut().add_class(LOADING_CLASS);
        let events = i18n.subscribe();
        let translate = i18n.clone() as Arc<dyn Translate>;

        Self {
            document,
            translator: PageTranslator::new(Some(translate.clone())),
            client_home: ClientHome::new(Some(translate)),
            i18n,
            switchers: Vec::new(),
            events,
            last_pass: None,
        }
    }

    /// Register a switcher of `style`.
    pub fn with_switcher(mut self, style: SwitcherStyle) -> Self {
        self.switchers
            .push(LanguageSwitcher::new(style, self.i18n.clone()));
        self
    }

    /// Register a switcher for every style whose markup the document has.
    pub fn with_detected_switchers(mut self) -> Self {
        for style in [SwitcherStyle::Modern, SwitcherStyle::Legacy] {
            let switcher = LanguageSwitcher::new(style, self.i18n.clone());
            if switcher.is_present(&self.document) {
                debug!("Found {:?} language switcher", style);
                self.switchers.push(switcher);
            }
        }
        self
    }

    /// Initialize i18n and render the page for the detected language.
    pub async fn boot(&mut self) {
        self.i18n.init(&mut self.document).await;
        self.process_events();
        info!(
            "Page '{}' ready in '{}'",
            PageTranslator::page_name(self.document.path()),
            self.i18n.language()
        );
    }

    /// Handle pending i18n events. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    debug!("Handling {:?}", event);
                    self.render();
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Skipped {} i18n events, re-rendering", skipped);
                    self.render();
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    fn render(&mut self) {
        self.last_pass = Some(self.translator.translate_all(&mut self.document));
        let language = self.i18n.language();
        for switcher in &self.switchers {
            switcher.render(&mut self.document, language);
        }
        self.client_home.render(&mut self.document);
    }

    /// Fetch the signed-in account and show it on the client home page.
    /// Pages without a subscription badge skip the requests.
    pub async fn load_account(&mut self, auth: &AuthClient) -> Option<&Account> {
        if !ClientHome::is_present(&self.document) {
            return None;
        }
        self.client_home.load(auth).await;
        self.client_home.render(&mut self.document);
        self.client_home.account()
    }

    /// Choose a language through the switcher at `index`.
    pub async fn select_language(
        &mut self,
        index: usize,
        code: &str,
    ) -> Option<Result<LanguageCode, I18nError>> {
        let switcher = self.switchers.get(index)?;
        let result = switcher.select(code, &mut self.document).await;
        self.process_events();
        Some(result)
    }

    /// Handle a click on `target`: switcher options, FAQ questions, and
    /// clicks that should close open dropdowns.
    pub async fn click(&mut self, target: NodeId) {
        for switcher in &self.switchers {
            switcher.handle_document_click(&mut self.document, target);
        }

        if let Some(question) = self.document.closest_with_class(target, faq::QUESTION_CLASS) {
            faq::toggle(&mut self.document, question);
            return;
        }

        for index in 0..self.switchers.len() {
            let selected = self.switchers[index]
                .select_option(target, &mut self.document)
                .await;
            if let Some(result) = selected {
                if let Err(e) = result {
                    warn!("Language option rejected: {}", e);
                }
                self.process_events();
                return;
            }
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn i18n(&self) -> &Arc<I18n> {
        &self.i18n
    }

    pub fn switchers(&self) -> &[LanguageSwitcher] {
        &self.switchers
    }

    pub fn client_home(&self) -> &ClientHome {
        &self.client_home
    }

    /// Result of the most recent translation pass.
    pub fn last_pass(&self) -> Option<&TranslationPass> {
        self.last_pass.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use crate::i18n::{DictionaryLoader, MemoryStorage};
    use crate::auth::MemoryNavigator;
    use crate::client_home::{DASHBOARD_BUTTON_ID, STATUS_ID};
    use crate::switcher::MODERN_OPTION_CLASS;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn i18n(dir: &TempDir) -> Arc<I18n> {
        std::fs::write(
            dir.path().join("en.json"),
            r#"{"faq": {"pageTitle": "FAQ"}, "faq_page": {"q1": "What is Wasla?"}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("ar.json"),
            r#"{"faq": {"pageTitle": "الأسئلة الشائعة"}, "faq_page": {"q1": "ما هي وصلة؟"}}"#,
        )
        .unwrap();
        Arc::new(I18n::new(
            DictionaryLoader::directory(dir.path()),
            Arc::new(MemoryStorage::new()),
            LanguageCode::En,
        ))
    }

    fn document() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("/static/faq.html");
        let body = doc.append(doc.root(), Element::new("body")).unwrap();
        let container = doc
            .append(body, Element::new("div").with_class("language-switcher"))
            .unwrap();
        let button = doc
            .append(container, Element::new("button").with_id("languageBtn"))
            .unwrap();
        doc.append(button, Element::new("span").with_class("flag"));
        doc.append(button, Element::new("span").with_class("lang-text"));
        let dropdown = doc
            .append(container, Element::new("div").with_id("languageDropdown"))
            .unwrap();
        let arabic = doc
            .append(
                dropdown,
                Element::new("a").with_class(MODERN_OPTION_CLASS).with_attr("data-lang", "ar"),
            )
            .unwrap();

        let item = doc
            .append(body, Element::new("div").with_class(faq::ITEM_CLASS))
            .unwrap();
        let question = doc
            .append(
                item,
                Element::new("button")
                    .with_class(faq::QUESTION_CLASS)
                    .with_attr("data-i18n", "faq_page.q1"),
            )
            .unwrap();
        (doc, arabic, item, question)
    }

    #[tokio::test]
    async fn test_boot_translates_and_reveals() {
        let dir = TempDir::new().unwrap();
        let (doc, _, _, question) = document();
        let mut page = Page::new(doc, i18n(&dir)).with_detected_switchers();
        assert!(page.document().document_element().has_class(LOADING_CLASS));
        assert_eq!(page.switchers().len(), 1);

        page.boot().await;
        let doc = page.document();
        assert!(!doc.document_element().has_class(LOADING_CLASS));
        assert_eq!(doc.title(), "FAQ");
        assert_eq!(doc.get(question).unwrap().text(), "What is Wasla?");
        assert_eq!(page.last_pass().unwrap().applied, 1);
    }

    #[tokio::test]
    async fn test_click_option_and_faq() {
        let dir = TempDir::new().unwrap();
        let (doc, arabic, item, question) = document();
        let mut page = Page::new(doc, i18n(&dir)).with_detected_switchers();
        page.boot().await;

        page.click(arabic).await;
        assert_eq!(page.i18n().language(), LanguageCode::Ar);
        assert_eq!(page.document().title(), "الأسئلة الشائعة");
        assert_eq!(page.document().get(question).unwrap().text(), "ما هي وصلة؟");

        page.click(question).await;
        assert!(page.document().get(item).unwrap().has_class(faq::OPEN_CLASS));
        // The FAQ toggle did not disturb the translated label
        assert_eq!(page.document().get(question).unwrap().text(), "ما هي وصلة؟");
    }

    #[tokio::test]
    async fn test_select_language_out_of_range() {
        let dir = TempDir::new().unwrap();
        let (doc, ..) = document();
        let mut page = Page::new(doc, i18n(&dir));
        page.boot().await;
        assert!(page.select_language(0, "ar").await.is_none());
        assert_eq!(page.i18n().language(), LanguageCode::En);
    }

    #[tokio::test]
    async fn test_subscription_badge_follows_language() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("en.json"),
            json!({"clientHome": {"subscriptionStatus": {
                "active": "Active", "activeLabel": "Subscription active",
                "accessGranted": "Access granted", "plan": "Plan:"
            }}})
            .to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("ar.json"),
            json!({"clientHome": {"subscriptionStatus": {
                "active": "نشط", "activeLabel": "الاشتراك نشط",
                "accessGranted": "تم منح الوصول", "plan": "الباقة:"
            }}})
            .to_string(),
        )
        .unwrap();
        let i18n = Arc::new(I18n::new(
            DictionaryLoader::directory(dir.path()),
            Arc::new(MemoryStorage::new()),
            LanguageCode::En,
        ));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3, "email": "sara@example.com", "full_name": "Sara Ali",
                "is_active": true, "is_verified": true, "role": "client"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me/subscription"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "has_access": true, "has_active_subscription": true,
                "admin_override": false, "dashboard_url": null,
                "subscription_end_date": null, "bundle_name": null
            })))
            .expect(1)
            .mount(&server)
            .await;
        let auth = AuthClient::new(
            reqwest::Client::new(),
            &server.uri(),
            Arc::new(MemoryNavigator::new("/static/client_home.html")),
        );

        let (mut doc, ..) = document();
        let root = doc.root();
        let status = doc.append(root, Element::new("div").with_id(STATUS_ID)).unwrap();
        doc.append(root, Element::new("button").with_id(DASHBOARD_BUTTON_ID));

        let mut page = Page::new(doc, i18n).with_detected_switchers();
        page.boot().await;
        assert!(matches!(page.load_account(&auth).await, Some(Account::Loaded { .. })));
        assert!(page.document().get(status).unwrap().text().contains("✓ Active"));

        page.select_language(0, "ar").await.unwrap().unwrap();
        let badge = page.document().get(status).unwrap().text();
        assert!(badge.contains("✓ نشط"));
        assert!(badge.contains("تم منح الوصول"));
    }

    #[tokio::test]
    async fn test_load_account_skipped_without_badge() {
        let dir = TempDir::new().unwrap();
        let (doc, ..) = document();
        let mut page = Page::new(doc, i18n(&dir));
        // Unreachable backend: no request is made
        let auth = AuthClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            Arc::new(MemoryNavigator::new("/static/faq.html")),
        );
        assert!(page.load_account(&auth).await.is_none());
        assert!(page.client_home().account().is_none());
    }
}

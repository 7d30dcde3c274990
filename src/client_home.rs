//! Client home page: account summary and the subscription badge.
//!
//! The badge is built from translated strings, so it is rendered again after
//! every language change.

use crate::auth::{AuthClient, SubscriptionStatus, User};
use crate::dom::Document;
use crate::i18n::{translator_or_identity, Translate};
use std::sync::Arc;
use tracing::{info, warn};

pub const STATUS_ID: &str = "subscriptionStatus";
pub const DASHBOARD_BUTTON_ID: &str = "dashboardBtn";
pub const USER_NAME_ID: &str = "userName";
pub const USER_EMAIL_ID: &str = "userEmailNav";
pub const ERROR_ID: &str = "errorMessage";

const STATUS_CLASS: &str = "subscription-status";
const ACTIVE_CLASS: &str = "active";
const EXPIRED_CLASS: &str = "expired";

/// What the page knows about the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    Loaded {
        user: User,
        subscription: SubscriptionStatus,
    },
    /// Fetching the user or the subscription failed
    Unavailable,
}

pub struct ClientHome {
    translator: Arc<dyn Translate>,
    account: Option<Account>,
}

impl ClientHome {
    pub fn new(translator: Option<Arc<dyn Translate>>) -> Self {
        Self {
            translator: translator_or_identity(translator),
            account: None,
        }
    }

    /// Whether `document` has a subscription badge to fill.
    pub fn is_present(document: &Document) -> bool {
        document.get_element_by_id(STATUS_ID).is_some()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Fetch the signed-in user and their subscription.
    pub async fn load(&mut self, auth: &AuthClient) -> &Account {
        let account = match auth.current_user().await {
            Some(user) => match auth.subscription_status().await {
                Ok(subscription) => {
                    info!(
                        "Subscription for user {}: access={}",
                        user.id, subscription.has_access
                    );
                    Account::Loaded { user, subscription }
                }
                Err(e) => {
                    warn!("Error loading subscription: {}", e);
                    Account::Unavailable
                }
            },
            None => Account::Unavailable,
        };
        self.account.insert(account)
    }

    pub fn set_account(&mut self, account: Account) {
        self.account = Some(account);
    }

    /// Write the account into the document. Nothing happens before `load`.
    pub fn render(&self, document: &mut Document) {
        match &self.account {
            None => {}
            Some(Account::Unavailable) => {
                if let Some(el) = document
                    .get_element_by_id(ERROR_ID)
                    .and_then(|id| document.get_mut(id))
                {
                    el.set_text(&self.translator.t("clientHome.errorMessages.loadingError"));
                    el.set_attribute("style", "display: block");
                }
            }
            Some(Account::Loaded { user, subscription }) => {
                let name = user.full_name.as_deref().unwrap_or(&user.email);
                set_text_by_id(document, USER_NAME_ID, name);
                set_text_by_id(document, USER_EMAIL_ID, &user.email);

                if let Some(el) = document
                    .get_element_by_id(STATUS_ID)
                    .and_then(|id| document.get_mut(id))
                {
                    let (state, remove) = if subscription.has_access {
                        (ACTIVE_CLASS, EXPIRED_CLASS)
                    } else {
                        (EXPIRED_CLASS, ACTIVE_CLASS)
                    };
                    el.add_class(STATUS_CLASS);
                    el.remove_class(remove);
                    el.add_class(state);
                    el.set_markup(&self.status_markup(subscription));
                }

                if let Some(button) = document
                    .get_element_by_id(DASHBOARD_BUTTON_ID)
                    .and_then(|id| document.get_mut(id))
                {
                    if subscription.has_access {
                        button.remove_attribute("disabled");
                    } else {
                        button.set_attribute("disabled", "");
                    }
                }
            }
        }
    }

    /// Badge markup for `status` in the active language.
    pub fn status_markup(&self, status: &SubscriptionStatus) -> String {
        let t = |key: &str| self.translator.t(&format!("clientHome.subscriptionStatus.{}", key));

        if !status.has_access {
            return format!(
                "<div class=\"status-badge expired\">✗ {}</div><p><strong>{}</strong></p><p>{}</p>",
                t("noSubscription"),
                t("subscriptionRequired"),
                t("purchaseRequired")
            );
        }

        let mut markup = format!(
            "<div class=\"status-badge active\">✓ {}</div><p><strong>{}</strong></p>",
            t("active"),
            t("activeLabel")
        );
        match status.subscription_end_date {
            Some(end) => markup.push_str(&format!(
                "<p>{} {}</p>",
                t("validUntil"),
                end.format("%-m/%-d/%Y")
            )),
            None => markup.push_str(&format!("<p>{}</p>", t("accessGranted"))),
        }
        if let Some(bundle) = &status.bundle_name {
            markup.push_str(&format!("<p>{} {}</p>", t("plan"), escape(bundle)));
        }
        markup
    }

    /// The dashboard URL to open, or the message to alert instead.
    pub fn open_dashboard(&self) -> Result<String, String> {
        let subscription = match &self.account {
            Some(Account::Loaded { subscription, .. }) if subscription.has_access => subscription,
            _ => return Err(self.translator.t("clientHome.errorMessages.noSubscriptionAlert")),
        };
        subscription
            .dashboard_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| self.translator.t("clientHome.errorMessages.dashboardUrlError"))
    }
}

fn set_text_by_id(document: &mut Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id).and_then(|node| document.get_mut(node)) {
        el.set_text(text);
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryNavigator;
    use crate::dom::{Content, Element};
    use crate::i18n::LanguageCode;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    struct Strings(HashMap<&'static str, &'static str>);

    impl Translate for Strings {
        fn t_or(&self, key: &str, default: &str) -> String {
            self.0.get(key).map(|v| v.to_string()).unwrap_or_else(|| default.to_string())
        }

        fn language(&self) -> LanguageCode {
            LanguageCode::En
        }
    }

    fn english() -> Arc<dyn Translate> {
        Arc::new(Strings(HashMap::from([
            ("clientHome.subscriptionStatus.active", "Active"),
            ("clientHome.subscriptionStatus.activeLabel", "Subscription active"),
            ("clientHome.subscriptionStatus.validUntil", "Valid until"),
            ("clientHome.subscriptionStatus.accessGranted", "Access granted"),
            ("clientHome.subscriptionStatus.plan", "Plan:"),
            ("clientHome.subscriptionStatus.noSubscription", "No subscription"),
            ("clientHome.subscriptionStatus.subscriptionRequired", "Subscription required"),
            ("clientHome.subscriptionStatus.purchaseRequired", "Buy a plan"),
            ("clientHome.errorMessages.loadingError", "Could not load your account"),
            ("clientHome.errorMessages.noSubscriptionAlert", "You need a subscription"),
            ("clientHome.errorMessages.dashboardUrlError", "Dashboard not ready"),
        ])))
    }

    fn user() -> User {
        User {
            id: 3,
            email: "sara@example.com".to_string(),
            full_name: None,
            is_active: true,
            is_verified: true,
            role: "client".to_string(),
        }
    }

    fn subscription(has_access: bool) -> SubscriptionStatus {
        SubscriptionStatus {
            has_access,
            has_active_subscription: has_access,
            admin_override: false,
            dashboard_url: Some("https://lookerstudio.example/d/1".to_string()),
            subscription_end_date: NaiveDate::from_ymd_opt(2026, 3, 1)
                .and_then(|d| d.and_hms_opt(12, 0, 0)),
            bundle_name: Some("Growth & More".to_string()),
        }
    }

    fn document() -> Document {
        let mut doc = Document::new("/static/client_home.html");
        let root = doc.root();
        for id in [USER_NAME_ID, USER_EMAIL_ID, STATUS_ID, ERROR_ID] {
            doc.append(root, Element::new("div").with_id(id));
        }
        doc.append(root, Element::new("button").with_id(DASHBOARD_BUTTON_ID));
        doc
    }

    fn by_id<'a>(doc: &'a Document, id: &str) -> &'a Element {
        doc.get(doc.get_element_by_id(id).unwrap()).unwrap()
    }

    #[test]
    fn test_active_subscription_badge() {
        let mut home = ClientHome::new(Some(english()));
        home.set_account(Account::Loaded {
            user: user(),
            subscription: subscription(true),
        });
        let mut doc = document();
        home.render(&mut doc);

        let status = by_id(&doc, STATUS_ID);
        assert!(status.has_class("subscription-status"));
        assert!(status.has_class("active"));
        assert_eq!(
            status.content(),
            &Content::Markup(
                "<div class=\"status-badge active\">✓ Active</div>\
                 <p><strong>Subscription active</strong></p>\
                 <p>Valid until 3/1/2026</p>\
                 <p>Plan: Growth &amp; More</p>"
                    .to_string()
            )
        );
        assert_eq!(by_id(&doc, USER_NAME_ID).text(), "sara@example.com");
        assert!(!by_id(&doc, DASHBOARD_BUTTON_ID).has_attribute("disabled"));
        assert_eq!(
            home.open_dashboard(),
            Ok("https://lookerstudio.example/d/1".to_string())
        );
    }

    #[test]
    fn test_access_without_end_date_or_plan() {
        let home = ClientHome::new(Some(english()));
        let status = SubscriptionStatus {
            subscription_end_date: None,
            bundle_name: None,
            ..subscription(true)
        };
        let markup = home.status_markup(&status);
        assert!(markup.ends_with("<p>Access granted</p>"));
        assert!(!markup.contains("Plan:"));
    }

    #[test]
    fn test_no_subscription_disables_dashboard() {
        let mut home = ClientHome::new(Some(english()));
        home.set_account(Account::Loaded {
            user: user(),
            subscription: subscription(false),
        });
        let mut doc = document();
        home.render(&mut doc);

        let status = by_id(&doc, STATUS_ID);
        assert!(status.has_class("expired"));
        assert!(!status.has_class("active"));
        assert!(status.text().contains("✗ No subscription"));
        assert!(by_id(&doc, DASHBOARD_BUTTON_ID).has_attribute("disabled"));
        assert_eq!(home.open_dashboard(), Err("You need a subscription".to_string()));
    }

    #[test]
    fn test_missing_dashboard_url() {
        let mut home = ClientHome::new(Some(english()));
        home.set_account(Account::Loaded {
            user: user(),
            subscription: SubscriptionStatus {
                dashboard_url: None,
                ..subscription(true)
            },
        });
        assert_eq!(home.open_dashboard(), Err("Dashboard not ready".to_string()));
    }

    #[test]
    fn test_render_before_load_is_noop() {
        let home = ClientHome::new(Some(english()));
        let mut doc = document();
        let before = doc.clone();
        home.render(&mut doc);
        assert_eq!(by_id(&doc, STATUS_ID), by_id(&before, STATUS_ID));
        assert!(ClientHome::is_present(&doc));
        assert!(!ClientHome::is_present(&Document::new("/")));
    }

    #[tokio::test]
    async fn test_load_failure_shows_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "email": "sara@example.com",
                "full_name": "Sara Ali",
                "is_active": true,
                "is_verified": true,
                "role": "client"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me/subscription"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let navigator = Arc::new(MemoryNavigator::new("/static/client_home.html"));
        let auth = AuthClient::new(reqwest::Client::new(), &server.uri(), navigator);
        let mut home = ClientHome::new(Some(english()));
        assert_eq!(home.load(&auth).await, &Account::Unavailable);

        let mut doc = document();
        home.render(&mut doc);
        let error = by_id(&doc, ERROR_ID);
        assert_eq!(error.text(), "Could not load your account");
        assert_eq!(error.get_attribute("style"), Some("display: block"));
    }
}

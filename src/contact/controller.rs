use crate::config::Config;
use crate::contact::{validate, validation, ContactForm};
use crate::i18n::{translator_or_identity, TextDirection, Translate};
use anyhow::Result;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const SUBMIT_PATH: &str = "/contacts/submit";

const GENERIC_INPUT_ERROR: &str = "Please check your input and try again.";
const GENERIC_SERVER_ERROR: &str = "An error occurred. Please try again later.";

/// Why a submission did not succeed.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("rate limited by the server")]
    RateLimited,

    /// 400/422 with the server's `detail` field, if any
    #[error("server rejected the input ({status})")]
    Rejected { status: u16, detail: Option<Value> },

    #[error("server error ({status})")]
    Server { status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Message shown at the top of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: Option<String>,
    pub messages: Vec<String>,
    pub rtl: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

/// What the page shows for the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub button: SubmitButton,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission was already in flight
    Ignored,
    /// Client-side validation failed; nothing was sent
    Invalid(Vec<String>),
    Submitted,
    Failed(Vec<String>),
}

/// Drives the contact form: validates, submits, and maintains the view.
pub struct ContactFormController {
    client: reqwest::Client,
    endpoint: String,
    translator: Arc<dyn Translate>,
    original_label: String,
    submitting: AtomicBool,
    view: Mutex<FormView>,
}

/// Clears the in-flight flag however the submission ends.
struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ContactFormController {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        translator: Option<Arc<dyn Translate>>,
        button_label: &str,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SUBMIT_PATH),
            translator: translator_or_identity(translator),
            original_label: button_label.to_string(),
            submitting: AtomicBool::new(false),
            view: Mutex::new(FormView {
                button: SubmitButton {
                    label: button_label.to_string(),
                    disabled: false,
                },
                notice: None,
            }),
        }
    }

    pub fn from_config(
        config: &Config,
        translator: Option<Arc<dyn Translate>>,
        button_label: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            config.http_client()?,
            &config.base_url,
            translator,
            button_label,
        ))
    }

    pub fn state(&self) -> FormState {
        if self.submitting.load(Ordering::SeqCst) {
            FormState::Submitting
        } else {
            FormState::Idle
        }
    }

    pub fn view(&self) -> FormView {
        self.view.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Warning to show under the email input while it is being typed.
    pub fn email_warning(&self, email: &str) -> Option<String> {
        validation::email_warning(email, self.translator.as_ref())
    }

    /// Validate and submit `form`. On success the form is cleared.
    pub async fn submit(&self, form: &mut ContactForm) -> SubmitOutcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }
        let _guard = SubmittingGuard(&self.submitting);

        self.update_view(|view| view.notice = None);

        let issues = validate(form);
        if !issues.is_empty() {
            let messages: Vec<String> = issues
                .iter()
                .map(|issue| issue.message(self.translator.as_ref()))
                .collect();
            debug!("Contact form invalid: {} issue(s)", messages.len());
            self.show_errors(messages.clone());
            return SubmitOutcome::Invalid(messages);
        }

        let submitting_label = self.translator.t("form.buttons.submitting");
        self.update_view(|view| {
            view.button = SubmitButton {
                label: submitting_label,
                disabled: true,
            }
        });

        let result = self.post(form).await;

        let outcome = match result {
            Ok(()) => {
                info!("Contact form submitted");
                form.clear();
                self.update_view(|view| {
                    view.notice = Some(Notice {
                        kind: NoticeKind::Success,
                        title: None,
                        messages: vec![self.translator.t("form.messages.success")],
                        rtl: false,
                    })
                });
                SubmitOutcome::Submitted
            }
            Err(e) => {
                warn!("Contact form submission failed: {}", e);
                let messages = self.error_messages(&e);
                self.show_errors(messages.clone());
                SubmitOutcome::Failed(messages)
            }
        };

        let label = self.original_label.clone();
        self.update_view(|view| {
            view.button = SubmitButton {
                label,
                disabled: false,
            }
        });
        outcome
    }

    async fn post(&self, form: &ContactForm) -> Result<(), SubmitError> {
        let payload = form.payload(self.translator.language());
        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        let status = response.status();
        if status.is_success() {
            // A 2xx that is not JSON (a proxy page) counts as a transport failure
            let _: Value = response.json().await?;
            return Ok(());
        }

        match status.as_u16() {
            429 => Err(SubmitError::RateLimited),
            code @ (400 | 422) => {
                let body: Value = response.json().await.unwrap_or(Value::Null);
                Err(SubmitError::Rejected {
                    status: code,
                    detail: body.get("detail").cloned(),
                })
            }
            code => Err(SubmitError::Server { status: code }),
        }
    }

    /// Messages listed in the error notice for `error`.
    pub fn error_messages(&self, error: &SubmitError) -> Vec<String> {
        match error {
            SubmitError::RateLimited => vec![self.translator.t("form.messages.rateLimitError")],
            SubmitError::Rejected { detail, .. } => detail_messages(detail.as_ref()),
            SubmitError::Server { .. } => vec![GENERIC_SERVER_ERROR.to_string()],
            SubmitError::Network(_) => vec![self.translator.t("form.messages.networkError")],
        }
    }

    fn show_errors(&self, messages: Vec<String>) {
        let notice = Notice {
            kind: NoticeKind::Error,
            title: Some(self.translator.t("form.messages.errorTitle")),
            messages,
            rtl: self.translator.language().direction() == TextDirection::Rtl,
        };
        self.update_view(|view| view.notice = Some(notice));
    }

    fn update_view(&self, f: impl FnOnce(&mut FormView)) {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut view);
    }
}

/// Messages for a rejected submission's `detail` field.
///
/// An array of `{loc, msg}` entries becomes `"<field>: <msg>"` lines, where
/// the field is the last `loc` segment; a string is shown as is.
pub fn detail_messages(detail: Option<&Value>) -> Vec<String> {
    match detail {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| {
                let field = entry
                    .get("loc")
                    .and_then(Value::as_array)
                    .and_then(|loc| loc.last())
                    .map(|segment| match segment {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "field".to_string());
                let msg = entry.get("msg").and_then(Value::as_str).unwrap_or_default();
                format!("{}: {}", field, msg)
            })
            .collect(),
        Some(Value::String(message)) => vec![message.clone()],
        _ => vec![GENERIC_INPUT_ERROR.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageCode;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    struct Messages(LanguageCode, HashMap<&'static str, &'static str>);

    impl Translate for Messages {
        fn t_or(&self, key: &str, default: &str) -> String {
            self.1.get(key).map(|v| v.to_string()).unwrap_or_else(|| default.to_string())
        }

        fn language(&self) -> LanguageCode {
            self.0
        }
    }

    fn arabic() -> Arc<dyn Translate> {
        Arc::new(Messages(
            LanguageCode::Ar,
            HashMap::from([
                ("form.messages.errorTitle", "خطأ"),
                ("form.messages.rateLimitError", "طلبات كثيرة"),
                ("form.messages.success", "تم الإرسال"),
                ("form.buttons.submitting", "جارٍ الإرسال..."),
                ("form.validation.firstNameRequired", "الاسم الأول مطلوب"),
            ]),
        ))
    }

    fn valid_form() -> ContactForm {
        ContactForm {
            first_name: "Sara".to_string(),
            last_name: "Ali".to_string(),
            email: "sara@example.com".to_string(),
            phone: "+966501234567".to_string(),
            country_code: "+966".to_string(),
            country: "Saudi Arabia".to_string(),
            business_name: "Qahwa".to_string(),
            num_locations: "2-5".to_string(),
            referral_source: "social".to_string(),
            marketing_consent: true,
        }
    }

    fn controller(server: &MockServer, translator: Option<Arc<dyn Translate>>) -> ContactFormController {
        ContactFormController::new(reqwest::Client::new(), &server.uri(), translator, "Get started")
    }

    #[tokio::test]
    async fn test_success_clears_form_and_restores_button() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SUBMIT_PATH))
            .and(body_partial_json(json!({
                "first_name": "Sara",
                "language_preference": "ar",
                "marketing_consent": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let controller = controller(&server, Some(arabic()));
        let mut form = valid_form();
        assert_eq!(controller.submit(&mut form).await, SubmitOutcome::Submitted);

        assert_eq!(form.first_name, "");
        assert_eq!(form.country_code, "+966");
        assert_eq!(form.num_locations, "1");
        assert!(!form.marketing_consent);

        let view = controller.view();
        assert_eq!(view.button.label, "Get started");
        assert!(!view.button.disabled);
        let notice = view.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.messages, vec!["تم الإرسال".to_string()]);
        assert_eq!(controller.state(), FormState::Idle);
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let controller = controller(&server, Some(arabic()));
        let mut form = valid_form();
        form.first_name.clear();

        let outcome = controller.submit(&mut form).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Invalid(vec!["الاسم الأول مطلوب".to_string()])
        );
        let notice = controller.view().notice.unwrap();
        assert_eq!(notice.title.as_deref(), Some("خطأ"));
        assert!(notice.rtl);
        assert_eq!(form.last_name, "Ali");
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SUBMIT_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({"detail": "slow down"})))
            .mount(&server)
            .await;

        let controller = controller(&server, Some(arabic()));
        let mut form = valid_form();
        let outcome = controller.submit(&mut form).await;
        assert_eq!(outcome, SubmitOutcome::Failed(vec!["طلبات كثيرة".to_string()]));
        assert_eq!(form, valid_form());
        assert!(!controller.view().button.disabled);
    }

    #[tokio::test]
    async fn test_validation_detail_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SUBMIT_PATH))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [
                    {"loc": ["body", "phone"], "msg": "string too long"},
                    {"msg": "bad"}
                ]
            })))
            .mount(&server)
            .await;

        let controller = controller(&server, None);
        let outcome = controller.submit(&mut valid_form()).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(vec![
                "phone: string too long".to_string(),
                "field: bad".to_string()
            ])
        );
        let notice = controller.view().notice.unwrap();
        assert_eq!(notice.title.as_deref(), Some("form.messages.errorTitle"));
        assert!(!notice.rtl);
    }

    #[tokio::test]
    async fn test_server_error_and_string_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let controller = controller(&server, None);
        assert_eq!(
            controller.submit(&mut valid_form()).await,
            SubmitOutcome::Failed(vec![GENERIC_SERVER_ERROR.to_string()])
        );

        assert_eq!(
            detail_messages(Some(&json!("Email already used"))),
            vec!["Email already used".to_string()]
        );
        assert_eq!(detail_messages(None), vec![GENERIC_INPUT_ERROR.to_string()]);
        assert_eq!(
            detail_messages(Some(&json!([{"loc": ["body", 0], "msg": "x"}]))),
            vec!["0: x".to_string()]
        );
    }

    #[tokio::test]
    async fn test_network_error() {
        // Nothing listens on the discard port
        let controller = ContactFormController::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            None,
            "Get started",
        );
        let outcome = controller.submit(&mut valid_form()).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(vec!["form.messages.networkError".to_string()])
        );
    }

    #[tokio::test]
    async fn test_success_status_without_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SUBMIT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html>proxy page</html>", "text/html"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let controller = controller(&server, None);
        let mut form = valid_form();
        let outcome = controller.submit(&mut form).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(vec!["form.messages.networkError".to_string()])
        );
        assert_eq!(form, valid_form());
        assert_eq!(controller.view().notice.unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SUBMIT_PATH))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": 8}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let controller = controller(&server, Some(arabic()));
        let mut first = valid_form();
        let mut second = valid_form();

        let slow = controller.submit(&mut first);
        let fast = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let state = controller.state();
            let label = controller.view().button;
            (state, label, controller.submit(&mut second).await)
        };
        let (first_outcome, (state, button, second_outcome)) = tokio::join!(slow, fast);

        assert_eq!(first_outcome, SubmitOutcome::Submitted);
        assert_eq!(second_outcome, SubmitOutcome::Ignored);
        assert_eq!(state, FormState::Submitting);
        assert!(button.disabled);
        assert_eq!(button.label, "جارٍ الإرسال...");
        assert_eq!(second, valid_form());
    }
}

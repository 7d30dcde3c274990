//! Client-side validation of the contact form.
//!
//! Runs before any network call. Every field is checked and the first failing
//! rule per field is reported.

use crate::contact::ContactForm;
use crate::i18n::Translate;
use regex::Regex;
use std::sync::OnceLock;

const MAX_NAME_CHARS: usize = 255;
const MAX_EMAIL_CHARS: usize = 255;
const MAX_PHONE_CHARS: usize = 20;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
static ARABIC_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"))
}

fn phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| Regex::new(r"^[0-9\s\-+()]+$").expect("valid regex"))
}

fn arabic_regex() -> &'static Regex {
    ARABIC_REGEX.get_or_init(|| Regex::new(r"[\x{0600}-\x{06FF}]").expect("valid regex"))
}

/// A failed validation rule. Each maps to a message key under
/// `form.validation.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    FirstNameRequired,
    FirstNameTooLong,
    LastNameRequired,
    LastNameTooLong,
    EmailRequired,
    EmailEnglishOnly,
    EmailInvalid,
    EmailTooLong,
    PhoneRequired,
    PhoneInvalid,
    PhoneTooLong,
    CountryCodeRequired,
    CountryRequired,
    BusinessNameRequired,
    BusinessNameTooLong,
    LocationsRequired,
    HearAboutRequired,
}

impl ValidationIssue {
    pub fn key(self) -> &'static str {
        match self {
            Self::FirstNameRequired => "form.validation.firstNameRequired",
            Self::FirstNameTooLong => "form.validation.firstNameTooLong",
            Self::LastNameRequired => "form.validation.lastNameRequired",
            Self::LastNameTooLong => "form.validation.lastNameTooLong",
            Self::EmailRequired => "form.validation.emailRequired",
            Self::EmailEnglishOnly => "form.validation.emailEnglishOnly",
            Self::EmailInvalid => "form.validation.emailInvalid",
            Self::EmailTooLong => "form.validation.emailTooLong",
            Self::PhoneRequired => "form.validation.phoneRequired",
            Self::PhoneInvalid => "form.validation.phoneInvalid",
            Self::PhoneTooLong => "form.validation.phoneTooLong",
            Self::CountryCodeRequired => "form.validation.countryCodeRequired",
            Self::CountryRequired => "form.validation.countryRequired",
            Self::BusinessNameRequired => "form.validation.businessNameRequired",
            Self::BusinessNameTooLong => "form.validation.businessNameTooLong",
            Self::LocationsRequired => "form.validation.locationsRequired",
            Self::HearAboutRequired => "form.validation.hearAboutRequired",
        }
    }

    /// Message in the translator's language, or the key itself.
    pub fn message(self, translator: &dyn Translate) -> String {
        translator.t(self.key())
    }
}

/// Whether `text` contains no Arabic-script characters.
pub fn is_english_only(text: &str) -> bool {
    !arabic_regex().is_match(text)
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

fn check_name(value: &str, required: ValidationIssue, too_long_issue: ValidationIssue) -> Option<ValidationIssue> {
    if value.is_empty() {
        Some(required)
    } else if too_long(value, MAX_NAME_CHARS) {
        Some(too_long_issue)
    } else {
        None
    }
}

fn check_email(email: &str) -> Option<ValidationIssue> {
    if email.is_empty() {
        Some(ValidationIssue::EmailRequired)
    } else if !is_english_only(email) {
        Some(ValidationIssue::EmailEnglishOnly)
    } else if !is_valid_email(email) {
        Some(ValidationIssue::EmailInvalid)
    } else if too_long(email, MAX_EMAIL_CHARS) {
        Some(ValidationIssue::EmailTooLong)
    } else {
        None
    }
}

fn check_phone(phone: &str) -> Option<ValidationIssue> {
    if phone.is_empty() {
        Some(ValidationIssue::PhoneRequired)
    } else if !is_valid_phone(phone) {
        Some(ValidationIssue::PhoneInvalid)
    } else if too_long(phone, MAX_PHONE_CHARS) {
        Some(ValidationIssue::PhoneTooLong)
    } else {
        None
    }
}

fn required(value: &str, issue: ValidationIssue) -> Option<ValidationIssue> {
    value.is_empty().then_some(issue)
}

/// Validate the form. Values are trimmed first; lengths count characters.
pub fn validate(form: &ContactForm) -> Vec<ValidationIssue> {
    use ValidationIssue::*;

    let form = form.trimmed();
    [
        check_name(&form.first_name, FirstNameRequired, FirstNameTooLong),
        check_name(&form.last_name, LastNameRequired, LastNameTooLong),
        check_email(&form.email),
        check_phone(&form.phone),
        required(&form.country_code, CountryCodeRequired),
        required(&form.country, CountryRequired),
        check_name(&form.business_name, BusinessNameRequired, BusinessNameTooLong),
        required(&form.num_locations, LocationsRequired),
        required(&form.referral_source, HearAboutRequired),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Live feedback for the email input: a warning while it contains
/// Arabic-script characters.
pub fn email_warning(email: &str, translator: &dyn Translate) -> Option<String> {
    (!email.is_empty() && !is_english_only(email))
        .then(|| ValidationIssue::EmailEnglishOnly.message(translator))
}

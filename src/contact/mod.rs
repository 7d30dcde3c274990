//! Contact form: field values, client-side validation, and submission.

mod controller;
mod form;
pub mod validation;

pub use controller::{
    detail_messages, ContactFormController, FormState, FormView, Notice, NoticeKind,
    SubmitButton, SubmitError, SubmitOutcome, SUBMIT_PATH,
};
pub use form::{ContactForm, ContactSubmission, DEFAULT_LOCATIONS, FIELD_ATTR};
pub use validation::{email_warning, validate, ValidationIssue};

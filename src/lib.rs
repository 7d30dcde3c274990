//! Client-side behaviour of the Wasla marketing site: runtime English/Arabic
//! translation, language switchers, the contact form, cookie-session auth
//! and the FAQ accordion, driven over an in-memory page document.

pub mod auth;
pub mod client_home;
pub mod config;
pub mod contact;
pub mod dom;
pub mod faq;
pub mod i18n;
pub mod page;
pub mod page_translator;
pub mod retry;
pub mod switcher;

//! Core types for stockwire

pub mod article;
pub mod quote;
pub mod validation;

pub use article::{Article, Enrichable, IdToken, NewsByCategory};
pub use quote::{Quote, QuoteResult, RawQuote};
pub use validation::{validate_date, validate_raw_quote, validate_ticker};

//! Dialogue adapters - deterministic implementations of the pre- and
//! post-generation ports.

mod business_hours;
mod contact_classifier;
mod resource_matcher;
mod script_book;
mod text_styler;

pub use business_hours::FixedBusinessHours;
pub use contact_classifier::KeywordContactClassifier;
pub use resource_matcher::{KeywordResourceMatcher, ResourceRule};
pub use script_book::RuleBasedScriptBook;
pub use text_styler::RuleBasedTextStyler;

use serde::{Deserialize, Serialize};

/// The first three whitespace-separated words of a chat message. Words after the third are
/// dropped and missing words are empty strings.
///
/// Any run of whitespace separates words, including the full-width space (U+3000) that Japanese
/// input methods produce.
///
/// ```
/// # use line_ledger::model::Tokens;
/// let tokens = Tokens::new("  コーヒー　300  飲料 ");
/// assert_eq!(tokens.first(), "コーヒー");
/// assert_eq!(tokens.second(), "300");
/// assert_eq!(tokens.third(), "飲料");
/// ```
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
    first: String,
    second: String,
    third: String,
}

impl Tokens {
    pub fn new(text: &str) -> Self {
        let mut words = text.split_whitespace().map(str::to_string);
        Self {
            first: words.next().unwrap_or_default(),
            second: words.next().unwrap_or_default(),
            third: words.next().unwrap_or_default(),
        }
    }

    /// The command keyword, or the item name of a record.
    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn third(&self) -> &str {
        &self.third
    }
}

//! Error types.
//!
//! Collaborator and IO failures are `anyhow` errors that propagate to the caller. Problems with
//! what a user typed are not failures: they are `Invalid` values that the command handlers turn
//! into a private reply.

use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A chat message that does not have the shape its command requires. The `Display` text of each
/// variant is the exact message sent back to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalid {
    /// A record needs an item name followed by a numeric amount.
    #[error(
        "メッセージの形式が正しくありません。「記録名 金額 カテゴリ」の順で空白区切りで入力してください。"
    )]
    Record,

    /// The optional period of a sum must look like `6月` or `2023年6月`.
    #[error(
        "メッセージの形式が正しくありません。「合計 6月」または「合計 2023年6月」のように入力してください。"
    )]
    Sum,

    /// Setting a display name requires the name.
    #[error("ユーザー名を入力してください。")]
    UserName,
}

/// The inbound webhook body could not be understood.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The body is not JSON or does not have the expected structure.
    #[error("malformed webhook payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The event has no text, e.g. a sticker or image message.
    #[error("webhook event {0} carries no text message")]
    NoText(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_messages_are_fixed() {
        assert_eq!(Invalid::UserName.to_string(), "ユーザー名を入力してください。");
        assert!(Invalid::Record.to_string().contains("「記録名 金額 カテゴリ」"));
        assert!(Invalid::Sum.to_string().contains("「合計 6月」"));
    }
}

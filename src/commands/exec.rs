use crate::api::{self, Ledger, Mode, UserNames};
use crate::commands::Out;
use crate::interpreter::{dispatch, Response};
use crate::model::{now, Event};
use crate::{Config, Result};

/// The reply token of a message that did not come from LINE.
const CLI_REPLY_TOKEN: &str = "cli";

/// Handles the `ledger exec` command: interprets `text` as if `user_id` had sent it in the chat
/// and returns the answer instead of delivering it. The sheet and the display names are changed
/// exactly as they would be by the webhook.
///
/// # Errors
/// - Returns an error if the sheet or the display-name store fails.
pub async fn exec(
    config: Config,
    mode: Mode,
    user_id: &str,
    message_id: &str,
    text: &str,
) -> Result<Out<Response>> {
    let mut ledger = Ledger::new(api::sheet(&config, mode).await?);
    let mut users = UserNames::load(config.user_names_path()).await?;
    let event = Event::new(CLI_REPLY_TOKEN, text, message_id, user_id);
    let response = dispatch(&event, &mut ledger, &mut users, &now()).await?;
    Ok(Out::new(response.message().to_string(), response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Status;
    use crate::model::header_row;

    #[tokio::test]
    async fn test_exec_records_and_deletes() {
        let env = crate::test::TestEnv::new().await;

        let out = exec(env.config(), Mode::Testing, "U1", "m1", "表示名設定 花子")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().status(), Status::Ok);

        let out = exec(env.config(), Mode::Testing, "U1", "m2", "牛乳 198")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().status(), Status::Created);
        assert!(out.message().starts_with("花子さんが下記内容で記録しました！\n"));

        let tabs = env.get_state();
        assert_eq!(tabs.len(), 1);
        let (_, rows) = &tabs[0];
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "m2");
        assert_eq!(rows[1][3], "食料品");

        let out = exec(env.config(), Mode::Testing, "U2", "m3", "削除")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().status(), Status::Created);
        assert!(out.message().starts_with("未設定さんが最後の記録を削除しました！\n"));

        let out = exec(env.config(), Mode::Testing, "U2", "m4", "削除")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().status(), Status::NotFound);
    }

    #[tokio::test]
    async fn test_exec_sums_an_earlier_month() {
        let env = crate::test::TestEnv::new().await;
        let row = |user: &str, category: &str, amount: &str| -> Vec<String> {
            ["m", "2023/05/02, 12:00", "2023年5月", category, "品", amount, user]
                .iter()
                .map(|s| s.to_string())
                .collect()
        };
        env.set_state(vec![(
            "2023年5月".to_string(),
            vec![
                header_row(),
                row("太郎", "食料品", "300"),
                row("花子", "日用品", "120"),
                row("太郎", "食料品", "80"),
            ],
        )]);

        let out = exec(env.config(), Mode::Testing, "U1", "m1", "合計 2023年5月分")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().status(), Status::Ok);
        let message = out.message();
        assert!(message.contains("2023年5月: 500円\n"));
        assert!(message.contains("太郎: 380円\n花子: 120円\n"));
        assert!(message.contains("食料品: 380円\n日用品: 120円\n"));
        assert_eq!(env.get_state().len(), 1);
    }

    #[tokio::test]
    async fn test_exec_invalid_message() {
        let env = crate::test::TestEnv::new().await;
        let out = exec(env.config(), Mode::Testing, "U1", "m1", "コーヒー たくさん")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().status(), Status::BadRequest);
        assert!(env.get_state().is_empty());
    }
}

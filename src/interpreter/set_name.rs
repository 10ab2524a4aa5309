use crate::api::UserNames;
use crate::interpreter::Response;
use crate::Result;
use tracing::info;

pub(super) async fn run(users: &mut UserNames, user_id: &str, name: &str) -> Result<Response> {
    users.set(user_id, name).await?;
    info!("User {user_id} is now {name}");
    Ok(Response::ok(format!("表示名を{name}に設定しました！")))
}

//! The LINE webhook server.
//!
//! Every POST is treated as a webhook call. The first event of the payload is interpreted, the
//! resulting message is delivered through the `Messenger`, and the caller receives a fixed
//! acknowledgement. Requests are handled one at a time because the append position of a record is
//! computed from the current last row of the sheet.

use crate::api::{Ledger, Messenger, UserNames};
use crate::interpreter::{dispatch, Channel, Response};
use crate::model::{now, Event, WebhookPayload};
use crate::Result;
use chrono::{DateTime, FixedOffset};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// The body returned to the webhook caller once a payload has been processed.
pub const ACK: &str = r#"{"content":"post ok"}"#;

/// The collaborators a webhook call needs.
pub struct App {
    ledger: Ledger,
    users: UserNames,
    messenger: Box<dyn Messenger + Send>,
}

impl App {
    pub fn new(ledger: Ledger, users: UserNames, messenger: Box<dyn Messenger + Send>) -> Self {
        Self {
            ledger,
            users,
            messenger,
        }
    }

    /// Interprets `event` and delivers the result: broadcast for `Created`, a reply otherwise.
    pub async fn handle(&mut self, event: &Event, now: &DateTime<FixedOffset>) -> Result<Response> {
        let response = dispatch(event, &mut self.ledger, &mut self.users, now).await?;
        match response.channel() {
            Channel::Broadcast => self.messenger.broadcast(response.message()).await?,
            Channel::Reply => {
                self.messenger
                    .reply(event.reply_token(), response.message())
                    .await?
            }
        }
        info!(
            "Message {} answered with {} ({})",
            event.message_id(),
            response.status().code(),
            response.status()
        );
        Ok(response)
    }
}

/// Processes one webhook body and returns the HTTP status and body for the caller.
pub async fn respond(app: &Mutex<App>, body: &[u8]) -> (StatusCode, String) {
    let event = match WebhookPayload::parse(body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!("Webhook payload without events acknowledged");
            return (StatusCode::OK, ACK.to_string());
        }
        Err(e) => {
            warn!("Rejected webhook payload: {e}");
            return (StatusCode::BAD_REQUEST, e.to_string());
        }
    };
    let mut app = app.lock().await;
    match app.handle(&event, &now()).await {
        Ok(_) => (StatusCode::OK, ACK.to_string()),
        Err(e) => {
            error!("Failed to process message {}: {e:?}", event.message_id());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            )
        }
    }
}

async fn handle_request(req: Request<Incoming>, app: &Mutex<App>) -> hyper::Response<Full<Bytes>> {
    let (status, body) = if req.method() != Method::POST {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        match req.into_body().collect().await {
            Ok(collected) => respond(app, &collected.to_bytes()).await,
            Err(e) => {
                warn!("Unable to read the request body: {e}");
                (StatusCode::BAD_REQUEST, "unreadable body".to_string())
            }
        }
    };
    let is_json = status == StatusCode::OK;
    let mut response = hyper::Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    if is_json {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    response
}

/// Serves webhook calls on `listener` until `shutdown` completes.
pub async fn serve(
    listener: TcpListener,
    app: App,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let app = Arc::new(Mutex::new(app));
    if let Ok(addr) = listener.local_addr() {
        info!("Listening for LINE webhooks on http://{addr}");
    }
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Failed to accept a connection: {e}");
                        continue;
                    }
                };
                debug!("Connection from {peer}");
                let app = app.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let app = app.clone();
                        async move { Ok::<_, Infallible>(handle_request(req, &app).await) }
                    });
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        debug!("Connection from {peer} ended with an error: {e}");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutting down the webhook server");
                return Ok(());
            }
        }
    }
}

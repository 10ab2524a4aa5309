//! OAuth 2.0 for the Google Sheets API.
//!
//! `TokenProvider::initialize` runs the consent flow once: it prints the Google consent URL,
//! catches the redirect on a local callback server, exchanges the code for tokens and saves them
//! to `token.json`. Afterwards `TokenProvider::load` reads the saved tokens and refreshes the
//! access token whenever it is about to expire, without any user interaction.

use crate::api::files::{File, SecretFile, TokenFile};
use crate::api::OAUTH_SCOPES;
use crate::Result;
use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    RefreshToken, Scope, TokenResponse, TokenUrl,
};
use std::convert::Infallible;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info};

const OAUTH_CALLBACK_PORT: u16 = 3030;

/// Access tokens are assumed to live this long when Google does not say otherwise.
const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Holds the client credentials and the saved tokens, and hands out a valid access token.
#[derive(Debug)]
pub(crate) struct TokenProvider {
    secret: SecretFile,
    token: File<TokenFile>,
    http: reqwest::Client,
}

impl TokenProvider {
    /// Runs the interactive consent flow and saves the resulting tokens at `token_path`.
    pub(crate) async fn initialize(
        client_secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let secret = SecretFile::load(&client_secret_path.into()).await?;
        let http = http_client()?;
        let redirect = format!("http://localhost:{OAUTH_CALLBACK_PORT}");

        let client = BasicClient::new(ClientId::new(secret.client_id().to_string()))
            .set_client_secret(ClientSecret::new(secret.client_secret().to_string()))
            .set_auth_uri(AuthUrl::new(secret.auth_uri().to_string()).context("Bad auth_uri")?)
            .set_token_uri(
                TokenUrl::new(secret.token_uri().to_string()).context("Bad token_uri")?,
            )
            .set_redirect_uri(RedirectUrl::new(redirect).context("Bad redirect URI")?);

        let listener = TcpListener::bind(("127.0.0.1", OAUTH_CALLBACK_PORT))
            .await
            .with_context(|| format!("Unable to listen on port {OAUTH_CALLBACK_PORT}"))?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in OAUTH_SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (auth_url, csrf) = request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Open this URL in your browser to grant access to your Google sheet:\n\n{auth_url}\n");
        info!("Waiting for the authorization callback on http://localhost:{OAUTH_CALLBACK_PORT}");

        let callback = wait_for_callback(listener).await?;
        if let Some(error) = callback.error {
            bail!("Authorization was not granted: {error}");
        }
        if callback.state.as_deref() != Some(csrf.secret().as_str()) {
            bail!("The OAuth state returned by Google does not match, aborting");
        }
        let code = callback
            .code
            .context("The authorization callback did not include a code")?;

        let response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http)
            .await
            .map_err(|e| anyhow!("Failed to exchange the authorization code: {e}"))?;

        let refresh_token = response
            .refresh_token()
            .context("Google did not return a refresh token")?
            .secret()
            .to_string();
        let token = TokenFile::new(
            OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
            response.access_token().secret().to_string(),
            refresh_token,
            expires_at(response.expires_in()),
        );
        let token = File::new(token_path, token);
        token.save().await?;
        info!("Authorization successful, tokens saved to {}", token.path().display());

        Ok(Self {
            secret,
            token,
            http,
        })
    }

    /// Loads previously saved tokens. Never opens a browser.
    pub(crate) async fn load(
        client_secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let secret = SecretFile::load(&client_secret_path.into()).await?;
        let token = TokenFile::load(token_path.into()).await?;
        Ok(Self {
            secret,
            token,
            http: http_client()?,
        })
    }

    /// The current access token, which may be expired.
    pub(crate) fn token(&self) -> &str {
        self.token.data().access_token()
    }

    /// Returns an access token, refreshing it first if it is expired or about to expire.
    pub(crate) async fn token_with_refresh(&mut self) -> Result<&str> {
        if self.token.data().is_expired() {
            self.refresh().await?;
        }
        Ok(self.token())
    }

    /// Exchanges the refresh token for a new access token and saves it.
    pub(crate) async fn refresh(&mut self) -> Result<()> {
        let client = BasicClient::new(ClientId::new(self.secret.client_id().to_string()))
            .set_client_secret(ClientSecret::new(self.secret.client_secret().to_string()))
            .set_token_uri(
                TokenUrl::new(self.secret.token_uri().to_string()).context("Bad token_uri")?,
            );
        let refresh_token = RefreshToken::new(self.token.data().refresh_token().to_string());
        let response = client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .map_err(|e| anyhow!("Failed to refresh the access token: {e}"))?;

        self.token.data_mut().update(
            response.access_token().secret().to_string(),
            expires_at(response.expires_in()),
            response.refresh_token().map(|rt| rt.secret().to_string()),
        );
        self.token.save().await?;
        debug!("Access token refreshed, valid until {}", self.token.data().expires_at());
        Ok(())
    }
}

fn http_client() -> Result<reqwest::Client> {
    // Following redirects during a token exchange would leak credentials.
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Unable to create the OAuth HTTP client")
}

fn expires_at(expires_in: Option<std::time::Duration>) -> chrono::DateTime<Utc> {
    let lifetime = expires_in
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECONDS));
    Utc::now() + lifetime
}

/// The query parameters Google appends to the redirect URI.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
struct Callback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl Callback {
    /// Reads the callback parameters from a request URI such as `/?code=abc&state=xyz`. Returns
    /// `None` for requests that are not the callback, like the browser asking for a favicon.
    fn from_uri(uri: &str) -> Option<Self> {
        let url = url::Url::parse(&format!("http://localhost{uri}")).ok()?;
        let mut callback = Callback::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => callback.code = Some(value.into_owned()),
                "state" => callback.state = Some(value.into_owned()),
                "error" => callback.error = Some(value.into_owned()),
                _ => {}
            }
        }
        if callback.code.is_none() && callback.error.is_none() {
            return None;
        }
        Some(callback)
    }
}

/// Serves HTTP on `listener` until the browser is redirected back with the OAuth parameters.
async fn wait_for_callback(listener: TcpListener) -> Result<Callback> {
    let (tx, mut rx) = mpsc::channel::<Callback>(1);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = accepted.context("Failed to accept the OAuth callback")?;
                let tx = tx.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let tx = tx.clone();
                        async move { Ok::<_, Infallible>(callback_response(req, &tx).await) }
                    });
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        debug!("OAuth callback connection error: {e}");
                    }
                });
            }
            Some(callback) = rx.recv() => return Ok(callback),
        }
    }
}

async fn callback_response(req: Request<Incoming>, tx: &mpsc::Sender<Callback>) -> Response<Full<Bytes>> {
    let uri = req.uri().to_string();
    let (status, text) = match Callback::from_uri(&uri) {
        Some(callback) => {
            let _ = tx.send(callback).await;
            (
                StatusCode::OK,
                "Authorization received. You can close this window and return to the terminal.",
            )
        }
        None => (StatusCode::NOT_FOUND, "Not found"),
    };
    let mut response = Response::new(Full::new(Bytes::from(text)));
    *response.status_mut() = status;
    response
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::{IntoUrl, Method, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;

use super::{
    error::{ClientError, Result},
    gate::UiGate,
};
use crate::{
    handlers::post_handlers::{DeleteResponse, PostListResponse, PostResponse},
    models::{CreatePost, PaginationParams, PostView, UpdatePost, UserSummary},
    rbac::{Policy, PolicyMatrix, Principal},
    services::{AuthResponse, LoginRequest, RefreshRequest},
};

const LOGIN_PATH: &str = "/api/auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";

/// Authenticated HTTP client for the posts API.
///
/// All session state lives in the client instance: the current token pair,
/// the signed-in principal, whether a refresh is in flight and who is waiting
/// on it. Clones share the session.
///
/// A call rejected with 401 triggers one token refresh and one retry. While a
/// refresh is running, other rejected calls wait for its result instead of
/// starting their own.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The base URL of a running server
    base_url: Url,
    /// A [`reqwest::Client`] for handling HTTP requests
    http_client: reqwest::Client,
    session: Arc<Mutex<Session>>,
}

#[derive(Debug, Default)]
struct Session {
    access_token: Option<Secret<String>>,
    refresh_token: Option<Secret<String>>,
    principal: Option<Principal>,
    refreshing: bool,
    waiters: Vec<oneshot::Sender<Option<String>>>,
}

impl Session {
    fn store(&mut self, auth: &AuthResponse) {
        self.access_token = Some(Secret::new(auth.access_token.clone()));
        self.refresh_token = Some(Secret::new(auth.refresh_token.clone()));
        self.principal = Some(auth.principal());
    }

    fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.principal = None;
    }

    fn access_token(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .map(|token| token.expose_secret().clone())
    }

    /// Hand the refresh outcome to everyone queued behind it.
    fn finish_refresh(&mut self, token: Option<&str>) {
        self.refreshing = false;
        for waiter in self.waiters.drain(..) {
            // A waiter that gave up has dropped its receiver
            let _ = waiter.send(token.map(str::to_string));
        }
    }
}

/// What a rejected call does next, decided under one session lock.
enum RefreshStep {
    /// Someone already refreshed; use their token.
    Ready(String),
    /// A refresh is in flight; wait for its outcome.
    Wait(oneshot::Receiver<Option<String>>),
    /// This call claimed the refresh.
    Refresh(String),
    Expired,
}

/// Releases waiters if the refreshing call is dropped before it finishes.
struct RefreshInFlight<'a> {
    client: &'a ApiClient,
    armed: bool,
}

impl Drop for RefreshInFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.client.session().finish_refresh(None);
        }
    }
}

impl ApiClient {
    /// Create a new [`ApiClient`] with no session
    pub fn new<U: IntoUrl>(base_url: U) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into_url().map_err(ClientError::BaseUrl)?,
            http_client: reqwest::Client::new(),
            session: Arc::new(Mutex::new(Session::default())),
        })
    }

    /// Resume a session from previously stored tokens.
    ///
    /// The principal is unknown until [`ApiClient::me`] succeeds.
    pub fn with_tokens<A: Into<String>, R: Into<String>>(self, access_token: A, refresh_token: R) -> Self {
        {
            let mut session = self.session();
            session.access_token = Some(Secret::new(access_token.into()));
            session.refresh_token = Some(Secret::new(refresh_token.into()));
        }
        self
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The signed-in principal, if any.
    pub fn principal(&self) -> Option<Principal> {
        self.session().principal.clone()
    }

    /// The current access token, for persisting between runs.
    pub fn access_token(&self) -> Option<String> {
        self.session().access_token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().access_token.is_some()
    }

    /// Build a UI gate for the current principal.
    pub fn ui_gate<P: Policy>(&self, policy: P) -> UiGate<P> {
        UiGate::new(self.principal(), policy)
    }

    /// `POST /api/auth/login`. Starts a new session on success.
    pub async fn login(&self, username: &str, password: &str) -> Result<Principal> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self.execute(Method::POST, LOGIN_PATH, Some(&body), None).await?;
        let auth: AuthResponse = Self::parse(resp).await?;

        let principal = auth.principal();
        self.session().store(&auth);
        tracing::debug!(user_id = %principal.id, role = %principal.role, "Logged in");
        Ok(principal)
    }

    /// Drop the session. Tokens are stateless, so nothing is sent to the server.
    pub fn logout(&self) {
        self.session().clear();
    }

    /// `GET /api/auth/me`. Also refreshes the cached principal.
    pub async fn me(&self) -> Result<Principal> {
        let principal: Principal = self
            .authorized(Method::GET, "/api/auth/me", None::<&()>)
            .await?;
        self.session().principal = Some(principal.clone());
        Ok(principal)
    }

    /// `GET /api/auth/permissions`
    pub async fn permissions(&self) -> Result<PolicyMatrix> {
        let resp = self
            .execute(Method::GET, "/api/auth/permissions", None::<&()>, None)
            .await?;
        Self::parse(resp).await
    }

    /// `GET /api/posts`
    pub async fn list_posts(&self, page: Option<PaginationParams>) -> Result<PostListResponse> {
        let path = match page {
            Some(p) => format!("/api/posts?page={}&per_page={}", p.page, p.per_page),
            None => "/api/posts".to_string(),
        };
        self.authorized(Method::GET, &path, None::<&()>).await
    }

    /// `POST /api/posts`
    pub async fn create_post(&self, post: &CreatePost) -> Result<PostView> {
        self.authorized(Method::POST, "/api/posts", Some(post)).await
    }

    /// `PUT /api/posts/:id`
    pub async fn update_post(&self, id: Uuid, changes: &UpdatePost) -> Result<PostView> {
        let resp: PostResponse = self
            .authorized(Method::PUT, &format!("/api/posts/{id}"), Some(changes))
            .await?;
        Ok(resp.post)
    }

    /// `DELETE /api/posts/:id`
    pub async fn delete_post(&self, id: Uuid) -> Result<DeleteResponse> {
        self.authorized(Method::DELETE, &format!("/api/posts/{id}"), None::<&()>)
            .await
    }

    /// `GET /api/users`
    pub async fn list_users(&self) -> Result<Vec<UserSummary>> {
        self.authorized(Method::GET, "/api/users", None::<&()>).await
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = self.base_url.join(path)?;
        let mut req = self.http_client.request(method.clone(), url);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        req.send()
            .await
            .map_err(|src| ClientError::request_send(method, path, src))
    }

    /// Send with the session's access token, refreshing once on 401.
    async fn authorized<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.access_token().ok_or(ClientError::NotAuthenticated)?;

        let resp = self
            .execute(method.clone(), path, body, Some(&token))
            .await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Self::parse(resp).await;
        }

        let fresh = self.refreshed_token(&token).await?;
        let resp = self.execute(method, path, body, Some(&fresh)).await?;
        Self::parse(resp).await
    }

    /// A token newer than `stale`, refreshing if nobody else already has.
    async fn refreshed_token(&self, stale: &str) -> Result<String> {
        let step = {
            let mut session = self.session();
            let current = session.access_token();
            let refresh_token = session
                .refresh_token
                .as_ref()
                .map(|token| token.expose_secret().clone());

            match (current, refresh_token) {
                (Some(current), _) if current != stale => RefreshStep::Ready(current),
                _ if session.refreshing => {
                    let (tx, rx) = oneshot::channel();
                    session.waiters.push(tx);
                    RefreshStep::Wait(rx)
                }
                (_, Some(refresh_token)) => {
                    session.refreshing = true;
                    RefreshStep::Refresh(refresh_token)
                }
                (_, None) => {
                    session.clear();
                    RefreshStep::Expired
                }
            }
        };

        let refresh_token = match step {
            RefreshStep::Ready(token) => return Ok(token),
            RefreshStep::Wait(rx) => {
                return rx.await.ok().flatten().ok_or(ClientError::SessionExpired)
            }
            RefreshStep::Expired => return Err(ClientError::SessionExpired),
            RefreshStep::Refresh(refresh_token) => refresh_token,
        };

        let mut in_flight = RefreshInFlight {
            client: self,
            armed: true,
        };
        let outcome = self.request_refresh(&refresh_token).await;
        in_flight.armed = false;

        let mut session = self.session();
        match outcome {
            Ok(auth) => {
                session.store(&auth);
                session.finish_refresh(Some(&auth.access_token));
                Ok(auth.access_token)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                session.clear();
                session.finish_refresh(None);
                Err(ClientError::SessionExpired)
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<AuthResponse> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let resp = self
            .execute(Method::POST, REFRESH_PATH, Some(&body), None)
            .await?;
        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(ClientError::Json);
        }

        let message = match resp.json::<serde_json::Value>().await {
            Ok(body) => body["error"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string()),
            Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
        };
        Err(ClientError::ApiError {
            code: status,
            message,
        })
    }
}

use super::credentials::login_body;
use super::{ApiRequest, Credentials, Method, Transport};
use crate::token::token_of;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * attempt`
    Linear,
    /// `base * 2^(attempt - 1)`
    Exponential,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
    /// Pause after every successful call, to stay under the API rate limit.
    pub throttle: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            backoff: Backoff::Linear,
            throttle: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self.backoff {
            Backoff::Linear => self.base_delay.saturating_mul(attempt),
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt - 1);
                self.base_delay.saturating_mul(factor)
            }
        }
    }
}

/// Retrying, self-healing wrapper around a [`Transport`].
///
/// Every call returns `Option<Value>`: `Some` with the decoded body on
/// success, `None` once the attempts are spent. Failures are logged, never
/// propagated, so one bad record cannot stop a run.
pub struct ApiClient<T: Transport> {
    transport: T,
    policy: RetryPolicy,
    login_path: String,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            login_path: "/login/teachers".into(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        label: &str,
        credentials: Option<&mut Credentials>,
    ) -> Option<Value> {
        self.call(Method::Post, path, Some(body), label, credentials).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: &Value,
        label: &str,
        credentials: Option<&mut Credentials>,
    ) -> Option<Value> {
        self.call(Method::Put, path, Some(body), label, credentials).await
    }

    pub async fn get(
        &self,
        path: &str,
        label: &str,
        credentials: Option<&mut Credentials>,
    ) -> Option<Value> {
        self.call(Method::Get, path, None, label, credentials).await
    }

    /// Serializes `body` and posts it. A payload that cannot be serialized is
    /// logged and skipped like any other failed record.
    pub async fn post_json<S: Serialize>(
        &self,
        path: &str,
        body: &S,
        label: &str,
        credentials: Option<&mut Credentials>,
    ) -> Option<Value> {
        match serde_json::to_value(body) {
            Ok(value) => self.post(path, &value, label, credentials).await,
            Err(err) => {
                warn!("Skipping {label}: payload not serializable: {err}");
                None
            }
        }
    }

    /// One login call without retries. Returns the fresh token.
    pub async fn login(&self, user_name: &str, password: &str) -> Option<String> {
        let body = login_body(user_name, password);
        let request = ApiRequest {
            method: Method::Post,
            path: &self.login_path,
            body: Some(&body),
            token: None,
        };
        match self.transport.send(request).await {
            Ok(value) => {
                let token = token_of(&value);
                if token.is_some() {
                    info!("Token refreshed for {user_name}");
                } else {
                    warn!("Login for {user_name} returned no token");
                }
                token
            }
            Err(err) => {
                warn!("Login failed for {user_name}: {err}");
                None
            }
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        label: &str,
        mut credentials: Option<&mut Credentials>,
    ) -> Option<Value> {
        let attempts = self.policy.max_attempts.max(1);
        let mut reauthenticated = false;
        let mut attempt = 1;

        while attempt <= attempts {
            let token = credentials.as_deref().map(|c| c.token().to_owned());
            let request = ApiRequest {
                method,
                path,
                body,
                token: token.as_deref().filter(|t| !t.is_empty()),
            };

            match self.transport.send(request).await {
                Ok(value) => {
                    info!("{} {label}", method.verb());
                    if !self.policy.throttle.is_zero() {
                        tokio::time::sleep(self.policy.throttle).await;
                    }
                    return Some(value);
                }
                Err(err) => {
                    warn!("Failed {label} (attempt {attempt}/{attempts}): {err}");

                    if err.is_unauthorized() && !reauthenticated {
                        if let Some(creds) = credentials.as_deref_mut() {
                            reauthenticated = true;
                            info!("401 error, refreshing login for {}", creds.user_name());
                            match self.login(creds.user_name(), creds.password()).await {
                                Some(fresh) => {
                                    creds.replace_token(fresh);
                                    info!("Retrying {label} with new token");
                                    // Same attempt again; the re-login does not use up a slot.
                                    continue;
                                }
                                None => warn!("Re-login failed for {}", creds.user_name()),
                            }
                        }
                    }

                    if attempt < attempts {
                        tokio::time::sleep(self.policy.delay_for(attempt)).await;
                    }
                    attempt += 1;
                }
            }
        }

        warn!("Giving up on {label} ({method} {path}) after {attempts} attempt(s)");
        None
    }
}

use std::sync::Arc;

use tracing::debug;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::screens::{Alerts, Navigator, Route, ScopeHandle, ScreenScope};
use crate::token::TokenStore;
use crate::validation::validate_login;

const LOGIN_FALLBACK: &str = "Something went wrong";

pub struct LoginController {
    api: ApiClient,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    alerts: Arc<dyn Alerts>,
    scope: ScreenScope,
    pub username: String,
    pub password: String,
    loading: bool,
}

impl LoginController {
    pub fn new(
        api: ApiClient,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        alerts: Arc<dyn Alerts>,
    ) -> Self {
        Self {
            api,
            tokens,
            navigator,
            alerts,
            scope: ScreenScope::new(),
            username: String::new(),
            password: String::new(),
            loading: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn activate(&mut self) {
        self.scope.activate();
    }

    pub fn deactivate(&self) {
        self.scope.deactivate();
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn go_to_register(&self) {
        self.navigator.navigate(Route::Register);
    }

    /// Log in, persist the token, then replace the history with the main tabs.
    /// Returns `true` when the session was established.
    pub async fn submit(&mut self) -> bool {
        if let Err(err) = validate_login(&self.username, &self.password) {
            self.alerts.show("Error", &err.to_string());
            return false;
        }

        self.loading = true;
        let outcome = self.scope.run(self.sign_in()).await;
        self.loading = false;

        match outcome {
            Some(Ok(())) => {
                self.navigator.reset(Route::MainTabs);
                true
            }
            Some(Err(err)) => {
                self.alerts.show("Error", &failure_message(&err));
                false
            }
            None => {
                debug!("login abandoned, screen left");
                false
            }
        }
    }

    async fn sign_in(&self) -> Result<(), ApiError> {
        let token = self.api.login(&self.username, &self.password).await?;
        self.tokens.set_token(token.as_str()).await?;
        Ok(())
    }
}

/// The server's message, with the password or username field error appended.
fn failure_message(err: &ApiError) -> String {
    let base = match err {
        ApiError::Server(server) => server
            .message
            .clone()
            .unwrap_or_else(|| LOGIN_FALLBACK.to_string()),
        other => other.user_message(LOGIN_FALLBACK),
    };
    match err
        .field_error("password")
        .or_else(|| err.field_error("username"))
    {
        Some(detail) => format!("{base}: {detail}"),
        None => base,
    }
}

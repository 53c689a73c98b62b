use std::sync::Arc;

use tracing::warn;

use crate::api::ApiClient;
use crate::screens::{Navigator, Route, ScopeHandle, ScreenScope};
use crate::token::TokenStore;
use crate::types::UserProfile;

pub struct ProfileController {
    api: ApiClient,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    scope: ScreenScope,
    profile: Option<UserProfile>,
    loading: bool,
}

impl ProfileController {
    pub fn new(api: ApiClient, tokens: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            tokens,
            navigator,
            scope: ScreenScope::new(),
            profile: None,
            loading: true,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub async fn activate(&mut self) {
        self.scope.activate();
        self.load().await;
    }

    pub fn deactivate(&self) {
        self.scope.deactivate();
    }

    pub async fn load(&mut self) {
        self.loading = true;
        let outcome = self.scope.run(self.api.fetch_user_profile()).await;
        match outcome {
            Some(Ok(profile)) => self.profile = Some(profile),
            Some(Err(err)) => warn!(error = %err, "failed to load profile"),
            None => {}
        }
        self.loading = false;
    }

    /// Forget the session and send the user back to the login screen.
    /// Returns `false` if the token could not be removed.
    pub async fn logout(&mut self) -> bool {
        if let Err(err) = self.tokens.clear_token().await {
            warn!(error = %err, "logout failed");
            return false;
        }
        self.profile = None;
        self.navigator.reset(Route::Login);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::AUTHORIZATION;
    use crate::test_support::{Harness, NavEvent};

    #[tokio::test]
    async fn loads_profile_with_token() {
        let h = Harness::new();
        h.tokens.set_token("tok").await.unwrap();
        h.transport.respond(
            200,
            r#"{"success":true,"data":{"username":"alice","email":"a@x.io","name":"Alice"}}"#,
        );
        let mut profile = ProfileController::new(h.api.clone(), h.tokens.clone(), h.navigator.clone());

        profile.activate().await;

        assert_eq!(profile.profile().unwrap().username, "alice");
        assert_eq!(h.transport.requests()[0].header(AUTHORIZATION), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn logout_clears_token_and_resets_to_login() {
        let h = Harness::new();
        h.tokens.set_token("tok").await.unwrap();
        let mut profile = ProfileController::new(h.api.clone(), h.tokens.clone(), h.navigator.clone());

        assert!(profile.logout().await);

        assert_eq!(h.tokens.get_token().await.unwrap(), None);
        assert_eq!(h.navigator.events(), vec![NavEvent::Reset(Route::Login)]);
    }

    #[tokio::test]
    async fn requests_after_logout_are_unauthenticated() {
        let h = Harness::new();
        h.tokens.set_token("tok").await.unwrap();
        h.transport.respond(401, r#"{"message":"Unauthorized"}"#);
        let mut profile = ProfileController::new(h.api.clone(), h.tokens.clone(), h.navigator.clone());

        profile.logout().await;
        profile.load().await;

        assert!(profile.profile().is_none());
        assert!(h.transport.requests()[0].header(AUTHORIZATION).is_none());
    }
}

use std::sync::Arc;

use crate::api::ApiClient;
use crate::screens::{Alerts, Navigator, Route, ScreenScope};
use crate::validation::validate_registration;

pub struct RegisterController {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    alerts: Arc<dyn Alerts>,
    scope: ScreenScope,
    pub username: String,
    pub email: String,
    pub password: String,
    /// Display name; the username is used when left blank.
    pub name: String,
    loading: bool,
}

impl RegisterController {
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>, alerts: Arc<dyn Alerts>) -> Self {
        Self {
            api,
            navigator,
            alerts,
            scope: ScreenScope::new(),
            username: String::new(),
            email: String::new(),
            password: String::new(),
            name: String::new(),
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

    pub fn go_to_login(&self) {
        self.navigator.navigate(Route::Login);
    }

    pub async fn submit(&mut self) -> bool {
        let name = Some(self.name.as_str());
        if let Err(err) = validate_registration(&self.username, &self.password, &self.email, name) {
            self.alerts.show("Error", &err.to_string());
            return false;
        }

        self.loading = true;
        let outcome = self
            .scope
            .run(self.api.register(&self.username, &self.password, &self.email, name))
            .await;
        self.loading = false;

        match outcome {
            Some(Ok(_)) => {
                self.alerts.show("Success", "Registration successful");
                self.navigator.navigate(Route::Login);
                true
            }
            Some(Err(err)) => {
                self.alerts.show("Error", &err.user_message("Registration failed"));
                false
            }
            None => false,
        }
    }
}

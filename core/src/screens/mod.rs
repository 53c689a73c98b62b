//! Screen controllers: per-screen view state driven by `ApiClient`.
//!
//! # Overview
//! Each controller holds what its screen shows (lists, loading flags, form
//! fields) and reacts to user actions by calling the API client. Rendering,
//! navigation transitions and dialogs belong to the host, reached through the
//! `Navigator` and `Alerts` traits.
//!
//! # Design
//! - Errors are caught where the call is made and turned into one alert;
//!   none escape a controller.
//! - Mutations never patch local state. After a successful write the
//!   controller re-fetches the full list.
//! - Every request runs inside the controller's `ScreenScope`. Leaving the
//!   screen cancels the scope, and a cancelled request's result is dropped
//!   instead of being applied to state nobody is looking at.

mod book_detail;
mod books;
mod home;
mod login;
mod profile;
mod register;

pub use book_detail::BookDetailController;
pub use books::BooksController;
pub use home::HomeController;
pub use login::LoginController;
pub use profile::ProfileController;
pub use register::RegisterController;

use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::BookId;

/// Navigation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    MainTabs,
    Home,
    Books,
    Profile,
    BookDetail { book_id: BookId },
}

pub trait Navigator: Send + Sync {
    /// Push `route` on top of the history.
    fn navigate(&self, route: Route);
    /// Replace the whole history with `route`.
    fn reset(&self, route: Route);
}

#[async_trait]
pub trait Alerts: Send + Sync {
    /// One-time message with a title; dismissed by the user.
    fn show(&self, title: &str, message: &str);
    /// Ask a yes/no question. `true` means the user confirmed.
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Lifetime of one activation of a screen.
#[derive(Debug)]
pub struct ScreenScope {
    token: CancellationToken,
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Start a new activation, cancelling whatever the previous one left running.
    pub fn activate(&mut self) {
        self.token.cancel();
        self.token = CancellationToken::new();
    }

    pub fn deactivate(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle(self.token.clone())
    }

    /// Drive `work` until it finishes or the scope is cancelled.
    /// `None` means cancelled; the work is dropped mid-flight.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = work => Some(output),
        }
    }
}

/// Cloneable handle that cancels the activation it was taken from.
#[derive(Debug, Clone)]
pub struct ScopeHandle(CancellationToken);

impl ScopeHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

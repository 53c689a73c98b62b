use std::sync::Arc;

use tracing::warn;

use crate::api::ApiClient;
use crate::screens::{Navigator, Route, ScopeHandle, ScreenScope};
use crate::types::{Book, BookId};

/// Read-only book feed with links into the detail and management screens.
/// Load failures are logged and leave the feed as it was.
pub struct HomeController {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    scope: ScreenScope,
    books: Vec<Book>,
    loading: bool,
}

impl HomeController {
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            navigator,
            scope: ScreenScope::new(),
            books: Vec::new(),
            loading: true,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
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
        let outcome = self.scope.run(self.api.get_all_books()).await;
        match outcome {
            Some(Ok(books)) => self.books = books,
            Some(Err(err)) => warn!(error = %err, "failed to fetch books"),
            None => {}
        }
        self.loading = false;
    }

    pub fn open_book(&self, book_id: &BookId) {
        self.navigator.navigate(Route::BookDetail {
            book_id: book_id.clone(),
        });
    }

    pub fn manage_books(&self) {
        self.navigator.navigate(Route::Books);
    }
}

use tracing::warn;

use crate::api::ApiClient;
use crate::screens::{ScopeHandle, ScreenScope};
use crate::types::{Book, BookId};

/// Detail view of a single book. A failed fetch leaves `book` empty, which
/// the host renders as "not found".
pub struct BookDetailController {
    api: ApiClient,
    scope: ScreenScope,
    book_id: BookId,
    book: Option<Book>,
    loading: bool,
}

impl BookDetailController {
    pub fn new(api: ApiClient, book_id: BookId) -> Self {
        Self {
            api,
            scope: ScreenScope::new(),
            book_id,
            book: None,
            loading: true,
        }
    }

    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
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
        let outcome = self.scope.run(self.api.get_book_by_id(&self.book_id)).await;
        match outcome {
            Some(Ok(book)) => self.book = Some(book),
            Some(Err(err)) => warn!(book_id = %self.book_id, error = %err, "failed to fetch book"),
            None => {}
        }
        self.loading = false;
    }
}

use std::sync::Arc;

use crate::api::ApiClient;
use crate::screens::{Alerts, ScopeHandle, ScreenScope};
use crate::types::{Book, BookId};
use crate::validation::BookDraft;

const DELETE_TITLE: &str = "Delete Book";
const DELETE_PROMPT: &str = "Are you sure you want to delete this book?";

/// Book management: list, add/edit form, delete.
pub struct BooksController {
    api: ApiClient,
    alerts: Arc<dyn Alerts>,
    scope: ScreenScope,
    books: Vec<Book>,
    loading: bool,
    dialog_visible: bool,
    selected: Option<Book>,
    /// Form fields as typed; validated and trimmed on submit.
    pub draft: BookDraft,
}

impl BooksController {
    pub fn new(api: ApiClient, alerts: Arc<dyn Alerts>) -> Self {
        Self {
            api,
            alerts,
            scope: ScreenScope::new(),
            books: Vec::new(),
            loading: true,
            dialog_visible: false,
            selected: None,
            draft: BookDraft::default(),
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_dialog_visible(&self) -> bool {
        self.dialog_visible
    }

    /// The book being edited; `None` while adding.
    pub fn selected(&self) -> Option<&Book> {
        self.selected.as_ref()
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub async fn activate(&mut self) {
        self.scope.activate();
        self.fetch_books().await;
    }

    pub fn deactivate(&self) {
        self.scope.deactivate();
    }

    /// Replace the list with the server's. Returns `false` on failure or cancel.
    pub async fn fetch_books(&mut self) -> bool {
        self.loading = true;
        let outcome = self.scope.run(self.api.get_all_books()).await;
        self.loading = false;
        match outcome {
            Some(Ok(books)) => {
                self.books = books;
                true
            }
            Some(Err(err)) => {
                self.alerts
                    .show("Error", &err.user_message("Failed to fetch books"));
                false
            }
            None => false,
        }
    }

    pub fn start_add(&mut self) {
        self.selected = None;
        self.draft = BookDraft::default();
        self.dialog_visible = true;
    }

    pub fn start_edit(&mut self, book: &Book) {
        self.draft = BookDraft::from_book(book);
        self.selected = Some(book.clone());
        self.dialog_visible = true;
    }

    pub fn cancel_form(&mut self) {
        self.dialog_visible = false;
    }

    /// Validate the form, then create or update, close the dialog and
    /// re-fetch the list. Invalid drafts never reach the network.
    pub async fn submit(&mut self) -> bool {
        let input = match self.draft.validate() {
            Ok(input) => input,
            Err(err) => {
                self.alerts.show("Validation Error", &err.to_string());
                return false;
            }
        };

        let (outcome, fallback) = match &self.selected {
            Some(book) => (
                self.scope.run(self.api.update_book(&book.id, &input)).await,
                "Failed to update book",
            ),
            None => (
                self.scope.run(self.api.create_book(&input)).await,
                "Failed to create book",
            ),
        };

        match outcome {
            Some(Ok(mutation)) => {
                self.dialog_visible = false;
                self.fetch_books().await;
                self.alerts.show("Success", &mutation.message);
                true
            }
            Some(Err(err)) => {
                self.alerts.show("Error", &err.summary_or(fallback));
                false
            }
            None => false,
        }
    }

    /// Ask for confirmation, delete, then re-fetch the list.
    pub async fn delete(&mut self, book_id: &BookId) -> bool {
        if !self.alerts.confirm(DELETE_TITLE, DELETE_PROMPT).await {
            return false;
        }
        let outcome = self.scope.run(self.api.delete_book(book_id)).await;
        match outcome {
            Some(Ok(_)) => {
                self.alerts.show("Success", "Book deleted successfully");
                self.fetch_books().await;
                true
            }
            Some(Err(err)) => {
                self.alerts
                    .show("Error", &err.user_message("Failed to delete book"));
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::test_support::{book_json, books_body, Harness};

    fn controller(h: &Harness) -> BooksController {
        BooksController::new(h.api.clone(), h.alerts.clone())
    }

    fn fill(c: &mut BooksController, title: &str, author: &str, description: &str, genre: &str) {
        c.draft = BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
            genre: genre.to_string(),
        };
    }

    #[tokio::test]
    async fn fetch_failure_alerts_with_server_message() {
        let h = Harness::new();
        h.transport.respond(401, r#"{"message":"Unauthorized"}"#);
        let mut c = controller(&h);

        c.activate().await;

        assert_eq!(
            h.alerts.last(),
            Some(("Error".to_string(), "Unauthorized".to_string()))
        );
        assert!(!c.is_loading());
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_network() {
        let h = Harness::new();
        let mut c = controller(&h);
        c.start_add();
        fill(&mut c, "AB", "Someone", "short", "");

        assert!(!c.submit().await);

        assert!(h.transport.requests().is_empty());
        assert_eq!(
            h.alerts.last(),
            Some((
                "Validation Error".to_string(),
                "Title must be at least 3 characters".to_string()
            ))
        );
        assert!(c.is_dialog_visible());
    }

    #[tokio::test]
    async fn create_sends_trimmed_values_then_refetches() {
        let h = Harness::new();
        h.transport.respond(201, &format!(r#"{{"success":true,"data":{}}}"#, book_json("b1", "Dune")));
        h.transport.respond(200, &books_body(&[("b1", "Dune")]));
        let mut c = controller(&h);
        c.start_add();
        fill(&mut c, " Dune ", " Frank Herbert ", " Desert planet saga ", " SF ");

        assert!(c.submit().await);

        let sent = h.transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["genre"], "SF");
        assert_eq!(sent[1].method, HttpMethod::Get);
        assert_eq!(c.books().len(), 1);
        assert!(!c.is_dialog_visible());
        assert_eq!(
            h.alerts.last(),
            Some(("Success".to_string(), "Book created successfully".to_string()))
        );
    }

    #[tokio::test]
    async fn create_with_empty_payload_reports_invalid_response() {
        let h = Harness::new();
        h.transport.respond(201, "");
        let mut c = controller(&h);
        c.start_add();
        fill(&mut c, "Dune", "Frank Herbert", "Desert planet saga", "SF");

        assert!(!c.submit().await);

        assert_eq!(h.alerts.last().unwrap().1, "Invalid response format");
        assert_eq!(h.transport.requests().len(), 1);
        assert!(c.is_dialog_visible());
    }

    #[tokio::test]
    async fn edit_updates_selected_book() {
        let h = Harness::new();
        h.transport.respond(200, &books_body(&[("b1", "Dune")]));
        h.transport.respond(200, &format!(r#"{{"data":{}}}"#, book_json("b1", "Dune Messiah")));
        h.transport.respond(200, &books_body(&[("b1", "Dune Messiah")]));
        let mut c = controller(&h);
        c.activate().await;

        let book = c.books()[0].clone();
        c.start_edit(&book);
        assert_eq!(c.draft.title, "Dune");
        c.draft.title = "Dune Messiah".to_string();

        assert!(c.submit().await);

        let sent = h.transport.requests();
        assert_eq!(sent[1].method, HttpMethod::Put);
        assert_eq!(sent[1].path, "http://api.test/api/books/b1");
        assert_eq!(c.books()[0].title, "Dune Messiah");
        assert_eq!(h.alerts.last().unwrap().1, "Book updated successfully");
    }

    #[tokio::test]
    async fn update_field_errors_are_joined() {
        let h = Harness::new();
        h.transport.respond(
            400,
            r#"{"errors":{"description":"Description too short","title":"Title taken"}}"#,
        );
        let mut c = controller(&h);
        let book: Book = serde_json::from_str(&book_json("b1", "Dune")).unwrap();
        c.start_edit(&book);

        assert!(!c.submit().await);
        assert_eq!(h.alerts.last().unwrap().1, "Description too short, Title taken");
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let h = Harness::with_confirm(false);
        let mut c = controller(&h);

        assert!(!c.delete(&"b1".parse().unwrap()).await);
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn delete_then_refetch() {
        let h = Harness::new();
        h.transport.respond(200, r#"{"success":true,"message":"Book deleted"}"#);
        h.transport.respond(200, &books_body(&[]));
        let mut c = controller(&h);

        assert!(c.delete(&"b1".parse().unwrap()).await);

        let sent = h.transport.requests();
        assert_eq!(sent[0].method, HttpMethod::Delete);
        assert_eq!(sent[1].method, HttpMethod::Get);
        assert!(c.books().is_empty());
        assert!(h
            .alerts
            .shown()
            .contains(&("Success".to_string(), "Book deleted successfully".to_string())));
    }

    #[tokio::test]
    async fn second_delete_surfaces_failure() {
        let h = Harness::new();
        h.transport.respond(404, r#"{"message":"Book not found"}"#);
        let mut c = controller(&h);

        assert!(!c.delete(&"b1".parse().unwrap()).await);
        assert_eq!(h.alerts.last().unwrap().1, "Book not found");
    }

    #[tokio::test]
    async fn empty_error_body_reads_as_network_error() {
        let h = Harness::new();
        h.transport.respond(500, "");
        h.transport.respond(500, "");
        let mut c = controller(&h);

        assert!(!c.fetch_books().await);
        assert_eq!(
            h.alerts.last(),
            Some(("Error".to_string(), "Network error".to_string()))
        );

        assert!(!c.delete(&"b1".parse().unwrap()).await);
        assert_eq!(
            h.alerts.last(),
            Some(("Error".to_string(), "Network error".to_string()))
        );
    }

    #[tokio::test]
    async fn error_body_without_message_uses_screen_fallback() {
        let h = Harness::new();
        h.transport.respond(500, r#"{"success":false}"#);
        let mut c = controller(&h);

        assert!(!c.fetch_books().await);
        assert_eq!(h.alerts.last().unwrap().1, "Failed to fetch books");
    }

    #[tokio::test]
    async fn list_with_unsafe_id_is_rejected() {
        let h = Harness::new();
        h.transport.respond(
            200,
            r#"{"data":[{"_id":"../profile","title":"Dune","author":"Frank Herbert"}]}"#,
        );
        let mut c = controller(&h);

        assert!(!c.fetch_books().await);

        assert!(c.books().is_empty());
        assert_eq!(h.alerts.last().unwrap().1, "Failed to fetch books");
    }

    #[tokio::test]
    async fn create_with_empty_error_body_uses_screen_fallback() {
        let h = Harness::new();
        h.transport.respond(500, "");
        let mut c = controller(&h);
        c.start_add();
        fill(&mut c, "Dune", "Frank Herbert", "Desert planet saga", "SF");

        assert!(!c.submit().await);
        assert_eq!(h.alerts.last().unwrap().1, "Failed to create book");
    }

    #[tokio::test]
    async fn cancelled_scope_discards_fetch() {
        let h = Harness::new();
        h.transport.respond(200, &books_body(&[("b1", "Dune")]));
        let mut c = controller(&h);
        c.scope_handle().cancel();

        assert!(!c.fetch_books().await);

        assert!(c.books().is_empty());
        assert!(!c.is_loading());
        assert!(h.alerts.shown().is_empty());
    }
}

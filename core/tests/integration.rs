//! Full lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP twice: once through the sans-IO `BookClient` with
//! ureq doing the IO (as a native host would), and once through `ApiClient`
//! and the screen controllers over reqwest.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bookshelf_core::screens::{
    Alerts, BookDetailController, BooksController, HomeController, LoginController, Navigator,
    ProfileController, RegisterController, Route,
};
use bookshelf_core::{
    ApiClient, ApiError, BookClient, BookInput, ClientConfig, HttpMethod, HttpRequest,
    HttpResponse, LoginRequest, RegisterRequest, TokenStore,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&req.path), &req.headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&req.path), &req.headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&req.path), &req.headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(&req.path), &req.headers).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            with_headers(agent.put(&req.path), &req.headers).send(body.as_bytes())
        }
        (HttpMethod::Put, None) => with_headers(agent.put(&req.path), &req.headers).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Start the mock server on its own thread and runtime.
fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn dune() -> BookInput {
    BookInput {
        title: "Dune".to_string(),
        author: "Frank Herbert".to_string(),
        description: "Desert planet saga".to_string(),
        genre: "SF".to_string(),
    }
}

#[test]
fn crud_lifecycle() {
    let addr = spawn_server();
    let client = BookClient::new(&format!("http://{addr}"));

    // Step 1: register and log in.
    let req = client
        .build_register(&RegisterRequest::new("alice", "secret1", "Alice@Example.com", None))
        .unwrap();
    let registered = client.parse_register(execute(req)).unwrap();
    assert_eq!(registered["data"]["email"], "alice@example.com");
    assert_eq!(registered["data"]["name"], "alice");

    let req = client.build_login(&LoginRequest::new(" alice ", "secret1")).unwrap();
    let token = client.parse_login(execute(req)).unwrap();
    let token = Some(token.as_str());

    // Step 2: without the token the API refuses.
    let err = client.parse_get_all_books(execute(client.build_get_all_books())).unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Unauthorized");

    // Step 3: list is empty.
    let req = client.build_get_all_books().authorize(token);
    let books = client.parse_get_all_books(execute(req)).unwrap();
    assert!(books.is_empty(), "expected empty list");

    // Step 4: create.
    let req = client.build_create_book(&dune()).unwrap().authorize(token);
    let created = client.parse_create_book(execute(req)).unwrap();
    assert_eq!(created.data.title, "Dune");
    assert_eq!(created.message, "Book created successfully");
    let id = created.data.id.clone();

    // Step 5: get.
    let req = client.build_get_book(&id).authorize(token);
    let fetched = client.parse_get_book(execute(req)).unwrap();
    assert_eq!(fetched, created.data);

    // Step 6: update rejected by the server keeps the field errors.
    let mut short = dune();
    short.description = "short".to_string();
    let req = client.build_update_book(&id, &short).unwrap().authorize(token);
    let err = client.parse_update_book(execute(req)).unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.field_error("description"),
        Some("Description must be at least 10 characters")
    );

    // Step 7: update.
    let mut messiah = dune();
    messiah.title = "Dune Messiah".to_string();
    let req = client.build_update_book(&id, &messiah).unwrap().authorize(token);
    let updated = client.parse_update_book(execute(req)).unwrap();
    assert_eq!(updated.data.title, "Dune Messiah");
    assert_eq!(updated.data.id, id);

    // Step 8: profile.
    let req = client.build_fetch_user_profile().authorize(token);
    let profile = client.parse_user_profile(execute(req)).unwrap();
    assert_eq!(profile.username, "alice");

    // Step 9: delete, then delete again.
    let req = client.build_delete_book(&id).authorize(token);
    let deleted = client.parse_delete_book(execute(req)).unwrap();
    assert_eq!(deleted["message"], "Book deleted successfully");

    let req = client.build_delete_book(&id).authorize(token);
    let err = client.parse_delete_book(execute(req)).unwrap_err();
    assert!(err.is_not_found());

    // Step 10: get after delete.
    let req = client.build_get_book(&id).authorize(token);
    let err = client.parse_get_book(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Server(_)));
    assert_eq!(err.to_string(), "Book not found");
}

// ---------------------------------------------------------------------------
// Controllers over reqwest
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Nav {
    resets: Mutex<Vec<Route>>,
    pushes: Mutex<Vec<Route>>,
}

impl Navigator for Nav {
    fn navigate(&self, route: Route) {
        self.pushes.lock().unwrap().push(route);
    }

    fn reset(&self, route: Route) {
        self.resets.lock().unwrap().push(route);
    }
}

#[derive(Default)]
struct Dialogs {
    shown: Mutex<Vec<(String, String)>>,
}

impl Dialogs {
    fn last(&self) -> (String, String) {
        self.shown.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Alerts for Dialogs {
    fn show(&self, title: &str, message: &str) {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        true
    }
}

#[tokio::test]
async fn screens_lifecycle() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));

    let tokens = TokenStore::in_memory();
    let config = ClientConfig::new(&format!("http://{addr}")).unwrap();
    let api = ApiClient::from_config(&config, Arc::new(tokens.clone())).unwrap();
    let nav = Arc::new(Nav::default());
    let dialogs = Arc::new(Dialogs::default());

    // Register.
    let mut register = RegisterController::new(api.clone(), nav.clone(), dialogs.clone());
    register.activate();
    register.username = "bob".to_string();
    register.email = "bob@example.com".to_string();
    register.password = "hunter22".to_string();
    assert!(register.submit().await);
    assert_eq!(
        dialogs.last(),
        ("Success".to_string(), "Registration successful".to_string())
    );

    // Registering the same username again is refused by the server.
    assert!(!register.submit().await);
    assert_eq!(dialogs.last().1, "Username already exists");

    // Wrong password, then the right one.
    let mut login = LoginController::new(api.clone(), tokens.clone(), nav.clone(), dialogs.clone());
    login.activate();
    login.username = "bob".to_string();
    login.password = "wrong".to_string();
    assert!(!login.submit().await);
    assert_eq!(dialogs.last().1, "Invalid credentials: Incorrect password");
    assert_eq!(tokens.get_token().await.unwrap(), None);

    login.password = "hunter22".to_string();
    assert!(login.submit().await);
    assert!(tokens.get_token().await.unwrap().is_some());
    assert_eq!(nav.resets.lock().unwrap().last(), Some(&Route::MainTabs));

    // Add a book with untrimmed fields.
    let mut books = BooksController::new(api.clone(), dialogs.clone());
    books.activate().await;
    assert!(books.books().is_empty());
    books.start_add();
    books.draft.title = "  Emma ".to_string();
    books.draft.author = " Jane Austen".to_string();
    books.draft.description = "Matchmaking in Highbury ".to_string();
    books.draft.genre = "Classic".to_string();
    assert!(books.submit().await);
    assert_eq!(books.books().len(), 1);
    assert_eq!(books.books()[0].title, "Emma");
    assert_eq!(books.books()[0].author, "Jane Austen");
    let id = books.books()[0].id.clone();

    // Home shows it and opens the detail screen.
    let mut home = HomeController::new(api.clone(), nav.clone());
    home.activate().await;
    assert_eq!(home.books().len(), 1);
    home.open_book(&id);
    assert_eq!(
        nav.pushes.lock().unwrap().last(),
        Some(&Route::BookDetail { book_id: id.clone() })
    );

    let mut detail = BookDetailController::new(api.clone(), id.clone());
    detail.activate().await;
    assert_eq!(detail.book().unwrap().genre, "Classic");

    // Edit.
    let book = books.books()[0].clone();
    books.start_edit(&book);
    books.draft.genre = "Romance".to_string();
    assert!(books.submit().await);
    assert_eq!(books.books()[0].genre, "Romance");
    assert_eq!(
        dialogs.last(),
        ("Success".to_string(), "Book updated successfully".to_string())
    );

    // Delete twice: the second one fails with the server's message.
    assert!(books.delete(&id).await);
    assert!(books.books().is_empty());
    assert!(!books.delete(&id).await);
    assert_eq!(dialogs.last(), ("Error".to_string(), "Book not found".to_string()));

    // Profile, then logout.
    let mut profile = ProfileController::new(api.clone(), tokens.clone(), nav.clone());
    profile.activate().await;
    assert_eq!(profile.profile().unwrap().email, "bob@example.com");
    assert_eq!(profile.profile().unwrap().name, "bob");

    assert!(profile.logout().await);
    assert_eq!(nav.resets.lock().unwrap().last(), Some(&Route::Login));
    let err = api.get_all_books().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

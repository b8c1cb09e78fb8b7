//! Integration test harness for the printer registry.
//!
//! [`TestApp`] drives the real router in-process with
//! `tower::ServiceExt::oneshot`, backed by the in-memory printer store,
//! identity provider, and session store. It keeps the session cookie between
//! requests the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p printers-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use printers_core::{PrinterData, PrinterInput};
use printers_web::AppState;
use printers_web::config::{PrintersConfig, UpdateValidation};
use printers_web::db::{MemoryPrinterStore, PrinterStore};
use printers_web::middleware::create_session_layer;
use printers_web::middleware::session::SESSION_COOKIE_NAME;
use printers_web::models::{Printer, UserFlags};
use printers_web::services::auth::{IdentityProvider, MemoryIdentityProvider};

/// Password used for every test account.
pub const PASSWORD: &str = "Str0ng-Passw0rd!";

/// Configuration suitable for in-process tests.
#[must_use]
pub fn test_config(update_validation: UpdateValidation) -> PrintersConfig {
    PrintersConfig {
        database_url: SecretString::from("postgres://unused@localhost/unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 8000,
        base_url: "http://localhost:8000".to_owned(),
        update_validation,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The interesting parts of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Whether this is a redirect to `path`.
    #[must_use]
    pub fn redirects_to(&self, path: &str) -> bool {
        self.status.is_redirection() && self.location.as_deref() == Some(path)
    }
}

/// A router plus direct handles on its stores.
pub struct TestApp {
    router: Router,
    pub printers: Arc<MemoryPrinterStore>,
    pub identity: Arc<MemoryIdentityProvider>,
    cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build an app with date-only update validation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_update_validation(UpdateValidation::DateOnly)
    }

    /// Build an app with the given update validation.
    #[must_use]
    pub fn with_update_validation(update_validation: UpdateValidation) -> Self {
        let config = test_config(update_validation);
        let printers = Arc::new(MemoryPrinterStore::new());
        let identity = Arc::new(MemoryIdentityProvider::new());
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::new(config, printers.clone(), identity.clone());

        Self {
            router: printers_web::app(state, session_layer),
            printers,
            identity,
            cookie: None,
        }
    }

    /// Another client against the same stores, with no session.
    #[must_use]
    pub fn new_client(&self) -> Self {
        Self {
            router: self.router.clone(),
            printers: self.printers.clone(),
            identity: self.identity.clone(),
            cookie: None,
        }
    }

    /// Send a request, carrying and updating the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body is not UTF-8.
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(
                header::COOKIE,
                cookie.parse().unwrap_or_else(|e| panic!("bad cookie: {e}")),
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| panic!("router error: {e}"));

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap_or_default();
            let Some(pair) = value.split(';').next() else {
                continue;
            };
            if !pair.starts_with(SESSION_COOKIE_NAME) {
                continue;
            }
            self.cookie = if value.contains("Max-Age=0") {
                None
            } else {
                Some(pair.to_owned())
            };
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("body error: {e}"));
        let body = String::from_utf8(bytes.to_vec()).unwrap_or_else(|e| panic!("{e}"));

        TestResponse {
            status,
            location,
            body,
        }
    }

    /// GET a path.
    ///
    /// # Panics
    ///
    /// Panics if the request can't be built.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap_or_else(|e| panic!("{e}"));
        self.send(request).await
    }

    /// POST an urlencoded form.
    ///
    /// # Panics
    ///
    /// Panics if the form can't be encoded.
    pub async fn post_form<T: serde::Serialize + ?Sized>(
        &mut self,
        uri: &str,
        form: &T,
    ) -> TestResponse {
        let body = serde_urlencoded::to_string(form).unwrap_or_else(|e| panic!("{e}"));
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap_or_else(|e| panic!("{e}"));
        self.send(request).await
    }

    /// Register `username` directly, set its superuser flag, and log in over HTTP.
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails.
    pub async fn login_as(&mut self, username: &str, superuser: bool) {
        self.identity
            .register_user(username, PASSWORD, PASSWORD)
            .await
            .unwrap_or_else(|e| panic!("register {username}: {e}"));
        if superuser {
            self.identity
                .set_flags(
                    username,
                    UserFlags {
                        is_staff: Some(true),
                        is_superuser: Some(true),
                        ..UserFlags::default()
                    },
                )
                .await
                .unwrap_or_else(|e| panic!("promote {username}: {e}"));
        }

        let response = self
            .post_form("/login/", &[("username", username), ("password", PASSWORD)])
            .await;
        assert!(
            response.redirects_to("/"),
            "login as {username} failed: {response:?}"
        );
    }

    /// Insert a printer directly into the store.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects the insert.
    pub async fn insert_printer(&self, data: &PrinterData) -> Printer {
        self.printers
            .insert(data)
            .await
            .unwrap_or_else(|e| panic!("insert: {e}"))
    }

    /// Number of stored printers.
    ///
    /// # Panics
    ///
    /// Panics if the store fails.
    pub async fn printer_count(&self) -> i64 {
        self.printers
            .count()
            .await
            .unwrap_or_else(|e| panic!("count: {e}"))
    }
}

/// Form fields for a valid printer.
#[must_use]
pub fn valid_printer_form() -> PrinterInput {
    PrinterInput {
        brand: Some("HP".to_owned()),
        model: Some("LaserJet".to_owned()),
        location: Some("Room 1".to_owned()),
        ip_address: Some("10.0.0.5".to_owned()),
        mac_address: Some("00:11:22:33:44:55".to_owned()),
        manufacture_date: Some("2020-01-01".to_owned()),
        comments: Some(String::new()),
    }
}

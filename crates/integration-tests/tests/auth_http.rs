//! HTTP-level tests for login, logout, and registration.

use printers_integration_tests::{PASSWORD, TestApp};
use printers_web::models::UserFlags;
use printers_web::services::auth::IdentityProvider;

#[tokio::test]
async fn test_login_page_renders() {
    let mut app = TestApp::new();
    let page = app.get("/login/").await;
    assert!(page.status.is_success());
    assert!(page.body.contains("action=\"/login/\""));
}

#[tokio::test]
async fn test_wrong_password_redirects_with_error() {
    let mut app = TestApp::new();
    app.identity
        .register_user("testuser", PASSWORD, PASSWORD)
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    let response = app
        .post_form(
            "/login/",
            &[("username", "testuser"), ("password", "wrong-password")],
        )
        .await;
    assert!(response.redirects_to("/login/?error=credentials"), "{response:?}");

    let page = app.get("/login/?error=credentials").await;
    assert!(page.body.contains("Please enter a correct username and password."));
    assert!(app.get("/").await.redirects_to("/login/"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let mut app = TestApp::new();
    app.login_as("testuser", false).await;
    assert!(app.get("/").await.status.is_success());

    let response = app.post_form("/logout/", &[("", "")]).await;
    assert!(response.redirects_to("/"));
    assert!(app.get("/").await.redirects_to("/login/"));
}

#[tokio::test]
async fn test_deactivated_user_loses_access() {
    let mut app = TestApp::new();
    app.login_as("testuser", false).await;
    assert!(app.get("/").await.status.is_success());

    app.identity
        .set_flags(
            "testuser",
            UserFlags {
                is_active: Some(false),
                ..UserFlags::default()
            },
        )
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert!(app.get("/").await.redirects_to("/login/"));
}

#[tokio::test]
async fn test_register_logs_in_and_redirects() {
    let mut app = TestApp::new();
    let response = app
        .post_form(
            "/register/",
            &[
                ("username", "newuser"),
                ("password1", PASSWORD),
                ("password2", PASSWORD),
            ],
        )
        .await;
    assert!(response.redirects_to("/"), "{response:?}");

    let page = app.get("/").await;
    assert!(page.status.is_success());
    assert!(page.body.contains("newuser"));
}

#[tokio::test]
async fn test_register_mismatch_rerenders_form() {
    let mut app = TestApp::new();
    let response = app
        .post_form(
            "/register/",
            &[
                ("username", "newuser"),
                ("password1", PASSWORD),
                ("password2", "Different-Passw0rd!"),
            ],
        )
        .await;
    assert!(response.status.is_success());
    assert!(response.body.contains("didn"));
    assert!(response.body.contains("value=\"newuser\""));
    assert!(app.get("/").await.redirects_to("/login/"));
}

#[tokio::test]
async fn test_register_weak_password_lists_problems() {
    let mut app = TestApp::new();
    let response = app
        .post_form(
            "/register/",
            &[
                ("username", "newuser"),
                ("password1", "1234"),
                ("password2", "1234"),
            ],
        )
        .await;
    assert!(response.status.is_success());
    assert!(response.body.contains("too short"));
    assert!(response.body.contains("entirely numeric"));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let mut app = TestApp::new();
    app.identity
        .register_user("taken", PASSWORD, PASSWORD)
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    let response = app
        .post_form(
            "/register/",
            &[
                ("username", "taken"),
                ("password1", PASSWORD),
                ("password2", PASSWORD),
            ],
        )
        .await;
    assert!(response.status.is_success());
    assert!(response.body.contains("already exists"));
}

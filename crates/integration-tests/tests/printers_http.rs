//! HTTP-level tests for printer listing and mutations.

use printers_core::{PrinterData, PrinterInput};
use printers_integration_tests::{TestApp, valid_printer_form};
use printers_web::config::UpdateValidation;

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
async fn test_anonymous_listing_redirects_to_login() {
    let mut app = TestApp::new();
    let response = app.get("/").await;
    assert!(response.redirects_to("/login/"), "{response:?}");
}

#[tokio::test]
async fn test_anonymous_add_is_redirected_without_mutation() {
    let mut app = TestApp::new();
    let response = app.post_form("/add_printer/", &valid_printer_form()).await;
    assert!(response.redirects_to("/login/"), "{response:?}");
    assert_eq!(app.printer_count().await, 0);
}

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new();
    assert_eq!(app.get("/health").await.body, "ok");
    assert!(app.get("/health/ready").await.status.is_success());
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_add_printer_and_list_it() {
    let mut app = TestApp::new();
    app.login_as("testuser", false).await;

    let response = app.post_form("/add_printer/", &valid_printer_form()).await;
    assert!(response.redirects_to("/"), "{response:?}");
    assert_eq!(app.printer_count().await, 1);

    let page = app.get("/").await;
    assert!(page.status.is_success());
    assert!(page.body.contains("Printer added successfully."));
    assert!(page.body.contains("LaserJet"));
    assert!(page.body.contains("2020-01-01"));

    // Flash messages are shown once.
    let page = app.get("/").await;
    assert!(!page.body.contains("Printer added successfully."));
}

#[tokio::test]
async fn test_add_printer_with_invalid_ip_is_rejected() {
    let mut app = TestApp::new();
    app.login_as("testuser", false).await;

    let form = PrinterInput {
        ip_address: Some("999.999.999.999".to_owned()),
        ..valid_printer_form()
    };
    let response = app.post_form("/add_printer/", &form).await;
    assert!(response.redirects_to("/"));
    assert_eq!(app.printer_count().await, 0);

    let page = app.get("/").await;
    assert!(page.body.contains("Invalid IP address"));
    assert!(page.body.contains("999.999.999.999"));
}

#[tokio::test]
async fn test_add_printer_with_missing_field_is_rejected() {
    let mut app = TestApp::new();
    app.login_as("testuser", false).await;

    let form = PrinterInput {
        model: None,
        ..valid_printer_form()
    };
    app.post_form("/add_printer/", &form).await;
    assert_eq!(app.printer_count().await, 0);

    let page = app.get("/").await;
    assert!(page.body.contains("model"));
    assert!(page.body.contains("cannot be empty."));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_printer_replaces_fields() {
    let mut app = TestApp::new();
    let printer = app.insert_printer(&PrinterData::placeholder()).await;
    app.login_as("testuser", false).await;

    let form = PrinterInput {
        location: Some("Room 42".to_owned()),
        ..valid_printer_form()
    };
    let response = app
        .post_form(&format!("/update_printer/{}/", printer.id), &form)
        .await;
    assert!(response.redirects_to("/"));

    let page = app.get("/").await;
    assert!(page.body.contains("Printer updated successfully."));
    assert!(page.body.contains("Room 42"));
}

#[tokio::test]
async fn test_update_with_invalid_date_is_rejected() {
    let mut app = TestApp::new();
    let printer = app.insert_printer(&PrinterData::placeholder()).await;
    app.login_as("testuser", false).await;

    let form = PrinterInput {
        location: Some("Room 42".to_owned()),
        manufacture_date: Some("not-a-date".to_owned()),
        ..valid_printer_form()
    };
    app.post_form(&format!("/update_printer/{}/", printer.id), &form)
        .await;

    let page = app.get("/").await;
    assert!(page.body.contains("Invalid date format"));
    assert!(!page.body.contains("Room 42"));
}

#[tokio::test]
async fn test_update_missing_printer_flashes_not_found() {
    let mut app = TestApp::new();
    app.login_as("testuser", false).await;

    for path in ["/update_printer/999/", "/update_printer/abc/"] {
        let response = app.post_form(path, &valid_printer_form()).await;
        assert!(response.redirects_to("/"));
        let page = app.get("/").await;
        assert!(page.body.contains("Printer not found."), "{path}");
    }
}

#[tokio::test]
async fn test_full_update_validation_rejects_invalid_ip() {
    let mut app = TestApp::with_update_validation(UpdateValidation::Full);
    let printer = app.insert_printer(&PrinterData::placeholder()).await;
    app.login_as("testuser", false).await;

    let form = PrinterInput {
        ip_address: Some("not-an-ip".to_owned()),
        ..valid_printer_form()
    };
    app.post_form(&format!("/update_printer/{}/", printer.id), &form)
        .await;

    let page = app.get("/").await;
    assert!(page.body.contains("Invalid IP address"));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_regular_user_cannot_delete() {
    let mut app = TestApp::new();
    let printer = app.insert_printer(&PrinterData::placeholder()).await;
    app.login_as("regular", false).await;

    let response = app
        .post_form(&format!("/delete_printer/{}/", printer.id), &[("", "")])
        .await;
    assert!(response.redirects_to("/"));
    assert_eq!(app.printer_count().await, 1);

    let page = app.get("/").await;
    assert!(
        page.body
            .contains("You do not have the required permissions to delete this printer.")
    );
}

#[tokio::test]
async fn test_superuser_deletes_printer() {
    let mut app = TestApp::new();
    let printer = app.insert_printer(&PrinterData::placeholder()).await;
    app.insert_printer(&PrinterData::placeholder()).await;
    app.login_as("admin", true).await;

    let response = app
        .post_form(&format!("/delete_printer/{}/", printer.id), &[("", "")])
        .await;
    assert!(response.redirects_to("/"));
    assert_eq!(app.printer_count().await, 1);

    let page = app.get("/").await;
    assert!(page.body.contains("Printer deleted successfully."));

    app.post_form(&format!("/delete_printer/{}/", printer.id), &[("", "")])
        .await;
    let page = app.get("/").await;
    assert!(page.body.contains("Printer not found."));
}

#[tokio::test]
async fn test_delete_button_only_shown_with_permission() {
    let mut app = TestApp::new();
    app.insert_printer(&PrinterData::placeholder()).await;

    let mut regular = app.new_client();
    regular.login_as("regular", false).await;
    assert!(!regular.get("/").await.body.contains("/delete_printer/"));

    app.login_as("admin", true).await;
    assert!(app.get("/").await.body.contains("/delete_printer/"));
}

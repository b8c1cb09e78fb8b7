//! Printer listing and mutation handlers.
//!
//! Mutations never render directly: each outcome (including validation and
//! permission failures) becomes a flash message and a redirect to the listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::instrument;

use printers_core::{Permission, PrinterId, PrinterInput};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, push_flash, take_flashes};
use crate::models::{FlashMessage, Printer};
use crate::services::PrinterError;
use crate::services::auth::Principal;
use crate::state::AppState;

const HOME_MESSAGE: &str = "This is a simple printer management system that allows you to view \
    all the printers on-site. You can view the brand, model, location, IP address, MAC address, \
    manufacture date, and comments for each printer. You can also add a new printer, edit an \
    existing printer, or delete a printer if you have the correct access.";

pub const PRINTER_ADDED: &str = "Printer added successfully.";
pub const PRINTER_UPDATED: &str = "Printer updated successfully.";
pub const PRINTER_DELETED: &str = "Printer deleted successfully.";

/// Listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
    pub message: &'static str,
    pub username: String,
    pub can_delete: bool,
    pub printers: Vec<Printer>,
    pub messages: Vec<FlashMessage>,
}

/// Display every printer along with pending flash messages.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<IndexTemplate> {
    let printers = state.printer_service().list_printers().await?;
    let can_delete = state
        .identity()
        .has_permission(&user, Permission::DeletePrinter)
        .await?;
    let messages = take_flashes(&session).await?;

    Ok(IndexTemplate {
        title: "Home",
        message: HOME_MESSAGE,
        username: user.username.to_string(),
        can_delete,
        printers,
        messages,
    })
}

/// Create a printer from the submitted form.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add_printer(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(input): Form<PrinterInput>,
) -> Result<Redirect> {
    let outcome = state
        .printer_service()
        .create_printer(input)
        .await
        .map(|_| PRINTER_ADDED);
    flash_and_redirect(&session, outcome).await
}

/// Replace every field of an existing printer.
#[instrument(skip_all, fields(user_id = %user.id, printer_id = %raw_id))]
pub async fn update_printer(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(raw_id): Path<String>,
    Form(input): Form<PrinterInput>,
) -> Result<Redirect> {
    let outcome = match parse_printer_id(&raw_id) {
        Ok(id) => state
            .printer_service()
            .update_printer(id, input)
            .await
            .map(|_| PRINTER_UPDATED),
        Err(err) => Err(err),
    };
    flash_and_redirect(&session, outcome).await
}

/// Delete a printer if the user holds the delete permission.
#[instrument(skip_all, fields(user_id = %user.id, printer_id = %raw_id))]
pub async fn delete_printer(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(raw_id): Path<String>,
) -> Result<Redirect> {
    let outcome = match parse_printer_id(&raw_id) {
        Ok(id) => {
            state
                .printer_service()
                .delete_printer(id, &Principal::Authenticated(user))
                .await
        }
        // Permission is still checked first so the message matches a real id.
        Err(not_found) => {
            if state
                .identity()
                .has_permission(&user, Permission::DeletePrinter)
                .await?
            {
                Err(not_found)
            } else {
                Err(PrinterError::PermissionDenied)
            }
        }
    };

    if outcome.is_ok() {
        add_breadcrumb(
            "printers",
            "Deleted printer",
            Some(&[("printer_id", raw_id.as_str())]),
        );
    }
    flash_and_redirect(&session, outcome.map(|()| PRINTER_DELETED)).await
}

/// Ids that aren't integers name no printer.
fn parse_printer_id(raw: &str) -> std::result::Result<PrinterId, PrinterError> {
    raw.parse::<i32>()
        .map(PrinterId::new)
        .map_err(|_| PrinterError::NotFound(PrinterId::new(0)))
}

/// Record the outcome as a flash message and send the user back to the listing.
///
/// Infrastructure failures are returned as errors instead of flashed.
async fn flash_and_redirect(
    session: &Session,
    outcome: std::result::Result<&'static str, PrinterError>,
) -> Result<Redirect> {
    let flash = match outcome {
        Ok(text) => FlashMessage::success(text),
        Err(err) if err.is_client_error() => {
            tracing::info!(error = %err, "Printer request rejected");
            FlashMessage::error(err.to_string())
        }
        Err(err) => return Err(err.into()),
    };
    push_flash(session, flash).await?;
    Ok(Redirect::to("/"))
}

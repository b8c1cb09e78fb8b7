//! Printer create/read/update/delete operations.
//!
//! Composes a [`PrinterStore`] with the validation rules from
//! `printers_core::validation` and permission checks from an
//! [`IdentityProvider`].

use thiserror::Error;
use tracing::{info, instrument, warn};

use printers_core::validation::{
    parse_manufacture_date, validate_ip_address, validate_max_lengths, validate_required_fields,
};
use printers_core::{Permission, PrinterField, PrinterId, PrinterInput, ValidationError};

use crate::config::UpdateValidation;
use crate::db::{PrinterStore, RepositoryError};
use crate::models::Printer;
use crate::services::auth::{AuthError, IdentityProvider, Principal};

/// Errors from printer operations.
///
/// `Display` output of the client-side variants is shown to users as-is.
#[derive(Debug, Error)]
pub enum PrinterError {
    /// Submitted data was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No printer with this id.
    #[error("Printer not found.")]
    NotFound(PrinterId),

    /// The principal lacks the required permission.
    #[error("You do not have the required permissions to delete this printer.")]
    PermissionDenied,

    /// Storage failure.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Permission lookup failure.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

impl PrinterError {
    /// Whether this error is caused by the request rather than infrastructure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::PermissionDenied => true,
            Self::Repository(_) => false,
            Self::Auth(err) => err.is_client_error(),
        }
    }
}

/// Printer operations bound to a store and an identity provider.
pub struct PrinterService<'a> {
    store: &'a dyn PrinterStore,
    identity: &'a dyn IdentityProvider,
    update_validation: UpdateValidation,
}

impl<'a> PrinterService<'a> {
    /// Create a new printer service.
    #[must_use]
    pub const fn new(
        store: &'a dyn PrinterStore,
        identity: &'a dyn IdentityProvider,
        update_validation: UpdateValidation,
    ) -> Self {
        Self {
            store,
            identity,
            update_validation,
        }
    }

    /// All printers ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `PrinterError::Repository` if the store fails.
    pub async fn list_printers(&self) -> Result<Vec<Printer>, PrinterError> {
        Ok(self.store.list().await?)
    }

    /// A single printer.
    ///
    /// # Errors
    ///
    /// Returns `PrinterError::NotFound` if the id does not exist.
    pub async fn get_printer(&self, id: PrinterId) -> Result<Printer, PrinterError> {
        self.store.get(id).await?.ok_or(PrinterError::NotFound(id))
    }

    /// Validate and insert a new printer.
    ///
    /// Checks, in order: required fields, IP address, column lengths, then
    /// the manufacture date. Nothing is stored if any check fails.
    ///
    /// # Errors
    ///
    /// Returns `PrinterError::Validation` naming the first rejected field.
    #[instrument(skip(self, input))]
    pub async fn create_printer(&self, input: PrinterInput) -> Result<Printer, PrinterError> {
        let manufacture_date = validate_full(&input)?;
        let printer = self.store.insert(&input.into_data(manufacture_date)).await?;
        info!(printer_id = %printer.id, "Printer created");
        Ok(printer)
    }

    /// Overwrite every field of an existing printer.
    ///
    /// By default only the manufacture date is validated (plus column
    /// lengths); with [`UpdateValidation::Full`] the create checks apply too.
    ///
    /// # Errors
    ///
    /// Returns `PrinterError::NotFound` if the id does not exist.
    /// Returns `PrinterError::Validation` if the input is rejected.
    #[instrument(skip(self, input))]
    pub async fn update_printer(
        &self,
        id: PrinterId,
        input: PrinterInput,
    ) -> Result<Printer, PrinterError> {
        if self.store.get(id).await?.is_none() {
            return Err(PrinterError::NotFound(id));
        }

        let manufacture_date = match self.update_validation {
            UpdateValidation::Full => validate_full(&input)?,
            UpdateValidation::DateOnly => {
                let date = parse_manufacture_date(
                    input.get(PrinterField::ManufactureDate).unwrap_or_default(),
                )?;
                validate_max_lengths(&input)?;
                if let Err(skipped) = validate_create_only(&input) {
                    warn!(
                        printer_id = %id,
                        field = %skipped.field(),
                        reason = %skipped,
                        "Update accepted input that create would reject"
                    );
                }
                date
            }
        };

        let printer = self
            .store
            .update(id, &input.into_data(manufacture_date))
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => PrinterError::NotFound(id),
                other => PrinterError::Repository(other),
            })?;

        info!(printer_id = %printer.id, "Printer updated");
        Ok(printer)
    }

    /// Permanently remove a printer.
    ///
    /// The permission check happens before the existence check, so a
    /// principal without permission learns nothing about the id.
    ///
    /// # Errors
    ///
    /// Returns `PrinterError::PermissionDenied` unless the principal holds
    /// `printers.delete_printer`.
    /// Returns `PrinterError::NotFound` if the id does not exist.
    #[instrument(skip(self, principal))]
    pub async fn delete_printer(
        &self,
        id: PrinterId,
        principal: &Principal,
    ) -> Result<(), PrinterError> {
        let allowed = match principal.user() {
            Some(user) => {
                self.identity
                    .has_permission(user, Permission::DeletePrinter)
                    .await?
            }
            None => false,
        };
        if !allowed {
            warn!(printer_id = %id, "Delete refused: missing permission");
            return Err(PrinterError::PermissionDenied);
        }

        if !self.store.delete(id).await? {
            return Err(PrinterError::NotFound(id));
        }

        info!(printer_id = %id, "Printer deleted");
        Ok(())
    }
}

/// Create-path checks on everything except the date.
fn validate_create_only(input: &PrinterInput) -> Result<(), ValidationError> {
    validate_required_fields(input, &PrinterField::REQUIRED)?;
    validate_ip_address(input.get(PrinterField::IpAddress).unwrap_or_default())?;
    Ok(())
}

/// Every create-path check, returning the parsed date.
fn validate_full(input: &PrinterInput) -> Result<chrono::NaiveDate, ValidationError> {
    validate_create_only(input)?;
    validate_max_lengths(input)?;
    parse_manufacture_date(input.get(PrinterField::ManufactureDate).unwrap_or_default())
}

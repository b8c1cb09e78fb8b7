//! Printer domain type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use printers_core::{PrinterData, PrinterId};

/// A stored printer record.
///
/// Records are plain values; every change goes through a `PrinterStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printer {
    pub id: PrinterId,
    pub brand: String,
    pub model: String,
    pub location: String,
    pub ip_address: String,
    pub mac_address: String,
    pub manufacture_date: NaiveDate,
    pub comments: Option<String>,
}

impl Printer {
    /// Build a record from an id and its column data.
    #[must_use]
    pub fn from_data(id: PrinterId, data: PrinterData) -> Self {
        Self {
            id,
            brand: data.brand,
            model: data.model,
            location: data.location,
            ip_address: data.ip_address,
            mac_address: data.mac_address,
            manufacture_date: data.manufacture_date,
            comments: data.comments,
        }
    }

    /// Manufacture date as `YYYY-MM-DD`.
    #[must_use]
    pub fn manufacture_date_display(&self) -> String {
        self.manufacture_date.format("%Y-%m-%d").to_string()
    }

    /// Comments, or an empty string when absent.
    #[must_use]
    pub fn comments_display(&self) -> &str {
        self.comments.as_deref().unwrap_or_default()
    }
}

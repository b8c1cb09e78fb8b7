//! Printer field names and the data carried by printer forms.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named field of a printer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrinterField {
    Brand,
    Model,
    Location,
    IpAddress,
    MacAddress,
    ManufactureDate,
    Comments,
}

impl PrinterField {
    /// Fields that must be present and non-blank when a printer is created.
    pub const REQUIRED: [Self; 6] = [
        Self::Brand,
        Self::Model,
        Self::Location,
        Self::IpAddress,
        Self::MacAddress,
        Self::ManufactureDate,
    ];

    /// The form/column name of this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Location => "location",
            Self::IpAddress => "ip_address",
            Self::MacAddress => "mac_address",
            Self::ManufactureDate => "manufacture_date",
            Self::Comments => "comments",
        }
    }

    /// Column width of this field, if bounded.
    #[must_use]
    pub const fn max_length(self) -> Option<usize> {
        match self {
            Self::Brand | Self::Model => Some(100),
            Self::Location => Some(255),
            Self::IpAddress => Some(45),
            Self::MacAddress => Some(17),
            Self::ManufactureDate | Self::Comments => None,
        }
    }
}

impl fmt::Display for PrinterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw printer data as submitted by a form, before validation.
///
/// Every field is optional so that absent and blank values can be reported
/// the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterInput {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub location: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub manufacture_date: Option<String>,
    pub comments: Option<String>,
}

impl PrinterInput {
    /// Look up the raw value of a field.
    #[must_use]
    pub fn get(&self, field: PrinterField) -> Option<&str> {
        let value = match field {
            PrinterField::Brand => &self.brand,
            PrinterField::Model => &self.model,
            PrinterField::Location => &self.location,
            PrinterField::IpAddress => &self.ip_address,
            PrinterField::MacAddress => &self.mac_address,
            PrinterField::ManufactureDate => &self.manufacture_date,
            PrinterField::Comments => &self.comments,
        };
        value.as_deref()
    }

    /// Assemble storable data from this input and an already-parsed date.
    ///
    /// Absent text fields become empty strings; blank comments become `None`.
    #[must_use]
    pub fn into_data(self, manufacture_date: NaiveDate) -> PrinterData {
        PrinterData {
            brand: self.brand.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            ip_address: self.ip_address.unwrap_or_default(),
            mac_address: self.mac_address.unwrap_or_default(),
            manufacture_date,
            comments: self.comments.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Printer data ready to be written to the store.
///
/// This is every column of a printer record except the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterData {
    pub brand: String,
    pub model: String,
    pub location: String,
    pub ip_address: String,
    pub mac_address: String,
    pub manufacture_date: NaiveDate,
    pub comments: Option<String>,
}

impl PrinterData {
    /// Placeholder values used when a record is created programmatically
    /// without user-supplied data (e.g. seeding a development database).
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            brand: "Brand".to_owned(),
            model: "Model".to_owned(),
            location: "Location".to_owned(),
            ip_address: "0.0.0.0".to_owned(),
            mac_address: "00:00:00:00:00:00".to_owned(),
            manufacture_date: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default(),
            comments: Some("Comments".to_owned()),
        }
    }
}

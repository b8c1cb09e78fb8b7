//! Printer repository for database operations.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use printers_core::{PrinterData, PrinterId};

use super::RepositoryError;
use crate::models::Printer;

/// Storage for printer records.
///
/// Implemented by [`PgPrinterStore`] for production and by
/// [`MemoryPrinterStore`](super::MemoryPrinterStore) for tests and local runs.
#[async_trait]
pub trait PrinterStore: Send + Sync {
    /// All records ordered by id ascending.
    async fn list(&self) -> Result<Vec<Printer>, RepositoryError>;

    /// A single record, if it exists.
    async fn get(&self, id: PrinterId) -> Result<Option<Printer>, RepositoryError>;

    /// Insert a new record and return it with its assigned id.
    async fn insert(&self, data: &PrinterData) -> Result<Printer, RepositoryError>;

    /// Overwrite every column of an existing record.
    ///
    /// Returns `RepositoryError::NotFound` if the id does not exist.
    async fn update(&self, id: PrinterId, data: &PrinterData) -> Result<Printer, RepositoryError>;

    /// Remove a record. Returns `false` if it did not exist.
    async fn delete(&self, id: PrinterId) -> Result<bool, RepositoryError>;

    /// Number of stored records.
    async fn count(&self) -> Result<i64, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct PrinterRow {
    id: i32,
    brand: String,
    model: String,
    location: String,
    ip_address: String,
    mac_address: String,
    manufacture_date: NaiveDate,
    comments: Option<String>,
}

impl From<PrinterRow> for Printer {
    fn from(row: PrinterRow) -> Self {
        Self {
            id: PrinterId::new(row.id),
            brand: row.brand,
            model: row.model,
            location: row.location,
            ip_address: row.ip_address,
            mac_address: row.mac_address,
            manufacture_date: row.manufacture_date,
            comments: row.comments,
        }
    }
}

const PRINTER_COLUMNS: &str =
    "id, brand, model, location, ip_address, mac_address, manufacture_date, comments";

/// Repository for printer database operations.
pub struct PrinterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PrinterRepository<'a> {
    /// Create a new printer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all printers ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Printer>, RepositoryError> {
        let rows = sqlx::query_as::<_, PrinterRow>(&format!(
            "SELECT {PRINTER_COLUMNS} FROM printer ORDER BY id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Printer::from).collect())
    }

    /// Get a printer by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PrinterId) -> Result<Option<Printer>, RepositoryError> {
        let row = sqlx::query_as::<_, PrinterRow>(&format!(
            "SELECT {PRINTER_COLUMNS} FROM printer WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Printer::from))
    }

    /// Insert a printer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, data: &PrinterData) -> Result<Printer, RepositoryError> {
        let row = sqlx::query_as::<_, PrinterRow>(&format!(
            r"
            INSERT INTO printer
                (brand, model, location, ip_address, mac_address, manufacture_date, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRINTER_COLUMNS}
            "
        ))
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.location)
        .bind(&data.ip_address)
        .bind(&data.mac_address)
        .bind(data.manufacture_date)
        .bind(data.comments.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Overwrite all columns of a printer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the printer doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: PrinterId,
        data: &PrinterData,
    ) -> Result<Printer, RepositoryError> {
        let row = sqlx::query_as::<_, PrinterRow>(&format!(
            r"
            UPDATE printer
            SET brand = $2, model = $3, location = $4, ip_address = $5,
                mac_address = $6, manufacture_date = $7, comments = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRINTER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.location)
        .bind(&data.ip_address)
        .bind(&data.mac_address)
        .bind(data.manufacture_date)
        .bind(data.comments.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(Printer::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a printer.
    ///
    /// # Returns
    ///
    /// Returns `true` if the printer was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PrinterId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM printer WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count printers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM printer")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// `PostgreSQL`-backed [`PrinterStore`].
#[derive(Clone)]
pub struct PgPrinterStore {
    pool: PgPool,
}

impl PgPrinterStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> PrinterRepository<'_> {
        PrinterRepository::new(&self.pool)
    }
}

#[async_trait]
impl PrinterStore for PgPrinterStore {
    async fn list(&self) -> Result<Vec<Printer>, RepositoryError> {
        self.repo().list().await
    }

    async fn get(&self, id: PrinterId) -> Result<Option<Printer>, RepositoryError> {
        self.repo().get_by_id(id).await
    }

    async fn insert(&self, data: &PrinterData) -> Result<Printer, RepositoryError> {
        self.repo().create(data).await
    }

    async fn update(&self, id: PrinterId, data: &PrinterData) -> Result<Printer, RepositoryError> {
        self.repo().update(id, data).await
    }

    async fn delete(&self, id: PrinterId) -> Result<bool, RepositoryError> {
        self.repo().delete(id).await
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        self.repo().count().await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn test_pool() -> PgPool {
        let url = std::env::var("PRINTERS_DATABASE_URL").unwrap();
        let pool = PgPool::connect(&url).await.unwrap();
        crate::db::MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    #[ignore = "requires PRINTERS_DATABASE_URL"]
    async fn test_create_update_delete_round() {
        let pool = test_pool().await;
        let repo = PrinterRepository::new(&pool);

        let created = repo.create(&PrinterData::placeholder()).await.unwrap();
        assert_eq!(created.brand, "Brand");

        let mut data = PrinterData::placeholder();
        data.location = "Room 2".to_owned();
        let updated = repo.update(created.id, &data).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.location, "Room 2");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires PRINTERS_DATABASE_URL"]
    async fn test_update_missing_printer() {
        let pool = test_pool().await;
        let repo = PrinterRepository::new(&pool);

        let result = repo
            .update(PrinterId::new(i32::MAX), &PrinterData::placeholder())
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}

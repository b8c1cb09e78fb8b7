//! Seed the database with placeholder printers.

use tracing::info;

use printers_core::PrinterData;
use printers_web::db::PrinterRepository;

use super::connect;

/// Insert `count` placeholder printers.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn printers(count: u32) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let repo = PrinterRepository::new(&pool);
    let data = PrinterData::placeholder();

    for _ in 0..count {
        let printer = repo.create(&data).await?;
        info!(printer_id = %printer.id, "Inserted placeholder printer");
    }

    info!(count, total = repo.count().await?, "Seeding complete!");
    Ok(())
}

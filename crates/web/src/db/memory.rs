//! In-memory printer store for tests and database-less local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use printers_core::{PrinterData, PrinterId};

use super::{PrinterStore, RepositoryError};
use crate::models::Printer;

#[derive(Default)]
struct Inner {
    next_id: i32,
    printers: BTreeMap<i32, Printer>,
}

/// [`PrinterStore`] backed by a `BTreeMap`, so iteration is in id order.
#[derive(Default)]
pub struct MemoryPrinterStore {
    inner: RwLock<Inner>,
}

impl MemoryPrinterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrinterStore for MemoryPrinterStore {
    async fn list(&self) -> Result<Vec<Printer>, RepositoryError> {
        Ok(self.inner.read().await.printers.values().cloned().collect())
    }

    async fn get(&self, id: PrinterId) -> Result<Option<Printer>, RepositoryError> {
        Ok(self.inner.read().await.printers.get(&id.as_i32()).cloned())
    }

    async fn insert(&self, data: &PrinterData) -> Result<Printer, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        let printer = Printer::from_data(PrinterId::new(id), data.clone());
        inner.printers.insert(id, printer.clone());
        Ok(printer)
    }

    async fn update(&self, id: PrinterId, data: &PrinterData) -> Result<Printer, RepositoryError> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .printers
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;
        *slot = Printer::from_data(id, data.clone());
        Ok(slot.clone())
    }

    async fn delete(&self, id: PrinterId) -> Result<bool, RepositoryError> {
        Ok(self
            .inner
            .write()
            .await
            .printers
            .remove(&id.as_i32())
            .is_some())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let len = self.inner.read().await.printers.len();
        i64::try_from(len).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_sequential_and_never_reused() {
        let store = MemoryPrinterStore::new();
        let first = store.insert(&PrinterData::placeholder()).await.unwrap();
        let second = store.insert(&PrinterData::placeholder()).await.unwrap();
        assert_eq!(first.id, PrinterId::new(1));
        assert_eq!(second.id, PrinterId::new(2));

        assert!(store.delete(second.id).await.unwrap());
        let third = store.insert(&PrinterData::placeholder()).await.unwrap();
        assert_eq!(third.id, PrinterId::new(3));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let store = MemoryPrinterStore::new();
        for _ in 0..3 {
            store.insert(&PrinterData::placeholder()).await.unwrap();
        }
        let ids: Vec<i32> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.as_i32())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryPrinterStore::new();
        let result = store
            .update(PrinterId::new(9), &PrinterData::placeholder())
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}

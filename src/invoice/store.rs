//! Invoice lookup.

use super::Invoice;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid invoice export: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Look up an invoice by id. `Ok(None)` when it does not exist.
    async fn find(&self, id: i64) -> Result<Option<Invoice>, StoreError>;
}

/// Invoices exported by the accounting application as a JSON array.
#[derive(Debug, Default)]
pub struct JsonInvoiceStore {
    invoices: HashMap<i64, Invoice>,
}

impl JsonInvoiceStore {
    /// Load an export file. Later entries win on duplicate ids.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let invoices: Vec<Invoice> = serde_json::from_str(&content)?;
        Ok(Self::from_invoices(invoices))
    }

    pub fn from_invoices(invoices: impl IntoIterator<Item = Invoice>) -> Self {
        Self {
            invoices: invoices.into_iter().map(|inv| (inv.id, inv)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}

#[async_trait]
impl InvoiceStore for JsonInvoiceStore {
    async fn find(&self, id: i64) -> Result<Option<Invoice>, StoreError> {
        Ok(self.invoices.get(&id).cloned())
    }
}

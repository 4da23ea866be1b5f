// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Solution-category lookup cache.

use fw_adapters::{Backend, BackendError};
use fw_core::SessionContext;
use tokio::sync::OnceCell;

/// Read-only enumerated list fetched once and cached for the session.
///
/// Used purely as the completion guard's valid-value set. A failed fetch is
/// not cached; the next access retries.
#[derive(Default)]
pub struct SolutionCategories {
    cell: OnceCell<Vec<String>>,
}

impl SolutionCategories {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached list, fetching it on first access.
    pub async fn get_or_fetch(
        &self,
        backend: &dyn Backend,
        ctx: &SessionContext,
    ) -> Result<&[String], BackendError> {
        let list = self
            .cell
            .get_or_try_init(|| async {
                let list = backend.solution_categories(ctx).await?;
                tracing::info!(count = list.len(), "solution categories fetched");
                Ok::<_, BackendError>(list)
            })
            .await?;
        Ok(list.as_slice())
    }

    /// The cached list without fetching; `None` before the first successful
    /// fetch.
    pub fn cached(&self) -> Option<&[String]> {
        self.cell.get().map(Vec::as_slice)
    }

    /// Seed the cache directly (tests, offline snapshots).
    pub fn seed(&self, categories: Vec<String>) {
        let _ = self.cell.set(categories);
    }
}

#[cfg(test)]
#[path = "categories_tests.rs"]
mod tests;

use crate::json_to_item;
use dimjoin_store::ItemStore;
use serde_json::Value;
use tracing::{error, info};

/// Outcome of a bulk load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: usize,
}

/// Writes every JSON object in `records` to `table`. A record that cannot be
/// converted or written is logged and skipped; the rest are still loaded.
pub async fn load_items(store: &dyn ItemStore, table: &str, records: &[Value]) -> LoadSummary {
    let mut summary = LoadSummary::default();

    for (index, record) in records.iter().enumerate() {
        let result = match json_to_item(record) {
            Ok(item) => store.put_item(table, item).await.map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                summary.loaded += 1;
                info!("Loaded record {} into {}", index, table);
            }
            Err(e) => {
                summary.failed += 1;
                error!("Error loading record {} into {}: {:#}", index, table, e);
            }
        }
    }

    info!(
        "Load into {} finished: {} loaded, {} failed",
        table, summary.loaded, summary.failed
    );
    summary
}

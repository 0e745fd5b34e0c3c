//! Load-once table store.
//!
//! The binary calls [`init`] explicitly at startup; everything afterwards
//! shares the same immutable table through an `Arc`. Once installed the table
//! is never replaced for the life of the process.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::domain::ObservationTable;
use crate::error::DataError;
use crate::io::ingest::load_table;

static TABLE: OnceLock<Arc<ObservationTable>> = OnceLock::new();

/// Load the CSV at `path` and install it as the shared table.
///
/// If a table is already installed it is returned as-is and `path` is not
/// read.
pub fn init(path: &Path) -> Result<Arc<ObservationTable>, DataError> {
    if let Some(table) = TABLE.get() {
        tracing::debug!(path = %path.display(), "table already loaded; skipping reload");
        return Ok(Arc::clone(table));
    }
    let table = load_table(path)?;
    Ok(install(table))
}

/// Install an already-built table. Returns whichever table ends up shared.
fn install(table: ObservationTable) -> Arc<ObservationTable> {
    Arc::clone(TABLE.get_or_init(|| Arc::new(table)))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // One test owns the global: the store is process-wide by construction.
    #[test]
    fn first_load_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "date,production,price_all,price_residential,price_commercial,price_industrial"
        )
        .unwrap();
        writeln!(file, "2020-01-01,10,5,6,4,3").unwrap();

        let first = init(file.path()).unwrap();
        assert_eq!(first.len(), 1);

        // A second init does not touch the filesystem.
        let again = init(Path::new("/no/such/file.csv")).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let installed = install(ObservationTable::default());
        assert!(Arc::ptr_eq(&first, &installed));
    }
}

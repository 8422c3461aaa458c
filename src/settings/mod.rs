pub mod record;
pub mod store;

pub use record::SettingsRecord;
pub use store::{FileOptionStore, MemoryOptionStore, OptionStore, OptionUpdate, StoreError};

use std::sync::Arc;
use tracing::{debug, info};

/// Option name the settings record is stored under
pub const OPTION_NAME: &str = "cmnotifier_data";

/// Prefix carried by every settings field in a submitted form
pub const FIELD_PREFIX: &str = "cm_";

/// Read and merge-write access to the settings record
pub struct SettingsStore {
    options: Arc<dyn OptionStore>,
}

impl SettingsStore {
    pub fn new(options: Arc<dyn OptionStore>) -> Self {
        Self { options }
    }

    /// Current record, or an empty one if nothing was ever saved.
    pub async fn read(&self) -> Result<SettingsRecord, StoreError> {
        match self.options.get(OPTION_NAME).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(SettingsRecord::default()),
        }
    }

    /// Merge submitted `cm_`-prefixed fields into the stored record and
    /// persist the result as a single replace.
    ///
    /// The merge runs inside the store's update, so concurrent writers
    /// (including other processes sharing a file store) never drop each
    /// other's fields.
    pub async fn write<I, K, V>(&self, fields: I) -> Result<SettingsRecord, StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields: Vec<(String, String)> = fields
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let merge: OptionUpdate = Box::new(move |current| {
            let mut record: SettingsRecord = match current {
                Some(value) => serde_json::from_value(value)?,
                None => SettingsRecord::default(),
            };
            let applied = merge_submission(&mut record, fields);
            debug!(fields = applied, "Merged settings submission");
            Ok(serde_json::to_value(&record)?)
        });

        let stored = self.options.update(OPTION_NAME, merge).await?;
        let record = serde_json::from_value(stored)?;

        info!("Settings saved");
        Ok(record)
    }
}

/// Apply submitted fields to `record`; returns how many were applied.
///
/// Fields without the prefix and empty values are skipped, so a stored
/// value can be replaced but never cleared.
pub fn merge_submission<I, K, V>(record: &mut SettingsRecord, fields: I) -> usize
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut applied = 0;
    for (field, value) in fields {
        let (field, value) = (field.as_ref(), value.as_ref());

        let Some(name) = field.strip_prefix(FIELD_PREFIX) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        if record.set(name, value) {
            applied += 1;
        } else {
            debug!("Ignoring unknown settings field '{}'", field);
        }
    }
    applied
}

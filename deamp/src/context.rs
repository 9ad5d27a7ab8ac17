//! Data that are persisted to the storage with version control.

use serde::{Deserialize, Serialize};

use crate::allowlist::{ActivationStats, Allowlist};
use crate::interop::storage;
use crate::util::errors::CustomError;

/// Storage keys for the persisted records.
pub(crate) mod keys {
    pub const VERSION: &str = "version";
    pub const ALLOWLIST: &str = "allowlist";
    pub const STATS: &str = "stats";
    pub const HANDLED_NEWS: &str = "handledNews";
}

/// Versioning of [GlobalContext] for detecting incompatible stored
/// data. The versioning scheme is to be decided in the next release.
#[derive(Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Version {
    pub version: (i16, i16, i16),
}

pub const CURRENT_VERSION: Version = Version { version: (0, 1, 0) };

/// Store-backed state shared by all privileged message handlers.
#[derive(Default, Deserialize, Serialize)]
pub struct GlobalContext {
    #[serde(default)]
    pub allowlist: Allowlist,
    #[serde(default)]
    pub stats: ActivationStats,
}

impl GlobalContext {
    /// Populates a context after checking the version for compatibility.
    /// A never-written store is initialized in place.
    /// Fails with [CustomError::UnsupportedVersion]
    /// or if the browser indicates so.
    pub async fn from_storage() -> Result<Self, CustomError> {
        match storage::get_single_entry::<Version>(keys::VERSION).await? {
            None => {
                let context = GlobalContext::default();
                storage::store_single_entry(keys::ALLOWLIST, &context.allowlist).await?;
                storage::store_single_entry(keys::STATS, &context.stats).await?;
                storage::store_single_entry(keys::VERSION, &CURRENT_VERSION).await?;
                Ok(context)
            }
            Some(version) if version != CURRENT_VERSION => {
                Err(CustomError::UnsupportedVersion)
            }
            Some(_) => Ok(Self {
                allowlist: storage::get_single_entry(keys::ALLOWLIST)
                    .await?
                    .unwrap_or_default(),
                stats: storage::get_single_entry(keys::STATS)
                    .await?
                    .unwrap_or_default(),
            }),
        }
    }
}

//! Request/response contract between the page script, the pop-up,
//! and the preference store.

use std::ops::DerefMut;

use serde::{Deserialize, Serialize};

use crate::allowlist::{Allowlist, WebsiteInfo};
use crate::context::{GlobalContext, keys};
use crate::domain::Hostname;
use crate::interop::storage;
use crate::util::errors::CustomError;

/// Request half of the store contract.
/// The page script serializes these, the privileged side deserializes;
/// an unknown type is a contract mismatch and asserted at the boundary.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Message {
    GetAllowlist,
    AddToAllowlist { item: String },
    RemoveFromAllowlist { item: String },
    IncrementHostname { item: String },
    FetchWebsiteInfo { item: String },
}

/// Response half of the store contract.
#[derive(Serialize)]
#[serde(untagged)]
pub enum Response {
    Allowlist(Allowlist),
    Acknowledgement(String),
    WebsiteInfo(WebsiteInfo),
}

impl Message {
    /// Performs the store operation and persists whatever changed.
    /// Fails if the browser indicates so.
    pub async fn act(
        self,
        global_context: &mut impl DerefMut<Target = GlobalContext>,
    ) -> Result<Response, CustomError> {
        use Message::*;
        match self {
            GetAllowlist => Ok(Response::Allowlist(global_context.allowlist.clone())),

            AddToAllowlist { item } => {
                let hostname = Hostname::try_from(&*item)?;
                if global_context.allowlist.insert(hostname) {
                    storage::store_single_entry(keys::ALLOWLIST, &global_context.allowlist)
                        .await?;
                }
                Ok(Response::Acknowledgement(format!(
                    "added `{item}` to the allowlist"
                )))
            }

            RemoveFromAllowlist { item } => {
                let hostname = Hostname::try_from(&*item)?;
                if global_context.allowlist.remove(&hostname) {
                    storage::store_single_entry(keys::ALLOWLIST, &global_context.allowlist)
                        .await?;
                }
                Ok(Response::Acknowledgement(format!(
                    "removed `{item}` from the allowlist"
                )))
            }

            IncrementHostname { item } => {
                global_context.stats.increment(&item);
                storage::store_single_entry(keys::STATS, &global_context.stats).await?;
                Ok(Response::Acknowledgement(format!(
                    "recorded an activation for `{item}`"
                )))
            }

            FetchWebsiteInfo { item } => {
                let hostname = Hostname::try_from(&*item)?;
                Ok(Response::WebsiteInfo(WebsiteInfo {
                    total_activations: global_context.stats.count(&item),
                    is_on_allowlist: global_context.allowlist.contains(&hostname),
                    hostname: item,
                }))
            }
        }
    }
}

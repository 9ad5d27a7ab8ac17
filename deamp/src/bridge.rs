//! Page-side client of the preference store.
//!
//! Interception must keep working when the store is unreachable, so
//! every call here degrades instead of propagating: a missing allowlist
//! reads as empty, and counting is fire-and-forget.

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::console;

use crate::allowlist::Allowlist;
use crate::context::keys;
use crate::interop::{self, storage};
use crate::message::Message;
use crate::pipeline::{HandledMarker, MarkerStore, ReportStats};
use crate::util::errors::CustomError;

/// Fetches the allowlist, once per document load.
/// A store failure degrades to an empty allowlist: interception keeps
/// working while the user's exemptions briefly may not apply.
pub async fn fetch_allowlist() -> Allowlist {
    match request_allowlist().await {
        Ok(allowlist) => allowlist,
        Err(error) => {
            console::warn_1(&JsValue::from_str(&format!(
                "allowlist unavailable, continuing without exemptions: {error}"
            )));
            Allowlist::default()
        }
    }
}

async fn request_allowlist() -> Result<Allowlist, CustomError> {
    let request = serde_wasm_bindgen::to_value(&Message::GetAllowlist)
        .expect("serialization fail unlikely");
    let reply = interop::send_message(request, "getAllowlist").await?;
    interop::cast_or_standard_mismatch(interop::get_or_standard_mismatch(
        &reply, "response",
    )?)
}

/// Activation counting over the runtime messaging channel.
/// The increment is spawned off the navigation path and failures are
/// logged, never surfaced.
#[derive(Clone, Copy, Default)]
pub struct StatReporter;

impl ReportStats for StatReporter {
    fn report_activation(&self, hostname: &str) {
        let request = serde_wasm_bindgen::to_value(&Message::IncrementHostname {
            item: String::from(hostname),
        })
        .expect("serialization fail unlikely");
        spawn_local(async move {
            if let Err(error) =
                interop::send_message(request, "incrementHostname").await
            {
                console::warn_1(&JsValue::from_str(&error.to_string()));
            }
        });
    }
}

/// Marker persistence over the extension's local storage area, which
/// the page script reaches without the privileged relay.
#[derive(Clone, Copy, Default)]
pub struct LocalMarkerStore;

impl MarkerStore for LocalMarkerStore {
    async fn handled_marker(&self) -> Result<Option<HandledMarker>, CustomError> {
        storage::get_single_entry(keys::HANDLED_NEWS).await
    }

    async fn set_handled_marker(&self, marker: &HandledMarker) -> Result<(), CustomError> {
        storage::store_single_entry(keys::HANDLED_NEWS, marker).await
    }
}

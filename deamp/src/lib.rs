pub mod allowlist;
pub mod bridge;
pub mod classify;
pub mod context;
pub mod domain;
pub mod interop;
pub mod message;
pub mod pipeline;
pub mod redirect;
pub mod util;
pub mod watch;

use std::panic;

use async_std::sync::Mutex;
use once_cell::sync::Lazy;
use wasm_bindgen::prelude::*;

use crate::context::GlobalContext;
use crate::message::Message;

static GLOBAL_CONTEXT: Lazy<Mutex<GlobalContext>> = Lazy::new(||
    Mutex::new(GlobalContext::default()));

/// Privileged entry point, called by the background script at startup.
#[wasm_bindgen(js_name="startBackground")]
pub async fn start_background() -> Result<(), JsError> {
    panic::set_hook(Box::new(console_error_panic_hook::hook));
    let mut global_context = GLOBAL_CONTEXT.lock().await;
    *global_context = GlobalContext::from_storage().await
        .map_err(|error| JsError::new(&error.to_string()))?;
    Ok(())
}

/// Handles one request from the page script or the pop-up.
#[wasm_bindgen(js_name="onMessage")]
pub async fn on_message(message: JsValue) -> Result<JsValue, JsError> {
    let message = serde_wasm_bindgen::from_value::<Message>(message)
        .expect("unexpected message format");
    let response = message.act(&mut GLOBAL_CONTEXT.lock().await).await
        .map_err(|error| JsError::new(&error.to_string()))?;
    serde_wasm_bindgen::to_value(&response)
        .map_err(|error| JsError::new(&error.to_string()))
}

/// Page entry point, called by the content script on every document
/// load.
#[wasm_bindgen(js_name="startContentScript")]
pub async fn start_content_script() -> Result<(), JsError> {
    panic::set_hook(Box::new(console_error_panic_hook::hook));
    watch::boot().await.map_err(|error| JsError::new(&error.to_string()))
}

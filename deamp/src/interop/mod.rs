pub mod storage;

use js_sys::{JsString, Promise, Reflect};
use serde::de::DeserializeOwned;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::util::errors::CustomError;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace=["browser", "runtime"], js_name="sendMessage")]
    fn runtime_send_message(message: JsValue) -> Promise;
}

/// Sends a runtime message and resolves to the raw reply.
pub async fn send_message(message: JsValue, message_type: &str)
-> Result<JsValue, CustomError> {
    JsFuture::from(runtime_send_message(message)).await
        .or(Err(CustomError::FailedMessageDelivery {
            message_type: String::from(message_type)
        }))
}

pub fn get_or_standard_mismatch(target: &JsValue, key: &str)
-> Result<JsValue, CustomError> {
    Reflect::get(target, &JsString::from(key))
        .or(Err(CustomError::StandardMismatch {
        message: format!("key `{}` is missing", key)
    }))
}

pub fn cast_or_standard_mismatch<T>(value: JsValue) -> Result<T, CustomError>
where T: DeserializeOwned {
    serde_wasm_bindgen::from_value(value)
        .or(Err(CustomError::StandardMismatch {
            message: String::from("value has an unexpected shape")
        }))
}

pub(crate) const MAP_SERIALIZER: &Serializer = &Serializer::new()
    .serialize_maps_as_objects(true);

use js_sys::{Object, Promise, Reflect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::interop::{self, MAP_SERIALIZER};
use crate::util::errors::CustomError;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace=["browser", "storage", "local"], js_name="get")]
    fn storage_get(keys: JsValue) -> Promise;
    #[wasm_bindgen(js_namespace=["browser", "storage", "local"], js_name="set")]
    fn storage_set(keys: JsValue) -> Promise;
}

/// Reads one entry, `None` if the key was never written.
pub async fn get_single_entry<T>(key: &str) -> Result<Option<T>, CustomError>
where T: DeserializeOwned {
    let entries = JsFuture::from(storage_get(JsValue::from_str(key))).await
        .or(Err(CustomError::FailedStorageOperation {
            verb_prep: String::from("read from")
        }))?;
    let value = interop::get_or_standard_mismatch(&entries, key)?;
    if value.is_undefined() {
        return Ok(None);
    }
    interop::cast_or_standard_mismatch(value).map(Some)
}

/// Stores one entry under `key`, overwriting any previous value.
pub async fn store_single_entry<T>(key: &str, value: &T)
-> Result<(), CustomError>
where T: Serialize + ?Sized {
    let entries = Object::new();
    let value = value.serialize(MAP_SERIALIZER)
        .expect("serialization fail unlikely");
    Reflect::set(&entries, &JsValue::from_str(key), &value)
        .expect("constructed object is writable");
    JsFuture::from(storage_set(JsValue::from(entries))).await
        .or(Err(CustomError::FailedStorageOperation {
            verb_prep: String::from("store to")
        }))?;
    Ok(())
}

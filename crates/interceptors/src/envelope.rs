//! The one success shape and the one failure shape every route emits.

use fintrack_errors::prelude::ErrorObj;
use serde_json::{json, Value};

pub fn success(data: Value, request_id: &str) -> Value {
    json!({
        "success": true,
        "data": data,
        "meta": { "request_id": request_id },
    })
}

pub fn failure(err: &ErrorObj, debug: bool) -> Value {
    let view = err.to_public(debug);
    let mut body = json!({
        "success": false,
        "message": view.message,
    });
    if let Some(errors) = view.errors {
        if let Value::Object(map) = &mut body {
            map.insert("errors".to_string(), json!(errors));
        }
    }
    body
}

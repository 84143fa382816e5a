use crate::utils::error::{AdsError, Result};
use serde_json::{Map, Value};

// JSON 安全整數上限，超過的整數改用十進位字串表示
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

// 巢狀深度上限，超過視為該列序列化失敗
const MAX_DEPTH: usize = 64;

pub fn serialize_value(value: &Value) -> Result<Value> {
    serialize_at_depth(value, 0)
}

fn serialize_at_depth(value: &Value, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(AdsError::ProcessingError {
            message: format!("value nested deeper than {} levels", MAX_DEPTH),
        });
    }

    match value {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i.unsigned_abs() > MAX_SAFE_INTEGER {
                    return Ok(Value::String(i.to_string()));
                }
            } else if let Some(u) = n.as_u64() {
                if u > MAX_SAFE_INTEGER {
                    return Ok(Value::String(u.to_string()));
                }
            }
            Ok(Value::Number(n.clone()))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(serialize_at_depth(item, depth + 1)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            // 帶 name 欄位的物件視為枚舉值，收斂成符號名稱
            if let Some(name) = map.get("name") {
                return serialize_at_depth(name, depth + 1);
            }

            let mut out = Map::new();
            for (key, val) in map {
                // 底線開頭的欄位是內部欄位，直接略過
                if key.starts_with('_') {
                    continue;
                }
                out.insert(key.clone(), serialize_at_depth(val, depth + 1)?);
            }
            Ok(Value::Object(out))
        }
    }
}

// 單列失敗以佔位列取代，絕不讓整批回應失敗
pub fn serialize_row(row: &Value) -> Value {
    match serialize_value(row) {
        Ok(serialized) => serialized,
        Err(e) => {
            tracing::error!("Error serializing GAQL row: {}", e);
            let mut placeholder = Map::new();
            placeholder.insert(
                "_error".to_string(),
                Value::String("Serialization failed".to_string()),
            );
            placeholder.insert("_raw".to_string(), Value::String(row.to_string()));
            Value::Object(placeholder)
        }
    }
}

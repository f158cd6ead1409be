use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Deserializes a config map, accepting `null` as an empty map and coercing
/// scalar values (numbers, booleans) into strings, since that's how LXD keeps
/// them anyway.
pub fn config_map<'de, D>(d: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<BTreeMap<String, Value>> = Option::deserialize(d)?;

    map.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(value) => value,
                Value::Number(value) => value.to_string(),
                Value::Bool(value) => value.to_string(),
                Value::Null => String::default(),

                value => {
                    return Err(D::Error::custom(format!(
                        "config `{}` must be a string, got: {}",
                        key, value
                    )));
                }
            };

            Ok((key, value))
        })
        .collect()
}

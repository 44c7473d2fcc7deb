//! On-disk storage layout.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Everything persisted in the store file.
///
/// Missing or `null` fields load as empty containers, so files written by
/// older versions (or edited by hand) never leave a container unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageData {
    pub counter: i64,

    #[serde(rename = "example_data", deserialize_with = "null_as_default")]
    pub data: serde_json::Map<String, serde_json::Value>,

    /// alias -> command name
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: BTreeMap<String, String>,

    #[serde(deserialize_with = "null_as_default")]
    pub blacklist: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub friends_list: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// Document in the "users" collection. There is no fixed schema: every field
/// may be absent, and updates add or remove fields freely.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<Bson>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "deserialize_optional_int"
    )]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<String>,
}

/// Imported data stores ages as int32, int64 or double depending on the tool
/// that wrote it.
fn deserialize_optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bson_value = Option::<Bson>::deserialize(deserializer)?;
    match bson_value {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Int32(v)) => Ok(Some(v as i64)),
        Some(Bson::Int64(v)) => Ok(Some(v)),
        Some(Bson::Double(v)) if v.fract() == 0.0 => Ok(Some(v as i64)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "Expected integer age, got {}",
            other
        ))),
    }
}

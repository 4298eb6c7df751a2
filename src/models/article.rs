use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// Article types created by the seed step, one document each.
pub const ARTICLE_TYPES: [&str; 3] = ["a", "b", "c"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Article {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<Bson>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tags: Option<Vec<String>>,
}

impl Article {
    pub fn new(kind: &str) -> Self {
        Self {
            id: None,
            kind: kind.to_string(),
            tags: None,
        }
    }
}

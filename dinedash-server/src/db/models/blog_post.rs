//! Blog Post Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::Timestamp;
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub title: String,
    pub content: String,
    pub date_posted: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogPostCreate {
    pub title: String,
    pub content: String,
}

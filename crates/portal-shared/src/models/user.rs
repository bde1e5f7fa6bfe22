use serde::{Deserialize, Serialize};

/// Public view of a student account. The password never appears here; the
/// server strips it before anything crosses the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Assigned at registration, e.g. "ST-2026-0001". Never changes.
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_study: Option<String>,
    /// Month and year of registration, e.g. "August 2026". Never changes.
    pub joined_date: String,
    /// Derived from `full_name`, kept in sync on every rename.
    pub avatar_initials: String,
}

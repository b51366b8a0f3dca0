//! Lists and groups
//!
//! The procedure protocol exposes two views of the same data: the send
//! service returns bare `(id, name)` pairs, the import service returns lists
//! with their GUID and groups. The resource protocol has its own, paginated
//! shapes.

use serde::{Deserialize, Serialize};

/// A list as reported by the send service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailingList {
    pub id: i64,
    pub name: String,
}

/// A list with its groups, as reported by the import service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl List {
    pub fn group(&self, id: i64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Group whose name matches `name` ignoring ASCII case.
    pub fn group_named(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

/* -------------------------------------------------------------------------- */
/* Resource protocol */
/* -------------------------------------------------------------------------- */

/// A list as returned by the console REST endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleList {
    pub id: i64,
    pub name: String,
    pub guid: Option<String>,
    pub description: Option<String>,
}

/// A group as returned by the console REST endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleGroup {
    pub id: i64,
    pub list_id: Option<i64>,
    pub name: String,
    pub notes: Option<String>,
    pub deletable: Option<bool>,
}

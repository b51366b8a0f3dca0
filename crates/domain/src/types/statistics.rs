//! Resource-protocol statistics and paging

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::{MailUpError, Result};

/// Aggregate counters for one message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStatistics {
    pub views: i64,
    pub clicks: i64,
    pub bounces: i64,
    pub unsubscriptions: i64,
}

/// One recipient row of a per-message activity listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientActivity {
    pub recipient_id: Option<i64>,
    pub email: String,
    pub count: Option<i64>,
}

/// Page request for paginated resource endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Zero-based page index
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self { page_number: 0, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl Paging {
    /// Build a validated page request.
    ///
    /// # Errors
    /// Returns `MailUpError::Validation` when `page_size` is outside
    /// `1..=1000`.
    pub fn new(page_number: u32, page_size: u32) -> Result<Self> {
        let paging = Self { page_number, page_size };
        paging.validate()?;
        Ok(paging)
    }

    /// Check the bounds again; fields are public and may have been edited.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(MailUpError::validation(format!(
                "Invalid page size: {} (expected 1 to {MAX_PAGE_SIZE})",
                self.page_size
            )));
        }
        Ok(())
    }

    /// Query string understood by the resource endpoints.
    pub fn query(&self) -> String {
        format!("pageNumber={}&pageSize={}", self.page_number, self.page_size)
    }
}

/// One page of a paginated resource listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: i64,
    pub is_paginated: bool,
}

impl<T> Page<T> {
    /// Whether pages after this one exist.
    pub fn has_more(&self) -> bool {
        let seen = (i64::from(self.page_number) + 1) * i64::from(self.page_size);
        self.is_paginated && seen < self.total_elements
    }
}

pub mod health;
pub mod movies;
pub mod posters;
pub mod tv;

use crate::error::AppError;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct PageParams {
    page: Option<u32>,
}

impl PageParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    page: Option<u32>,
}

impl SearchParams {
    /// Trimmed query, rejecting a missing or blank one
    pub fn query(&self) -> Result<&str, AppError> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::BadRequest("q is required".into()))
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// A page of results in list responses
#[derive(Serialize)]
pub struct ListResponse<T> {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub results: Vec<T>,
}

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?skip=&limit=` query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl Pagination {
    pub fn validate(self, max_limit: Option<i64>) -> AppResult<Self> {
        if self.skip < 0 {
            return Err(AppError::Validation("skip must be >= 0".into()));
        }
        if self.limit < 1 {
            return Err(AppError::Validation("limit must be >= 1".into()));
        }
        if let Some(max) = max_limit {
            if self.limit > max {
                return Err(AppError::Validation(format!("limit must be <= {max}")));
            }
        }
        Ok(self)
    }
}

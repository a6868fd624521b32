use serde::Deserialize;

const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Deserialize, Debug, Default)]
pub struct PaginationParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PaginationParams {
    /// Page size, falling back to `default` when absent or unparsable.
    pub fn limit(&self, default: i64) -> i64 {
        self.limit
            .as_ref()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(default)
            .min(MAX_PAGE_LIMIT)
    }
    pub fn offset(&self) -> i64 {
        self.offset
            .as_ref()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .unwrap_or(0)
    }
}

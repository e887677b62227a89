/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Row counts as reported by PostgreSQL (`COPY`, `COUNT(*)`).
pub type RowCount = u64;

/// All backend primary keys are 64-bit integers.
pub type DbId = i64;

/// All event timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

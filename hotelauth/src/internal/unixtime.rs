use std::fmt::Display;
use time::{Duration, OffsetDateTime};

//--------------------------------------------------------------------------------------------------
// Unix Timestamp handling
//--------------------------------------------------------------------------------------------------

pub const ONE_HOUR: i64 = 3600;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnixTimestamp(OffsetDateTime);

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UnixTimestamp {
    pub fn now() -> Self {
        UnixTimestamp(OffsetDateTime::now_utc())
    }

    /// None when the value is outside the range `time` can represent
    pub fn from_seconds(seconds: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .ok()
            .map(UnixTimestamp)
    }

    pub fn seconds(self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn add_seconds(self, seconds: i64) -> Self {
        UnixTimestamp(self.0.saturating_add(Duration::seconds(seconds)))
    }

    pub fn add_one_hour(self) -> Self {
        self.add_seconds(ONE_HOUR)
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------

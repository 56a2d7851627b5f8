//! Build timestamp, captured once per invocation.

use time::OffsetDateTime;

/// The instant a build started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStamp(OffsetDateTime);

impl BuildStamp {
    /// Current time in the local offset, or UTC when the offset is unknown.
    pub fn now() -> Self {
        Self(OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()))
    }

    pub fn at(instant: OffsetDateTime) -> Self {
        Self(instant)
    }

    /// `YYYYMMDD-HHMMSS`
    pub fn compact(&self) -> String {
        let t = self.0;
        format!(
            "{:04}{:02}{:02}-{:02}{:02}{:02}",
            t.year(),
            t.month() as u8,
            t.day(),
            t.hour(),
            t.minute(),
            t.second()
        )
    }

    /// `YYYY-MM-DD HH:MM:SS`
    pub fn human(&self) -> String {
        let t = self.0;
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            t.year(),
            t.month() as u8,
            t.day(),
            t.hour(),
            t.minute(),
            t.second()
        )
    }
}

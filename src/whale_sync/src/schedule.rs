//! Daily ingest schedule.
//!
//! Runs once at startup, then every day at a fixed local hour in an IANA zone.
//! Run failures are logged and swallowed so one bad day never stops the loop.
//!
//! DST handling for the local run time:
//! - Nonexistent (spring-forward gap): shift forward one hour at a time.
//! - Ambiguous (fall-back): take the earliest instant.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc, offset::LocalResult};
use chrono_tz::Tz;
use diesel::SqliteConnection;
use tracing::{info, warn};

use crate::{
    ingest::{IngestError, IngestSummary, Ingestor},
    store::SnapshotStore,
};

/// When the daily run fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Zone the hour is interpreted in.
    pub tz: Tz,
    /// Local hour, `0..=23`.
    pub hour: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::Los_Angeles,
            hour: 18,
        }
    }
}

impl Schedule {
    /// Next run strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_run_after(now, self.tz, self.hour)
    }
}

/// Instant of `hour:00` local time on `date` in `tz`.
pub fn local_run_instant(date: NaiveDate, tz: Tz, hour: u32) -> Option<DateTime<Utc>> {
    let base = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0)?);
    for shift in 0..3 {
        let naive = base + chrono::Duration::hours(shift);
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest.with_timezone(&Utc)),
            LocalResult::None => continue,
        }
    }
    None
}

/// Next instant strictly after `now` at `hour:00` local time in `tz`.
///
/// Hours outside `0..=23` fall back to midnight.
pub fn next_run_after(now: DateTime<Utc>, tz: Tz, hour: u32) -> DateTime<Utc> {
    let hour = if hour < 24 { hour } else { 0 };
    let mut date = now.with_timezone(&tz).date_naive();
    for _ in 0..3 {
        if let Some(at) = local_run_instant(date, tz, hour).filter(|at| *at > now) {
            return at;
        }
        date = date + Days::new(1);
    }
    // Unreachable for real zones: one of three consecutive days has the hour.
    now + chrono::Duration::days(1)
}

/// One ingest whose failure is logged instead of returned.
pub async fn run_logged<S: SnapshotStore>(
    ingestor: &Ingestor<S>,
    conn: &mut SqliteConnection,
    trigger: &str,
) -> Option<IngestSummary> {
    match ingestor.ingest(conn).await {
        Ok(summary) => {
            info!(trigger, %summary, "ingest run complete");
            Some(summary)
        }
        Err(IngestError::Persist { failures, summary, .. }) => {
            for f in &failures {
                warn!(trigger, failure = %f, "day not persisted");
            }
            warn!(trigger, %summary, "ingest run finished with failures");
            None
        }
        Err(e) => {
            warn!(trigger, error = %e, "ingest run failed");
            None
        }
    }
}

/// Bootstrap run, then one run per day forever.
pub async fn run_daily<S: SnapshotStore>(ingestor: &Ingestor<S>, conn: &mut SqliteConnection, schedule: Schedule) {
    run_logged(ingestor, conn, "bootstrap").await;
    loop {
        let now = Utc::now();
        let next = schedule.next_after(now);
        info!(next = %next, tz = %schedule.tz, "next ingest scheduled");
        tokio::time::sleep((next - now).to_std().unwrap_or_default()).await;
        run_logged(ingestor, conn, "scheduled").await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn la() -> Tz {
        chrono_tz::America::Los_Angeles
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn later_today_or_tomorrow() {
        // 2025-08-12 10:00 PDT = 17:00Z; 18:00 PDT = 01:00Z next day.
        assert_eq!(next_run_after(utc(2025, 8, 12, 17, 0), la(), 18), utc(2025, 8, 13, 1, 0));
        // Exactly at the run time -> the following day.
        assert_eq!(next_run_after(utc(2025, 8, 13, 1, 0), la(), 18), utc(2025, 8, 14, 1, 0));
        // 19:00 PDT -> tomorrow 18:00 PDT.
        assert_eq!(next_run_after(utc(2025, 8, 13, 2, 0), la(), 18), utc(2025, 8, 14, 1, 0));
    }

    #[test]
    fn spring_forward_gap_shifts_one_hour() {
        // 2025-03-09 02:00 does not exist in Los Angeles; 03:00 PDT = 10:00Z.
        let d = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(local_run_instant(d, la(), 2), Some(utc(2025, 3, 9, 10, 0)));
    }

    #[test]
    fn fall_back_takes_earliest() {
        // 2025-11-02 01:00 happens twice; the PDT one is 08:00Z.
        let d = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        assert_eq!(local_run_instant(d, la(), 1), Some(utc(2025, 11, 2, 8, 0)));
    }

    #[test]
    fn respects_standard_time() {
        // January: PST (UTC-8). 18:00 PST = 02:00Z next day.
        assert_eq!(next_run_after(utc(2025, 1, 15, 12, 0), la(), 18), utc(2025, 1, 16, 2, 0));
    }
}

//! Duration conversion and timer utilities.

use std::time::Duration;
use tokio::time::Instant;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    ///
    /// Intervals are persisted as plain millisecond counts, so this never
    /// saturates in practice.
    fn as_millis_u64(&self) -> u64;

    /// Human readable label used by menus ("5 seconds", "1 minute").
    fn interval_label(&self) -> String;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }

    fn interval_label(&self) -> String {
        let millis = self.as_millis_u64();
        if millis % 60_000 == 0 && millis > 0 {
            let minutes = millis / 60_000;
            if minutes == 1 {
                "1 minute".to_string()
            } else {
                format!("{minutes} minutes")
            }
        } else if millis % 1000 == 0 {
            let seconds = millis / 1000;
            if seconds == 1 {
                "1 second".to_string()
            } else {
                format!("{seconds} seconds")
            }
        } else {
            format!("{millis} ms")
        }
    }
}

/// Sleep until `deadline`, or forever when there is none
pub async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

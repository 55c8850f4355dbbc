//! Session identifier formatting.

use chrono::{DateTime, Utc};

/// Builds `{user}_session_{counter}_{YYYYMMDD_HHMMSS}` from the UTC start time,
/// truncated to whole seconds.
pub fn format_session_id(user_id: &str, counter: u64, started_at: DateTime<Utc>) -> String {
    format!(
        "{user_id}_session_{counter}_{}",
        started_at.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn formats_counter_and_compact_timestamp() {
        let started_at = Utc
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .expect("valid time");
        assert_eq!(
            format_session_id("al", 1, started_at),
            "al_session_1_20240309_070501"
        );
    }

    #[test]
    fn drops_sub_second_precision() {
        let started_at = Utc
            .with_ymd_and_hms(2024, 12, 31, 23, 59, 59)
            .single()
            .expect("valid time")
            + chrono::Duration::milliseconds(999);
        assert_eq!(
            format_session_id("bob smith", 12, started_at),
            "bob smith_session_12_20241231_235959"
        );
    }
}

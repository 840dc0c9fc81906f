use chrono::{DateTime, Local, TimeDelta, Utc};

/// Format a UTC instant as a readable date
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a duration to a human readable string; negative spans read as zero
pub fn format_duration(duration: TimeDelta) -> String {
    let seconds = duration.num_seconds().max(0);
    if seconds < 60 {
        format!("{} seconds", seconds)
    } else if seconds < 3600 {
        format!("{} minutes", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours", seconds / 3600)
    } else {
        format!("{} days", seconds / 86400)
    }
}

/// Convert a UTC instant to a local time string
pub fn utc_to_local(timestamp: DateTime<Utc>) -> String {
    let local_time: DateTime<Local> = DateTime::from(timestamp);
    local_time.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_formatting() {
        let timestamp = Utc.timestamp_opt(1609459200, 0).unwrap(); // 2021-01-01 00:00:00
        assert_eq!(format_timestamp(timestamp), "2021-01-01 00:00:00");
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(TimeDelta::seconds(30)), "30 seconds");
        assert_eq!(format_duration(TimeDelta::seconds(90)), "1 minutes");
        assert_eq!(format_duration(TimeDelta::hours(2)), "2 hours");
        assert_eq!(format_duration(TimeDelta::days(1)), "1 days");
        assert_eq!(format_duration(TimeDelta::minutes(-5)), "0 seconds");
    }

    #[test]
    fn test_utc_to_local() {
        let local_time = utc_to_local(Utc::now());
        assert!(!local_time.is_empty());
        assert!(local_time.contains(':'));
        assert!(local_time.len() > 15);
    }
}

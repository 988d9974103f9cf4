use chrono::{DateTime, Duration, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn from_rfc3339(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Long-form date used on certificates, e.g. "March 4, 2026".
pub fn certificate_date(dt: DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y").to_string()
}

/// Time left until `started_at + limit`, floored at zero.
pub fn remaining(started_at: DateTime<Utc>, limit: Duration, at: DateTime<Utc>) -> Duration {
    let deadline = started_at + limit;
    if at >= deadline {
        Duration::zero()
    } else {
        deadline - at
    }
}

/// "mm:ss" countdown, or "h:mm:ss" when an hour or more remains.
pub fn format_countdown(left: Duration) -> String {
    let total = left.num_seconds().max(0);
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

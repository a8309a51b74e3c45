use chrono::{DateTime, Local, Utc};
use std::time::Duration;

/// 格式化时间为本地时间显示
pub fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 格式化耗时 (例如: "1.250s", "12.500ms", "800µs")
pub fn format_elapsed(duration: Duration) -> String {
    let micros = duration.as_micros();

    match micros {
        0..=999 => format!("{}µs", micros),
        1_000..=999_999 => format!("{:.3}ms", micros as f64 / 1_000.0),
        _ => format!("{:.3}s", duration.as_secs_f64()),
    }
}

use std::time::Duration;

/// Human-readable elapsed time: `1h 2m 3s`, `2m 3s` or `3.042s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = elapsed.subsec_millis();

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(3042)), "3.042s");
        assert_eq!(format_elapsed(Duration::from_secs(123)), "2m 3s");
        assert_eq!(format_elapsed(Duration::from_secs(3723)), "1h 2m 3s");
    }
}

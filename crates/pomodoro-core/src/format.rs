//! Formatting utilities

/// Format seconds as a countdown clock (MM:SS)
///
/// Minutes are not wrapped into hours, so a 90 minute session reads `90:00`.
pub fn clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Format a minute count as `Xh Ym`, or `Ym` below an hour
pub fn minutes(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let mins = total_minutes % 60;
    if hours == 0 {
        format!("{}m", mins)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Render a fixed-width progress bar for a fraction in 0.0..=1.0
pub fn bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = ((width as f64) * fraction).round() as usize;
    let empty = width - filled.min(width);
    format!("{}{}", "\u{2588}".repeat(filled.min(width)), "\u{2591}".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        assert_eq!(clock(1500), "25:00");
        assert_eq!(clock(59), "00:59");
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(5400), "90:00");
    }

    #[test]
    fn test_minutes() {
        assert_eq!(minutes(50), "50m");
        assert_eq!(minutes(135), "2h 15m");
        assert_eq!(minutes(60), "1h 0m");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0, 4), "\u{2591}\u{2591}\u{2591}\u{2591}");
        assert_eq!(bar(1.0, 4), "\u{2588}\u{2588}\u{2588}\u{2588}");
        assert_eq!(bar(0.5, 4).chars().filter(|c| *c == '\u{2588}').count(), 2);
        assert_eq!(bar(3.0, 2).chars().count(), 2);
    }
}

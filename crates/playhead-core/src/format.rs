//! Time and rate formatting shared by every display surface

/// Format seconds as `H:MM:SS` (with hours) or `M:SS`.
///
/// Non-finite and negative inputs render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// `"1:05 / 10:00"` style label
pub fn format_progress(current: f64, duration: f64) -> String {
    format!("{} / {}", format_time(current), format_time(duration))
}

/// Rate label shown on the speed button: `1.5x`, `1x`, `0.25x`
pub fn format_rate(rate: f64) -> String {
    // Trim trailing zeros so 1.0 shows as "1x"
    let mut text = format!("{:.2}", rate);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{}x", text)
}

/// Rate label used in the speed menu (`1x (Normal)` for the default rate)
pub fn format_rate_option(rate: f64) -> String {
    if (rate - 1.0).abs() < f64::EPSILON {
        format!("{} (Normal)", format_rate(rate))
    } else {
        format_rate(rate)
    }
}

/// Signed seek feedback text: `+10s`, `-15s`
pub fn format_seek_delta(delta: f64) -> String {
    let rounded = delta.round() as i64;
    if delta > 0.0 {
        format!("+{}s", rounded)
    } else {
        format!("{}s", rounded)
    }
}

/// Volume feedback text: `Muted` or the rounded percentage
pub fn format_volume(volume: f64, muted: bool) -> String {
    if muted {
        "Muted".to_string()
    } else {
        format!("{}%", (volume * 100.0).round() as i64)
    }
}

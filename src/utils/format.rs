use unicode_width::UnicodeWidthChar;

use crate::models::Requirement;

/// Percentage with up to `decimals` places, trailing zeros trimmed: "80%", "85.71%".
pub fn format_percentage(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    format!("{}%", trimmed)
}

pub fn format_requirement(requirement: Requirement) -> String {
    match requirement {
        Requirement::Count(n) => n.to_string(),
        Requirement::Unreachable => "∞ (unreachable)".to_string(),
    }
}

/// "1 lecture", "3 lectures"
pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() {
        return "░".repeat(width);
    }
    let ratio = (value / max).clamp(0.0, 1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Pad or cut `text` to exactly `width` terminal columns.
pub fn fit_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

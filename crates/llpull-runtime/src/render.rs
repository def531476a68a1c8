//! Text progress bar.

/// Render a fixed-width progress bar that redraws the current terminal line.
///
/// `current` is clamped into `[0, total]`. A non-positive `total` renders
/// an empty bar (`[]`). Arithmetic is widened so no input can overflow.
///
/// ```
/// use llpull_runtime::render_bar;
///
/// assert_eq!(
///     render_bar(50, 100, 10),
///     "\rProcessing: [#####-----]  50% Complete (50/100)"
/// );
/// ```
pub fn render_bar(current: i64, total: i64, width: usize) -> String {
    if total <= 0 {
        return "[]".to_string();
    }

    let current = current.clamp(0, total);
    let filled = filled_width(current, total, width);
    let empty = width - filled;
    let percent = i128::from(current) * 100 / i128::from(total);

    format!(
        "\rProcessing: [{}{}] {percent:3}% Complete ({current}/{total})",
        "#".repeat(filled),
        "-".repeat(empty),
    )
}

/// Number of filled cells: `floor(width * current / total)`.
///
/// Callers guarantee `0 <= current <= total` and `total > 0`.
fn filled_width(current: i64, total: i64, width: usize) -> usize {
    let width_wide = i128::try_from(width).unwrap_or(i128::MAX);
    let filled = width_wide.saturating_mul(i128::from(current)) / i128::from(total);
    usize::try_from(filled).map_or(width, |f| f.min(width))
}

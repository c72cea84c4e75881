/// Scrape a percentage out of a free-form transfer log line.
///
/// The token right before the first `%` is parsed as a float, so
/// `"Transferred: 42.5% done"` yields `42.5`. Lines without `%`, or whose
/// token does not parse, yield `None` and the caller keeps its previous value.
/// The value is not clamped: the output format belongs to rclone and the
/// transfer scripts.
pub fn parse_percent(line: &str) -> Option<f32> {
    let (head, _) = line.split_once('%')?;
    head.split_whitespace().last()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rclone_stats_line() {
        let line = "Transferred:   1.205 MiB / 10 MiB, 12%, 512 KiB/s, ETA 17s";
        assert_eq!(parse_percent(line), Some(12.0));
    }

    #[test]
    fn leading_percent_is_ignored() {
        assert_eq!(parse_percent("% of nothing"), None);
    }

    #[test]
    fn only_first_percent_counts() {
        assert_eq!(parse_percent("done 10% then 90%"), Some(10.0));
    }
}

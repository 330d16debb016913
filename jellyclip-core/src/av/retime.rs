use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Largest timing a cue line can carry: `99:59:59,999`.
const MAX_CUE_MS: i64 = ((99 * 60 + 59) * 60 + 59) * 1000 + 999;

fn cue_timing() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})")
            .expect("cue timing pattern is valid")
    })
}

/// Shifts every SRT cue timing in `content` back by `offset_seconds`.
///
/// Timings that would become negative are clamped to zero. Every other line
/// (cue indices, text, blank separators, trailing `\r`) is passed through
/// untouched, so line count and order are preserved and cues are never
/// renumbered. A non-finite offset leaves the content unchanged, and
/// offsets beyond the cue range are capped to it.
pub fn shift(content: &str, offset_seconds: f64) -> String {
    if !offset_seconds.is_finite() {
        return content.to_string();
    }
    let offset_ms = ((offset_seconds * 1000.0).round() as i64).clamp(-MAX_CUE_MS, MAX_CUE_MS);
    if offset_ms == 0 {
        return content.to_string();
    }
    let pattern = cue_timing();
    content
        .split('\n')
        .map(|line| {
            pattern
                .replace(line, |caps: &Captures<'_>| {
                    let start = timestamp_ms(caps, 1).saturating_sub(offset_ms);
                    let end = timestamp_ms(caps, 5).saturating_sub(offset_ms);
                    format!("{} --> {}", format_timestamp(start), format_timestamp(end))
                })
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn timestamp_ms(caps: &Captures<'_>, first_group: usize) -> i64 {
    let field = |offset: usize| -> i64 {
        caps.get(first_group + offset)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    ((field(0) * 60 + field(1)) * 60 + field(2)) * 1000 + field(3)
}

fn format_timestamp(ms: i64) -> String {
    let ms = ms.max(0);
    let total_seconds = ms / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60,
        ms % 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:05,000 --> 00:00:07,500\nHello there.\n\n2\n00:01:02,250 --> 00:01:04,000\nGeneral Kenobi!\n";

    #[test]
    fn zero_offset_is_identity() {
        assert_eq!(shift(SAMPLE, 0.0), SAMPLE);
    }

    #[test]
    fn shifts_both_timestamps() {
        let shifted = shift(SAMPLE, 2.0);
        assert!(shifted.contains("00:00:03,000 --> 00:00:05,500"));
        assert!(shifted.contains("00:01:00,250 --> 00:01:02,000"));
        assert!(shifted.contains("Hello there."));
    }

    #[test]
    fn fractional_offsets_shift_milliseconds() {
        let shifted = shift("00:00:01,000 --> 00:00:02,000", 0.25);
        assert_eq!(shifted, "00:00:00,750 --> 00:00:01,750");
    }

    #[test]
    fn clamps_to_zero_without_renumbering() {
        let shifted = shift(SAMPLE, 70.0);
        let lines: Vec<&str> = shifted.split('\n').collect();
        assert_eq!(lines[0], "1");
        assert_eq!(lines[1], "00:00:00,000 --> 00:00:00,000");
        assert_eq!(lines[4], "2");
        assert_eq!(lines[5], "00:00:00,000 --> 00:00:00,000");
    }

    #[test]
    fn preserves_line_count_and_carriage_returns() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        let shifted = shift(&crlf, 1.0);
        assert_eq!(shifted.split('\n').count(), crlf.split('\n').count());
        assert!(shifted.contains("00:00:04,000 --> 00:00:06,500\r\n"));
        assert!(shifted.ends_with("\r\n"));
    }

    #[test]
    fn large_hours_keep_two_digit_minimum() {
        let shifted = shift("10:00:00,000 --> 10:00:01,000", 3600.0);
        assert_eq!(shifted, "09:00:00,000 --> 09:00:01,000");
    }

    #[test]
    fn extreme_offsets_do_not_overflow() {
        let line = "00:00:01,000 --> 00:00:02,000";
        assert_eq!(shift(line, f64::NEG_INFINITY), line);
        assert_eq!(shift(line, f64::INFINITY), line);
        assert_eq!(shift(line, f64::NAN), line);
        assert_eq!(shift(line, 1e19), "00:00:00,000 --> 00:00:00,000");

        let pushed_forward = shift(line, -1e19);
        assert_eq!(pushed_forward, shift(line, -(MAX_CUE_MS as f64) / 1000.0));
        assert_eq!(pushed_forward.split('\n').count(), 1);
        assert!(pushed_forward.starts_with("100:00:00,999 --> 100:00:01,999"));
    }

    #[test]
    fn non_timing_lines_pass_through() {
        let content = "WEBVTT-ish header\n00:00:01 --> 00:00:02\n";
        assert_eq!(shift(content, 5.0), content);
    }
}

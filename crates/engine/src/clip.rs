use crate::types::ClipWindow;

/// Seconds of context kept before the resolved timestamp.
pub const LEAD_SECONDS: f64 = 2.0;
/// Seconds of context kept after the resolved timestamp. The window is
/// deliberately asymmetric: the moment a model points at usually starts at or
/// after the timestamp it reports.
pub const TRAIL_SECONDS: f64 = 8.0;

/// Derive the fixed 10-second playback window around a timestamp. The start
/// is clamped so it never goes negative; the end is left unclamped.
pub fn clip_window(timestamp: f64) -> ClipWindow {
    ClipWindow {
        start: (timestamp - LEAD_SECONDS).max(0.0),
        end: timestamp + TRAIL_SECONDS,
    }
}

/// Like [`clip_window`], but additionally clamps the end to the video's total
/// duration when one is known. The backend is not documented to reject or
/// clamp out-of-range ranges itself, so we do it here when we can.
pub fn clip_window_clamped(timestamp: f64, duration: Option<f64>) -> ClipWindow {
    let mut window = clip_window(timestamp);
    if let Some(duration) = duration {
        if window.end > duration {
            window.end = duration;
        }
        if window.start > window.end {
            window.start = window.end;
        }
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_start_is_clamped_to_zero() {
        let w = clip_window(1.0);
        assert_eq!(w.start, 0.0);
        assert_eq!(w.end, 9.0);
    }

    #[test]
    fn window_is_ten_seconds_mid_video() {
        let w = clip_window(50.0);
        assert_eq!(w.start, 48.0);
        assert_eq!(w.end, 58.0);
    }

    #[test]
    fn window_end_clamps_to_duration_when_known() {
        let w = clip_window_clamped(50.0, Some(52.5));
        assert_eq!(w.start, 48.0);
        assert_eq!(w.end, 52.5);
    }

    #[test]
    fn window_end_unclamped_without_duration() {
        let w = clip_window_clamped(50.0, None);
        assert_eq!(w.end, 58.0);
    }

    #[test]
    fn degenerate_window_past_end_of_video() {
        // Timestamp beyond the video entirely; window collapses rather than
        // inverting.
        let w = clip_window_clamped(100.0, Some(60.0));
        assert_eq!(w.end, 60.0);
        assert_eq!(w.start, 60.0);
    }
}

//! Download progress normalization

/// Whole percentage of `bytes` out of `total`, rounded down
///
/// Returns `None` when the total is unknown (zero). Values past the total
/// are capped at 100.
#[must_use]
pub fn percent(bytes: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let pct = (u128::from(bytes.min(total)) * 100) / u128::from(total);
    u8::try_from(pct).ok()
}

/// Filters raw byte counts down to strictly increasing percentages
///
/// Each percentage is reported at most once, so 100 is reported exactly once
/// when the download completes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressTracker {
    last: Option<u8>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a provider byte count; returns the percentage to report, if any
    pub fn observe(&mut self, bytes: u64, total: u64) -> Option<u8> {
        let pct = percent(bytes, total)?;
        if self.last.is_some_and(|last| pct <= last) {
            return None;
        }
        self.last = Some(pct);
        Some(pct)
    }

    /// Close out a successful download
    ///
    /// Returns 100 if progress was being reported and has not reached it yet.
    pub fn complete(&mut self) -> Option<u8> {
        match self.last {
            Some(last) if last < 100 => {
                self.last = Some(100);
                Some(100)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_total_reports_nothing() {
        assert_eq!(percent(10, 0), None);
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.observe(10, 0), None);
        assert_eq!(tracker.complete(), None);
    }

    #[test]
    fn percent_rounds_down() {
        assert_eq!(percent(0, 3), Some(0));
        assert_eq!(percent(1, 3), Some(33));
        assert_eq!(percent(2, 3), Some(66));
        assert_eq!(percent(3, 3), Some(100));
        assert_eq!(percent(5, 3), Some(100));
        assert_eq!(percent(u64::MAX, u64::MAX), Some(100));
    }

    #[test]
    fn thousand_bytes_in_hundred_byte_steps() {
        let mut tracker = ProgressTracker::new();
        let reported: Vec<u8> = (1..=10)
            .filter_map(|step| tracker.observe(step * 100, 1000))
            .collect();
        assert_eq!(reported, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        assert_eq!(tracker.complete(), None);
    }

    #[test]
    fn repeats_and_regressions_are_dropped() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.observe(500, 1000), Some(50));
        assert_eq!(tracker.observe(500, 1000), None);
        assert_eq!(tracker.observe(400, 1000), None);
        assert_eq!(tracker.observe(501, 1000), None);
        assert_eq!(tracker.complete(), Some(100));
        assert_eq!(tracker.complete(), None);
    }
}

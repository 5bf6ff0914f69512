//! Monotonic request sequencing for supersedable calls.
//!
//! List fetches and previews can be overtaken by a newer request before
//! their response arrives. Each request gets an ascending number when it is
//! issued, and a response is only applied if its number is still the
//! latest one. Arrival order is never consulted.

/// Issues ascending sequence numbers and answers "is this still current?".
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number. Every earlier number becomes stale.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Make every issued number stale without starting a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_ascend() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert_eq!(seq.latest(), b);
    }

    #[test]
    fn only_latest_is_current() {
        let mut seq = RequestSequencer::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.is_latest(first));
        assert!(seq.is_latest(second));
    }

    #[test]
    fn invalidate_stales_everything() {
        let mut seq = RequestSequencer::new();
        let issued = seq.issue();
        seq.invalidate();
        assert!(!seq.is_latest(issued));
    }

    #[test]
    fn nothing_is_current_before_first_issue() {
        let seq = RequestSequencer::new();
        assert!(!seq.is_latest(1));
    }
}

//! End-of-session score tiers

/// Result tier for a finished dictation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    Perfect,
    Excellent,
    Good,
    Fair,
    Practice,
}

impl ScoreBand {
    /// Tier for `score` correct answers out of `total`
    ///
    /// Thresholds are inclusive lower bounds on the percentage: 100, 80, 60,
    /// 40. A zero total rates as practice.
    pub fn for_score(score: u32, total: u32) -> Self {
        if total == 0 {
            return ScoreBand::Practice;
        }
        // Compare in integers so 4/5 is exactly 80%
        let scaled = u64::from(score) * 100;
        let total = u64::from(total);
        if scaled >= 100 * total {
            ScoreBand::Perfect
        } else if scaled >= 80 * total {
            ScoreBand::Excellent
        } else if scaled >= 60 * total {
            ScoreBand::Good
        } else if scaled >= 40 * total {
            ScoreBand::Fair
        } else {
            ScoreBand::Practice
        }
    }

    /// Rounded-down percentage for display
    pub fn percentage(score: u32, total: u32) -> u32 {
        if total == 0 {
            0
        } else {
            (u64::from(score) * 100 / u64::from(total)) as u32
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Perfect => "Perfect!",
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Practice => "Keep practicing",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Perfect => "Every term spelled correctly.",
            ScoreBand::Excellent => "Only a few slips. You know this material.",
            ScoreBand::Good => "Solid work. Review the terms you missed.",
            ScoreBand::Fair => "Getting there. Another round will help.",
            ScoreBand::Practice => "Study the labels in explore mode and try again.",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_thresholds() {
        assert_eq!(ScoreBand::for_score(10, 10), ScoreBand::Perfect);
        assert_eq!(ScoreBand::for_score(9, 10), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(8, 10), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(7, 10), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(6, 10), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(5, 10), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(4, 10), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(3, 10), ScoreBand::Practice);
        assert_eq!(ScoreBand::for_score(0, 10), ScoreBand::Practice);
    }

    #[test]
    fn test_thresholds_without_float_drift() {
        // 4/5, 3/5 and 2/5 sit exactly on the boundaries
        assert_eq!(ScoreBand::for_score(4, 5), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(3, 5), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(2, 5), ScoreBand::Fair);
        // 79.9...% is not excellent
        assert_eq!(ScoreBand::for_score(799, 1000), ScoreBand::Good);
    }

    #[test]
    fn test_percentage_and_labels() {
        assert_eq!(ScoreBand::percentage(2, 3), 66);
        assert_eq!(ScoreBand::percentage(1, 0), 0);
        assert_eq!(ScoreBand::for_score(0, 0), ScoreBand::Practice);
        assert_eq!(ScoreBand::Perfect.to_string(), "Perfect!");
        assert!(!ScoreBand::Fair.message().is_empty());
    }
}

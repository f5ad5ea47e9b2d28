use serde::{Deserialize, Serialize};

/// One-shot milestones a game can earn.
///
/// Serialized names are stable identifiers kept from the original save
/// format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    #[serde(rename = "1000Points")]
    ThousandPoints,
    #[serde(rename = "10000Points")]
    TenThousandPoints,
    #[serde(rename = "21000Points")]
    TwentyOneThousandPoints,
    #[serde(rename = "100000Points")]
    HundredThousandPoints,
    #[serde(rename = "1000000Points")]
    MillionPoints,
    AllThreeByThrees,
    AllOneByOnes,
    ClearEntireBoard,
    SixClears,
}

const SCORE_ACHIEVEMENTS: &[(u32, Achievement)] = &[
    (1_000, Achievement::ThousandPoints),
    (10_000, Achievement::TenThousandPoints),
    (21_000, Achievement::TwentyOneThousandPoints),
    (100_000, Achievement::HundredThousandPoints),
    (1_000_000, Achievement::MillionPoints),
];

/// Score, high score, and earned achievements.
///
/// Achievements are monotone: once earned they survive undo and persist for
/// the life of the game. The high score is likewise never rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    score: u32,
    high_score: u32,
    is_high_score: bool,
    achievements: Vec<Achievement>,
}

impl ScoreBoard {
    /// Starts a fresh game against a previous high score.
    ///
    /// A game with no previous high score counts as a high-score run from
    /// the start.
    #[must_use]
    pub fn new(high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            is_high_score: high_score == 0,
            achievements: Vec::new(),
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Whether this run has beaten (or started without) a previous high
    /// score.
    #[must_use]
    pub fn is_high_score(&self) -> bool {
        self.is_high_score
    }

    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    #[must_use]
    pub fn has(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }

    /// Adds points, updating the high score and returning any newly crossed
    /// score milestones.
    pub fn increase(&mut self, points: u32) -> Vec<Achievement> {
        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            self.high_score = self.score;
            self.is_high_score = true;
        }
        let mut earned = Vec::new();
        for &(threshold, achievement) in SCORE_ACHIEVEMENTS {
            if self.score >= threshold && self.award(achievement) {
                earned.push(achievement);
            }
        }
        earned
    }

    /// Records an achievement. Returns whether it was newly earned.
    pub fn award(&mut self, achievement: Achievement) -> bool {
        if self.has(achievement) {
            return false;
        }
        self.achievements.push(achievement);
        true
    }

    /// Rewinds the score during undo. High score and achievements are
    /// deliberately left alone.
    pub(crate) fn restore_score(&mut self, score: u32) {
        self.score = score;
    }

    pub(crate) fn from_parts(
        score: u32,
        high_score: u32,
        is_high_score: bool,
        achievements: Vec<Achievement>,
    ) -> Self {
        Self {
            score,
            high_score,
            is_high_score,
            achievements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_a_threshold_awards_once() {
        let mut scoring = ScoreBoard::new(0);
        assert!(scoring.increase(999).is_empty());
        assert_eq!(scoring.increase(1), vec![Achievement::ThousandPoints]);
        assert!(scoring.increase(100).is_empty());
        assert!(scoring.has(Achievement::ThousandPoints));
    }

    #[test]
    fn one_jump_can_cross_several_thresholds() {
        let mut scoring = ScoreBoard::new(0);
        let earned = scoring.increase(25_000);
        assert_eq!(
            earned,
            vec![
                Achievement::ThousandPoints,
                Achievement::TenThousandPoints,
                Achievement::TwentyOneThousandPoints,
            ]
        );
    }

    #[test]
    fn high_score_tracks_score_and_never_rolls_back() {
        let mut scoring = ScoreBoard::new(50);
        assert!(!scoring.is_high_score());
        scoring.increase(30);
        assert_eq!(scoring.high_score(), 50);
        assert!(!scoring.is_high_score());
        scoring.increase(30);
        assert_eq!(scoring.high_score(), 60);
        assert!(scoring.is_high_score());

        scoring.restore_score(30);
        assert_eq!(scoring.score(), 30);
        assert_eq!(scoring.high_score(), 60);
        assert!(scoring.is_high_score());
    }

    #[test]
    fn fresh_game_with_no_history_counts_as_high_score() {
        assert!(ScoreBoard::new(0).is_high_score());
        assert!(!ScoreBoard::new(1).is_high_score());
    }

    #[test]
    fn manual_awards_are_idempotent() {
        let mut scoring = ScoreBoard::new(0);
        assert!(scoring.award(Achievement::ClearEntireBoard));
        assert!(!scoring.award(Achievement::ClearEntireBoard));
        assert_eq!(scoring.achievements(), [Achievement::ClearEntireBoard]);
    }

    #[test]
    fn achievement_names_match_the_persisted_raw_values() {
        let cases = [
            (Achievement::ThousandPoints, "\"1000Points\""),
            (Achievement::TenThousandPoints, "\"10000Points\""),
            (Achievement::TwentyOneThousandPoints, "\"21000Points\""),
            (Achievement::HundredThousandPoints, "\"100000Points\""),
            (Achievement::MillionPoints, "\"1000000Points\""),
            (Achievement::AllThreeByThrees, "\"AllThreeByThrees\""),
            (Achievement::AllOneByOnes, "\"AllOneByOnes\""),
            (Achievement::ClearEntireBoard, "\"ClearEntireBoard\""),
            (Achievement::SixClears, "\"SixClears\""),
        ];
        for (achievement, expected) in cases {
            assert_eq!(serde_json::to_string(&achievement).unwrap(), expected);
            let parsed: Achievement = serde_json::from_str(expected).unwrap();
            assert_eq!(parsed, achievement);
        }
    }

    #[test]
    fn undo_does_not_revoke_achievements() {
        let mut scoring = ScoreBoard::new(0);
        scoring.increase(1_500);
        scoring.restore_score(900);
        assert!(scoring.has(Achievement::ThousandPoints));
        // Re-crossing the threshold stays silent.
        assert!(scoring.increase(200).is_empty());
    }
}

//! Touchdown detection and final yardage assembly.
//!
//! A touchdown scored on the original play stands even when a
//! non-negating penalty is assessed on the same snap (the yardage is
//! enforced on the ensuing kickoff by the game loop); a negated play
//! never scores. Final yardage is clipped so the resulting spot never
//! passes the goal line. Kick points are settled by the kick resolvers,
//! not here.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeResolution {
    pub actual_yards: f32,
    pub points: u8,
    pub is_touchdown: bool,
}

/// Combine pre-penalty yardage, penalty-adjusted yardage and the negation
/// flag into the play's scored outcome.
pub fn assemble(
    field_position: f32,
    pre_penalty_yards: f32,
    adjusted_yards: f32,
    play_negated: bool,
) -> OutcomeResolution {
    let to_goal = (100.0 - field_position).max(0.0);

    if !play_negated && pre_penalty_yards >= to_goal {
        // The score came on the live ball; clip to the goal line.
        return OutcomeResolution { actual_yards: to_goal, points: 6, is_touchdown: true };
    }

    if adjusted_yards >= to_goal {
        return OutcomeResolution { actual_yards: to_goal, points: 6, is_touchdown: true };
    }

    OutcomeResolution { actual_yards: adjusted_yards, points: 0, is_touchdown: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_line_gain_clips_and_scores() {
        let res = assemble(97.0, 5.0, 5.0, false);
        assert!(res.is_touchdown);
        assert_eq!(res.points, 6);
        assert!((res.actual_yards - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_touchdown_stands_through_added_penalty() {
        // Roughing tacked 15 onto a 12-yard score from the 90.
        let res = assemble(90.0, 12.0, 27.0, false);
        assert!(res.is_touchdown);
        assert_eq!(res.points, 6);
        assert!((res.actual_yards - 10.0).abs() < f32::EPSILON, "clipped to the goal line");
    }

    #[test]
    fn test_negated_touchdown_comes_back() {
        // Holding wiped out a 40-yard score; the play nets minus ten.
        let res = assemble(65.0, 40.0, -10.0, true);
        assert!(!res.is_touchdown);
        assert_eq!(res.points, 0);
        assert!((res.actual_yards - -10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_penalty_yards_can_score_on_their_own() {
        // Interference at the goal line from the 95 with an incompletion.
        let res = assemble(95.0, 0.0, 15.0, false);
        assert!(res.is_touchdown);
        assert!((res.actual_yards - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ordinary_gain_passes_through() {
        let res = assemble(25.0, 6.0, 6.0, false);
        assert!(!res.is_touchdown);
        assert_eq!(res.points, 0);
        assert!((res.actual_yards - 6.0).abs() < f32::EPSILON);
    }
}

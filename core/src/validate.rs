//! Capacity and goal input validation.
//!
//! Inputs arrive as minute and second fields. A blank field counts as zero,
//! but both blank is a missing input.

use crate::error::ValidationError;

/// Validate a glass capacity and return it in seconds.
pub fn validate_capacity(minutes: i64, seconds: i64, max_secs: u64) -> Result<u64, ValidationError> {
    let total = total_secs(minutes, seconds)?;
    if total == 0 {
        return Err(ValidationError::CapacityNotPositive);
    }
    if total > max_secs {
        return Err(ValidationError::CapacityTooLarge { max_secs });
    }
    Ok(total)
}

/// Validate a goal and return it in seconds.
pub fn validate_goal(minutes: i64, seconds: i64) -> Result<u64, ValidationError> {
    match total_secs(minutes, seconds)? {
        0 => Err(ValidationError::GoalNotPositive),
        total => Ok(total),
    }
}

/// Parse the raw capacity fields.
pub fn parse_capacity(minutes: &str, seconds: &str, max_secs: u64) -> Result<u64, ValidationError> {
    let (m, s) = parse_fields(minutes, seconds).ok_or(ValidationError::MissingCapacity)??;
    validate_capacity(m, s, max_secs)
}

/// Parse the raw goal fields.
pub fn parse_goal(minutes: &str, seconds: &str) -> Result<u64, ValidationError> {
    let (m, s) = parse_fields(minutes, seconds).ok_or(ValidationError::MissingGoal)??;
    validate_goal(m, s)
}

fn total_secs(minutes: i64, seconds: i64) -> Result<u64, ValidationError> {
    if !(0..=59).contains(&minutes) {
        return Err(ValidationError::MinutesOutOfRange);
    }
    if !(0..=59).contains(&seconds) {
        return Err(ValidationError::SecondsOutOfRange);
    }
    Ok((minutes * 60 + seconds) as u64)
}

/// `None` when both fields are blank.
fn parse_fields(minutes: &str, seconds: &str) -> Option<Result<(i64, i64), ValidationError>> {
    let (minutes, seconds) = (minutes.trim(), seconds.trim());
    if minutes.is_empty() && seconds.is_empty() {
        return None;
    }
    let m = match parse_field(minutes) {
        Some(m) => m,
        None => return Some(Err(ValidationError::MinutesOutOfRange)),
    };
    let s = match parse_field(seconds) {
        Some(s) => s,
        None => return Some(Err(ValidationError::SecondsOutOfRange)),
    };
    Some(Ok((m, s)))
}

fn parse_field(field: &str) -> Option<i64> {
    if field.is_empty() {
        return Some(0);
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_accepts_blank_minutes() {
        assert_eq!(parse_capacity("", "45", 3600), Ok(45));
        assert_eq!(parse_capacity(" 2 ", "", 3600), Ok(120));
        assert_eq!(parse_capacity("59", "59", 3600), Ok(3599));
    }

    #[test]
    fn capacity_reasons() {
        assert_eq!(parse_capacity("", " ", 3600), Err(ValidationError::MissingCapacity));
        assert_eq!(parse_capacity("60", "0", 3600), Err(ValidationError::MinutesOutOfRange));
        assert_eq!(parse_capacity("x", "0", 3600), Err(ValidationError::MinutesOutOfRange));
        assert_eq!(parse_capacity("1", "-1", 3600), Err(ValidationError::SecondsOutOfRange));
        assert_eq!(parse_capacity("0", "0", 3600), Err(ValidationError::CapacityNotPositive));
        assert_eq!(
            parse_capacity("5", "0", 120),
            Err(ValidationError::CapacityTooLarge { max_secs: 120 })
        );
    }

    #[test]
    fn goal_reasons() {
        assert_eq!(parse_goal("", ""), Err(ValidationError::MissingGoal));
        assert_eq!(parse_goal("0", "0"), Err(ValidationError::GoalNotPositive));
        assert_eq!(parse_goal("1", "30"), Ok(90));
        assert_eq!(validate_goal(0, 60), Err(ValidationError::SecondsOutOfRange));
    }

    #[test]
    fn reason_text() {
        assert_eq!(ValidationError::MinutesOutOfRange.to_string(), "Minutes: 0–59");
        assert_eq!(
            ValidationError::CapacityTooLarge { max_secs: 3600 }.to_string(),
            "Max 60 minutes"
        );
    }
}

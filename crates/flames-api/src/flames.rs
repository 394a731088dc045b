use axum::{Json, response::IntoResponse};

use flames_types::api::{FlamesRequest, FlamesResponse};

use crate::error::ApiError;

const OUTCOMES: [&str; 6] = [
    "Friendship",
    "Love",
    "Affection",
    "Marriage",
    "Enemy",
    "Siblings",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlamesOutcome {
    pub result: String,
    pub message: String,
}

/// Letters left over after striking out the ones two names share.
///
/// Case-insensitive; spaces are ignored. Each shared letter is struck once
/// per matching occurrence.
pub fn remaining_letters(name1: &str, name2: &str) -> usize {
    let normalize = |name: &str| -> Vec<char> {
        name.to_lowercase().chars().filter(|c| *c != ' ').collect()
    };

    let first = normalize(name1);
    let mut second = normalize(name2);

    let mut unmatched = 0;
    for c in first {
        match second.iter().position(|other| *other == c) {
            Some(pos) => {
                second.remove(pos);
            }
            None => unmatched += 1,
        }
    }

    unmatched + second.len()
}

/// Classic FLAMES elimination.
///
/// Counting `count` positions around the list removes one outcome per round,
/// and counting resumes just after it, until a single outcome is left.
pub fn calculate_flames(name1: &str, name2: &str) -> FlamesOutcome {
    let count = remaining_letters(name1, name2);
    if count == 0 {
        return FlamesOutcome {
            result: "No Characters Left".into(),
            message: "Try with different names!".into(),
        };
    }

    let mut outcomes: Vec<&str> = OUTCOMES.to_vec();
    while outcomes.len() > 1 {
        match count % outcomes.len() {
            0 => {
                outcomes.pop();
            }
            n => {
                let removed = n - 1;
                let mut rotated = outcomes[removed + 1..].to_vec();
                rotated.extend_from_slice(&outcomes[..removed]);
                outcomes = rotated;
            }
        }
    }

    let result = outcomes[0].to_string();
    FlamesOutcome {
        message: format!("Your relationship is {}!", result),
        result,
    }
}

/// POST /calculate
pub async fn calculate(Json(req): Json<FlamesRequest>) -> Result<impl IntoResponse, ApiError> {
    let (Some(name1), Some(name2)) = (
        req.name1.filter(|n| !n.is_empty()),
        req.name2.filter(|n| !n.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Both names are required".into()));
    };

    let outcome = calculate_flames(&name1, &name2);
    Ok(Json(FlamesResponse {
        result: outcome.result,
        message: outcome.message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_letters_are_struck() {
        assert_eq!(remaining_letters("masood", "siri"), 8);
        assert_eq!(remaining_letters("Anna", "anna"), 0);
        assert_eq!(remaining_letters("Ma Sood", "masood"), 0);
        // One 'l' in the second name only cancels one of the two
        assert_eq!(remaining_letters("lolly", "l"), 4);
    }

    #[test]
    fn known_pairs() {
        assert_eq!(calculate_flames("masood", "siri").result, "Affection");
        // A single leftover letter walks off every outcome but the last
        assert_eq!(calculate_flames("ab", "a").result, "Siblings");
    }

    #[test]
    fn no_letters_left() {
        let outcome = calculate_flames("Romeo", "romeo");
        assert_eq!(outcome.result, "No Characters Left");
        assert_eq!(outcome.message, "Try with different names!");
    }

    #[test]
    fn message_names_the_result() {
        let outcome = calculate_flames("masood", "siri");
        assert_eq!(outcome.message, "Your relationship is Affection!");
    }

    #[test]
    fn every_count_lands_on_an_outcome() {
        for n in 1..60 {
            let name1 = "x".repeat(n);
            let outcome = calculate_flames(&name1, "");
            assert!(OUTCOMES.contains(&outcome.result.as_str()), "count {n}");
        }
    }
}

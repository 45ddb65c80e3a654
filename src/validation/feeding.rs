//! Input rules for new feeding records

use crate::error::ValidationError;
use crate::types::NewFeeding;

/// Validate a new feeding and return its normalized form
///
/// Labels are trimmed; optional text fields that are blank become `None`.
pub fn validate_new_feeding(new: &NewFeeding) -> Result<NewFeeding, ValidationError> {
    let bird_type = new.bird_type.trim();
    if bird_type.is_empty() {
        return Err(ValidationError::EmptyField("bird_type"));
    }

    let food_type = new.food_type.trim();
    if food_type.is_empty() {
        return Err(ValidationError::EmptyField("food_type"));
    }

    if !new.quantity.is_finite() {
        return Err(ValidationError::NonFiniteQuantity);
    }
    if new.quantity < 0.0 {
        return Err(ValidationError::NegativeQuantity(new.quantity));
    }

    Ok(NewFeeding {
        bird_type: bird_type.to_string(),
        food_type: food_type.to_string(),
        quantity: new.quantity,
        location: normalize_optional(new.location.as_deref()),
        notes: normalize_optional(new.notes.as_deref()),
    })
}

/// Validate an optional listing limit (must be positive when present)
pub fn validate_limit(limit: Option<usize>) -> Result<Option<usize>, ValidationError> {
    match limit {
        Some(0) => Err(ValidationError::ZeroLimit),
        other => Ok(other),
    }
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

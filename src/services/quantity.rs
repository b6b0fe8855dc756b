use crate::errors::ServiceError;

/// Quantity invariant checker: `0 <= prepared_quantity <= quantity` and
/// `quantity >= 1`.
///
/// Always evaluated on the post-update pair, regardless of which side a
/// request changed. Quantities are integers; fractional input never reaches
/// this check because the request types reject it at deserialization.
pub fn check_prepared_quantity(quantity: i32, prepared_quantity: i32) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if prepared_quantity < 0 {
        return Err(ServiceError::BadRequest(
            "Prepared quantity cannot be negative".to_string(),
        ));
    }
    if prepared_quantity > quantity {
        return Err(ServiceError::BadRequest(
            "Prepared quantity cannot exceed quantity".to_string(),
        ));
    }
    Ok(())
}

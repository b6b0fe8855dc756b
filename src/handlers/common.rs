use std::str::FromStr;

use chrono::NaiveDate;

use crate::errors::ServiceError;

/// Path and filter ids must be positive; zero and negatives are caller
/// mistakes, not missing rows.
pub fn ensure_positive_id(id: i64, entity: &str) -> Result<i64, ServiceError> {
    if id < 1 {
        return Err(ServiceError::BadRequest(format!("Invalid {entity} id")));
    }
    Ok(id)
}

/// Parses an optional `YYYY-MM-DD` filter value.
pub fn parse_date_filter(
    value: Option<&str>,
    field: &str,
) -> Result<Option<NaiveDate>, ServiceError> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ServiceError::BadRequest(format!("Invalid {field}: expected YYYY-MM-DD"))
            }),
    }
}

/// Parses an optional sort field or direction using the target's `FromStr`,
/// which carries its own `BadRequest` message.
pub fn parse_sort_param<T>(value: Option<&str>) -> Result<Option<T>, ServiceError>
where
    T: FromStr<Err = ServiceError>,
{
    value.map(T::from_str).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortOrder;
    use assert_matches::assert_matches;

    #[test]
    fn positive_ids_pass_through() {
        assert_eq!(ensure_positive_id(1, "kitchen order").unwrap(), 1);
        assert_eq!(ensure_positive_id(i64::MAX, "kitchen order").unwrap(), i64::MAX);
    }

    #[test]
    fn non_positive_ids_are_bad_requests() {
        for id in [0, -1, i64::MIN] {
            let err = ensure_positive_id(id, "kitchen order").unwrap_err();
            assert_eq!(err.to_string(), "Invalid kitchen order id");
        }
    }

    #[test]
    fn date_filter_parses_iso_dates() {
        let parsed = parse_date_filter(Some("2024-03-09"), "createdFrom").unwrap();
        assert_eq!(parsed, Some(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()));
        assert_eq!(parse_date_filter(None, "createdFrom").unwrap(), None);
    }

    #[test]
    fn date_filter_rejects_other_formats() {
        for raw in ["09/03/2024", "2024-3-9x", "yesterday", ""] {
            assert_matches!(
                parse_date_filter(Some(raw), "createdFrom"),
                Err(ServiceError::BadRequest(_)),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn sort_param_uses_target_from_str() {
        let order: Option<SortOrder> = parse_sort_param(Some("DESC")).unwrap();
        assert_eq!(order, Some(SortOrder::Desc));
        let none: Option<SortOrder> = parse_sort_param(None).unwrap();
        assert_eq!(none, None);
        assert!(parse_sort_param::<SortOrder>(Some("no")).is_err());
    }
}

use crate::error::ApiError;

pub const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;
const MAX_OFFSET: i64 = 10_000;

/// Applies defaults and bounds to caller-supplied paging parameters.
pub fn resolve_pagination(limit: Option<i64>, offset: Option<i64>) -> Result<(i64, i64), ApiError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let offset = offset.unwrap_or(0);

    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    if !(0..=MAX_OFFSET).contains(&offset) {
        return Err(ApiError::BadRequest(format!(
            "offset must be between 0 and {MAX_OFFSET}"
        )));
    }

    Ok((limit, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(resolve_pagination(None, None).unwrap(), (DEFAULT_LIMIT, 0));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(resolve_pagination(Some(1), Some(0)).unwrap(), (1, 0));
        assert_eq!(
            resolve_pagination(Some(MAX_LIMIT), Some(MAX_OFFSET)).unwrap(),
            (MAX_LIMIT, MAX_OFFSET)
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(resolve_pagination(Some(0), None), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            resolve_pagination(Some(MAX_LIMIT + 1), None),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(resolve_pagination(None, Some(-1)), Err(ApiError::BadRequest(_))));
    }
}

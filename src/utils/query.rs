use crate::error::{AppError, AppResult};

/// Parses a comma-separated id list such as `"1,2,3"`.
///
/// Blank segments are skipped, so `"1,,2,"` yields `[1, 2]`.
pub fn parse_id_list(param: &str, raw: &str) -> AppResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                AppError::BadRequest(format!(
                    "Invalid value '{}' for '{}': expected comma-separated ids",
                    s, param
                ))
            })
        })
        .collect()
}

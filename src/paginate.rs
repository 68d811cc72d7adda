//! `skip`/`take` pagination.

use crate::{ast::Arg, error::QueryError};

/// Read `skip` and `take` from the arguments. Both default to 0; a `take`
/// of 0 means no limit.
pub fn parse_skip_take(args: &[Arg]) -> Result<(usize, usize), QueryError> {
    let mut skip = 0;
    let mut take = 0;
    for arg in args {
        match arg.key.as_deref() {
            Some("skip") => {
                let n = parse_int("skip", &arg.value)?;
                skip = usize::try_from(n).map_err(|_| {
                    QueryError::validation(format!("skip must be >= 0, got {}", n))
                        .with_detail("param", "skip")
                        .with_detail("value", n)
                })?;
            }
            Some("take") => {
                let n = parse_int("take", &arg.value)?;
                take = usize::try_from(n).ok().filter(|&t| t > 0).ok_or_else(|| {
                    QueryError::validation(format!("take must be > 0, got {}", n))
                        .with_detail("param", "take")
                        .with_detail("value", n)
                })?;
            }
            _ => {}
        }
    }
    Ok((skip, take))
}

fn parse_int(param: &str, value: &str) -> Result<i64, QueryError> {
    value.parse::<i64>().map_err(|_| {
        QueryError::validation(format!("{} must be an integer, got {:?}", param, value))
            .with_detail("param", param)
            .with_detail("value", value)
    })
}

/// Drop the first `skip` items and keep at most `take` of the rest.
///
/// Validation happens before any slicing; a `skip` past the end yields an
/// empty vec.
pub fn paginate_slice<T>(items: Vec<T>, args: &[Arg]) -> Result<Vec<T>, QueryError> {
    let (skip, take) = parse_skip_take(args)?;
    let limit = if take == 0 { usize::MAX } else { take };
    Ok(items.into_iter().skip(skip).take(limit).collect())
}

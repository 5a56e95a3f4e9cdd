//! Ordered-fallback execution shared by the generative endpoint pair
//! and the stock source chain.

use crate::error::{NewswallError, Result};
use futures::future::BoxFuture;

/// Tries `candidates` in order and returns the first success together
/// with the winning candidate's label.
///
/// Every failure is kept: on total failure the caller receives one
/// `(label, error)` pair per candidate, in trial order, so no cause is
/// lost to whichever error happened to come last.
pub async fn first_success<'a, C, T>(
    candidates: &'a [C],
    label: impl Fn(&C) -> String,
    mut attempt: impl FnMut(&'a C) -> BoxFuture<'a, Result<T>>,
) -> std::result::Result<(String, T), Vec<(String, NewswallError)>> {
    let mut causes = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let name = label(candidate);
        match attempt(candidate).await {
            Ok(value) => return Ok((name, value)),
            Err(e) => {
                tracing::warn!(candidate = %name, "attempt failed: {e}");
                causes.push((name, e));
            }
        }
    }

    Err(causes)
}

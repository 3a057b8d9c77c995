//! Short code validation and allocation
//!
//! Accepts a caller-supplied code after validating it, or generates a
//! random 6-character alphanumeric code, retrying on collision. The
//! uniqueness pre-checks here are advisory only: the store's write
//! transaction is the real enforcement point, so a create that loses a
//! race still fails with a conflict even if the pre-check passed.

use rand::{distr::Alphanumeric, Rng};

use crate::error::AppError;
use crate::store::LinkStore;

/// Number of random-generation attempts before giving up
///
/// With 62^6 possible codes, hitting this cap implies near-saturation of
/// the code space or a store outage; it bounds worst-case latency rather
/// than reflecting a realistic collision rate.
const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Length of generated codes
const GENERATED_CODE_LEN: usize = 6;

/// Checks a caller-supplied code against the `[A-Za-z0-9]{6,8}` pattern
pub fn is_valid_code(code: &str) -> bool {
    (6..=8).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Generates a random 6-character code from the 62-character alphanumeric alphabet
pub fn random_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_CODE_LEN)
        .map(char::from)
        .collect()
}

/// Resolves the code to use for a new link
///
/// - `Some(code)`: validated against the pattern, then checked for
///   availability. Fails with `InvalidCode` or `CodeTaken`.
/// - `None`: generate-check-retry up to [`MAX_GENERATION_ATTEMPTS`] times,
///   failing with `AllocationExhausted` if every attempt collides.
pub async fn allocate(
    store: &dyn LinkStore,
    requested: Option<String>,
) -> Result<String, AppError> {
    match requested {
        Some(code) => {
            if !is_valid_code(&code) {
                return Err(AppError::InvalidCode);
            }
            if store.exists(&code).await.map_err(AppError::from)? {
                return Err(AppError::CodeTaken(code));
            }
            Ok(code)
        }
        None => {
            for _ in 0..MAX_GENERATION_ATTEMPTS {
                let code = random_code();
                if !store.exists(&code).await.map_err(AppError::from)? {
                    return Ok(code);
                }
            }
            tracing::error!(
                "random code generation collided {} times in a row",
                MAX_GENERATION_ATTEMPTS
            );
            Err(AppError::AllocationExhausted)
        }
    }
}

//! Entity name -> random seed.

use crate::error::SeedInputError;

/// Derives the seed for an entity as the sum of its character codes.
///
/// Anagrams collide ("ABC" and "CBA" share a seed). Existing runs depend on
/// this exact mapping, so it stays a plain sum.
///
/// # Errors
/// Returns [`SeedInputError`] for an empty name.
pub fn derive_seed(name: &str) -> Result<u64, SeedInputError> {
    if name.is_empty() {
        return Err(SeedInputError);
    }
    Ok(name.chars().map(|c| c as u64).sum())
}

// Catalog name validation (pure, no side effects)

use crate::catalog::types::GameRecord;
use crate::error::CatalogError;

/// Check that `name` is non-empty and not already used by another record.
///
/// `ignore` names a record that may keep its own name (used by rename).
pub fn validate_name(
    games: &[GameRecord],
    name: &str,
    ignore: Option<&str>,
) -> Result<(), CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::EmptyName);
    }
    let taken = games
        .iter()
        .filter(|g| Some(g.name.as_str()) != ignore)
        .any(|g| g.name == name);
    if taken {
        return Err(CatalogError::DuplicateName(name.to_string()));
    }
    Ok(())
}

/// `base` if it is free, otherwise the first free `"<base> (n)"`.
pub fn unique_name(games: &[GameRecord], base: &str) -> String {
    let base = match base.trim() {
        "" => "Untitled",
        trimmed => trimmed,
    };
    if validate_name(games, base, None).is_ok() {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{} ({})", base, n))
        .find(|candidate| validate_name(games, candidate, None).is_ok())
        .unwrap_or_else(|| base.to_string())
}

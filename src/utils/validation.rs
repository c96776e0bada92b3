//! Centralized validation and helper functions.

use std::env;
use std::path::{Path, PathBuf};

/// Exclusive bounds for the identity thresholds (and primary coverage)
pub const IDENTITY_RANGE: (f64, f64) = (50.0, 100.0);

/// Exclusive bounds for the spurious coverage threshold
pub const SPURIOUS_COVERAGE_RANGE: (f64, f64) = (30.0, 100.0);

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{flag} must be between {min:.1} and {max:.1} (exclusive), got {value}")]
    OutOfRange {
        flag: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("could not find {0}")]
    MissingProgram(String),
}

/// Check that `value` lies strictly inside `(min, max)`.
///
/// Boundaries and NaN are rejected; nothing is clamped.
///
/// # Examples
///
/// ```
/// use kpsc_amr::utils::validation::check_open_range;
///
/// assert!(check_open_range("--min", 90.0, (50.0, 100.0)).is_ok());
/// assert!(check_open_range("--min", 50.0, (50.0, 100.0)).is_err());
/// assert!(check_open_range("--min", f64::NAN, (50.0, 100.0)).is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` naming the flag when the value is outside the interval.
pub fn check_open_range(flag: &str, value: f64, (min, max): (f64, f64)) -> Result<(), ValidationError> {
    if min < value && value < max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            flag: flag.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Locate an executable by absolute/relative path or on `PATH`.
///
/// # Errors
///
/// Returns `ValidationError::MissingProgram` when nothing executable is found.
pub fn find_executable(name: &str) -> Result<PathBuf, ValidationError> {
    let path = Path::new(name);
    if path.components().count() > 1 || path.is_absolute() {
        if is_executable(path) {
            return Ok(path.to_path_buf());
        }
        return Err(ValidationError::MissingProgram(name.to_string()));
    }

    if let Some(paths) = env::var_os("PATH") {
        for dir in env::split_paths(&paths) {
            let candidate = dir.join(name);
            if is_executable(&candidate) {
                return Ok(candidate);
            }
        }
    }

    Err(ValidationError::MissingProgram(name.to_string()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

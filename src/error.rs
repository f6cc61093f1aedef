//! Generator error types.
//!
//! Almost every runtime failure in the generator degrades locally (fallback
//! archetype, skipped pickup). Only the cases that would otherwise produce
//! invalid geometry reach the caller through [`GeneratorError`], and they do so
//! at startup or rebuild time, never mid-frame.

use std::fmt;
use std::path::PathBuf;

/// Top-level error enum for the tunnel generator.
#[derive(Debug)]
pub enum GeneratorError {
    /// `start` was called before a traveler was attached.
    MissingTraveler,

    /// A catalog archetype names a content template the library does not have.
    MissingTemplate {
        /// Archetype that referenced the template.
        archetype: String,
        /// Template id that could not be resolved.
        template: String,
    },

    /// A tuning value is outside its usable range.
    InvalidSetting {
        /// Name of the setting (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// Settings JSON could not be parsed.
    SettingsParse(serde_json::Error),

    /// Settings file could not be read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::MissingTraveler => {
                write!(f, "no traveler attached; the generator cannot place rings")
            }
            GeneratorError::MissingTemplate { archetype, template } => write!(
                f,
                "archetype '{}' references unknown content template '{}'",
                archetype, template
            ),
            GeneratorError::InvalidSetting {
                name,
                value,
                expected,
            } => write!(f, "setting '{}' = {} is outside {}", name, value, expected),
            GeneratorError::SettingsParse(err) => write!(f, "invalid settings JSON: {}", err),
            GeneratorError::Io { path, source } => {
                write!(f, "settings file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeneratorError::SettingsParse(err) => Some(err),
            GeneratorError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::SettingsParse(err)
    }
}

/// Convenience alias: a `Result` using `GeneratorError` as the error type.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Returns an error unless `value` is strictly positive.
pub fn require_positive(name: &'static str, value: f32) -> GeneratorResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GeneratorError::InvalidSetting {
            name,
            value,
            expected: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is a probability in `[0, 1]`.
pub fn require_unit(name: &'static str, value: f32) -> GeneratorResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GeneratorError::InvalidSetting {
            name,
            value,
            expected: "[0.0, 1.0]",
        })
    }
}

/// Returns an error when an inclusive `[min, max]` range is inverted.
pub fn require_ordered(name: &'static str, min: u32, max: u32) -> GeneratorResult<()> {
    if min <= max {
        Ok(())
    } else {
        Err(GeneratorError::InvalidSetting {
            name,
            value: min as f32,
            expected: "min <= max",
        })
    }
}

//! Loading of [`PhysicalConstants`] from JSON.
//!
//! The defaults ship embedded as `constants.json`; a file on disk may
//! override any subset of fields. Parsed files are cached by path.

use crate::constants::PhysicalConstants;
use crate::error::{IntegrationError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const EMBEDDED_CONSTANTS_JSON: &str = include_str!("constants.json");

static EMBEDDED_CONSTANTS: Lazy<PhysicalConstants> = Lazy::new(|| {
    match ConstantsParser::parse_str(EMBEDDED_CONSTANTS_JSON) {
        Ok(constants) => constants,
        Err(err) => {
            log::warn!("embedded constants.json unusable ({err}), using built-in values");
            PhysicalConstants::standard()
        }
    }
});

/// Cache for constants files to avoid repeated disk reads
static FILE_CACHE: Lazy<Mutex<HashMap<PathBuf, PhysicalConstants>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

pub struct ConstantsParser;

impl ConstantsParser {
    /// The constants shipped with the crate.
    pub fn embedded() -> PhysicalConstants {
        *EMBEDDED_CONSTANTS
    }

    /// Parse a JSON document. Missing fields take their standard values.
    pub fn parse_str(json_str: &str) -> Result<PhysicalConstants> {
        let constants: PhysicalConstants = serde_json::from_str(json_str)
            .map_err(|e| IntegrationError::ConstantsParse(e.to_string()))?;
        Self::check(&constants)?;
        Ok(constants)
    }

    /// Load constants from a file, using the cache if this path was seen before.
    pub fn load_file<P: AsRef<Path>>(file_path: P) -> Result<PhysicalConstants> {
        let path_buf = file_path.as_ref().to_path_buf();

        if let Some(constants) = Self::cache().get(&path_buf) {
            return Ok(*constants);
        }

        let json_str = fs::read_to_string(&path_buf).map_err(|source| IntegrationError::ConstantsIo {
            path: path_buf.clone(),
            source,
        })?;
        let constants = Self::parse_str(&json_str)?;
        log::debug!("loaded physical constants from {}", path_buf.display());

        Self::cache().insert(path_buf, constants);
        Ok(constants)
    }

    pub fn clear_cache() {
        Self::cache().clear();
    }

    pub fn cache_size() -> usize {
        Self::cache().len()
    }

    fn cache() -> MutexGuard<'static, HashMap<PathBuf, PhysicalConstants>> {
        FILE_CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // every constant divides or scales a physical quantity
    fn check(constants: &PhysicalConstants) -> Result<()> {
        let fields = [
            ("ionization_energy_kev", constants.ionization_energy_kev),
            ("km_to_cm", constants.km_to_cm),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(IntegrationError::ConstantsParse(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{IONIZATION_ENERGY_KEV, KM_TO_CM};
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_embedded_matches_standard() {
        let embedded = ConstantsParser::embedded();
        assert_relative_eq!(embedded.ionization_energy_kev, IONIZATION_ENERGY_KEV);
        assert_relative_eq!(embedded.km_to_cm, KM_TO_CM);
        assert_eq!(embedded, PhysicalConstants::standard());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let constants = ConstantsParser::parse_str(r#"{"ionization_energy_kev": 0.034}"#).unwrap();
        assert_eq!(constants.ionization_energy_kev, 0.034);
        assert_eq!(constants.km_to_cm, KM_TO_CM);
    }

    #[test]
    fn test_rejects_broken_and_non_physical_json() {
        assert!(matches!(
            ConstantsParser::parse_str(r#"{"km_to_cm": "#),
            Err(IntegrationError::ConstantsParse(_))
        ));
        assert!(matches!(
            ConstantsParser::parse_str(r#"{"ionization_energy_kev": 0.0}"#),
            Err(IntegrationError::ConstantsParse(_))
        ));
        assert!(matches!(
            ConstantsParser::parse_str(r#"{"km_to_cm": -1.0}"#),
            Err(IntegrationError::ConstantsParse(_))
        ));
    }

    #[test]
    fn test_file_loading_and_cache() {
        let path = std::env::temp_dir().join(format!(
            "precip_ionization_constants_{}.json",
            std::process::id()
        ));
        {
            let mut file = fs::File::create(&path).unwrap();
            write!(file, r#"{{"ionization_energy_kev": 0.036}}"#).unwrap();
        }

        let first = ConstantsParser::load_file(&path).unwrap();
        assert_eq!(first.ionization_energy_kev, 0.036);
        assert!(ConstantsParser::cache_size() >= 1);

        // cached value survives the file disappearing
        fs::remove_file(&path).unwrap();
        let second = ConstantsParser::load_file(&path).unwrap();
        assert_eq!(first, second);

        ConstantsParser::clear_cache();
        assert!(matches!(
            ConstantsParser::load_file(&path),
            Err(IntegrationError::ConstantsIo { .. })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let original = PhysicalConstants {
            ionization_energy_kev: 0.0345,
            ..PhysicalConstants::standard()
        };
        let json = serde_json::to_string_pretty(&original).unwrap();
        assert_eq!(ConstantsParser::parse_str(&json).unwrap(), original);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ConstantsParser::load_file("/path/that/does/not/exist.json");
        assert!(matches!(result, Err(IntegrationError::ConstantsIo { .. })));
    }
}

//! Loading [`Options`] from the environment, dotenv files, JSON, and YAML.
//!
//! Every loader is all-or-nothing: it starts from [`Options::default`],
//! applies what it finds, validates the result, and either returns a complete
//! configuration or an error. A failed load never leaves a half-applied
//! configuration behind. Whether to fall back to defaults on error is the
//! caller's decision; [`ConfigError::NotFound`] is distinct from parse
//! failures so it can be handled on its own.

use std::{
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use super::{ConfigError, Options};

/// Environment variable for [`Options::sequence_bits`].
pub const ENV_SEQUENCE_BITS: &str = "DATEFLAKE_SEQUENCE_BITS";
/// Environment variable for [`Options::machine_id`].
pub const ENV_MACHINE_ID: &str = "DATEFLAKE_MACHINE_ID";
/// Environment variable for [`Options::machine_bits`].
pub const ENV_MACHINE_BITS: &str = "DATEFLAKE_MACHINE_BITS";
/// Environment variable for [`Options::region_id`].
pub const ENV_REGION_ID: &str = "DATEFLAKE_REGION_ID";
/// Environment variable for [`Options::region_bits`].
pub const ENV_REGION_BITS: &str = "DATEFLAKE_REGION_BITS";
/// Environment variable for [`Options::key_prefix`].
pub const ENV_KEY_PREFIX: &str = "DATEFLAKE_KEY_PREFIX";

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    snowflake: Options,
}

impl Options {
    /// Builds options from `(name, value)` pairs, ignoring unrelated names.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if a recognized variable does not parse,
    /// or any validation error from [`Options::validate`].
    ///
    /// # Example
    ///
    /// ```
    /// use dateflake::Options;
    ///
    /// let options = Options::from_vars([
    ///     ("DATEFLAKE_MACHINE_ID", "7"),
    ///     ("PATH", "/usr/bin"),
    /// ])
    /// .unwrap();
    /// assert_eq!(options.machine_id, 7);
    /// assert_eq!(options.sequence_bits, 11);
    /// ```
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut options = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            match key {
                ENV_SEQUENCE_BITS => options.sequence_bits = parse_var(key, value.into())?,
                ENV_MACHINE_ID => options.machine_id = parse_var(key, value.into())?,
                ENV_MACHINE_BITS => options.machine_bits = parse_var(key, value.into())?,
                ENV_REGION_ID => options.region_id = parse_var(key, value.into())?,
                ENV_REGION_BITS => options.region_bits = parse_var(key, value.into())?,
                ENV_KEY_PREFIX => options.key_prefix = value.into(),
                _ => {}
            }
        }
        options.validate()?;
        Ok(options)
    }

    /// Builds options from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Options::from_vars`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Builds options from a dotenv file without modifying the process
    /// environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] if the file is missing,
    /// [`ConfigError::Io`] if it cannot be read, [`ConfigError::Parse`] if a
    /// line is malformed, and anything [`Options::from_vars`] returns.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let vars = dotenvy::from_path_iter(path)
            .map_err(|err| dotenv_error(path, err))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| dotenv_error(path, err))?;
        Self::from_vars(vars)
    }

    /// Builds options from a JSON document of the form
    /// `{ "snowflake": { "sequenceBits": 11, "machineId": 3, ... } }`.
    ///
    /// Fields missing from the `snowflake` object take their defaults; the
    /// object itself is required. Unknown keys are rejected rather than
    /// ignored, so a misspelled width cannot silently change the layout.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON or unknown keys, and any
    /// validation error.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        file.snowflake.validate()?;
        Ok(file.snowflake)
    }

    /// Reads a JSON configuration file; see [`Options::from_json_str`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] if the file is missing,
    /// [`ConfigError::Io`] if it cannot be read, and anything
    /// [`Options::from_json_str`] returns.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| io_error(path, err))?;
        Self::from_json_str(&json)
    }

    /// Builds options from a YAML document with a `snowflake` section.
    ///
    /// Accepts the same keys as [`Options::from_json_str`], plus the
    /// `idBits`, `machineIdBits`, `regionIdBits` and `cachePrefix` spellings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed YAML or unknown keys, and any
    /// validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use dateflake::Options;
    ///
    /// let options = Options::from_yaml_str(
    ///     "snowflake:\n  idBits: 10\n  machineId: 4\n  cachePrefix: \"orders:\"\n",
    /// )
    /// .unwrap();
    /// assert_eq!(options.sequence_bits, 10);
    /// assert_eq!(options.machine_id, 4);
    /// assert_eq!(options.key_prefix, "orders:");
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_yaml::from_str(yaml).map_err(|err| ConfigError::Parse(err.to_string()))?;
        file.snowflake.validate()?;
        Ok(file.snowflake)
    }

    /// Reads a YAML configuration file such as `config.yaml`; see
    /// [`Options::from_yaml_str`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] if the file is missing,
    /// [`ConfigError::Io`] if it cannot be read, and anything
    /// [`Options::from_yaml_str`] returns.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|err| io_error(path, err))?;
        Self::from_yaml_str(&yaml)
    }
}

fn parse_var<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::InvalidValue {
            key: key.to_owned(),
            value,
        }),
    }
}

fn io_error(path: &Path, source: io::Error) -> ConfigError {
    if source.kind() == io::ErrorKind::NotFound {
        ConfigError::NotFound(PathBuf::from(path))
    } else {
        ConfigError::Io {
            path: PathBuf::from(path),
            source,
        }
    }
}

fn dotenv_error(path: &Path, err: dotenvy::Error) -> ConfigError {
    match err {
        dotenvy::Error::Io(source) => io_error(path, source),
        other => ConfigError::Parse(other.to_string()),
    }
}

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::cli::{CliArgs, CliSources, DocumentType, OcrBackend};
use mrz_fast_validator::Strategy;

const PROJECT_CONFIG_FILE: &str = "mrz-fast.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    document: Option<String>,
    threshold: Option<u8>,
    scale: Option<f32>,
    strategy: Option<String>,
    ocr_backend: Option<String>,
    tessdata_dir: Option<String>,
    ocr_language: Option<String>,
    dump_dir: Option<String>,
}

/// Fully merged runtime settings: CLI values win, file values fill gaps,
/// clap defaults cover the rest.
#[derive(Debug)]
pub struct EffectiveSettings {
    pub document: DocumentType,
    pub threshold: u8,
    pub scale: f32,
    pub strategy: Strategy,
    pub ocr_backend: OcrBackend,
    pub tessdata_dir: Option<PathBuf>,
    pub ocr_language: String,
    pub dump_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    NotFound {
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "failed to parse config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { path, field, value } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "invalid value '{}' for '{}' in {}",
                        value,
                        field,
                        path.display()
                    )
                } else {
                    write!(f, "invalid value '{}' for '{}'", value, field)
                }
            }
            ConfigError::NotFound { path } => {
                write!(f, "config file {} does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
            ConfigError::NotFound { .. } => None,
        }
    }
}

pub fn resolve_settings(
    cli: &CliArgs,
    sources: &CliSources,
) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    merge(cli, sources, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        let path = path.to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        let config = read_config(&path)?;
        return Ok((config, Some(path)));
    }

    let project_path = PathBuf::from(PROJECT_CONFIG_FILE);
    if project_path.exists() {
        let config = read_config(&project_path)?;
        return Ok((config, Some(project_path)));
    }

    if let Some(dirs) = ProjectDirs::from("", "", "mrz-fast") {
        let default_path = dirs.config_dir().join("config.toml");
        if default_path.exists() {
            let config = read_config(&default_path)?;
            return Ok((config, Some(default_path)));
        }
    }

    Ok((FileConfig::default(), None))
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge(
    cli: &CliArgs,
    sources: &CliSources,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<EffectiveSettings, ConfigError> {
    let document = if sources.document_from_cli {
        cli.document
    } else {
        match file.document.as_deref() {
            Some(value) => parse_document(value, config_path.as_deref())?,
            None => cli.document,
        }
    };

    let threshold = if sources.threshold_from_cli {
        cli.threshold
    } else {
        file.threshold.unwrap_or(cli.threshold)
    };

    let scale = if sources.scale_from_cli {
        cli.scale
    } else {
        file.scale.unwrap_or(cli.scale)
    };

    let strategy = if sources.strategy_from_cli {
        cli.strategy.strategy()
    } else {
        match file.strategy.as_deref() {
            Some(value) => parse_strategy(value, config_path.as_deref())?,
            None => cli.strategy.strategy(),
        }
    };

    let ocr_backend = if sources.ocr_backend_from_cli {
        cli.ocr_backend
    } else {
        match file.ocr_backend.as_deref() {
            Some(value) => parse_backend(value, config_path.as_deref())?,
            None => cli.ocr_backend,
        }
    };

    let ocr_language = if sources.ocr_language_from_cli {
        cli.ocr_language.clone()
    } else {
        file.ocr_language.unwrap_or_else(|| cli.ocr_language.clone())
    };

    let tessdata_dir = cli
        .tessdata_dir
        .clone()
        .or_else(|| file.tessdata_dir.map(PathBuf::from));

    let dump_dir = cli
        .dump_dir
        .clone()
        .or_else(|| file.dump_dir.map(PathBuf::from));

    Ok(EffectiveSettings {
        document,
        threshold,
        scale,
        strategy,
        ocr_backend,
        tessdata_dir,
        ocr_language,
        dump_dir,
        config_path,
    })
}

fn parse_document(value: &str, path: Option<&Path>) -> Result<DocumentType, ConfigError> {
    match value {
        "passport" => Ok(DocumentType::Passport),
        "id-card" => Ok(DocumentType::IdCard),
        other => Err(invalid_value("document", other, path)),
    }
}

fn parse_strategy(value: &str, path: Option<&Path>) -> Result<Strategy, ConfigError> {
    match value {
        "pattern" | "pattern-validated" => Ok(Strategy::PatternValidated),
        "equal-length" => Ok(Strategy::EqualLength),
        other => Err(invalid_value("strategy", other, path)),
    }
}

fn parse_backend(value: &str, path: Option<&Path>) -> Result<OcrBackend, ConfigError> {
    match value {
        "auto" => Ok(OcrBackend::Auto),
        "tesseract" => Ok(OcrBackend::Tesseract),
        "noop" => Ok(OcrBackend::Noop),
        other => Err(invalid_value("ocr_backend", other, path)),
    }
}

fn invalid_value(field: &'static str, value: &str, path: Option<&Path>) -> ConfigError {
    ConfigError::InvalidValue {
        path: path.map(Path::to_path_buf),
        field,
        value: value.to_string(),
    }
}

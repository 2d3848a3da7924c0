use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use mrz_fast_preprocess::InterfaceOrientation;
use mrz_fast_types::DocumentFrameSpec;
use mrz_fast_validator::Strategy;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DocumentType {
    Passport,
    IdCard,
}

impl DocumentType {
    pub fn frame_spec(self) -> DocumentFrameSpec {
        match self {
            DocumentType::Passport => DocumentFrameSpec::passport(),
            DocumentType::IdCard => DocumentFrameSpec::id_card(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OcrBackend {
    Auto,
    Tesseract,
    Noop,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    Pattern,
    EqualLength,
}

impl StrategyArg {
    pub fn strategy(self) -> Strategy {
        match self {
            StrategyArg::Pattern => Strategy::PatternValidated,
            StrategyArg::EqualLength => Strategy::EqualLength,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OrientationArg {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl OrientationArg {
    pub fn orientation(self) -> InterfaceOrientation {
        match self {
            OrientationArg::Portrait => InterfaceOrientation::Portrait,
            OrientationArg::PortraitUpsideDown => InterfaceOrientation::PortraitUpsideDown,
            OrientationArg::LandscapeLeft => InterfaceOrientation::LandscapeLeft,
            OrientationArg::LandscapeRight => InterfaceOrientation::LandscapeRight,
        }
    }
}

/// Which CLI values were explicitly provided, so file-config values only
/// fill the gaps instead of being shadowed by clap defaults.
#[derive(Debug, Default)]
pub struct CliSources {
    pub document_from_cli: bool,
    pub threshold_from_cli: bool,
    pub scale_from_cli: bool,
    pub strategy_from_cli: bool,
    pub ocr_backend_from_cli: bool,
    pub ocr_language_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            document_from_cli: value_from_cli(matches, "document"),
            threshold_from_cli: value_from_cli(matches, "threshold"),
            scale_from_cli: value_from_cli(matches, "scale"),
            strategy_from_cli: value_from_cli(matches, "strategy"),
            ocr_backend_from_cli: value_from_cli(matches, "ocr_backend"),
            ocr_language_from_cli: value_from_cli(matches, "ocr_language"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    let command = CliArgs::command();
    let matches = command.get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let sources = CliSources::from_matches(&matches);
    (args, sources)
}

#[derive(Debug, Parser)]
#[command(
    name = "mrz-fast",
    about = "Extract the machine-readable zone from identity document photos",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Document geometry preset
    #[arg(long = "document", value_enum, default_value_t = DocumentType::Passport)]
    pub document: DocumentType,

    /// Binarization threshold (0-255)
    #[arg(long = "threshold", default_value_t = 128)]
    pub threshold: u8,

    /// Uniform upscale factor applied before binarization (>= 1)
    #[arg(long = "scale", default_value_t = 1.0)]
    pub scale: f32,

    /// Line validation heuristic
    #[arg(long = "strategy", value_enum, default_value_t = StrategyArg::Pattern)]
    pub strategy: StrategyArg,

    /// Preferred OCR backend
    #[arg(long = "ocr-backend", id = "ocr_backend", value_enum, default_value_t = OcrBackend::Auto)]
    pub ocr_backend: OcrBackend,

    /// Directory holding the OCR trained-data files
    #[arg(long = "tessdata-dir")]
    pub tessdata_dir: Option<PathBuf>,

    /// Trained-data language/model name
    #[arg(long = "ocr-language", id = "ocr_language", default_value = "ocrb")]
    pub ocr_language: String,

    /// Interface orientation at capture time (landscape-left means the
    /// photo is already upright)
    #[arg(long = "orientation", value_enum, default_value_t = OrientationArg::LandscapeLeft)]
    pub orientation: OrientationArg,

    /// Emit the cropped document image instead of running OCR
    #[arg(long = "crop-only")]
    pub crop_only: bool,

    /// Output path for --crop-only (defaults next to the input)
    #[arg(long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Write intermediate pipeline images (oriented, band, normalized)
    #[arg(long = "dump-dir")]
    pub dump_dir: Option<PathBuf>,

    /// Print the MRZ result as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Run the synthetic camera demo instead of scanning a file
    #[arg(long = "mock")]
    pub mock: bool,

    /// Input photo (PNG/JPEG)
    pub input: Option<PathBuf>,
}

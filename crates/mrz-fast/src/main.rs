use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_stream::StreamExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mrz_fast::cli::parse_cli;
use mrz_fast::engine::build_engine;
use mrz_fast::imageio;
use mrz_fast::mock::MockCamera;
use mrz_fast::pipeline;
use mrz_fast::settings::resolve_settings;
use mrz_fast::{MrzScanner, PhotoCrop, ScanSession, ScannerConfig};
use mrz_fast_ocr::OcrSettings;
use mrz_fast_preprocess::NormalizeOptions;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (cli, sources) = parse_cli();
    let settings = resolve_settings(&cli, &sources)?;
    if let Some(path) = &settings.config_path {
        debug!(path = %path.display(), "loaded configuration file");
    }

    let config = ScannerConfig {
        frame_spec: settings.document.frame_spec(),
        normalize: NormalizeOptions {
            threshold: settings.threshold,
            scale: settings.scale,
        },
        strategy: settings.strategy,
        ocr: OcrSettings::default(),
    };
    let engine = build_engine(&settings)?;
    let scanner = Arc::new(MrzScanner::new(config, engine)?);
    info!(engine = scanner.engine_name(), "pipeline ready");

    if cli.mock {
        return run_mock(scanner).await;
    }

    let Some(input) = cli.input.clone() else {
        return Err("an input photo is required unless --mock is given".into());
    };
    let photo = imageio::load_image(&input)?;
    let orientation = cli.orientation.orientation();

    if cli.crop_only {
        let cropped = scanner
            .capture_photo(photo, orientation, PhotoCrop::Document)
            .await?;
        let out = cli.out.clone().unwrap_or_else(|| default_out(&input));
        imageio::save_image(&cropped, &out)?;
        println!("cropped document written to {}", out.display());
        return Ok(());
    }

    if let Some(dir) = &settings.dump_dir {
        let stages = pipeline::prepare_photo(scanner.config(), &photo, orientation)?;
        imageio::dump_stages(dir, &stages)?;
    }

    let result = scanner.scan_photo(photo, orientation).await?;
    if result.is_empty() {
        println!("no MRZ found");
    } else if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.text());
    }
    Ok(())
}

async fn run_mock(scanner: Arc<MrzScanner>) -> Result<(), Box<dyn Error>> {
    let camera = MockCamera::default();
    let (handle, mut results) = ScanSession::spawn(Box::new(camera), scanner);

    let mut emitted = 0usize;
    while let Some(item) = results.next().await {
        match item {
            Ok(result) => {
                emitted += 1;
                println!("mrz ({} lines):\n{}", result.line_count(), result.text());
                if emitted >= 3 {
                    handle.stop();
                }
            }
            Err(err) => {
                eprintln!("camera error: {err}");
                break;
            }
        }
    }

    println!("mock session complete ({emitted} results)");
    Ok(())
}

fn default_out(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string());
    input.with_file_name(format!("{stem}-cropped.png"))
}

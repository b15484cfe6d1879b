#![deny(missing_docs)]

//! # Generate Command
//!
//! Implements the pipeline: fetch -> patch -> parse -> emit -> write.
//!
//! 1. **Fetch**: one blocking GET of the upstream document (or a local file
//!    with `--input`).
//! 2. **Patch**: version downgrade plus structural schema/response repair.
//! 3. **Parse**: the corrected document through the downstream parser.
//! 4. **Emit**: one client source file per selected language.

use crate::error::{CliError, CliResult};
use crate::fetch;
use apigen_core::{CSharpGenerator, ClientGenerator, PythonGenerator, Settings};
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// URL of the upstream OpenAPI document.
    #[clap(long, default_value = fetch::DEFAULT_UPSTREAM_URL)]
    pub url: String,

    /// Read the upstream document from a local file instead of fetching.
    #[clap(long)]
    pub input: Option<PathBuf>,

    /// Directory receiving the generated client sources.
    #[clap(long, default_value = "clients")]
    pub output_dir: PathBuf,

    /// Target language selection.
    #[clap(long, value_enum, default_value_t = Language::All)]
    pub language: Language,

    /// Also write the corrected OpenAPI document to this path.
    #[clap(long)]
    pub patched_spec_out: Option<PathBuf>,
}

/// Selectable client targets.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Emit every supported client.
    All,
    /// Emit the C# client only.
    Csharp,
    /// Emit the Python client only.
    Python,
}

/// Executes the generation pipeline.
pub fn execute(args: &GenerateArgs) -> CliResult<()> {
    // 1. Obtain the raw upstream text
    let raw = match &args.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| CliError::General(format!("Failed to read input file {:?}: {}", path, e)))?,
        None => fetch::fetch_document(&args.url)?,
    };

    // 2. Patch
    let patched = apigen_core::patch_document(&raw)?;

    if let Some(path) = &args.patched_spec_out {
        write_file(path, &patched)?;
        log::info!("Wrote corrected document to {:?}", path);
    }

    // 3. Parse
    let api = apigen_core::parse_api_document(&patched)?;
    log::info!(
        "Parsed '{}' v{}: {} operations",
        api.title,
        api.version,
        api.operations.len()
    );

    // 4. Emit and write
    let settings = Settings::default();

    for generator in selected_generators(args.language) {
        let code = generator.generate(&api, &settings)?;
        let path = args.output_dir.join(generator.file_name(&settings));
        write_file(&path, &code)?;
        log::info!("Generated {} client at {:?}", generator.language(), path);
    }

    Ok(())
}

fn selected_generators(language: Language) -> Vec<Box<dyn ClientGenerator>> {
    match language {
        Language::All => vec![Box::new(CSharpGenerator), Box::new(PythonGenerator)],
        Language::Csharp => vec![Box::new(CSharpGenerator)],
        Language::Python => vec![Box::new(PythonGenerator)],
    }
}

fn write_file(path: &Path, contents: &str) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, contents)?;
    Ok(())
}

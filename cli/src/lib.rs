use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use silhouette::{DirectorySink, Pipeline, ResizePolicy, TraceConfig, TraceError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::{Display, EnumString, VariantNames};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    TraceError(#[from] TraceError),
    #[error("No input images given")]
    NoInputs,
    #[error("Inputs '{first}' and '{second}' would both write {}", path.display())]
    DuplicateOutput {
        path: PathBuf,
        first: String,
        second: String,
    },
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// What gets written for each traced image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[derive(Display, EnumString, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Vector document with the compound path
    #[default]
    Svg,
    /// Contour tree as a feature collection
    GeoJson,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::GeoJson => "geojson",
        }
    }
}

/// Batch tracing job
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JobConfig {
    /// Image files to trace
    #[serde(default)]
    pub inputs: Vec<String>,
    pub output_dir: String,
    #[serde(default)]
    pub format: OutputFormat,
    /// Write intermediate rasters here, one prefix per input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_dir: Option<String>,
    #[serde(default)]
    pub trace: TraceConfig,
}

/// Command-line values that take precedence over a job file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub inputs: Vec<String>,
    pub output_dir: Option<String>,
    pub format: Option<OutputFormat>,
    pub debug_dir: Option<String>,
    pub policy: Option<ResizePolicy>,
    pub bound: Option<u32>,
    pub tolerance: Option<f64>,
    pub native_resolution: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: ".".to_string(),
            format: OutputFormat::default(),
            debug_dir: None,
            trace: TraceConfig::default(),
        }
    }
}

impl JobConfig {
    /// Load JobConfig configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load JobConfig configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        let job: JobConfig = toml::from_str(content)?;
        Ok(job)
    }

    /// Load JobConfig configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load JobConfig configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        let job: JobConfig = serde_json::from_str(content)?;
        Ok(job)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Convert JobConfig to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        let toml = toml::to_string_pretty(&self)?;
        Ok(toml)
    }

    /// Convert JobConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// JSON schema of the job file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(JobConfig)
    }

    /// Apply command-line values. Inputs given on the command line are
    /// appended to those from the file.
    pub fn apply(mut self, overrides: Overrides) -> Self {
        self.inputs.extend(overrides.inputs);
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        if overrides.debug_dir.is_some() {
            self.debug_dir = overrides.debug_dir;
        }
        if let Some(policy) = overrides.policy {
            self.trace.resize_policy = policy;
        }
        if let Some(bound) = overrides.bound {
            self.trace.target_bound = bound;
        }
        if let Some(tolerance) = overrides.tolerance {
            self.trace.simplify_tolerance_factor = tolerance;
        }
        if overrides.native_resolution {
            self.trace.raster_bound = None;
        }
        self
    }

    /// Reject empty jobs and inputs whose outputs (and debug prefixes) would
    /// collide, e.g. `logos/a.png` and `art/a.jpg`.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.inputs.is_empty() {
            return Err(CliError::NoInputs);
        }

        let mut seen: HashMap<PathBuf, &str> = HashMap::new();
        for input in &self.inputs {
            let path = self.output_path_for(Path::new(input));
            if let Some(first) = seen.insert(path.clone(), input.as_str()) {
                return Err(CliError::DuplicateOutput {
                    path,
                    first: first.to_string(),
                    second: input.clone(),
                });
            }
        }
        Ok(())
    }

    /// `<output_dir>/<input stem>.<ext>`
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        Path::new(&self.output_dir).join(format!("{}.{}", stem, self.format.extension()))
    }
}

/// Result of tracing one input of a job
#[derive(Debug)]
pub struct TraceOutcome {
    pub input: String,
    pub result: Result<PathBuf, CliError>,
}

impl TraceOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Trace every input of `job` in parallel.
///
/// Job-level problems (no inputs, colliding outputs, unwritable output
/// directory) fail the whole run; a failing image only fails its own outcome.
pub fn run_job(job: &JobConfig) -> Result<Vec<TraceOutcome>, CliError> {
    job.validate()?;
    fs::create_dir_all(&job.output_dir)?;

    let outcomes = job
        .inputs
        .par_iter()
        .map(|input| TraceOutcome {
            input: input.clone(),
            result: trace_one(job, Path::new(input)),
        })
        .collect();

    Ok(outcomes)
}

/// Trace a single image and write it in the job's output format.
pub fn trace_one(job: &JobConfig, input: &Path) -> Result<PathBuf, CliError> {
    let mut builder = Pipeline::builder().with_config(job.trace.clone());
    if let Some(dir) = &job.debug_dir {
        let prefix = input
            .file_stem()
            .map(|s| format!("{}_", s.to_string_lossy()))
            .unwrap_or_default();
        builder = builder.with_diagnostics(Arc::new(DirectorySink::new(dir).with_prefix(prefix)));
    }
    let pipeline = builder.build();

    let output = pipeline.process_file(input)?;
    if output.is_blank() {
        tracing::warn!("{}: no foreground found, writing background only", input.display());
    }

    let target = job.output_path_for(input);
    match job.format {
        OutputFormat::Svg => output.document.save_svg(&target)?,
        OutputFormat::GeoJson => output.contours.save_geojson(&target)?,
    }
    Ok(target)
}

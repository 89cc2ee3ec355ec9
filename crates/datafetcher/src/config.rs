use crate::error::{Error, Result};
use lazy_static::lazy_static;
use models::Palette;
use regex::Regex;
use std::path::PathBuf;

/// Catalog the subject and course pages are fetched from
pub const DEFAULT_BASE_URL: &str = "http://www.drps.ed.ac.uk/17-18/dpt/";
/// Subjects crawled when none are configured
pub const DEFAULT_SUBJECTS: &[&str] = &["easc"];
/// Directory holding one raw file per fetched page
pub const DEFAULT_CACHE_DIR: &str = "./data/cache";
/// Intermediate adjacency matrix; its presence skips crawling
pub const DEFAULT_MATRIX_FILE: &str = "./data/output/adjacency_matrix.csv";
/// Final hierarchy export
pub const DEFAULT_OUTPUT_FILE: &str = "./data/output/hierarchy.json";
/// Four uppercase letters followed by at least four digits
pub const DEFAULT_CODE_PATTERN: &str = r"[A-Z]{4}\d{4,}";
pub const DEFAULT_REQUIRED_MARKER: &str = "MUST";
pub const DEFAULT_RECOMMENDED_MARKER: &str = "RECOMMEND";

lazy_static! {
    static ref COURSE_CODE: Regex = Regex::new(DEFAULT_CODE_PATTERN).unwrap();
}

/// Markup conventions of the catalog being scraped
#[derive(Debug, Clone)]
pub struct Markup {
    pub code_pattern: Regex,
    pub required_marker: String,
    pub recommended_marker: String,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            code_pattern: COURSE_CODE.clone(),
            required_marker: DEFAULT_REQUIRED_MARKER.to_string(),
            recommended_marker: DEFAULT_RECOMMENDED_MARKER.to_string(),
        }
    }
}

/// Runtime settings of the hierarchy builder
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub subjects: Vec<String>,
    pub cache_dir: PathBuf,
    pub matrix_file: PathBuf,
    pub output_file: PathBuf,
    pub palette: Palette,
    /// Whether predecessors of the listed courses are crawled as well
    pub recurse: bool,
    pub markup: Markup,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            matrix_file: PathBuf::from(DEFAULT_MATRIX_FILE),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            palette: Palette::default(),
            recurse: false,
            markup: Markup::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment, after loading `.env`
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup, using defaults for unset keys
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of a variable, or `None` if it is unset
    ///
    /// # Returns
    /// The configuration, or [`Error::Config`] if a value cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Config::default();

        if let Some(base_url) = get("CATALOG_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(subjects) = get("CATALOG_SUBJECTS") {
            config.subjects = subjects
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(dir) = get("CATALOG_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(file) = get("CATALOG_MATRIX_FILE") {
            config.matrix_file = PathBuf::from(file);
        }
        if let Some(file) = get("CATALOG_OUTPUT_FILE") {
            config.output_file = PathBuf::from(file);
        }
        if let Some(palette) = get("CATALOG_PALETTE") {
            config.palette = palette.parse().map_err(|_| {
                let known: Vec<String> = Palette::all().iter().map(Palette::to_string).collect();
                Error::Config(format!(
                    "Unknown palette: {palette} (expected one of {})",
                    known.join(", ")
                ))
            })?;
        }
        if let Some(recurse) = get("CATALOG_RECURSE") {
            config.recurse = parse_bool(&recurse)
                .ok_or_else(|| Error::Config(format!("CATALOG_RECURSE is not a boolean: {recurse}")))?;
        }
        if let Some(pattern) = get("CATALOG_CODE_PATTERN") {
            config.markup.code_pattern = Regex::new(&pattern)
                .map_err(|e| Error::Config(format!("Invalid course code pattern: {e}")))?;
        }
        if let Some(marker) = get("CATALOG_REQUIRED_MARKER") {
            config.markup.required_marker = marker;
        }
        if let Some(marker) = get("CATALOG_RECOMMENDED_MARKER") {
            config.markup.recommended_marker = marker;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

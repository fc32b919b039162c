use crate::languages::{parse_language_list, LanguageEntry, DEFAULT_LANGUAGES};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Azure Translator accepts at most this many texts per request.
pub const MAX_BATCH_SIZE: usize = 1000;

pub const DEFAULT_TRANSLATOR_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";

#[derive(Debug, Clone)]
pub struct Config {
    // Azure Translator
    pub translator_key: String,
    pub translator_endpoint: String,
    pub translator_region: Option<String>,
    pub translator_max_attempts: u32,
    pub batch_size: usize,

    // Paths
    pub source_path: PathBuf,
    pub output_path: PathBuf,

    // Languages
    pub source_language: String,
    pub languages: Vec<LanguageEntry>,

    // Packaging
    pub target_version: String,
    pub package: PackageSettings,
}

/// Values baked into the generated project, solution and readme files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSettings {
    /// Output folder and project name prefix ("Oqtane.Translations" -> "Oqtane.Translations.af-ZA")
    pub name_prefix: String,
    /// Location of the resource tree inside each package folder
    pub resource_subpath: PathBuf,
    /// Assembly name and package id prefix
    pub assembly_prefix: String,
    /// Namespace used for the embedded resources' logical names
    pub root_namespace: String,
    pub target_framework: String,
    pub authors: String,
    pub product_name: String,
    /// Where the readme tells users to drop the `.nupkg`
    pub install_path: String,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            name_prefix: "Oqtane.Translations".to_string(),
            resource_subpath: PathBuf::from("Oqtane.Client").join("Resources"),
            assembly_prefix: "Oqtane.Translation".to_string(),
            root_namespace: "Oqtane.Client".to_string(),
            target_framework: "net9.0".to_string(),
            authors: "Spot".to_string(),
            product_name: "Oqtane Framework".to_string(),
            install_path: "Oqtane.Server/wwwroot/Packages".to_string(),
        }
    }
}

impl PackageSettings {
    /// Package (and output folder) name for a culture code.
    pub fn package_name(&self, culture_code: &str) -> String {
        format!("{}.{}", self.name_prefix, culture_code)
    }

    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name_prefix: env_or("PACKAGE_PREFIX", defaults.name_prefix),
            resource_subpath: std::env::var("RESOURCE_SUBPATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.resource_subpath),
            assembly_prefix: env_or("ASSEMBLY_PREFIX", defaults.assembly_prefix),
            root_namespace: env_or("ROOT_NAMESPACE", defaults.root_namespace),
            target_framework: env_or("TARGET_FRAMEWORK", defaults.target_framework),
            authors: env_or("PACKAGE_AUTHORS", defaults.authors),
            product_name: env_or("PRODUCT_NAME", defaults.product_name),
            install_path: env_or("PACKAGE_INSTALL_PATH", defaults.install_path),
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

/// Parse a numeric variable, failing loudly on garbage instead of silently
/// using the default.
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            // Azure Translator
            translator_key: std::env::var("TRANSLATOR_KEY").context("TRANSLATOR_KEY not set")?,
            translator_endpoint: std::env::var("TRANSLATOR_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_TRANSLATOR_ENDPOINT.to_string()),
            translator_region: std::env::var("TRANSLATOR_REGION")
                .ok()
                .filter(|r| !r.trim().is_empty()),
            translator_max_attempts: env_parse("TRANSLATOR_MAX_ATTEMPTS", 1)?,
            batch_size: env_parse("TRANSLATION_BATCH_SIZE", MAX_BATCH_SIZE)?,

            // Paths
            source_path: std::env::var("SOURCE_RESOURCES_PATH")
                .map(PathBuf::from)
                .context("SOURCE_RESOURCES_PATH not set")?,
            output_path: std::env::var("OUTPUT_BASE_PATH")
                .map(PathBuf::from)
                .context("OUTPUT_BASE_PATH not set")?,

            // Languages
            source_language: std::env::var("SOURCE_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            languages: parse_language_list(
                &std::env::var("LANGUAGES").unwrap_or_else(|_| DEFAULT_LANGUAGES.to_string()),
            )
            .context("LANGUAGES is invalid")?,

            // Packaging
            target_version: std::env::var("TARGET_VERSION").unwrap_or_else(|_| "6.1.3".to_string()),
            package: PackageSettings::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.translator_key.trim().is_empty() {
            bail!("TRANSLATOR_KEY is empty");
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            bail!(
                "TRANSLATION_BATCH_SIZE must be between 1 and {}, got {}",
                MAX_BATCH_SIZE,
                self.batch_size
            );
        }
        if self.translator_max_attempts == 0 {
            bail!("TRANSLATOR_MAX_ATTEMPTS must be at least 1");
        }
        if self.target_version.trim().is_empty() {
            bail!("TARGET_VERSION is empty");
        }
        Ok(())
    }

    /// Languages to translate into, in configured order, without the source language.
    pub fn target_languages(&self) -> impl Iterator<Item = &LanguageEntry> {
        self.languages
            .iter()
            .filter(move |lang| !lang.is_source(&self.source_language))
    }
}

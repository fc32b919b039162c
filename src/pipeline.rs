//! One full run: scan once, then translate, rewrite and scaffold each target
//! language in turn.

use crate::config::Config;
use crate::rewriter::rewrite_tree;
use crate::scaffold::{write_package_files, PackageFiles};
use crate::scanner::collect_distinct_values;
use crate::translation::{translate_distinct_values, TranslationService, TranslationStats};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// What a run produced for one target language.
#[derive(Debug, Clone)]
pub struct LanguageReport {
    pub culture_code: String,
    /// Package root: `{output}/{prefix}.{culture}`
    pub output_dir: PathBuf,
    /// Translated resource files written under the package's resource subpath
    pub files_written: Vec<PathBuf>,
    pub package: PackageFiles,
    pub stats: TranslationStats,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub distinct_values: usize,
    pub files_scanned: usize,
    pub skipped: Vec<PathBuf>,
    pub languages: Vec<LanguageReport>,
}

impl RunReport {
    pub fn failed_batches(&self) -> usize {
        self.languages.iter().map(|l| l.stats.failed_batches).sum()
    }
}

/// Run the whole job against `service`.
///
/// Translation failures never abort the run; filesystem errors do.
pub async fn run<S: TranslationService>(config: &Config, service: &S) -> Result<RunReport> {
    info!("Scanning {}", config.source_path.display());
    let scan = collect_distinct_values(&config.source_path)?;
    info!(
        "Found {} distinct values in {} files",
        scan.values.len(),
        scan.files_scanned
    );
    if !scan.skipped.is_empty() {
        warn!("Skipped {} unreadable resource files", scan.skipped.len());
    }

    let mut report = RunReport {
        distinct_values: scan.values.len(),
        files_scanned: scan.files_scanned,
        skipped: scan.skipped.clone(),
        languages: Vec::new(),
    };

    for language in config.target_languages() {
        let culture = language.culture_code.as_str();
        info!("Processing {} ({})", language.name, culture);

        let (map, stats) = translate_distinct_values(
            service,
            scan.values.as_slice(),
            &config.source_language,
            language.target_language(),
            config.batch_size,
        )
        .await;
        info!("Translated distinct values for {}", culture);
        if stats.failed_batches > 0 {
            warn!(
                "{}: {} of {} batches failed, {:.1}% of values translated",
                culture,
                stats.failed_batches,
                stats.batches,
                stats.success_rate()
            );
        }

        let package_name = config.package.package_name(culture);
        let output_dir = config.output_path.join(&package_name);
        let resource_dir = output_dir.join(&config.package.resource_subpath);

        let files_written = rewrite_tree(&config.source_path, &resource_dir, culture, &map)
            .with_context(|| format!("Failed to write resources for {}", culture))?;

        let package = write_package_files(
            &output_dir,
            &package_name,
            culture,
            &config.target_version,
            &config.package,
        )
        .with_context(|| format!("Failed to write package files for {}", culture))?;

        report.languages.push(LanguageReport {
            culture_code: culture.to_string(),
            output_dir,
            files_written,
            package,
            stats,
        });
    }

    info!("Translation and file creation completed.");
    Ok(report)
}

//! Produce culture-specific copies of a resource tree.
//!
//! Values are replaced textually: each `<value>…</value>` span is looked up by
//! its decoded text and, when the map has a different translation, the span's
//! inner text is swapped for the escaped translation. Everything outside the
//! replaced spans is written back byte for byte.

use crate::resx::{escape_value, is_resx_file, unescape_value};
use crate::scanner::walk_tree;
use crate::translation::TranslationMap;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const VALUE_OPEN: &str = "<value>";
const VALUE_CLOSE: &str = "</value>";

/// Replace every delimited value that has a translation in `map`.
///
/// Spans are processed in a single left-to-right pass, so a translated value is
/// never matched again. Spans containing nested markup are left alone.
pub fn rewrite_content(content: &str, map: &TranslationMap) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(open) = rest.find(VALUE_OPEN) {
        let inner_start = open + VALUE_OPEN.len();
        let Some(inner_len) = rest[inner_start..].find(VALUE_CLOSE) else {
            break;
        };
        let inner = &rest[inner_start..inner_start + inner_len];

        out.push_str(&rest[..inner_start]);
        match translation_for(inner, map) {
            Some(translated) => out.push_str(&escape_value(translated)),
            None => out.push_str(inner),
        }
        out.push_str(VALUE_CLOSE);

        rest = &rest[inner_start + inner_len + VALUE_CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

fn translation_for<'m>(inner: &str, map: &'m TranslationMap) -> Option<&'m str> {
    if inner.is_empty() || inner.contains('<') {
        return None;
    }
    let source = unescape_value(inner).ok()?;
    map.get(&source).filter(|translated| *translated != source)
}

/// `Login.resx` + `af-ZA` -> `Login.af-ZA.resx`
pub fn localized_file_name(path: &Path, culture_code: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => Some(format!("{}.{}.{}", stem, culture_code, ext)),
        None => Some(format!("{}.{}", stem, culture_code)),
    }
}

/// Mirror `source` under `destination`, writing a translated copy of every
/// resource file. Every subdirectory is recreated, including ones without
/// resource files. Returns the paths of the files written.
///
/// Entries that cannot be accessed or read are skipped with a warning, as
/// during the scan. Failing to write output is an error.
pub fn rewrite_tree(
    source: &Path,
    destination: &Path,
    culture_code: &str,
    map: &TranslationMap,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for entry in walk_tree(source) {
        let relative = entry
            .path()
            .strip_prefix(source)
            .context("Walked path is outside the source tree")?;

        if entry.file_type().is_dir() {
            let dir = destination.join(relative);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            continue;
        }

        if !entry.file_type().is_file() || !is_resx_file(entry.path()) {
            continue;
        }

        let file_name = localized_file_name(entry.path(), culture_code).with_context(|| {
            format!("Unsupported file name: {}", entry.path().display())
        })?;
        let target = match relative.parent() {
            Some(parent) => destination.join(parent).join(file_name),
            None => destination.join(file_name),
        };

        let bytes = match fs::read(entry.path()) {
            Ok(b) => b,
            Err(e) => {
                warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        rewrite_file(entry.path(), bytes, &target, map)?;
        info!("Created {}", target.display());
        written.push(target);
    }

    Ok(written)
}

fn rewrite_file(source: &Path, bytes: Vec<u8>, target: &Path, map: &TranslationMap) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let output = match String::from_utf8(bytes) {
        Ok(content) => rewrite_content(&content, map).into_bytes(),
        Err(e) => {
            warn!(
                "{} is not valid UTF-8, copying without translation",
                source.display()
            );
            e.into_bytes()
        }
    };

    fs::write(target, output).with_context(|| format!("Failed to write {}", target.display()))
}

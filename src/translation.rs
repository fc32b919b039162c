//! Translation of the distinct value set, one target language at a time.
//!
//! Values are sent to a [`TranslationService`] in bounded batches. A batch that
//! fails for any reason is not fatal: every value in it maps to itself, so the
//! resulting [`TranslationMap`] always covers the full input.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// One translation alternative returned for a source text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranslationAlternative {
    pub text: String,
    /// Language the text was translated to, if the service reports it
    #[serde(default)]
    pub to: Option<String>,
}

/// Translation result for one source text, positionally matched to the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslationResult {
    #[serde(default)]
    pub translations: Vec<TranslationAlternative>,
}

impl TranslationResult {
    /// Convenience constructor for a single translation.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            translations: vec![TranslationAlternative {
                text: text.into(),
                to: None,
            }],
        }
    }

    /// First translation alternative, if any.
    pub fn best(&self) -> Option<&str> {
        self.translations.first().map(|t| t.text.as_str())
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("failed to send translation request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translator API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("translator rate limit exceeded: {body}")]
    RateLimited {
        /// Wait requested by the service's `Retry-After` header
        retry_after: Option<std::time::Duration>,
        body: String,
    },

    #[error("failed to parse translator response: {0}")]
    Decode(String),
}

/// A remote machine-translation service.
#[allow(async_fn_in_trait)]
pub trait TranslationService {
    /// Translate `texts` from `from` to `to`.
    ///
    /// The returned results must be positionally aligned with `texts`.
    async fn translate_batch(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<TranslationResult>, TranslateError>;
}

/// Source text -> translated text for one target language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    entries: HashMap<String, String>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, translated: impl Into<String>) {
        self.entries.insert(source.into(), translated.into());
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every value has an entry.
    pub fn covers<'a>(&self, values: impl IntoIterator<Item = &'a String>) -> bool {
        values.into_iter().all(|v| self.entries.contains_key(v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Counters for one language's translation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Number of batches sent to the service
    pub batches: usize,

    /// Number of batches that failed and fell back to the source text
    pub failed_batches: usize,

    /// Values that received a translation from the service
    pub translated: usize,

    /// Values left in the source language (failed batch or empty result)
    pub untranslated: usize,
}

impl TranslationStats {
    /// Share of values that received a translation, as a percentage (0-100).
    pub fn success_rate(&self) -> f64 {
        let total = self.translated + self.untranslated;
        if total == 0 {
            return 0.0;
        }
        (self.translated as f64 / total as f64) * 100.0
    }
}

/// Translate `values` into `target_language`, `batch_size` values per request.
///
/// Batches are sent one after another. Every value ends up in the returned map:
/// values without a translation map to themselves.
pub async fn translate_distinct_values<S: TranslationService>(
    service: &S,
    values: &[String],
    source_language: &str,
    target_language: &str,
    batch_size: usize,
) -> (TranslationMap, TranslationStats) {
    let mut map = TranslationMap::new();
    let mut stats = TranslationStats::default();

    for batch in values.chunks(batch_size.max(1)) {
        stats.batches += 1;
        debug!(
            "Translating batch {} ({} values) to {}",
            stats.batches,
            batch.len(),
            target_language
        );

        match service
            .translate_batch(batch, source_language, target_language)
            .await
        {
            Ok(results) => {
                if results.len() != batch.len() {
                    warn!(
                        "Translator returned {} results for {} values ({}); missing positions stay untranslated",
                        results.len(),
                        batch.len(),
                        target_language
                    );
                }

                for (i, source) in batch.iter().enumerate() {
                    match results.get(i).and_then(TranslationResult::best) {
                        Some(text) => {
                            stats.translated += 1;
                            map.insert(source.as_str(), text);
                        }
                        None => {
                            stats.untranslated += 1;
                            map.insert(source.as_str(), source.as_str());
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Error translating batch to {}: {}", target_language, e);
                stats.failed_batches += 1;
                stats.untranslated += batch.len();
                for source in batch {
                    map.insert(source.as_str(), source.as_str());
                }
            }
        }
    }

    (map, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Uppercases every text; records the batch sizes it sees.
    #[derive(Default)]
    struct UppercaseService {
        batches: Mutex<Vec<usize>>,
    }

    impl TranslationService for UppercaseService {
        async fn translate_batch(
            &self,
            texts: &[String],
            _from: &str,
            _to: &str,
        ) -> Result<Vec<TranslationResult>, TranslateError> {
            self.batches.lock().unwrap().push(texts.len());
            Ok(texts
                .iter()
                .map(|t| TranslationResult::single(t.to_uppercase()))
                .collect())
        }
    }

    /// Fails the batch with the given 1-based index, uppercases the rest.
    struct FailingService {
        fail_batch: usize,
        calls: Mutex<usize>,
    }

    impl TranslationService for FailingService {
        async fn translate_batch(
            &self,
            texts: &[String],
            _from: &str,
            _to: &str,
        ) -> Result<Vec<TranslationResult>, TranslateError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == self.fail_batch {
                return Err(TranslateError::Api {
                    status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                    body: "quota exceeded".to_string(),
                });
            }
            Ok(texts
                .iter()
                .map(|t| TranslationResult::single(t.to_uppercase()))
                .collect())
        }
    }

    /// Returns canned results regardless of input.
    struct CannedService(Vec<TranslationResult>);

    impl TranslationService for CannedService {
        async fn translate_batch(
            &self,
            _texts: &[String],
            _from: &str,
            _to: &str,
        ) -> Result<Vec<TranslationResult>, TranslateError> {
            Ok(self.0.clone())
        }
    }

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_translates_every_value() {
        let service = UppercaseService::default();
        let input = values(&["Hello", "Save", "Cancel"]);

        let (map, stats) = translate_distinct_values(&service, &input, "en", "af", 1000).await;

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("Hello"), Some("HELLO"));
        assert_eq!(map.get("Save"), Some("SAVE"));
        assert_eq!(map.get("Cancel"), Some("CANCEL"));
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.translated, 3);
        assert_eq!(stats.failed_batches, 0);
    }

    #[tokio::test]
    async fn test_splits_into_batches() {
        let service = UppercaseService::default();
        let input: Vec<String> = (0..7).map(|i| format!("value {}", i)).collect();

        let (map, stats) = translate_distinct_values(&service, &input, "en", "af", 3).await;

        assert_eq!(*service.batches.lock().unwrap(), vec![3, 3, 1]);
        assert_eq!(stats.batches, 3);
        assert!(map.covers(&input));
    }

    #[tokio::test]
    async fn test_failed_batch_falls_back_to_source() {
        let service = FailingService {
            fail_batch: 2,
            calls: Mutex::new(0),
        };
        let input = values(&["a", "b", "c", "d", "e"]);

        let (map, stats) = translate_distinct_values(&service, &input, "en", "af", 2).await;

        assert!(map.covers(&input), "every value must be present");
        assert_eq!(map.get("a"), Some("A"));
        assert_eq!(map.get("b"), Some("B"));
        assert_eq!(map.get("c"), Some("c"));
        assert_eq!(map.get("d"), Some("d"));
        assert_eq!(map.get("e"), Some("E"));
        assert_eq!(stats.batches, 3);
        assert_eq!(stats.failed_batches, 1);
        assert_eq!(stats.translated, 3);
        assert_eq!(stats.untranslated, 2);
    }

    #[tokio::test]
    async fn test_every_batch_failing_is_identity() {
        let service = FailingService {
            fail_batch: 1,
            calls: Mutex::new(0),
        };
        let input = values(&["Hello", "World"]);

        let (map, stats) = translate_distinct_values(&service, &input, "en", "af", 10).await;

        assert_eq!(map.get("Hello"), Some("Hello"));
        assert_eq!(map.get("World"), Some("World"));
        assert!((stats.success_rate() - 0.0).abs() < f64::EPSILON);
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_failed_batch_is_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let service = FailingService {
            fail_batch: 1,
            calls: Mutex::new(0),
        };
        let input = values(&["Hello"]);

        let (map, _) = translate_distinct_values(&service, &input, "en", "af", 10).await;

        assert_eq!(map.get("Hello"), Some("Hello"));
        let output = logs.contents();
        assert!(
            output.contains("Error translating batch to af"),
            "missing diagnostic in: {}",
            output
        );
        assert!(output.contains("quota exceeded"));
        assert!(output.contains("WARN"));
    }

    #[tokio::test]
    async fn test_takes_first_alternative() {
        let service = CannedService(vec![TranslationResult {
            translations: vec![
                TranslationAlternative {
                    text: "Hallo".to_string(),
                    to: Some("af".to_string()),
                },
                TranslationAlternative {
                    text: "Goeie dag".to_string(),
                    to: Some("af".to_string()),
                },
            ],
        }]);
        let input = values(&["Hello"]);

        let (map, _) = translate_distinct_values(&service, &input, "en", "af", 10).await;

        assert_eq!(map.get("Hello"), Some("Hallo"));
    }

    #[tokio::test]
    async fn test_missing_alternatives_fall_back() {
        let service = CannedService(vec![
            TranslationResult::default(),
            TranslationResult::single("Stoor"),
        ]);
        let input = values(&["Hello", "Save"]);

        let (map, stats) = translate_distinct_values(&service, &input, "en", "af", 10).await;

        assert_eq!(map.get("Hello"), Some("Hello"));
        assert_eq!(map.get("Save"), Some("Stoor"));
        assert_eq!(stats.translated, 1);
        assert_eq!(stats.untranslated, 1);
    }

    #[tokio::test]
    async fn test_short_response_falls_back_for_missing_positions() {
        let service = CannedService(vec![TranslationResult::single("Een")]);
        let input = values(&["One", "Two", "Three"]);

        let (map, _) = translate_distinct_values(&service, &input, "en", "af", 10).await;

        assert_eq!(map.get("One"), Some("Een"));
        assert_eq!(map.get("Two"), Some("Two"));
        assert_eq!(map.get("Three"), Some("Three"));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let service = UppercaseService::default();

        let (map, stats) = translate_distinct_values(&service, &[], "en", "af", 10).await;

        assert!(map.is_empty());
        assert_eq!(stats.batches, 0);
        assert!(service.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_translation_result_deserialize() {
        let json = r#"[{"translations":[{"text":"Hallo","to":"af"}]},{"translations":[]},{}]"#;
        let results: Vec<TranslationResult> = serde_json::from_str(json).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].best(), Some("Hallo"));
        assert_eq!(results[0].translations[0].to.as_deref(), Some("af"));
        assert_eq!(results[1].best(), None);
        assert_eq!(results[2].best(), None);
    }

    #[test]
    fn test_translation_map_from_iter() {
        let map: TranslationMap = [("Hello", "Hallo"), ("Save", "Stoor")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Save"), Some("Stoor"));
        assert_eq!(map.get("Missing"), None);
    }

    #[test]
    fn test_success_rate() {
        let stats = TranslationStats {
            batches: 2,
            failed_batches: 1,
            translated: 3,
            untranslated: 1,
        };
        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
        assert!((TranslationStats::default().success_rate() - 0.0).abs() < f64::EPSILON);
    }
}

//! Pipeline orchestration: resolve the index, process each entity, reconcile
//! the dataset, export.
//!
//! The orchestrator is the single owner of the master dataset and the running
//! field set. Entities are processed sequentially in index order; a failure
//! on one entity is contained as a null-filled row and the run continues.
//! Only index resolution and export failures escape to the caller.

use crate::config::ScrapeConfig;
use crate::dataset::{FieldSet, MasterDataset};
use crate::error::ScrapeError;
use crate::extract::{entity_name, extract_tables, resolve_index, EntityReference, RawTableRecord};
use crate::fetch::rate_limiter::RateLimiter;
use crate::fetch::PageFetcher;
use crate::normalize::normalize;
use crate::sink::{ConnectionDescriptor, DatasetSink};
use tracing::{debug, info, warn};

/// Pipeline lifecycle. `Failed` is reachable from `Resolving` only; entity
/// failures never terminate the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Resolving,
    Extracting(usize),
    Normalizing(usize),
    Exporting,
    Done,
    Failed,
}

/// Drives the scrape run and owns all accumulated state.
pub struct Pipeline<F: PageFetcher> {
    fetcher: F,
    config: ScrapeConfig,
    limiter: RateLimiter,
    state: RunState,
    dataset: MasterDataset,
    field_set: FieldSet,
}

impl<F: PageFetcher> Pipeline<F> {
    pub fn new(config: ScrapeConfig, fetcher: F) -> Self {
        let limiter = RateLimiter::from_config(&config);
        Self {
            fetcher,
            config,
            limiter,
            state: RunState::Idle,
            dataset: MasterDataset::new(),
            field_set: FieldSet::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn dataset(&self) -> &MasterDataset {
        &self.dataset
    }

    pub fn field_set(&self) -> &FieldSet {
        &self.field_set
    }

    /// Execute the full run: resolve the index, then fetch, extract and
    /// normalize every entity in index order, then reconcile the dataset
    /// with one backfill pass.
    ///
    /// On success the dataset holds exactly one row per resolved entity,
    /// every row carrying the same column set.
    pub async fn run(&mut self) -> Result<&MasterDataset, ScrapeError> {
        self.state = RunState::Resolving;
        info!(url = %self.config.index_url, "fetching entity index");

        let index_html = match self.fetcher.fetch(&self.config.index_url).await {
            Ok(html) => html,
            Err(e) => {
                self.state = RunState::Failed;
                return Err(ScrapeError::IndexFetch(e));
            }
        };

        let mut entities =
            match resolve_index(&index_html, &self.config.base_url, &self.config.index_url) {
                Ok(entities) => entities,
                Err(e) => {
                    self.state = RunState::Failed;
                    return Err(e);
                }
            };
        if let Some(limit) = self.config.max_entities {
            entities.truncate(limit);
        }
        info!(count = entities.len(), "resolved entity index");

        for (i, entity) in entities.iter().enumerate() {
            self.state = RunState::Extracting(i);
            let (entity, records) = self.process_entity(entity).await;

            self.state = RunState::Normalizing(i);
            let record = normalize(&entity, &records, &mut self.field_set);
            debug!(ordinal = record.ordinal, name = %record.name, fields = record.values.len(), "row ready");
            self.dataset.push(record);
        }

        // Single reconciliation pass, after the last entity and before any
        // export: earlier rows get explicit nulls for late-discovered fields.
        self.dataset.backfill(&self.field_set);
        self.state = RunState::Done;
        info!(
            rows = self.dataset.len(),
            columns = self.dataset.columns().len(),
            "run complete"
        );
        Ok(&self.dataset)
    }

    /// Fetch and extract one entity. Fetch or parse trouble is the soft
    /// failure path: log, return zero records, let the normalizer emit an
    /// identifier-only row.
    async fn process_entity(
        &self,
        entity: &EntityReference,
    ) -> (EntityReference, Vec<RawTableRecord>) {
        let _guard = self.limiter.acquire().await;

        let html = match self.fetcher.fetch(&entity.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(ordinal = entity.ordinal, url = %entity.url, error = %e, "entity fetch failed, emitting null row");
                return (entity.clone(), Vec::new());
            }
        };

        let records = extract_tables(&html);
        if records.is_empty() {
            warn!(ordinal = entity.ordinal, url = %entity.url, "no recognized tables on page");
        }

        // The detail page heading is the authoritative display name; the
        // index link text is the fallback.
        let mut entity = entity.clone();
        if let Some(name) = entity_name(&html) {
            entity.name = name;
        }
        (entity, records)
    }

    /// Export the reconciled dataset through the given sink.
    ///
    /// A sink failure is surfaced to the caller but the dataset stays
    /// intact, so export may be retried without re-scraping.
    pub fn export<S: DatasetSink>(
        &mut self,
        sink: &S,
        conn: &ConnectionDescriptor,
    ) -> Result<u64, ScrapeError> {
        // Backfill is idempotent; this guards direct export calls after a
        // partial setup in tests or embedding code.
        self.dataset.backfill(&self.field_set);

        self.state = RunState::Exporting;
        let result = sink.export(&self.dataset, conn);
        self.state = RunState::Done;

        let rows = result?;
        info!(rows, table = %conn.table_name, "export complete");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FieldValue;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Fixture fetcher serving canned pages; unknown URLs fail like a
    /// network error would.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 500,
                })
        }
    }

    fn config() -> ScrapeConfig {
        ScrapeConfig {
            index_url: "https://dex.test/index".to_string(),
            base_url: "https://dex.test".to_string(),
            min_delay_ms: 0,
            ..Default::default()
        }
    }

    fn index_page(slugs: &[&str]) -> String {
        let cards: String = slugs
            .iter()
            .map(|s| {
                format!(
                    r#"<div class="infocard"><span class="infocard-lg-img"><a href="/pokedex/{s}">{s}</a></span></div>"#
                )
            })
            .collect();
        format!("<html><body>{cards}</body></html>")
    }

    fn entity_page(name: &str, with_breeding: bool) -> String {
        let breeding = if with_breeding {
            r#"<h2>Breeding</h2>
               <table class="vitals-table"><tbody>
                 <tr><th>Egg Groups</th><td>Monster</td></tr>
               </tbody></table>"#
        } else {
            ""
        };
        format!(
            r#"<html><body><main id="main"><h1>{name}</h1>
            <h2>Pokédex data</h2>
            <table class="vitals-table"><tbody>
              <tr><th>Type</th><td>Grass</td></tr>
              <tr><th>Weight</th><td>6.9 kg</td></tr>
            </tbody></table>
            {breeding}</main></body></html>"#
        )
    }

    fn fixture(pages: &[(&str, String)]) -> FixtureFetcher {
        FixtureFetcher {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_rows_follow_index_order() {
        let fetcher = fixture(&[
            ("https://dex.test/index", index_page(&["a", "b", "c"])),
            ("https://dex.test/pokedex/a", entity_page("A", false)),
            ("https://dex.test/pokedex/b", entity_page("B", false)),
            ("https://dex.test/pokedex/c", entity_page("C", false)),
        ]);
        let mut pipeline = Pipeline::new(config(), fetcher);
        let dataset = pipeline.run().await.unwrap();

        let names: Vec<_> = dataset.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        let ordinals: Vec<_> = dataset.rows().iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_entity_fetch_failure_is_contained() {
        // Page "b" is missing from the fixtures and will 500.
        let fetcher = fixture(&[
            ("https://dex.test/index", index_page(&["a", "b"])),
            ("https://dex.test/pokedex/a", entity_page("A", false)),
        ]);
        let mut pipeline = Pipeline::new(config(), fetcher);
        let dataset = pipeline.run().await.unwrap();

        assert_eq!(dataset.len(), 2);
        let failed = &dataset.rows()[1];
        assert_eq!(failed.name, "b"); // index name, detail page never loaded
        assert_eq!(failed.url, "https://dex.test/pokedex/b");
        assert!(failed.values.values().all(FieldValue::is_null));
        assert_eq!(pipeline.state(), RunState::Done);
    }

    #[tokio::test]
    async fn test_variable_schema_backfilled() {
        let fetcher = fixture(&[
            ("https://dex.test/index", index_page(&["a", "b"])),
            ("https://dex.test/pokedex/a", entity_page("A", true)),
            ("https://dex.test/pokedex/b", entity_page("B", false)),
        ]);
        let mut pipeline = Pipeline::new(config(), fetcher);
        let dataset = pipeline.run().await.unwrap();

        // Both rows carry the breeding column even though only "a" had it.
        assert_eq!(
            dataset.rows()[0].values["egg_groups"],
            FieldValue::List(vec!["Monster".to_string()])
        );
        assert_eq!(dataset.rows()[1].values["egg_groups"], FieldValue::Null);
        let fields_a: Vec<_> = {
            let mut k: Vec<_> = dataset.rows()[0].values.keys().collect();
            k.sort();
            k
        };
        let fields_b: Vec<_> = {
            let mut k: Vec<_> = dataset.rows()[1].values.keys().collect();
            k.sort();
            k
        };
        assert_eq!(fields_a, fields_b);
    }

    #[tokio::test]
    async fn test_index_failure_is_fatal() {
        let fetcher = fixture(&[]);
        let mut pipeline = Pipeline::new(config(), fetcher);
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, ScrapeError::IndexFetch(_)));
        assert_eq!(pipeline.state(), RunState::Failed);
    }

    #[tokio::test]
    async fn test_unrecognizable_index_is_fatal() {
        let fetcher = fixture(&[(
            "https://dex.test/index",
            "<html><body>down for maintenance</body></html>".to_string(),
        )]);
        let mut pipeline = Pipeline::new(config(), fetcher);
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, ScrapeError::IndexParse { .. }));
        assert_eq!(pipeline.state(), RunState::Failed);
    }

    #[tokio::test]
    async fn test_max_entities_limit() {
        let fetcher = fixture(&[
            ("https://dex.test/index", index_page(&["a", "b", "c"])),
            ("https://dex.test/pokedex/a", entity_page("A", false)),
        ]);
        let mut pipeline = Pipeline::new(
            ScrapeConfig {
                max_entities: Some(1),
                ..config()
            },
            fetcher,
        );
        let dataset = pipeline.run().await.unwrap();
        assert_eq!(dataset.len(), 1);
    }
}

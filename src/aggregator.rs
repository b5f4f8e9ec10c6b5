//! Concurrent multi-provider search with streaming partial results.

use std::cmp::Reverse;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::model::{LyricCandidate, SearchAliases, SongInformation};
use crate::providers::LyricProvider;
use crate::resolver::QueryResolver;
use crate::search::score_candidate;

/// Callback receiving each provider's scored batch as it completes.
pub type PartialCallback<'a> = &'a mut (dyn FnMut(&[LyricCandidate]) + Send);

/// Fans a search out to every registered provider concurrently, scores
/// the results, and streams per-provider batches back as they arrive.
pub struct SearchAggregator {
    resolver: Arc<QueryResolver>,
    providers: Vec<Arc<dyn LyricProvider>>,
}

impl SearchAggregator {
    #[must_use]
    pub fn new(resolver: Arc<QueryResolver>, providers: Vec<Arc<dyn LyricProvider>>) -> Self {
        Self {
            resolver,
            providers,
        }
    }

    /// Runs the full search. Alternate queries are resolved first and
    /// attached to `song.search_aliases`; each provider then runs on its
    /// own task. Batches reach `on_partial` in provider-completion
    /// order, each scored and sorted descending. The returned list is
    /// the concatenation of all batches, stably re-sorted by score so
    /// ties keep arrival order. A failing provider contributes an empty
    /// batch.
    pub async fn search(
        &self,
        song: &mut SongInformation,
        limit: usize,
        mut on_partial: Option<PartialCallback<'_>>,
    ) -> Vec<LyricCandidate> {
        let queries = self.resolver.resolve_queries(song).await;
        song.search_aliases = Some(SearchAliases {
            titles: queries.iter().map(|q| q.title.clone()).collect(),
            artists: queries.iter().map(|q| q.artist.clone()).collect(),
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let song = song.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let batch = match provider.search(&song, limit).await {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        tracing::warn!(
                            provider = provider.name(),
                            error = %e,
                            "provider search failed"
                        );
                        Vec::new()
                    }
                };
                let _ = tx.send(batch);
            });
        }
        drop(tx);

        // Batches are drained here, on the caller's task; provider tasks
        // never touch shared state directly.
        let mut merged = Vec::new();
        while let Some(mut batch) = rx.recv().await {
            for candidate in &mut batch {
                candidate.score = score_candidate(song, candidate);
            }
            batch.sort_by_key(|c| Reverse(c.score));
            if let Some(callback) = on_partial.as_mut() {
                callback(&batch);
            }
            merged.extend(batch);
        }

        merged.sort_by_key(|c| Reverse(c.score));
        merged
    }
}

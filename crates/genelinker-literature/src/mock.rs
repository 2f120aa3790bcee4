//! Scripted literature source for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use genelinker_common::SearchPage;

use crate::sources::{LiteratureSource, SourceError};

pub struct ScriptedSource {
    result: Mutex<Option<Result<SearchPage, SourceError>>>,
    delay: Duration,
    last_query: Mutex<Option<(String, usize)>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn returning(page: SearchPage) -> Self {
        Self::new(Ok(page))
    }

    pub fn failing(err: SourceError) -> Self {
        Self::new(Err(err))
    }

    fn new(result: Result<SearchPage, SourceError>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            delay: Duration::ZERO,
            last_query: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<(String, usize)> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }
}

#[async_trait]
impl LiteratureSource for ScriptedSource {
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<SearchPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some((query.to_string(), limit));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        // A page is replayed on every call; an error is returned once, then
        // the source reports an empty page.
        let mut slot = self.result.lock().map_err(|_| anyhow::anyhow!("scripted source poisoned"))?;
        match slot.take() {
            Some(Ok(page)) => {
                *slot = Some(Ok(page.clone()));
                Ok(page)
            }
            Some(Err(err)) => Err(err.into()),
            None => Ok(SearchPage { papers: vec![], total_results: 0 }),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

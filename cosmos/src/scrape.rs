//! Request-scoped fan-out / fan-in.
//!
//! A scrape runs a handful of independent queries concurrently, waits for
//! all of them and renders the registry. Each query is a named *fetch*
//! future plus a *write* closure that turns its result into gauge values.
//! A failing fetch is logged and its series are left out of the scrape;
//! the other tasks are unaffected.
//!
//! Tasks live in a [`JoinSet`] owned by the request future. If the client
//! goes away and the request future is dropped, the set is dropped with it
//! and every in-flight query is aborted.

use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{Instrument, Span, debug, error, info, info_span};
use uuid::Uuid;

use crate::client::ClientError;
use crate::metrics::ScrapeRegistry;

/// Concurrent set of named fetch-and-write tasks.
pub struct FanOut {
    span: Span,
    tasks: JoinSet<()>,
}

impl FanOut {
    pub fn new(span: Span) -> Self {
        Self {
            span,
            tasks: JoinSet::new(),
        }
    }

    /// Spawns `fetch` under `name`; on success its output is handed to
    /// `write`.
    pub fn spawn<T, Fut, W>(&mut self, name: &'static str, fetch: Fut, write: W)
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
        W: FnOnce(T) + Send + 'static,
    {
        let task = async move {
            debug!(query = name, "started querying");
            let started = Instant::now();

            match fetch.await {
                Ok(value) => {
                    debug!(
                        query = name,
                        request_time = started.elapsed().as_secs_f64(),
                        "finished querying"
                    );
                    write(value);
                }
                Err(err) => {
                    error!(query = name, error = %err, "query failed");
                }
            }
        };

        self.tasks.spawn(task.instrument(self.span.clone()));
    }

    /// Waits until every spawned task has finished.
    pub async fn join(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(err) = result {
                self.span
                    .in_scope(|| error!(error = %err, "scrape task did not complete"));
            }
        }
    }
}

/// One scrape of one endpoint: request id, isolated registry and the
/// tasks populating it.
pub struct Scrape {
    endpoint: &'static str,
    started: Instant,
    span: Span,
    registry: ScrapeRegistry,
    tasks: FanOut,
}

impl Scrape {
    pub fn begin(endpoint: &'static str, const_labels: &HashMap<String, String>) -> Self {
        let span = info_span!("scrape", request_id = %Uuid::new_v4(), endpoint);
        Self {
            endpoint,
            started: Instant::now(),
            registry: ScrapeRegistry::new(const_labels),
            tasks: FanOut::new(span.clone()),
            span,
        }
    }

    pub fn registry(&self) -> &ScrapeRegistry {
        &self.registry
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Shorthand for [`FanOut::spawn`] on this scrape's task set.
    pub fn spawn<T, Fut, W>(&mut self, name: &'static str, fetch: Fut, write: W)
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
        W: FnOnce(T) + Send + 'static,
    {
        self.tasks.spawn(name, fetch, write);
    }

    /// Waits for all tasks, renders the registry and logs the request.
    pub async fn finish(self) -> Result<String, prometheus::Error> {
        let Scrape {
            endpoint,
            started,
            span,
            registry,
            tasks,
        } = self;

        tasks.join().await;
        let body = registry.gather_text();

        span.in_scope(|| {
            info!(
                method = "GET",
                endpoint,
                request_time = started.elapsed().as_secs_f64(),
                "request processed"
            );
        });
        body
    }
}

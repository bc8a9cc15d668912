//! Lazy cursor-based pagination
//!
//! Walks a paginated result set one page at a time, yielding typed items in
//! page order. The pager never prefetches beyond the page it is delivering,
//! so dropping it mid-walk abandons at most one in-flight request.

use serde::de::DeserializeOwned;
use serde_json::json;

use super::client::SuperOpsClient;
use super::error::SuperOpsError;
use super::query::Operation;

/// The pager's position in its walk.
#[derive(Debug)]
enum PagerState<T> {
    /// Ready to fetch; holds the continuation cursor, absent on the first page.
    Idle { cursor: Option<String> },
    /// Handing out items from the current page.
    Delivering {
        items: std::vec::IntoIter<T>,
        next_cursor: Option<String>,
    },
    /// The final page was drained. Terminal.
    Exhausted,
    /// A fetch failed. Terminal; the walk cannot be resumed mid-cursor.
    Failed { message: String },
}

/// Lazy, forward-only sequence of typed items behind a base list operation.
///
/// The base operation's `cursor` variable is overridden on every fetch, so
/// restarting the pager replays the walk from the first page.
pub struct Pager<T> {
    client: SuperOpsClient,
    operation: Operation,
    state: PagerState<T>,
    pages_fetched: u32,
}

impl<T: DeserializeOwned> Pager<T> {
    pub(crate) fn new(client: SuperOpsClient, operation: Operation) -> Self {
        Self {
            client,
            operation,
            state: PagerState::Idle { cursor: None },
            pages_fetched: 0,
        }
    }

    /// Yield the next item, fetching the next page when the current one is
    /// drained. Returns `Ok(None)` once the final page is exhausted.
    pub async fn next_item(&mut self) -> Result<Option<T>, SuperOpsError> {
        loop {
            match std::mem::replace(&mut self.state, PagerState::Exhausted) {
                PagerState::Delivering {
                    mut items,
                    next_cursor,
                } => {
                    if let Some(item) = items.next() {
                        self.state = PagerState::Delivering { items, next_cursor };
                        return Ok(Some(item));
                    }
                    self.state = match next_cursor {
                        Some(cursor) => PagerState::Idle {
                            cursor: Some(cursor),
                        },
                        None => PagerState::Exhausted,
                    };
                }
                PagerState::Idle { cursor } => {
                    let operation = match &cursor {
                        Some(cursor) => self.operation.with_variable("cursor", json!(cursor)),
                        None => self.operation.clone(),
                    };
                    match self.client.execute_page::<T>(&operation).await {
                        Ok(page) => {
                            self.pages_fetched += 1;
                            self.state = PagerState::Delivering {
                                items: page.items.into_iter(),
                                next_cursor: page.cursor,
                            };
                        }
                        Err(error) => {
                            self.state = PagerState::Failed {
                                message: error.to_string(),
                            };
                            return Err(error);
                        }
                    }
                }
                PagerState::Exhausted => {
                    return Ok(None);
                }
                PagerState::Failed { message } => {
                    let error = SuperOpsError::Pagination {
                        message: format!("pager already failed: {message}"),
                    };
                    self.state = PagerState::Failed { message };
                    return Err(error);
                }
            }
        }
    }

    /// Drain the remaining items into a vector.
    pub async fn collect_all(&mut self) -> Result<Vec<T>, SuperOpsError> {
        let mut items = Vec::new();
        while let Some(item) = self.next_item().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Reset the walk to the first page. Clears a failed state too.
    pub fn restart(&mut self) {
        self.state = PagerState::Idle { cursor: None };
        self.pages_fetched = 0;
    }

    /// How many pages have been fetched since the last (re)start.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}

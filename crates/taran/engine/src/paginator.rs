//! History paginator: merges a run's paged event log into one history
//!
//! Pages are fetched strictly one after another, since each continuation
//! token is only known once the previous page has arrived. The merged
//! history keeps the order the broker emitted (newest first by default);
//! callers that need the log oldest-first must re-order it themselves.

use crate::broker::Broker;
use crate::config::TaranConfig;
use futures::stream::{self, Stream, TryStreamExt};
use taran_types::{
    HistoryOrder, HistoryPage, HistoryPageRequest, TaranError, TaranResult, WorkflowExecution,
    WorkflowHistory, MAX_PAGE_SIZE,
};

/// Where the page stream stands
enum Cursor {
    /// Nothing fetched yet; start from this token (none for the newest page)
    Start(Option<String>),
    Next(String),
    Exhausted,
}

/// Reads a run's full history from the broker
pub struct HistoryPaginator<'b, B: Broker + ?Sized> {
    broker: &'b B,
    domain: String,
    page_size: u32,
    order: HistoryOrder,
}

impl<B: Broker + ?Sized> Clone for HistoryPaginator<'_, B> {
    fn clone(&self) -> Self {
        Self {
            broker: self.broker,
            domain: self.domain.clone(),
            page_size: self.page_size,
            order: self.order,
        }
    }
}

impl<'b, B: Broker + ?Sized> HistoryPaginator<'b, B> {
    pub fn new(broker: &'b B, domain: impl Into<String>) -> Self {
        Self {
            broker,
            domain: domain.into(),
            page_size: MAX_PAGE_SIZE,
            order: HistoryOrder::Reverse,
        }
    }

    pub fn from_config(broker: &'b B, config: &TaranConfig) -> Self {
        Self::new(broker, config.domain_name.clone())
            .with_page_size(config.history.page_size)
            .with_order(config.history.order)
    }

    /// Requested events per page, clamped to 1..=1000
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_order(mut self, order: HistoryOrder) -> Self {
        self.order = order;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Lazy, finite sequence of pages starting at `start_token`.
    ///
    /// The stream ends after the first page without a continuation token.
    /// It cannot be restarted; build a new one to read again.
    pub fn pages(
        &self,
        execution: &WorkflowExecution,
        start_token: Option<String>,
    ) -> impl Stream<Item = TaranResult<HistoryPage>> + 'b {
        let paginator = self.clone();
        let execution = execution.clone();
        stream::try_unfold(
            (Cursor::Start(start_token), 0usize),
            move |(cursor, index)| {
                let paginator = paginator.clone();
                let execution = execution.clone();
                async move { paginator.next_page(&execution, cursor, index).await }
            },
        )
    }

    /// Fetch every page of the run's history, newest page first
    pub async fn fetch_full_history(
        &self,
        execution: &WorkflowExecution,
    ) -> TaranResult<WorkflowHistory> {
        self.merge(execution, WorkflowHistory::default(), None).await
    }

    /// Fetch the pages still missing from a seeded history, such as the
    /// first page delivered with a decision task
    pub async fn complete_history(
        &self,
        execution: &WorkflowExecution,
        seed: WorkflowHistory,
    ) -> TaranResult<WorkflowHistory> {
        match seed.next_page_token.clone() {
            Some(token) => self.merge(execution, seed, Some(token)).await,
            None => Ok(seed),
        }
    }

    async fn merge(
        &self,
        execution: &WorkflowExecution,
        seed: WorkflowHistory,
        start_token: Option<String>,
    ) -> TaranResult<WorkflowHistory> {
        let seeded = seed.events.len();
        let (history, pages) = self
            .pages(execution, start_token)
            .try_fold((seed, 0usize), |(mut history, pages), page| async move {
                history.events.extend(page.events);
                history.next_page_token = page.next_page_token;
                Ok::<_, TaranError>((history, pages + 1))
            })
            .await?;

        tracing::debug!(
            run_id = %execution.run_id,
            pages,
            seeded,
            reverse = self.order.is_reverse(),
            events = history.events.len(),
            "Workflow history merged"
        );
        Ok(history)
    }

    async fn next_page(
        &self,
        execution: &WorkflowExecution,
        cursor: Cursor,
        index: usize,
    ) -> TaranResult<Option<(HistoryPage, (Cursor, usize))>> {
        let token = match cursor {
            Cursor::Start(token) => token,
            Cursor::Next(token) => Some(token),
            Cursor::Exhausted => return Ok(None),
        };

        let request = HistoryPageRequest {
            domain: self.domain.clone(),
            execution: execution.clone(),
            next_page_token: token.clone(),
            maximum_page_size: self.page_size,
            order: self.order,
        };

        let page = match self.broker.get_history_page(&request).await? {
            Some(page) => page,
            None => {
                tracing::error!(
                    run_id = %execution.run_id,
                    page = index,
                    "No response for history page"
                );
                return Err(TaranError::TransportExhausted {
                    page: index,
                    next_page_token: token,
                });
            }
        };

        tracing::trace!(page = index, events = page.events.len(), "History page received");

        let cursor = match &page.next_page_token {
            Some(next) => Cursor::Next(next.clone()),
            None => Cursor::Exhausted,
        };
        Ok(Some((page, (cursor, index + 1))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBroker;
    use futures::StreamExt;
    use taran_types::{BrokerError, EventId, EventKind, HistoryEvent};

    fn marker(id: u64) -> HistoryEvent {
        HistoryEvent::new(
            id,
            EventKind::Other {
                event_type: "MarkerRecorded".into(),
                attributes: serde_json::Value::Null,
            },
        )
    }

    fn execution() -> WorkflowExecution {
        WorkflowExecution::new("wf", "run")
    }

    fn ids(history: &WorkflowHistory) -> Vec<u64> {
        history.events.iter().map(|e| e.event_id.value()).collect()
    }

    #[tokio::test]
    async fn test_single_page() {
        let broker = InMemoryBroker::new()
            .with_page(None, HistoryPage::new(vec![marker(2), marker(1)], None));
        let paginator = HistoryPaginator::new(&broker, "d");

        let history = paginator.fetch_full_history(&execution()).await.unwrap();
        assert_eq!(ids(&history), vec![2, 1]);
        assert!(history.is_complete());
    }

    #[tokio::test]
    async fn test_requests_carry_tokens_and_settings() {
        let broker = InMemoryBroker::new()
            .with_page(None, HistoryPage::new(vec![marker(4)], Some("t1".into())))
            .with_page(Some("t1"), HistoryPage::new(vec![marker(3)], None));
        let paginator = HistoryPaginator::new(&broker, "d")
            .with_page_size(0)
            .with_order(HistoryOrder::Forward);
        assert_eq!(paginator.page_size(), 1);

        paginator.fetch_full_history(&execution()).await.unwrap();

        let requests = broker.history_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].next_page_token, None);
        assert_eq!(requests[1].next_page_token.as_deref(), Some("t1"));
        assert_eq!(requests[1].maximum_page_size, 1);
        assert_eq!(requests[1].order, HistoryOrder::Forward);
        assert_eq!(requests[0].domain, "d");
    }

    #[tokio::test]
    async fn test_missing_response_is_transport_exhausted() {
        let broker = InMemoryBroker::new()
            .with_page(None, HistoryPage::new(vec![marker(9)], Some("gone".into())));
        let paginator = HistoryPaginator::new(&broker, "d");

        let result = paginator.fetch_full_history(&execution()).await;
        match result {
            Err(TaranError::TransportExhausted {
                page,
                next_page_token,
            }) => {
                assert_eq!(page, 1);
                assert_eq!(next_page_token.as_deref(), Some("gone"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_page_is_not_an_error() {
        let broker = InMemoryBroker::new()
            .with_page(None, HistoryPage::new(vec![], Some("t1".into())))
            .with_page(Some("t1"), HistoryPage::new(vec![], None));
        let paginator = HistoryPaginator::new(&broker, "d");

        let history = paginator.fetch_full_history(&execution()).await.unwrap();
        assert!(history.is_empty());
        assert!(history.is_complete());
    }

    #[tokio::test]
    async fn test_broker_errors_propagate() {
        let broker = InMemoryBroker::new().failing_history_with(BrokerError::AccessDenied(
            "not allowed".into(),
        ));
        let paginator = HistoryPaginator::new(&broker, "d");

        let result = paginator.fetch_full_history(&execution()).await;
        assert!(matches!(
            result,
            Err(TaranError::Broker(BrokerError::AccessDenied(_)))
        ));
    }

    #[tokio::test]
    async fn test_complete_history_continues_from_seed() {
        let broker = InMemoryBroker::new()
            .with_page(Some("t1"), HistoryPage::new(vec![marker(2)], Some("t2".into())))
            .with_page(Some("t2"), HistoryPage::new(vec![marker(1)], None));
        let paginator = HistoryPaginator::new(&broker, "d");

        let seed = WorkflowHistory::new(vec![marker(3)])
            .with_next_page_token("t1")
            .with_previous_started_event_id(3u64);
        let history = paginator.complete_history(&execution(), seed).await.unwrap();

        assert_eq!(ids(&history), vec![3, 2, 1]);
        assert!(history.is_complete());
        assert_eq!(history.previous_started_event_id, Some(EventId::new(3)));
        assert_eq!(broker.history_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_complete_seed_needs_no_requests() {
        let broker = InMemoryBroker::new();
        let paginator = HistoryPaginator::new(&broker, "d");

        let seed = WorkflowHistory::new(vec![marker(1)]);
        let history = paginator
            .complete_history(&execution(), seed.clone())
            .await
            .unwrap();
        assert_eq!(history, seed);
        assert!(broker.history_requests().is_empty());
    }

    #[tokio::test]
    async fn test_page_stream_is_lazy() {
        let broker = InMemoryBroker::new()
            .with_page(None, HistoryPage::new(vec![marker(2)], Some("t1".into())))
            .with_page(Some("t1"), HistoryPage::new(vec![marker(1)], None));
        let paginator = HistoryPaginator::new(&broker, "d");

        let exec = execution();
        let pages = paginator.pages(&exec, None);
        futures::pin_mut!(pages);

        let first = pages.next().await.unwrap().unwrap();
        assert_eq!(first.next_page_token.as_deref(), Some("t1"));
        // Only the first page has been requested so far
        assert_eq!(broker.history_requests().len(), 1);

        let second = pages.next().await.unwrap().unwrap();
        assert!(second.is_last());
        assert!(pages.next().await.is_none());
        assert_eq!(broker.history_requests().len(), 2);
    }
}

//! # The Retry Loop
//!
//! One logical request, many physical attempts. For each attempt:
//!
//! 1. Stop if the caller cancelled, the deadline passed, or the attempt
//!    ceiling was reached.
//! 2. Pick a node this request hasn't tried yet (healthy ones first).
//! 3. Build the request for that node and send it, bounded by the
//!    per-attempt timeout and whatever is left of the deadline.
//! 4. A transport fault marks the node unhealthy and counts as retryable.
//! 5. A decoded response is classified: `Finished` returns, `Error` and
//!    `Expired` fail immediately, `Retry` falls through.
//! 6. Back off (`min * 2^(k-1)`, clamped) unless that was the last attempt.
//!    The wait is raced against the deadline and the cancellation signal.
//!
//! Only terminal outcomes leave this module.

use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, field, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::client::Client;
use crate::error::{AttemptFailure, Error, Result};
use crate::execution::backoff::Backoff;
use crate::execution::cancel::CancellationSignal;
use crate::execution::classify::Verdict;
use crate::id::AccountId;
use crate::network::{Node, TransportError};
use crate::transaction::TransactionId;
use crate::wire::{self, Response};

/// Something the engine can execute: a frozen transaction or a query.
pub trait Executable: Sync {
    type Output: Send;

    /// Short operation name for logs, e.g. `"CryptoTransfer"`.
    fn operation(&self) -> &'static str;

    /// The transaction id, for transactions and receipt queries.
    fn transaction_id(&self) -> Option<TransactionId>;

    /// Nodes this request is pinned to. `None` lets the engine rotate
    /// through the whole network.
    fn node_account_ids(&self) -> Option<&[AccountId]>;

    /// Serializes the request addressed to `node`. Must be deterministic.
    fn make_request(&self, node: &Node) -> Result<Bytes>;

    fn classify(&self, response: &Response) -> Verdict;

    /// Converts a `Finished` response into the caller's result.
    fn map_response(&self, node: &Node, response: Response) -> Result<Self::Output>;
}

/// Per-request overrides of the client's retry settings.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub max_attempts: Option<u32>,
    pub min_backoff: Option<Duration>,
    pub max_backoff: Option<Duration>,
    pub request_timeout: Option<Duration>,
    /// Absolute deadline. Overrides the client's relative `deadline_ms`.
    pub deadline: Option<Instant>,
    pub cancel: Option<CancellationSignal>,
}

impl ExecuteOptions {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn backoff(mut self, min: Duration, max: Duration) -> Self {
        self.min_backoff = Some(min);
        self.max_backoff = Some(max);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel_on(mut self, signal: CancellationSignal) -> Self {
        self.cancel = Some(signal);
        self
    }
}

/// Settings resolved from client defaults and per-request overrides.
#[derive(Debug, Clone)]
struct Budget {
    max_attempts: u32,
    backoff: Backoff,
    request_timeout: Duration,
    deadline: Option<Instant>,
}

impl Budget {
    fn resolve(client: &Client, options: &ExecuteOptions) -> Result<Self> {
        let config = client.config();
        let max_attempts = options.max_attempts.unwrap_or(config.max_attempts);
        if max_attempts == 0 {
            return Err(Error::InvalidArgument("max_attempts must be at least 1".into()));
        }
        Ok(Self {
            max_attempts,
            backoff: Backoff::new(
                options.min_backoff.unwrap_or_else(|| config.min_backoff()),
                options.max_backoff.unwrap_or_else(|| config.max_backoff()),
            ),
            request_timeout: options
                .request_timeout
                .unwrap_or_else(|| config.request_timeout()),
            deadline: options
                .deadline
                .or_else(|| config.deadline().map(|budget| Instant::now() + budget)),
        })
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// The per-attempt timeout, shortened to fit inside the deadline.
    fn attempt_timeout(&self) -> Duration {
        match self.deadline {
            Some(deadline) => self
                .request_timeout
                .min(deadline.saturating_duration_since(Instant::now())),
            None => self.request_timeout,
        }
    }
}

/// Runs `executable` to a terminal outcome.
pub async fn execute<E>(client: &Client, executable: &E, options: &ExecuteOptions) -> Result<E::Output>
where
    E: Executable + ?Sized,
{
    let budget = Budget::resolve(client, options)?;
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "execute",
        %request_id,
        operation = executable.operation(),
        transaction_id = field::Empty,
    );
    if let Some(id) = executable.transaction_id() {
        span.record("transaction_id", field::display(id));
    }
    run(client, executable, budget, options.cancel.clone())
        .instrument(span)
        .await
}

async fn run<E>(
    client: &Client,
    executable: &E,
    budget: Budget,
    mut cancel: Option<CancellationSignal>,
) -> Result<E::Output>
where
    E: Executable + ?Sized,
{
    let network = client.network();
    let mut selection = match executable.node_account_ids() {
        Some(ids) => network.selection_for(ids)?,
        None => network.selection(),
    };
    let mut attempts: u32 = 0;
    let mut last: Option<AttemptFailure> = None;

    loop {
        if cancel.as_ref().is_some_and(CancellationSignal::is_cancelled) {
            return Err(Error::Cancelled { attempts, last });
        }
        if budget.deadline_passed() {
            return Err(Error::DeadlineExceeded { attempts, last });
        }
        if attempts >= budget.max_attempts {
            return Err(Error::MaxAttemptsExceeded { attempts, last });
        }

        let node = selection.next_node();
        let node_id = node.account_id();
        attempts += 1;
        let request = executable.make_request(&node)?;
        debug!(attempt = attempts, node = %node_id, bytes = request.len(), "sending request");

        let outcome = tokio::time::timeout(
            budget.attempt_timeout(),
            client.transport().call(&node, request),
        )
        .await
        .unwrap_or(Err(TransportError::Timeout));

        let failure = match outcome {
            Err(error) => {
                network.mark_unhealthy(node_id);
                AttemptFailure::Transport {
                    node: node_id,
                    error,
                }
            }
            Ok(bytes) => {
                network.mark_healthy(node_id);
                let response: Response = wire::decode(&bytes)?;
                match executable.classify(&response) {
                    Verdict::Finished => {
                        info!(attempt = attempts, node = %node_id, "request finished");
                        return executable.map_response(&node, response);
                    }
                    Verdict::Retry(status) => AttemptFailure::Status {
                        node: node_id,
                        status,
                    },
                    Verdict::Error(status) => {
                        warn!(attempt = attempts, node = %node_id, %status, "permanent failure");
                        return Err(Error::Precheck {
                            status,
                            transaction_id: executable.transaction_id(),
                            node: node_id,
                            attempts,
                        });
                    }
                    Verdict::Expired(status) => {
                        warn!(attempt = attempts, node = %node_id, %status, "request expired");
                        return Err(Error::Expired {
                            status,
                            node: node_id,
                            attempts,
                        });
                    }
                }
            }
        };

        warn!(attempt = attempts, %failure, "attempt failed");
        last = Some(failure);

        // No point sleeping if nothing follows.
        if attempts >= budget.max_attempts {
            return Err(Error::MaxAttemptsExceeded { attempts, last });
        }

        let wait = budget.backoff.delay(attempts);
        debug!(attempt = attempts, wait_ms = wait.as_millis() as u64, "backing off");
        tokio::select! {
            biased;
            _ = wait_for_cancel(cancel.as_mut()) => {
                return Err(Error::Cancelled { attempts, last });
            }
            _ = wait_for_deadline(budget.deadline) => {
                return Err(Error::DeadlineExceeded { attempts, last });
            }
            _ = tokio::time::sleep(wait) => {}
        }
    }
}

async fn wait_for_cancel(signal: Option<&mut CancellationSignal>) {
    match signal {
        Some(signal) => signal.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::cancel::cancellation;
    use crate::execution::classify::classify_query;
    use crate::network::{Network, Transport};
    use crate::status::Status;
    use crate::wire::{Query, Request};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Answers from a script, in order; records which node got each call.
    #[derive(Default)]
    struct Scripted {
        script: Mutex<VecDeque<std::result::Result<Response, TransportError>>>,
        calls: Mutex<Vec<(AccountId, Instant)>>,
    }

    impl Scripted {
        fn new(script: Vec<std::result::Result<Response, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::default(),
            })
        }

        fn nodes(&self) -> Vec<AccountId> {
            self.calls.lock().iter().map(|(node, _)| *node).collect()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn call(&self, node: &Node, _request: Bytes) -> std::result::Result<Bytes, TransportError> {
            self.calls.lock().push((node.account_id(), Instant::now()));
            let next = self
                .script
                .lock()
                .pop_front()
                .unwrap_or(Ok(Response::precheck(Status::Busy)));
            next.map(|response| Bytes::from(wire::encode(&response).unwrap()))
        }
    }

    /// The smallest possible executable: a balance lookup that returns the
    /// precheck status on success.
    struct Probe;

    impl Executable for Probe {
        type Output = Status;

        fn operation(&self) -> &'static str {
            "Probe"
        }

        fn transaction_id(&self) -> Option<TransactionId> {
            None
        }

        fn node_account_ids(&self) -> Option<&[AccountId]> {
            None
        }

        fn make_request(&self, _node: &Node) -> Result<Bytes> {
            let request = Request::Query(Query::AccountBalance {
                account_id: AccountId::new(0, 0, 2),
            });
            Ok(Bytes::from(wire::encode(&request)?))
        }

        fn classify(&self, response: &Response) -> Verdict {
            classify_query(response)
        }

        fn map_response(&self, _node: &Node, response: Response) -> Result<Status> {
            Ok(response.precheck)
        }
    }

    fn client(transport: Arc<Scripted>, nodes: usize) -> Client {
        let addresses: Vec<String> = (0..nodes).map(|i| format!("10.0.0.{i}:50211")).collect();
        Client::with_transport(Network::from_addresses(&addresses).unwrap(), transport)
    }

    fn options() -> ExecuteOptions {
        ExecuteOptions::default()
            .max_attempts(5)
            .backoff(Duration::from_millis(100), Duration::from_millis(800))
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_on_first_ok() {
        let transport = Scripted::new(vec![Ok(Response::precheck(Status::Ok))]);
        let status = execute(&client(transport.clone(), 3), &Probe, &options()).await.unwrap();
        assert_eq!(status, Status::Ok);
        assert_eq!(transport.nodes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_status_stops_immediately() {
        let transport = Scripted::new(vec![Ok(Response::precheck(Status::InvalidAccountId))]);
        let err = execute(&client(transport.clone(), 3), &Probe, &options())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Precheck { status: Status::InvalidAccountId, attempts: 1, transaction_id: None, .. }
        ));
        assert_eq!(transport.nodes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_follow_backoff_schedule() {
        let transport = Scripted::new(vec![]);
        let err = execute(&client(transport.clone(), 3), &Probe, &options())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MaxAttemptsExceeded { attempts: 5, .. }));

        let calls = transport.calls.lock();
        let gaps: Vec<u128> = calls
            .windows(2)
            .map(|w| (w[1].1 - w[0].1).as_millis())
            .collect();
        assert_eq!(gaps, vec![100, 200, 400, 800]);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_fault_marks_node_and_moves_on() {
        let transport = Scripted::new(vec![
            Err(TransportError::ConnectionRefused),
            Ok(Response::precheck(Status::Ok)),
        ]);
        let client = client(transport.clone(), 2);
        execute(&client, &Probe, &options()).await.unwrap();
        let nodes = transport.nodes();
        assert_eq!(nodes.len(), 2);
        assert_ne!(nodes[0], nodes[1]);
        assert!(!client.network().is_healthy(nodes[0]));
        assert!(client.network().is_healthy(nodes[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_the_backoff_short() {
        let transport = Scripted::new(vec![]);
        let started = Instant::now();
        let options = options().deadline(started + Duration::from_millis(250));
        let err = execute(&client(transport.clone(), 3), &Probe, &options)
            .await
            .unwrap_err();
        // Attempts at t=0 and t=100; the 200ms wait after that hits the deadline.
        assert!(matches!(err, Error::DeadlineExceeded { attempts: 2, last: Some(_) }));
        assert_eq!(Instant::now() - started, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_backoff_sends_nothing_more() {
        let transport = Scripted::new(vec![]);
        let (handle, signal) = cancellation();
        let options = options().cancel_on(signal);
        let client = client(transport.clone(), 3);

        let task = tokio::spawn(async move { execute(&client, &Probe, &options).await });
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Cancelled { attempts: 2, .. }));
        assert_eq!(transport.nodes().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_request_never_calls_out() {
        let transport = Scripted::new(vec![]);
        let (handle, signal) = cancellation();
        handle.cancel();
        let err = execute(&client(transport.clone(), 1), &Probe, &options().cancel_on(signal))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { attempts: 0, last: None }));
        assert!(transport.nodes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_node_times_out_and_counts_as_fault() {
        struct Stalled;

        #[async_trait]
        impl Transport for Stalled {
            async fn call(&self, _: &Node, _: Bytes) -> std::result::Result<Bytes, TransportError> {
                std::future::pending().await
            }
        }

        let network = Network::from_addresses(&["10.0.0.1:50211"]).unwrap();
        let client = Client::with_transport(network, Arc::new(Stalled));
        let options = options()
            .max_attempts(2)
            .request_timeout(Duration::from_secs(1));
        let err = execute(&client, &Probe, &options).await.unwrap_err();
        match err {
            Error::MaxAttemptsExceeded {
                attempts: 2,
                last: Some(AttemptFailure::Transport { error, .. }),
            } => assert_eq!(error, TransportError::Timeout),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_is_rejected_up_front() {
        let transport = Scripted::new(vec![]);
        let err = execute(&client(transport.clone(), 1), &Probe, &options().max_attempts(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(transport.nodes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_response_is_terminal() {
        struct Garbage;

        #[async_trait]
        impl Transport for Garbage {
            async fn call(&self, _: &Node, _: Bytes) -> std::result::Result<Bytes, TransportError> {
                Ok(Bytes::from_static(&[0xde, 0xad]))
            }
        }

        let network = Network::from_addresses(&["10.0.0.1:50211"]).unwrap();
        let client = Client::with_transport(network, Arc::new(Garbage));
        let err = execute(&client, &Probe, &options()).await.unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
    }
}

use super::config::PipelineConfig;
use crate::core::{KvError, Operation, Request, Result};
use crate::sync::{CountdownEvent, TurnGate};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

type RequestSource = Box<dyn Iterator<Item = Request> + Send>;

struct ClaimCursor {
    next_seq: u64,
    source: RequestSource,
}

/// Shared state of one batch run.
///
/// Each piece has its own lock and a single owning protocol step:
/// the claim cursor is only touched by `claim`, the begin turn only by the
/// begin gate, the output turn and buffer only by the output gate.
/// Lock order is claim → begin gate → bucket → output gate.
pub struct BatchContext {
    claim: Mutex<ClaimCursor>,
    pub(crate) begin: TurnGate<()>,
    pub(crate) output: TurnGate<Vec<String>>,
    pub(crate) completion: CountdownEvent,
    aborted: AtomicBool,
    failure: Mutex<Option<KvError>>,
}

impl BatchContext {
    pub fn new<I>(requests: I, config: &PipelineConfig) -> Self
    where
        I: IntoIterator<Item = Request>,
        I::IntoIter: Send + 'static,
    {
        let timeout = config.timeout();
        Self {
            claim: Mutex::new(ClaimCursor {
                next_seq: 0,
                source: Box::new(requests.into_iter()),
            }),
            begin: TurnGate::new("begin", ()).with_timeout(timeout),
            output: TurnGate::new("output", Vec::new()).with_timeout(timeout),
            completion: CountdownEvent::new(config.workers),
            aborted: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }

    /// Takes the next request and stamps it with the next sequence number.
    /// Returns `None` once the source is exhausted or the batch was aborted.
    pub fn claim(&self) -> Result<Option<Operation>> {
        let mut cursor = self.claim.lock()?;
        if self.is_aborted() {
            return Ok(None);
        }

        Ok(cursor.source.next().map(|request| {
            let seq = cursor.next_seq;
            cursor.next_seq += 1;
            Operation { seq, request }
        }))
    }

    pub fn claimed(&self) -> Result<u64> {
        Ok(self.claim.lock()?.next_seq)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Stops further claims and releases every gate waiter.
    pub fn abort(&self) {
        if !self.aborted.swap(true, Ordering::AcqRel) {
            self.begin.abandon();
            self.output.abandon();
        }
    }

    /// Records `err` as the cause of the abort unless the batch was already
    /// aborted, in which case `err` is a consequence and is dropped.
    pub fn fail(&self, err: KvError) {
        if self.is_aborted() {
            return;
        }
        if let Ok(mut failure) = self.failure.lock() {
            failure.get_or_insert(err);
        }
        self.abort();
    }

    pub fn take_failure(&self) -> Option<KvError> {
        self.failure.lock().ok().and_then(|mut failure| failure.take())
    }

    /// Output lines in submission order. Only valid once every worker is done.
    pub fn into_output(self) -> Result<Vec<String>> {
        self.output.into_inner()
    }
}

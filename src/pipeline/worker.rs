use super::context::BatchContext;
use crate::core::{OpStage, Operation, Outcome, Request, Result};
use crate::storage::StorageEngine;
use crate::sync::Participant;
use std::thread;
use tracing::{Level, event, info_span};

/// Keeps the batch consistent when a worker exits, normally or by panic.
/// Completion is signalled by the participant after the abort check.
struct WorkerExit<'a> {
    ctx: &'a BatchContext,
    _done: Participant<'a>,
}

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.ctx.abort();
        }
    }
}

fn stage(seq: u64, stage: OpStage) {
    event!(Level::TRACE, seq, stage = %stage, "operation stage");
}

/// Worker loop: claim, pass the begin gate, execute, pass the output gate,
/// until the source runs dry or the batch aborts. Failures are recorded on
/// the context. Returns how many operations this worker completed.
pub(crate) fn run_worker<S>(worker: usize, ctx: &BatchContext, store: &S) -> usize
where
    S: StorageEngine,
{
    let _exit = WorkerExit {
        ctx,
        _done: ctx.completion.participant(),
    };
    let span = info_span!("pipeline.worker", worker);
    let _enter = span.enter();

    let mut processed = 0usize;
    loop {
        let op = match ctx.claim() {
            Ok(Some(op)) => op,
            Ok(None) => break,
            Err(err) => {
                ctx.fail(err);
                break;
            }
        };

        let seq = op.seq;
        if let Err(err) = execute(ctx, store, op) {
            if ctx.is_aborted() {
                event!(Level::DEBUG, seq, error = %err, "operation stopped by abort");
            } else {
                event!(Level::ERROR, seq, error = %err, "operation failed");
            }
            ctx.fail(err);
            break;
        }
        processed += 1;
    }

    event!(Level::DEBUG, processed, "worker finished");
    processed
}

fn execute<S>(ctx: &BatchContext, store: &S, op: Operation) -> Result<()>
where
    S: StorageEngine,
{
    let Operation { seq, request } = op;
    stage(seq, OpStage::Claimed);

    stage(seq, OpStage::AwaitingBegin);
    let begin = ctx.begin.wait_turn(seq)?;

    let outcome = match request {
        Request::Command(command) => {
            event!(Level::TRACE, seq, op = command.kind(), key = command.key(), "begin");
            store.apply(&command, move || {
                // Runs with the bucket lock held: order is fixed from here on,
                // so the next operation may start.
                begin.advance();
                stage(seq, OpStage::Began);
                stage(seq, OpStage::Executing);
            })
        }
        Request::Malformed { line, reason } => {
            begin.advance();
            stage(seq, OpStage::Began);
            Outcome::Malformed { line, reason }
        }
    };

    stage(seq, OpStage::AwaitingOutput);
    let mut output = ctx.output.wait_turn(seq)?;
    output.value_mut().push(outcome.to_string());
    output.advance();
    event!(Level::TRACE, seq, success = outcome.is_success(), "result recorded");
    stage(seq, OpStage::Output);

    stage(seq, OpStage::Done);
    Ok(())
}

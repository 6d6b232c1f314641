//! Propagates one event through a built stack (spec.md §4.4).
//!
//! Rust's aliasing rules forbid holding a live reference into one
//! `Pluginstance` while mutating another in the same `Vec`, so instead of
//! reading "through" a bound `source` at call time, [`propagate`] copies
//! each resolved input value into the consumer's own input table
//! immediately before calling `interpret` — a "copy-in" step using
//! `split_at_mut` to name the producer and consumer slices disjointly.
//! Ownership of values stays centered on the producer's output slots; they
//! are released by [`clean_results`] once every stage has been dispatched.

use crate::plugin::{Pluginstance, ReturnCode};
use crate::stack::Stack;

/// Copies every bound input key on `consumer` from whichever already-
/// dispatched stage in `producers` it names as its source. A key's
/// `source` can point to any earlier stage, not just the immediately
/// preceding one, so the whole dispatched prefix is searched.
fn copy_in(producers: &[Pluginstance], consumer: &mut Pluginstance) {
    for key_index in 0..consumer.input_keys().len() {
        let Some(source) = consumer.input_keys()[key_index].source() else { continue };
        let Some(producer) = producers.get(source.instance_index) else { continue };
        if let Some(value) = producer.output_keys().get(source.key_index).and_then(|k| k.value()) {
            consumer.input_keys_mut()[key_index].set_value(value.clone());
        }
    }
}

/// Walks downstream from the stage *after* `origin_index` to the tail.
///
/// `origin_index` is the stage whose `interpret` already ran and produced
/// the new outputs this event is propagating — a source's fd callback, or
/// any other stage that produced new outputs outside the normal chain
/// (spec.md §4.4). The origin itself is never re-invoked here: each
/// downstream stage's `interpret` is called exactly once, in order, and a
/// `Stop` or `Err` return code halts the remaining stages without treating
/// it as a failure of the call itself — `Err` is logged at notice level and
/// otherwise handled like `Stop`.
pub async fn propagate(stack: &mut Stack, origin_index: usize) -> ReturnCode {
    let stages = stack.stages_mut();

    for index in (origin_index + 1)..stages.len() {
        let (producers, rest) = stages.split_at_mut(index);
        copy_in(producers, &mut rest[0]);

        let descriptor = stages[index].descriptor().clone();
        let outcome = descriptor.interpret(&mut stages[index]).await;

        match &outcome {
            ReturnCode::Ok => continue,
            ReturnCode::Stop => return outcome,
            ReturnCode::Err(message) => {
                log::warn!("stage '{}' returned an error: {message}", stages[index].id());
                return outcome;
            }
        }
    }

    ReturnCode::Ok
}

/// Runs `origin_index`'s own `interpret`, then [`propagate`]s downstream if
/// it produced `Ok`. This is the entry point a reactor fd callback (or any
/// other event source) uses to dispatch one full event through the stack —
/// `propagate` alone never calls the origin (spec.md §4.4, testable
/// property 5).
pub async fn dispatch_from(stack: &mut Stack, origin_index: usize) -> ReturnCode {
    let descriptor = stack.stages()[origin_index].descriptor().clone();
    let outcome = descriptor.interpret(&mut stack.stages_mut()[origin_index]).await;

    match &outcome {
        ReturnCode::Ok => propagate(stack, origin_index).await,
        ReturnCode::Stop => outcome,
        ReturnCode::Err(message) => {
            log::warn!("stage '{}' returned an error: {message}", stack.stages()[origin_index].id());
            outcome
        }
    }
}

/// Releases every producer-owned (`needs_free_on_release`) output value
/// across the whole stack. Called once after [`propagate`] returns,
/// regardless of outcome, so a `Stop`/`Err` partway through never leaks a
/// value that later stages never got to consume (spec.md §4.4).
pub fn clean_results(stack: &mut Stack) {
    for stage in stack.stages_mut() {
        for key in stage.output_keys_mut() {
            if key.needs_free_on_release() && key.is_valid() {
                key.release();
            }
        }
    }
}

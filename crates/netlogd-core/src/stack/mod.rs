//! A built, ready-to-run stack: an ordered chain of pluginstances from
//! source to sink (spec.md §4, C6/C7).

pub mod builder;
pub mod dispatch;
pub mod error;

use crate::plugin::Pluginstance;

pub use builder::{build_stack, StageSpec};
pub use error::StackError;

/// An ordered, fully resolved chain of pluginstances. Index `0` is always
/// the source, the last entry the sink; everything between is an
/// intermediate stage. Built once by [`build_stack`] and then driven
/// repeatedly by [`dispatch::propagate`].
pub struct Stack {
    stages: Vec<Pluginstance>,
}

impl Stack {
    pub(crate) fn new(stages: Vec<Pluginstance>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Pluginstance] {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut [Pluginstance] {
        &mut self.stages
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Pluginstance> {
        self.stages.iter().find(|s| s.id() == id)
    }

    /// Run every stage's `stop` hook in reverse order (spec.md §7 shutdown,
    /// and §9's fail-partway-through-build cleanup path).
    pub async fn stop_all(&mut self) {
        for stage in self.stages.iter_mut().rev() {
            let descriptor = stage.descriptor().clone();
            if let Err(err) = descriptor.stop(stage).await {
                log::error!("stop() failed on '{}': {err}", stage.id());
            }
        }
    }

    /// Fan a signal out to every stage, head to tail (spec.md §4.6, §9).
    pub fn signal_all(&mut self, signum: i32) {
        for stage in self.stages.iter_mut() {
            let descriptor = stage.descriptor().clone();
            descriptor.signal(stage, signum);
        }
    }
}

#[cfg(test)]
mod tests;

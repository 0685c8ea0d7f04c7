use std::fmt;

/// Correlates status polls with an accepted submission.
///
/// Only ever created from a `202 Accepted` answer carrying an `nvcf-reqid`
/// header. Handles live as long as one call and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    task_id: String,
}

impl JobHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.task_id)
    }
}

/// Lifecycle of one prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    NotSubmitted,
    Pending(JobHandle),
    Resolved,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Resolved)
    }

    pub fn handle(&self) -> Option<&JobHandle> {
        match self {
            JobState::Pending(handle) => Some(handle),
            _ => None,
        }
    }

    /// Moves to `Pending`. Only valid from `NotSubmitted`.
    pub fn accept(&mut self, handle: JobHandle) -> bool {
        if *self == JobState::NotSubmitted {
            *self = JobState::Pending(handle);
            true
        } else {
            false
        }
    }

    /// Moves to `Resolved`; resolving twice is refused.
    pub fn resolve(&mut self) -> bool {
        if self.is_terminal() {
            false
        } else {
            *self = JobState::Resolved;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_not_submitted() {
        let state = JobState::default();
        assert_eq!(state, JobState::NotSubmitted);
        assert!(!state.is_terminal());
        assert!(state.handle().is_none());
    }

    #[test]
    fn accept_moves_to_pending_with_handle() {
        let mut state = JobState::default();
        assert!(state.accept(JobHandle::new("abc123")));
        assert_eq!(state.handle().map(JobHandle::task_id), Some("abc123"));
        assert!(!state.accept(JobHandle::new("other")));
        assert_eq!(state.handle().map(JobHandle::task_id), Some("abc123"));
    }

    #[test]
    fn resolve_is_reachable_from_both_earlier_states() {
        let mut sync = JobState::default();
        assert!(sync.resolve());
        assert!(sync.is_terminal());

        let mut async_job = JobState::default();
        async_job.accept(JobHandle::new("t"));
        assert!(async_job.resolve());
        assert!(async_job.handle().is_none());
    }

    #[test]
    fn resolved_state_cannot_be_reopened() {
        let mut state = JobState::Resolved;
        assert!(!state.resolve());
        assert!(!state.accept(JobHandle::new("late")));
        assert_eq!(state, JobState::Resolved);
    }
}

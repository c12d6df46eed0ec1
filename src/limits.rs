//! Bounded execution: operation counter and wall-clock deadline (spec.md
//! §4.7/§5).

/// Execution limits configured by the host. `Limits::default()` is
/// unlimited, mirroring the teacher's `Default` impls on `Context`/`Scope`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    /// If `Some` and positive, evaluation halts once the operation counter
    /// exceeds it.
    pub max_operations: Option<u64>,
    /// Absolute epoch milliseconds. If `Some`, evaluation halts once the
    /// wall clock crosses it.
    pub deadline_epoch_ms: Option<i64>,
}

impl Limits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = Some(max_operations);
        self
    }

    pub fn with_deadline_epoch_ms(mut self, deadline_epoch_ms: i64) -> Self {
        self.deadline_epoch_ms = Some(deadline_epoch_ms);
        self
    }
}

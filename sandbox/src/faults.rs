/// Failures the sandbox injects into the stub so error paths can be exercised.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub fail_get_state: bool,
    pub fail_put_state: bool,
    /// Fail the range iterator once this many results were returned.
    pub fail_range_after: Option<usize>,
    /// Fail the history iterator once this many results were returned.
    pub fail_history_after: Option<usize>,
    /// Hand out history entries without a timestamp.
    pub drop_history_timestamps: bool,
}

impl Faults {
    pub fn none() -> Self {
        Self::default()
    }
}

use core::fmt::Display;

/// Holds the context for the current operation run. Used for prefixing logs.
#[derive(Default, Debug, Clone, Copy)]
pub struct Context {
    /// The name of the operation.
    pub operation: &'static str,
    /// Which run of the operation this is, starting at 1.
    pub run: u64,
}

impl Display for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}#{}] ", self.operation, self.run)
    }
}

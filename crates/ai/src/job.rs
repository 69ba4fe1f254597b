use crate::result::{AiError, AiResult};

/// One inference unit over a caller-provided snapshot.
///
/// This crate stays storage-agnostic: the API layer gathers the input.
pub trait AiJob: Send + Sync + 'static {
    type Input: Send + Sync + 'static;

    fn input(&self) -> &Self::Input;

    /// Run the heuristic. Must not mutate anything.
    fn run(&self) -> Result<AiResult, AiError>;
}

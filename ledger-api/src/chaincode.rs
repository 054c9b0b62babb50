use crate::stub::TransactionContext;

/// A contract the platform can invoke by function name.
///
/// Arguments arrive as positional strings; the returned payload is handed back
/// to the caller verbatim. An `Err` aborts the transaction and nothing it wrote
/// is committed.
pub trait Chaincode {
    type Error: std::error::Error + Send + Sync + 'static;

    fn invoke(
        &self,
        ctx: &dyn TransactionContext,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, Self::Error>;
}

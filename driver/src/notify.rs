use kernel::interface::notify::{DependOnLoanNotifier, LoanNotice, LoanNotifier};
use kernel::KernelError;

use crate::database::PostgresDatabase;
use crate::error::ConvertError;

/// Emits notices on the log stream. Actual delivery (mail, push) hangs off
/// this interface; the committed transition never waits for it.
pub struct TracingLoanNotifier;

#[async_trait::async_trait]
impl LoanNotifier for TracingLoanNotifier {
    async fn publish(&self, notice: &LoanNotice) -> error_stack::Result<(), KernelError> {
        let payload = serde_json::to_string(notice).convert_error()?;
        tracing::info!(target: "loan_notice", "{payload}");
        Ok(())
    }
}

impl DependOnLoanNotifier for PostgresDatabase {
    type LoanNotifier = TracingLoanNotifier;
    fn loan_notifier(&self) -> &Self::LoanNotifier {
        &TracingLoanNotifier
    }
}

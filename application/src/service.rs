mod account;
mod borrow_request;
mod event;
mod game;
mod lending_record;

pub use self::{account::*, borrow_request::*, event::*, game::*, lending_record::*};

use error_stack::Report;
use kernel::interface::database::Transaction;
use kernel::interface::query::AccountQuery;
use kernel::prelude::entity::{Account, AccountId};
use kernel::KernelError;

/// Resolves an account reference or reports which role of the operation was
/// dangling.
pub(in crate::service) async fn resolve_account<Connection: Transaction + Send>(
    query: &impl AccountQuery<Connection>,
    con: &mut Connection,
    id: i64,
    part: &str,
) -> error_stack::Result<Account, KernelError> {
    query
        .find_by_id(con, &AccountId::new(id))
        .await?
        .ok_or_else(|| {
            Report::new(KernelError::NotFound)
                .attach_printable(format!("{part} account does not exist"))
        })
}

use sqlx::{PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::KernelError;

use crate::env;
use crate::error::ConvertError;

pub use self::{
    account::*, borrow_request::*, event::*, game::*, lending_record::*, registration::*,
};

mod account;
mod borrow_request;
mod event;
mod game;
mod lending_record;
mod registration;

static POSTGRES_URL: &str = "POSTGRES_URL";

pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let pool = Pool::connect(&url).await.convert_error()?;
        Ok(Self { pool })
    }
}

/// Every engine operation runs inside one of these; the conditional updates
/// and their read-backs commit or vanish together.
pub struct PgTransaction(sqlx::Transaction<'static, Postgres>);

impl PgTransaction {
    pub(in crate::database) fn as_conn(&mut self) -> &mut PgConnection {
        &mut *self.0
    }
}

#[async_trait::async_trait]
impl DatabaseConnection<PgTransaction> for PostgresDatabase {
    async fn transact(&self) -> error_stack::Result<PgTransaction, KernelError> {
        let tx = self.pool.begin().await.convert_error()?;
        Ok(PgTransaction(tx))
    }
}

#[async_trait::async_trait]
impl Transaction for PgTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

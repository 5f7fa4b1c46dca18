pub mod clock;
pub mod database;
pub mod error;
pub mod notify;

use kernel::KernelError;

use crate::error::ConvertError;

pub(crate) fn env(key: &str) -> error_stack::Result<String, KernelError> {
    dotenvy::var(key).convert_error()
}

mod id;
mod name;
mod role;

pub use self::{id::*, name::*, role::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct Account {
    id: AccountId,
    name: AccountName,
    role: AccountRole,
}

impl Account {
    pub fn new(id: AccountId, name: AccountName, role: AccountRole) -> Self {
        Self { id, name, role }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Destructure, References)]
pub struct AccountDraft {
    name: AccountName,
    role: AccountRole,
}

impl AccountDraft {
    pub fn new(name: AccountName, role: AccountRole) -> Self {
        Self { name, role }
    }
}

use kernel::prelude::entity::{Account, AccountRole, DestructAccount};

#[derive(Debug, Clone)]
pub struct AccountDto {
    pub id: i64,
    pub name: String,
    pub role: String,
}

impl From<Account> for AccountDto {
    fn from(value: Account) -> Self {
        let DestructAccount { id, name, role } = value.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            role: role.as_str().to_string(),
        }
    }
}

pub struct CreateAccountDto {
    pub name: String,
    pub role: AccountRole,
}

pub struct GetAccountDto {
    pub id: i64,
}

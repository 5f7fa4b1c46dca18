use crate::controller::Intake;
use application::transfer::{CreateAccountDto, GetAccountDto};
use kernel::prelude::entity::AccountRole;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    name: String,
    role: AccountRole,
}

pub struct Transformer;

impl Intake<CreateAccountRequest> for Transformer {
    type To = CreateAccountDto;
    fn emit(&self, CreateAccountRequest { name, role }: CreateAccountRequest) -> Self::To {
        Self::To { name, role }
    }
}

impl Intake<i64> for Transformer {
    type To = GetAccountDto;
    fn emit(&self, id: i64) -> Self::To {
        Self::To { id }
    }
}

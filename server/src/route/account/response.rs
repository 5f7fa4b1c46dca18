use crate::controller::Exhaust;
use application::transfer::AccountDto;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    id: i64,
    name: String,
    role: String,
}

impl From<AccountDto> for AccountResponse {
    fn from(value: AccountDto) -> Self {
        Self {
            id: value.id,
            name: value.name,
            role: value.role,
        }
    }
}

impl IntoResponse for AccountResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub struct Presenter;

impl Exhaust<AccountDto> for Presenter {
    type To = Json<AccountResponse>;
    fn emit(&self, input: AccountDto) -> Self::To {
        Json(AccountResponse::from(input))
    }
}

impl Exhaust<Option<AccountDto>> for Presenter {
    type To = Option<AccountResponse>;
    fn emit(&self, input: Option<AccountDto>) -> Self::To {
        input.map(AccountResponse::from)
    }
}

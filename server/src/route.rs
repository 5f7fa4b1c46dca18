mod account;
mod borrow_request;
mod event;
mod game;
mod lending_record;

pub use self::{
    account::AccountRouter, borrow_request::BorrowRequestRouter, event::EventRouter,
    game::GameRouter, lending_record::LendingRecordRouter,
};

mod account;
mod borrow_request;
mod common;
mod event;
mod game;
mod lending_record;
mod registration;

pub use self::{
    account::*, borrow_request::*, common::*, event::*, game::*, lending_record::*,
    registration::*,
};

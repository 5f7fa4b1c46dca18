mod account;
mod borrow_request;
mod event;
mod game;
mod lending_record;
mod registration;

pub use self::{
    account::*, borrow_request::*, event::*, game::*, lending_record::*, registration::*,
};

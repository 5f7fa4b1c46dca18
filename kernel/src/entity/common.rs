mod page;
mod period;
mod time;

pub use self::{page::*, period::*, time::*};

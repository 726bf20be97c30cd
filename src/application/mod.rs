pub mod cart;
pub mod countdown;
pub mod session;

pub mod cart;
pub mod command;
pub mod product;

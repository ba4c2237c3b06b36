pub mod cart;
pub mod category;
pub mod money;
pub mod order;
pub mod product;

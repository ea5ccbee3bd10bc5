pub mod customer;
pub mod edit;
pub mod money;
pub mod quote;

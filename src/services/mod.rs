pub mod accounts;
pub mod identifier;
pub mod links;

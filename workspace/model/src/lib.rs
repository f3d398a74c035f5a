pub mod account;
pub mod budget;
pub mod category;
pub mod household;
pub mod member;
pub mod profile;
pub mod recurring;
pub mod transaction;
pub mod user;

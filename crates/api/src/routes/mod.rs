pub mod corp_actions;
pub mod health;
pub mod symbols;

pub mod merchants;
pub mod transactions;

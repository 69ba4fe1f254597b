//! Inventory records: stock items, stock withdrawals and the article catalogue.
//!
//! Plain validated records plus the stock arithmetic (levels, withdrawals);
//! no IO, no HTTP, no storage.

pub mod article;
pub mod stock;

pub use article::Article;
pub use stock::{StockItem, StockLevel, StockWithdrawal};

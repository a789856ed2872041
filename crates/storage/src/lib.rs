pub mod db;
pub mod repositories;

pub use db::Database;

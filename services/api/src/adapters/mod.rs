pub mod db;
pub mod token;

pub use db::PgStore;
pub use token::JwtTokens;

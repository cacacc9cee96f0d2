pub mod results;

pub use results::ResultStore;
pub use results::StoreKey;

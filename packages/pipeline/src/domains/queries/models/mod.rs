pub mod query;

pub use query::{Query, QueryStatus, YmylCategory};

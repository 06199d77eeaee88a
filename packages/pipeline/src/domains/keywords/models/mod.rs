pub mod keyword;

pub use keyword::Keyword;

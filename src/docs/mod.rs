//! Documentation corpus, search and context assembly

pub mod context;
pub mod corpus;
pub mod index;

pub use context::ContextBuilder;
pub use corpus::{Corpus, DocArticle, DocSection};
pub use index::{DocumentationIndex, SearchHit};

mod pipeline;
mod config;
mod corpus;
mod vocab;
mod generator;
mod train;
mod similarity;

pub use pipeline::Pipeline;
pub use config::files_handling;
pub use generator::{Batch, SkipGramGenerator};
pub use vocab::Vocab;
pub use similarity::Similarity;

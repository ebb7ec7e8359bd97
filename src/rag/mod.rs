//! RAG (Retrieval-Augmented Generation) question answering.
//!
//! Turns a free-text question into a grounded answer: retrieve the most
//! similar passages from the vector index, render them into a fixed prompt
//! template, and return the generative model's raw completion.

mod pipeline;
mod retriever;

pub use pipeline::RagPipeline;
pub use retriever::{Retriever, RetrievedPassage, DEFAULT_TOP_K};

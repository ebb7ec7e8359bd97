//! Daun - Plant-disease diagnosis and RAG
//!
//! A CLI tool for diagnosing plant-leaf diseases and answering questions
//! about them, grounded in a private corpus of research journals.
//!
//! The name "Daun" comes from the Indonesian word for "leaf."
//!
//! # Overview
//!
//! Daun allows you to:
//! - Build a searchable vector index from a directory of PDF journals
//! - Ask questions and get AI-generated answers grounded in the corpus
//! - Serve an HTTP API that diagnoses leaf photographs and chats about them
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `corpus` - Document loading (PDF and plain text)
//! - `chunking` - Splitting documents into overlapping passages
//! - `embedding` - Embedding generation
//! - `index` - Vector index, snapshot persistence, and the offline builder
//! - `generation` - Generative model provider
//! - `rag` - Retriever and the question-answering pipeline
//! - `vision` - Leaf-disease image classification collaborator
//!
//! # Example
//!
//! ```rust,no_run
//! use daun::config::Settings;
//! use daun::rag::RagPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = RagPipeline::initialize(&settings)?;
//!
//!     let answer = pipeline.answer("What causes leaf curl?").await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod openai;
pub mod rag;
pub mod vision;

pub use error::{DaunError, Result};

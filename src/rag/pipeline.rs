//! The runtime question-answering pipeline.

use super::retriever::{RetrievedPassage, Retriever};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{DaunError, Result};
use crate::generation::{ChatModel, OpenAIChatModel};
use crate::index::{SimilarityMetric, VectorIndex};
use crate::openai;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// The RAG pipeline: retriever, prompt template, generative model.
///
/// Constructed once at startup and read-only afterwards, so concurrent
/// `answer` calls are safe without locking. `answer` mutates no state; the
/// only cost of repeating a call is the external API spend.
pub struct RagPipeline {
    retriever: Retriever,
    chat: Arc<dyn ChatModel>,
    prompts: Prompts,
    top_k: usize,
}

impl RagPipeline {
    /// Initialize the pipeline from settings.
    ///
    /// Startup sequence: verify the API credential, construct the embedding
    /// provider, load the persisted index, construct the generative model.
    /// A failure at any step refuses startup; there is no automatic retry.
    /// Fix the configuration and restart.
    pub fn initialize(settings: &Settings) -> Result<Self> {
        openai::require_api_key()?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let metric: SimilarityMetric = settings
            .index
            .metric
            .parse()
            .map_err(DaunError::Config)?;

        let index = VectorIndex::load(
            &settings.snapshot_path(),
            embedder.dimensions(),
            metric,
        )?;
        info!(
            "Loaded index with {} passages from {}",
            index.len(),
            settings.snapshot_path().display()
        );

        let chat: Arc<dyn ChatModel> = Arc::new(OpenAIChatModel::with_config(
            &settings.rag.model,
            settings.rag.temperature,
        ));

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self::with_components(
            Arc::new(index),
            embedder,
            chat,
            prompts,
            settings.rag.top_k,
        ))
    }

    /// Assemble a pipeline from explicit components. Used by tests to
    /// substitute fakes for the external providers.
    pub fn with_components(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
        prompts: Prompts,
        top_k: usize,
    ) -> Self {
        Self {
            retriever: Retriever::new(index, embedder),
            chat,
            prompts,
            top_k,
        }
    }

    /// Answer a question from the indexed corpus.
    ///
    /// Retrieves the top-k passages, renders the fixed prompt template, and
    /// returns the model's raw completion unmodified: no post-processing,
    /// grounding check, or citations. Retrieval and generation failures are
    /// both surfaced as a single `Pipeline` error; no retries are performed.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn answer(&self, question: &str) -> Result<String> {
        let passages = self
            .retriever
            .retrieve(question, self.top_k)
            .await
            .map_err(into_pipeline_error)?;

        let prompt = self.render_prompt(question, &passages);

        let answer = self
            .chat
            .complete(&prompt)
            .await
            .map_err(into_pipeline_error)?;

        info!("Answered with {} passages of context", passages.len());
        Ok(answer)
    }

    /// Build the follow-up question for a vision diagnosis label.
    pub fn diagnosis_question(&self, disease: &str) -> String {
        self.prompts.diagnosis_question(disease)
    }

    fn render_prompt(&self, question: &str, passages: &[RetrievedPassage]) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), format_context(passages));
        vars.insert("question".to_string(), question.to_string());
        self.prompts.render_with_custom(&self.prompts.rag.template, &vars)
    }
}

/// Join retrieved passages into readable prompt context.
fn format_context(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn into_pipeline_error(e: DaunError) -> DaunError {
    DaunError::Pipeline(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::{FailingEmbedder, FakeEmbedder};
    use crate::generation::testing::{FailingChatModel, FakeChatModel};
    use crate::index::IndexEntry;

    async fn pipeline_with(
        chat: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
    ) -> RagPipeline {
        let fake = FakeEmbedder::new(64);
        let texts = vec![
            "Gemini virus causes leaf curl, transmitted by whitefly.".to_string(),
            "Leaf spot shows as brown lesions with yellow halos.".to_string(),
        ];
        let embeddings = fake.embed_batch(&texts).await.unwrap();
        let entries = texts
            .into_iter()
            .zip(embeddings)
            .map(|(t, e)| IndexEntry::new("journal.pdf".into(), t, e))
            .collect();
        let index = VectorIndex::build(entries, SimilarityMetric::Cosine).unwrap();

        RagPipeline::with_components(Arc::new(index), embedder, chat, Prompts::default(), 5)
    }

    #[tokio::test]
    async fn test_answer_returns_raw_completion() {
        let chat = Arc::new(FakeChatModel::new("It is caused by the Gemini virus."));
        let pipeline = pipeline_with(chat.clone(), Arc::new(FakeEmbedder::new(64))).await;

        let answer = pipeline.answer("What causes leaf curl?").await.unwrap();
        assert_eq!(answer, "It is caused by the Gemini virus.");

        // The rendered prompt carries both the context and the question.
        let prompts = chat.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Gemini virus"));
        assert!(prompts[0].contains("What causes leaf curl?"));
        assert!(!prompts[0].contains("{{context}}"));
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces_as_pipeline_error() {
        let pipeline =
            pipeline_with(Arc::new(FailingChatModel), Arc::new(FakeEmbedder::new(64))).await;

        let err = pipeline.answer("What causes leaf curl?").await.unwrap_err();
        assert!(matches!(err, DaunError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_retrieval_failure_surfaces_as_pipeline_error() {
        let chat = Arc::new(FakeChatModel::new("unused"));
        let pipeline = pipeline_with(chat.clone(), Arc::new(FailingEmbedder)).await;

        let err = pipeline.answer("any question").await.unwrap_err();
        assert!(matches!(err, DaunError::Pipeline(_)));
        // The generative model is never called when retrieval fails.
        assert!(chat.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_refuses_startup_without_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let _env = crate::openai::testing::env_lock();
        std::env::set_var("OPENAI_API_KEY", "sk-test");

        let mut settings = Settings::default();
        settings.index.snapshot_path = dir
            .path()
            .join("missing.json")
            .to_string_lossy()
            .into_owned();

        let err = match RagPipeline::initialize(&settings) {
            Err(e) => e,
            Ok(_) => panic!("initialize must fail without a snapshot"),
        };
        assert!(matches!(err, DaunError::IndexCorrupt(_)));
    }

    #[test]
    fn test_format_context_joins_with_blank_lines() {
        let passages = vec![
            RetrievedPassage {
                source: "a.pdf".into(),
                text: "first".into(),
                score: 0.9,
            },
            RetrievedPassage {
                source: "b.pdf".into(),
                text: "second".into(),
                score: 0.5,
            },
        ];
        assert_eq!(format_context(&passages), "first\n\nsecond");
    }
}

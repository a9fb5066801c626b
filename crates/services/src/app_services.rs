use std::sync::Arc;

use academy_core::catalog::{MaterialCatalog, QuestionBank};
use academy_core::model::UserId;
use storage::repository::Storage;

use crate::Clock;
use crate::ai::OpenAiClient;
use crate::analysis::{AnalysisProvider, OpenAiAnalysisProvider};
use crate::content::ContentService;
use crate::error::AppServicesError;
use crate::speech::{ElevenLabsVoice, RemoteVoice};
use crate::study::StudyService;

/// Assembles app-facing services from the environment and optional storage.
#[derive(Clone)]
pub struct AppServices {
    study: Arc<StudyService>,
    content: Option<Arc<ContentService>>,
    remote_voice: Option<Arc<dyn RemoteVoice>>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the bundled
    /// catalog is invalid.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        user: UserId,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(Some(storage), clock, user)
    }

    /// Build services with the given storage, or none for a throwaway session.
    ///
    /// AI analysis, generated content, and the remote voice are enabled only when
    /// their API keys are present in the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the bundled questions or materials are invalid.
    pub fn new(
        storage: Option<Storage>,
        clock: Clock,
        user: UserId,
    ) -> Result<Self, AppServicesError> {
        let bank = Arc::new(QuestionBank::builtin()?);
        let catalog = Arc::new(MaterialCatalog::builtin()?);
        let client = OpenAiClient::from_env();

        let mut study = StudyService::new(clock, user, bank, catalog).with_shuffle_questions(true);
        if let Some(storage) = storage {
            study = study.with_storage(storage);
        }

        let content = if client.enabled() {
            let provider: Arc<dyn AnalysisProvider> =
                Arc::new(OpenAiAnalysisProvider::new(client.clone()));
            study = study.with_analysis(provider);
            Some(Arc::new(ContentService::new(client)))
        } else {
            tracing::info!("ACADEMY_OPENAI_API_KEY not set; quizzes use local feedback");
            None
        };

        let remote_voice = ElevenLabsVoice::from_env().map(|v| Arc::new(v) as Arc<dyn RemoteVoice>);
        if remote_voice.is_none() {
            tracing::info!("ACADEMY_ELEVENLABS_API_KEY not set; read-aloud uses the local voice");
        }

        Ok(Self {
            study: Arc::new(study),
            content,
            remote_voice,
        })
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    #[must_use]
    pub fn content(&self) -> Option<Arc<ContentService>> {
        self.content.clone()
    }

    #[must_use]
    pub fn remote_voice(&self) -> Option<Arc<dyn RemoteVoice>> {
        self.remote_voice.clone()
    }
}

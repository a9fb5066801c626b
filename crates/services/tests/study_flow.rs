use std::sync::Arc;

use academy_core::catalog::{MaterialCatalog, QuestionBank};
use academy_core::model::{
    AnalysisSource, Question, QuizAnalysis, Submission, Topic, UserId,
};
use academy_core::session::{Session, SessionState};
use academy_core::time::fixed_now;
use async_trait::async_trait;
use services::ai::{AiConfig, OpenAiClient};
use services::{AnalysisError, AnalysisProvider, Clock, OpenAiAnalysisProvider, StudyService};
use storage::repository::{
    InMemoryRepository, LearningProgressRepository, ProgressRepository, QuizSessionRepository,
    Storage,
};

struct ScriptedProvider {
    reply: Option<QuizAnalysis>,
}

#[async_trait]
impl AnalysisProvider for ScriptedProvider {
    async fn analyze(
        &self,
        _topic: Topic,
        _questions: &[Question],
        _submission: &Submission,
    ) -> Result<QuizAnalysis, AnalysisError> {
        self.reply
            .clone()
            .ok_or_else(|| AnalysisError::InvalidReply("scripted failure".into()))
    }
}

fn storage_over(repo: &InMemoryRepository) -> Storage {
    Storage {
        progress: Arc::new(repo.clone()),
        quiz_sessions: Arc::new(repo.clone()),
        sections: Arc::new(repo.clone()),
    }
}

fn service(user: UserId) -> StudyService {
    service_at(user, Clock::fixed(fixed_now()))
}

fn service_at(user: UserId, clock: Clock) -> StudyService {
    StudyService::new(
        clock,
        user,
        Arc::new(QuestionBank::builtin().unwrap()),
        Arc::new(MaterialCatalog::builtin().unwrap()),
    )
}

fn answer_all(session: &mut Session, answers: &[usize]) {
    let quiz = session.quiz_mut().unwrap();
    for answer in answers {
        quiz.select(*answer).unwrap();
        quiz.next(fixed_now()).unwrap();
    }
}

fn labels(session: &Session) -> Vec<String> {
    match session.state() {
        SessionState::StudyingRemediation(plan) => plan
            .materials()
            .iter()
            .map(|m| m.concept().as_str().to_owned())
            .collect(),
        other => panic!("expected remediation, got {}", other.name()),
    }
}

#[tokio::test]
async fn failed_quiz_without_provider_is_scored_locally_and_persisted() {
    let repo = InMemoryRepository::new();
    let user = UserId::generate();
    let study = service(user).with_storage(storage_over(&repo));

    let mut session = study.start_session().await;
    study.select_topic(&mut session, Topic::Causes).unwrap();
    answer_all(&mut session, &[1, 0, 0]);

    let outcome = study.submit_quiz(&mut session).await.unwrap();
    assert_eq!(outcome.result().percentage(), 33);
    assert_eq!(outcome.source(), AnalysisSource::Fallback);
    assert!(outcome.feedback().starts_with("You scored 33%"));

    let stored = repo.load_progress(user).await.unwrap().get(Topic::Causes);
    assert_eq!(stored.score(), 33);
    assert!(!stored.completed());
    assert_eq!(stored.weak_areas().len(), 2);

    let history = repo
        .list_quiz_sessions(user, Some(Topic::Causes), 5)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].answers, vec![Some(1), Some(0), Some(0)]);

    session.acknowledge_result().unwrap();
    assert_eq!(labels(&session), vec!["colonial_response", "enlightenment"]);
}

#[tokio::test]
async fn remote_analysis_keeps_local_score_and_narrows_focus() {
    let provider = ScriptedProvider {
        reply: Some(QuizAnalysis {
            score: 99,
            weak_areas: vec!["enlightenment".into(), "naval_warfare".into()],
            feedback: "Revisit Locke and natural rights.".into(),
            recommendations: vec!["Read the Second Treatise".into()],
        }),
    };
    let study = service(UserId::generate()).with_analysis(Arc::new(provider));

    let mut session = study.start_session().await;
    study.select_topic(&mut session, Topic::Causes).unwrap();
    answer_all(&mut session, &[1, 0, 0]);

    let outcome = study.submit_quiz(&mut session).await.unwrap();
    assert_eq!(outcome.result().percentage(), 33);
    assert_eq!(outcome.source(), AnalysisSource::Remote);
    assert_eq!(outcome.feedback(), "Revisit Locke and natural rights.");

    session.acknowledge_result().unwrap();
    assert_eq!(labels(&session), vec!["enlightenment"]);
}

#[tokio::test]
async fn unresponsive_analysis_service_falls_back_after_timeout() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = AiConfig::new(format!("http://{addr}/v1"), "key")
        .with_timeout(std::time::Duration::from_millis(300));
    let provider = OpenAiAnalysisProvider::new(OpenAiClient::new(Some(config)));
    let study = service(UserId::generate()).with_analysis(Arc::new(provider));

    let mut session = study.start_session().await;
    study.select_topic(&mut session, Topic::Causes).unwrap();
    answer_all(&mut session, &[1, 0, 0]);

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        study.submit_quiz(&mut session),
    )
    .await
    .expect("submit_quiz must not wait forever on the analysis service")
    .unwrap();
    assert_eq!(outcome.source(), AnalysisSource::Fallback);
    assert_eq!(outcome.result().percentage(), 33);
    assert!(matches!(session.state(), SessionState::ReviewingResult { .. }));
    server.abort();
}

#[tokio::test]
async fn expired_quiz_is_submitted_with_gaps_and_late_answers_dropped() {
    let user = UserId::generate();
    let study = service(user);
    let mut session = study.start_session().await;
    study.select_topic(&mut session, Topic::Causes).unwrap();
    answer_all(&mut session, &[1]);

    let late_clock = Clock::fixed(fixed_now()).later(chrono::Duration::seconds(301));
    let quiz = session.quiz_mut().unwrap();
    quiz.select(0).unwrap();
    assert!(quiz.next(late_clock.now()).is_err());

    let late = service_at(user, late_clock);
    let outcome = late.submit_quiz(&mut session).await.unwrap();
    assert_eq!(outcome.result().percentage(), 33);
    assert_eq!(outcome.result().missed().len(), 2);
}

#[tokio::test]
async fn provider_failure_falls_back_to_local_outcome() {
    let study = service(UserId::generate()).with_analysis(Arc::new(ScriptedProvider { reply: None }));

    let mut session = study.start_session().await;
    study.select_topic(&mut session, Topic::Events).unwrap();
    answer_all(&mut session, &[0]);

    let outcome = study.submit_quiz(&mut session).await.unwrap();
    assert_eq!(outcome.result().percentage(), 100);
    assert_eq!(outcome.source(), AnalysisSource::Fallback);
    assert!(outcome.result().missed().is_empty());

    session.acknowledge_result().unwrap();
    assert!(matches!(session.state(), SessionState::Dashboard));
    assert!(session.progress().get(Topic::Events).completed());
}

#[tokio::test]
async fn remediation_records_sections_and_leads_to_retake() {
    let repo = InMemoryRepository::new();
    let user = UserId::generate();
    let study = service(user).with_storage(storage_over(&repo));

    let mut session = study.start_session().await;
    study.select_topic(&mut session, Topic::Causes).unwrap();
    answer_all(&mut session, &[0, 2, 1]);
    study.submit_quiz(&mut session).await.unwrap();
    session.acknowledge_result().unwrap();
    assert_eq!(labels(&session), vec!["taxation"]);

    assert!(study.finish_remediation(&mut session).is_err());
    assert!(study.complete_section(&mut session, "taxation", 90).await.unwrap());
    assert!(!study.complete_section(&mut session, "taxation", 5).await.unwrap());

    let sections = repo.list_sections(user, Topic::Causes).await.unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].time_spent_secs, 90);

    study.finish_remediation(&mut session).unwrap();
    assert!(matches!(session.state(), SessionState::TakingQuiz(_)));
}

#[tokio::test]
async fn stored_weak_areas_resume_remediation_in_a_new_session() {
    let repo = InMemoryRepository::new();
    let user = UserId::generate();
    let study = service(user).with_storage(storage_over(&repo));

    let mut first = study.start_session().await;
    study.select_topic(&mut first, Topic::Causes).unwrap();
    answer_all(&mut first, &[1, 2, 0]);
    study.submit_quiz(&mut first).await.unwrap();

    let mut second = study.start_session().await;
    assert_eq!(second.progress().get(Topic::Causes).score(), 67);
    study.select_topic(&mut second, Topic::Causes).unwrap();
    assert_eq!(labels(&second), vec!["enlightenment"]);
}

#[tokio::test]
async fn submitting_an_unfinished_quiz_is_rejected() {
    let study = service(UserId::generate());
    let mut session = study.start_session().await;
    study.select_topic(&mut session, Topic::Causes).unwrap();
    answer_all(&mut session, &[1]);

    assert!(study.submit_quiz(&mut session).await.is_err());
    assert!(matches!(session.state(), SessionState::TakingQuiz(_)));
    assert!(study.history(None, 10).await.unwrap().is_empty());
}

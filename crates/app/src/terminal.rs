//! Interactive terminal front end over the study session.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use academy_core::model::{
    AnalysisOutcome, LearningMaterial, MaterialSection, StudentLevel, Topic,
};
use academy_core::quiz::{QuizError, QuizStep, format_remaining};
use academy_core::report::{ProgressReport, ScoreBand};
use academy_core::session::{Session, SessionState};
use services::{AppServices, SpeechPlayer, StudyService};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Dashboard,
    Quiz,
    Analyzing,
    Result,
    Study,
}

impl Screen {
    fn of(state: &SessionState) -> Self {
        match state {
            SessionState::Dashboard => Self::Dashboard,
            SessionState::TakingQuiz(_) => Self::Quiz,
            SessionState::Analyzing(_) => Self::Analyzing,
            SessionState::ReviewingResult { .. } => Self::Result,
            SessionState::StudyingRemediation(_) => Self::Study,
        }
    }
}

pub struct Terminal {
    services: AppServices,
    study: Arc<StudyService>,
    speech: Arc<SpeechPlayer>,
    input: Lines<BufReader<Stdin>>,
    reading_since: HashMap<String, Instant>,
}

impl Terminal {
    pub fn new(services: AppServices, speech: Arc<SpeechPlayer>) -> Self {
        let study = services.study();
        Self {
            services,
            study,
            speech,
            input: BufReader::new(tokio::io::stdin()).lines(),
            reading_since: HashMap::new(),
        }
    }

    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt} ");
        io::stdout().flush()?;
        Ok(self
            .input
            .next_line()
            .await?
            .map(|line| line.trim().to_owned()))
    }

    pub async fn run(mut self) -> AppResult<()> {
        let mut session = self.study.start_session().await;
        println!("American Revolution Academy");

        loop {
            let flow = match Screen::of(session.state()) {
                Screen::Dashboard => self.dashboard(&mut session).await?,
                Screen::Quiz => self.quiz(&mut session).await?,
                Screen::Result => self.result(&mut session).await?,
                Screen::Study => self.studying(&mut session).await?,
                Screen::Analyzing => {
                    return Err("analysis did not complete".into());
                }
            };
            if flow == Flow::Quit {
                self.speech.stop().await;
                return Ok(());
            }
        }
    }

    async fn dashboard(&mut self, session: &mut Session) -> AppResult<Flow> {
        println!();
        print_report(&ProgressReport::from_book(session.progress()));
        println!();
        let Some(line) = self
            .read_line("Pick a topic (1-4), 'history', or 'quit':")
            .await?
        else {
            return Ok(Flow::Quit);
        };

        match line.as_str() {
            "" => {}
            "quit" | "q" | "exit" => return Ok(Flow::Quit),
            "history" => self.print_history().await,
            other => match parse_topic(other) {
                Some(topic) => {
                    report(self.study.select_topic(session, topic));
                    if matches!(session.state(), SessionState::StudyingRemediation(_)) {
                        println!(
                            "\nYou still have weak areas in {}. Let's review them first.",
                            topic.title()
                        );
                    }
                }
                None => println!("Unknown choice: {other}"),
            },
        }
        Ok(Flow::Continue)
    }

    async fn print_history(&self) {
        match self.study.history(None, 10).await {
            Ok(records) if records.is_empty() => println!("No quiz attempts recorded yet."),
            Ok(records) => {
                for record in records {
                    println!(
                        "{}  {:<28} {:>3}%  ({})",
                        record.completed_at.format("%Y-%m-%d %H:%M"),
                        record.topic.title(),
                        record.score,
                        record.source.as_str()
                    );
                }
            }
            Err(err) => println!("Could not load history: {err}"),
        }
    }

    async fn quiz(&mut self, session: &mut Session) -> AppResult<Flow> {
        let now = self.study.clock().now();
        let SessionState::TakingQuiz(run) = session.state() else {
            return Ok(Flow::Continue);
        };
        if run.is_expired(now) {
            println!("\nTime is up!");
            return self.submit(session).await;
        }
        let Some(question) = run.current() else {
            return self.submit(session).await;
        };

        let progress = run.progress();
        println!(
            "\n{} · Question {} of {} · {} left",
            run.topic().title(),
            progress.position,
            progress.total,
            format_remaining(run.remaining_secs(now))
        );
        println!("{}", question.prompt());
        for (index, option) in question.options().iter().enumerate() {
            let marker = if run.selected() == Some(index) { '>' } else { ' ' };
            println!(" {marker} {}) {option}", index + 1);
        }
        let option_count = question.options().len();

        let Some(line) = self
            .read_line("Answer (number), 'prev', or 'back':")
            .await?
        else {
            return Ok(Flow::Quit);
        };

        match line.as_str() {
            "back" | "b" => report(session.back()),
            "prev" | "p" => report(session.quiz_mut().and_then(|q| q.previous().map_err(Into::into))),
            other => match other.parse::<usize>() {
                Ok(choice) if (1..=option_count).contains(&choice) => {
                    let answered_at = self.study.clock().now();
                    let run = session.quiz_mut()?;
                    run.select(choice - 1)?;
                    match run.next(answered_at) {
                        Ok(QuizStep::Finished) => return self.submit(session).await,
                        Ok(QuizStep::Advanced { .. }) => {}
                        Err(QuizError::TimeUp) => {
                            println!("\nTime is up! That answer was not recorded.");
                            return self.submit(session).await;
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                _ => println!("Enter a number between 1 and {option_count}."),
            },
        }
        Ok(Flow::Continue)
    }

    async fn submit(&mut self, session: &mut Session) -> AppResult<Flow> {
        println!("\nAnalyzing your answers...");
        let outcome = self.study.submit_quiz(session).await?;
        print_outcome(&outcome);
        Ok(Flow::Continue)
    }

    async fn result(&mut self, session: &mut Session) -> AppResult<Flow> {
        if self.read_line("\nPress Enter to continue.").await?.is_none() {
            return Ok(Flow::Quit);
        }
        session.acknowledge_result()?;
        if matches!(session.state(), SessionState::StudyingRemediation(_)) {
            println!("\nLet's review the concepts you missed.");
        }
        Ok(Flow::Continue)
    }

    async fn studying(&mut self, session: &mut Session) -> AppResult<Flow> {
        let SessionState::StudyingRemediation(plan) = session.state() else {
            return Ok(Flow::Continue);
        };
        let topic = plan.topic();
        println!("\nStudy plan · {}", topic.title());
        for (index, material) in plan.materials().iter().enumerate() {
            let mark = if plan.is_completed(material.concept()) { 'x' } else { ' ' };
            println!("  [{mark}] {}. {}", index + 1, material.title());
        }
        if !plan.remediation().uncovered().is_empty() {
            let pending: Vec<String> = plan
                .remediation()
                .uncovered()
                .iter()
                .map(|c| c.display_label())
                .collect();
            println!("  Content pending for: {}", pending.join(", "));
        }
        let materials: Vec<LearningMaterial> = plan.materials().to_vec();

        let Some(line) = self
            .read_line("read N | listen N [overview|key|deep|examples] | stop | done N | generate | finish | back:")
            .await?
        else {
            return Ok(Flow::Quit);
        };
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let pick = words
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| materials.get(i));

        match (command, pick) {
            ("", _) => {}
            ("quit" | "q", _) => return Ok(Flow::Quit),
            ("back" | "b", _) => report(session.back()),
            ("stop", _) => self.speech.stop().await,
            ("finish", _) => {
                if session.can_finish() {
                    report(self.study.finish_remediation(session));
                    println!("\nTime to retake the quiz.");
                } else {
                    println!("Mark every material as done before retaking the quiz.");
                }
            }
            ("generate", _) => self.generate(session, topic).await,
            ("read", Some(material)) => {
                self.reading_since
                    .entry(material.concept().as_str().to_owned())
                    .or_insert_with(Instant::now);
                print_material(material);
            }
            ("listen", Some(material)) => {
                let section = parse_section(words.next());
                self.listen(material.narration(section));
            }
            ("done", Some(material)) => {
                let concept = material.concept().as_str();
                let spent = self
                    .reading_since
                    .remove(concept)
                    .map_or(0, |start| u32::try_from(start.elapsed().as_secs()).unwrap_or(u32::MAX));
                match self.study.complete_section(session, concept, spent).await {
                    Ok(true) => println!("Marked '{}' as done.", material.title()),
                    Ok(false) => println!("'{}' was already done.", material.title()),
                    Err(err) => println!("{err}"),
                }
            }
            ("read" | "listen" | "done", None) => println!("Pick a material by its number."),
            (other, _) => println!("Unknown command: {other}"),
        }
        Ok(Flow::Continue)
    }

    fn listen(&self, text: String) {
        let player = Arc::clone(&self.speech);
        println!("Playing... type 'stop' to stop.");
        tokio::spawn(async move {
            if let Err(err) = player.play(&text).await {
                tracing::warn!(error = %err, "read-aloud failed");
                println!("Read-aloud is unavailable: {err}");
            }
        });
    }

    async fn generate(&self, session: &Session, topic: Topic) {
        let Some(content) = self.services.content() else {
            println!("Set ACADEMY_OPENAI_API_KEY to enable personalized content.");
            return;
        };
        let weak_areas: Vec<_> = session
            .progress()
            .get(topic)
            .weak_areas()
            .iter()
            .cloned()
            .collect();
        println!("Generating personalized content...");
        match content
            .generate(topic, &weak_areas, StudentLevel::default())
            .await
        {
            Ok(material) => print_material(&material),
            Err(err) => println!("Could not generate content: {err}"),
        }
    }
}

fn report<T, E: std::fmt::Display>(result: Result<T, E>) {
    if let Err(err) = result {
        println!("{err}");
    }
}

fn parse_topic(raw: &str) -> Option<Topic> {
    if let Ok(n) = raw.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| Topic::ALL.get(i)).copied();
    }
    raw.parse().ok()
}

fn parse_section(raw: Option<&str>) -> MaterialSection {
    match raw {
        Some("key" | "keypoints" | "key_points") => MaterialSection::KeyPoints,
        Some("deep" | "deepdive" | "deep_dive") => MaterialSection::DeepDive,
        Some("examples" | "example") => MaterialSection::Examples,
        _ => MaterialSection::Overview,
    }
}

pub fn print_report(report: &ProgressReport) {
    for (index, line) in report.topics.iter().enumerate() {
        println!(
            "  {}. {:<28} {:<12} {:>3}%",
            index + 1,
            line.topic.title(),
            line.status.label(),
            line.score
        );
    }
    println!(
        "Completed {}/{} topics ({}%) · average {}% ({})",
        report.completed_topics,
        report.topics.len(),
        report.overall_percent,
        report.average_score,
        report.average_band.label()
    );
    if !report.top_weak_areas.is_empty() {
        let areas: Vec<String> = report
            .top_weak_areas
            .iter()
            .map(|(concept, count)| format!("{} ({count})", concept.display_label()))
            .collect();
        println!("Focus areas: {}", areas.join(", "));
    }
}

fn print_outcome(outcome: &AnalysisOutcome) {
    let result = outcome.result();
    println!(
        "\nScore: {}% ({} of {} correct) · {}",
        result.percentage(),
        result.correct(),
        result.total(),
        ScoreBand::for_score(result.percentage()).label()
    );
    println!("{}", outcome.feedback());
    for recommendation in outcome.recommendations() {
        println!("  - {recommendation}");
    }
    if !result.missed().is_empty() {
        let missed: Vec<String> = result.missed().iter().map(|c| c.display_label()).collect();
        println!("Areas to review: {}", missed.join(", "));
    }
}

fn print_material(material: &LearningMaterial) {
    let content = material.content();
    println!("\n{}", material.title());
    for section in MaterialSection::ALL {
        println!("\n{}", section.title());
        match section {
            MaterialSection::Overview => println!("{}", content.overview),
            MaterialSection::DeepDive => println!("{}", content.deep_dive),
            MaterialSection::KeyPoints => {
                for point in &content.key_points {
                    println!("  • {point}");
                }
            }
            MaterialSection::Examples => {
                for example in &content.examples {
                    println!("  • {example}");
                }
            }
        }
    }
}

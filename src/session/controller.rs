use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::Instant,
};
use uuid::Uuid;

use crate::{
    errors::AppResult,
    models::{
        domain::QuizDefinition,
        dto::{
            request::{AnswerSelection, SubmitQuizRequest},
            response::{PublicQuestion, SubmissionResponse},
        },
    },
    session::{
        backend::AttemptBackend,
        clock::SessionClock,
        integrity::{EnvironmentEvent, IntegrityMonitor, IntegritySignal, RestrictedAction},
    },
};

/// In-memory state of one attempt. Never persisted and never resumed.
#[derive(Debug)]
pub struct AttemptSession {
    quiz: QuizDefinition,
    questions: Vec<PublicQuestion>,
    answers: HashMap<String, String>,
    started_at: Instant,
    deadline_at: Option<Instant>,
    submission_id: String,
    finalized: bool,
}

impl AttemptSession {
    pub fn new(quiz: QuizDefinition, questions: Vec<PublicQuestion>) -> Self {
        Self {
            quiz,
            questions,
            answers: HashMap::new(),
            started_at: Instant::now(),
            deadline_at: None,
            submission_id: Uuid::new_v4().to_string(),
            finalized: false,
        }
    }

    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    pub fn questions(&self) -> &[PublicQuestion] {
        &self.questions
    }

    /// Idempotency key sent with this session's submission.
    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Fixes the instant after which no answer is accepted.
    pub fn set_deadline(&mut self, deadline_at: Instant) {
        self.deadline_at = Some(deadline_at);
    }

    pub fn is_expired(&self) -> bool {
        is_past(self.deadline_at)
    }

    /// Last write wins. Returns false once the session is finalized or its
    /// deadline has passed.
    pub fn select_answer(&mut self, question_id: String, option_id: String) -> bool {
        if self.finalized || self.is_expired() {
            return false;
        }
        self.answers.insert(question_id, option_id);
        true
    }

    /// Time spent so far, capped at the deadline.
    pub fn elapsed_seconds(&self) -> i64 {
        let now = Instant::now();
        let end = self.deadline_at.map_or(now, |at| now.min(at));
        i64::try_from(end.saturating_duration_since(self.started_at).as_secs())
            .unwrap_or(i64::MAX)
    }

    /// Closes the session and returns one answer per sampled question, in
    /// question order. Only the first call returns anything.
    pub fn finalize(&mut self) -> Option<Vec<AnswerSelection>> {
        if self.finalized {
            return None;
        }
        self.finalized = true;

        Some(
            self.questions
                .iter()
                .map(|question| AnswerSelection {
                    question_id: question.id.clone(),
                    selected_option_id: self.answers.get(&question.id).cloned(),
                })
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptCommand {
    SelectAnswer {
        question_id: String,
        option_id: String,
    },
    Submit,
}

fn is_past(deadline_at: Option<Instant>) -> bool {
    deadline_at.is_some_and(|at| Instant::now() >= at)
}

/// Learner-side handle to a running session.
#[derive(Clone, Debug)]
pub struct AttemptHandle {
    commands: mpsc::UnboundedSender<AttemptCommand>,
    deadline_at: Option<Instant>,
}

impl AttemptHandle {
    /// Returns false when the session no longer accepts input.
    pub fn select_answer(&self, question_id: impl Into<String>, option_id: impl Into<String>) -> bool {
        self.send(AttemptCommand::SelectAnswer {
            question_id: question_id.into(),
            option_id: option_id.into(),
        })
    }

    pub fn submit(&self) -> bool {
        self.send(AttemptCommand::Submit)
    }

    pub fn send(&self, command: AttemptCommand) -> bool {
        if is_past(self.deadline_at) {
            return false;
        }
        self.commands.send(command).is_ok()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeTrigger {
    User,
    Deadline,
    Integrity,
    NoQuestions,
}

/// Notifications for the host while a session runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AttemptEvent {
    Warning { violations: u32, limit: u32 },
    RestrictedActionBlocked { action: RestrictedAction },
    Finalized { trigger: FinalizeTrigger },
}

#[derive(Debug)]
pub struct AttemptOutcome {
    pub trigger: FinalizeTrigger,
    pub elapsed_seconds: i64,
    pub answers: Vec<AnswerSelection>,
    /// `None` when the session had no questions and nothing was submitted.
    pub submission: Option<AppResult<SubmissionResponse>>,
}

/// Drives one session from start to its single finalization.
pub struct AttemptController {
    backend: Arc<dyn AttemptBackend>,
    session: AttemptSession,
    clock: SessionClock,
    monitor: IntegrityMonitor,
    commands: mpsc::UnboundedReceiver<AttemptCommand>,
    deadline: Option<oneshot::Receiver<()>>,
    notifications: mpsc::UnboundedSender<AttemptEvent>,
}

impl AttemptController {
    /// Samples questions and starts the clock and the integrity monitor.
    /// Nothing is created if the quiz cannot be started.
    pub async fn start(
        backend: Arc<dyn AttemptBackend>,
        quiz_id: &str,
        environment: mpsc::UnboundedReceiver<EnvironmentEvent>,
        violation_limit: u32,
        notifications: mpsc::UnboundedSender<AttemptEvent>,
    ) -> AppResult<(Self, AttemptHandle)> {
        let started = backend.start_session(quiz_id).await?;
        let mut session = AttemptSession::new(started.quiz, started.questions);

        let mut clock = SessionClock::new(Duration::from_secs(session.quiz().time_budget_seconds()));
        let mut monitor = IntegrityMonitor::attach(environment, violation_limit);

        let deadline = if session.questions().is_empty() {
            monitor.detach();
            None
        } else {
            let deadline = clock.start()?;
            if let Some(expires_at) = clock.expires_at() {
                session.set_deadline(expires_at);
            }
            Some(deadline)
        };

        log::info!(
            "Started session '{}' on quiz '{}' with {} question(s)",
            session.submission_id(),
            session.quiz().id,
            session.questions().len()
        );

        let (commands_tx, commands) = mpsc::unbounded_channel();
        let controller = Self {
            backend,
            session,
            clock,
            monitor,
            commands,
            deadline,
            notifications,
        };

        let handle = AttemptHandle {
            commands: commands_tx,
            deadline_at: controller.session.deadline_at,
        };

        Ok((controller, handle))
    }

    pub fn session(&self) -> &AttemptSession {
        &self.session
    }

    pub fn remaining_time(&self) -> watch::Receiver<u64> {
        self.clock.subscribe_remaining()
    }

    /// Runs until the first trigger fires, finalizes, and submits once.
    pub async fn run(self) -> AttemptOutcome {
        let AttemptController {
            backend,
            mut session,
            mut clock,
            mut monitor,
            mut commands,
            deadline,
            notifications,
        } = self;

        let notify = |event: AttemptEvent| {
            let _ = notifications.send(event);
        };

        let trigger = match deadline {
            None => FinalizeTrigger::NoQuestions,
            Some(mut deadline) => {
                let mut commands_open = true;
                loop {
                    tokio::select! {
                        biased;
                        command = commands.recv(), if commands_open => {
                            if session.is_expired() {
                                break FinalizeTrigger::Deadline;
                            }
                            match command {
                                Some(AttemptCommand::SelectAnswer { question_id, option_id }) => {
                                    session.select_answer(question_id, option_id);
                                }
                                Some(AttemptCommand::Submit) => break FinalizeTrigger::User,
                                // The learner went away; the deadline still closes the session.
                                None => commands_open = false,
                            }
                        }
                        _ = &mut deadline => break FinalizeTrigger::Deadline,
                        signal = monitor.next_signal(), if monitor.is_attached() => match signal {
                            Some(IntegritySignal::ForceSubmit { .. }) => break FinalizeTrigger::Integrity,
                            Some(IntegritySignal::Warning { violations, limit }) => {
                                notify(AttemptEvent::Warning { violations, limit });
                            }
                            Some(IntegritySignal::RestrictedActionBlocked(action)) => {
                                notify(AttemptEvent::RestrictedActionBlocked { action });
                            }
                            None => {}
                        },
                    }
                }
            }
        };

        clock.cancel();
        monitor.detach();
        commands.close();

        let elapsed_seconds = session.elapsed_seconds();
        let answers = session.finalize().unwrap_or_default();
        notify(AttemptEvent::Finalized { trigger });

        log::info!(
            "Session '{}' finalized by {:?} after {}s",
            session.submission_id(),
            trigger,
            elapsed_seconds
        );

        let submission = if answers.is_empty() {
            None
        } else {
            let request = SubmitQuizRequest {
                quiz_id: session.quiz().id.clone(),
                answers: answers.clone(),
                time_taken_seconds: elapsed_seconds,
                submission_id: Some(session.submission_id().to_string()),
            };
            let result = backend.submit(request).await;
            if let Err(err) = &result {
                log::error!(
                    "Submission for session '{}' failed: {}",
                    session.submission_id(),
                    err
                );
            }
            Some(result)
        };

        AttemptOutcome {
            trigger,
            elapsed_seconds,
            answers,
            submission,
        }
    }
}

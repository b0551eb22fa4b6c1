//! Curriculum driver.
//!
//! The teacher feeds lessons one sentence at a time, waits for the network to
//! say the lesson's key word, rewards it when it does and repeats the word when
//! it stays silent. It never touches the network directly; everything goes
//! through the [`Student`] seam so the state machine can be driven by scripted
//! students in tests.
//!
//! ```text
//! IDLE -> TEACHING -> WAITING -> TEACHING ... -> IDLE
//!                       |  ^
//!                       v  |
//!                    CORRECTING
//! ```

pub mod curriculum;

use crate::config::TeacherConfig;
use bionet_data::{DelegateReply, DelegateRequest, Notification};
use curriculum::Curriculum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use uuid::Uuid;

/// What the teacher needs from the network it trains.
pub trait Student {
    /// Feeds a lesson through the token encoder with learning mode forced on.
    fn inject_lesson(&mut self, sentence: &str, now: u64);
    /// Whether a concept neuron for `word` exists.
    fn knows(&self, word: &str) -> bool;
    fn boost_concept(&mut self, word: &str, amount: f32);
    fn reward(&mut self, now: u64);
    fn punish(&mut self, now: u64);
    /// Most recent utterance not yet seen by the teacher.
    fn take_utterance(&mut self) -> Option<String>;
    fn notify(&mut self, notification: Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeacherState {
    Idle,
    Teaching,
    Waiting,
    Correcting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeacherErrorCode {
    /// The awaited word was not produced within the patience budget.
    StudentSilent,
    /// The last delegate request failed and built-in lessons were used.
    DelegateUnavailable,
}

/// How an instruction was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Started { topic: String, lessons: usize },
    Delegated { request: Uuid },
    Corrected,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherStatus {
    pub state: TeacherState,
    pub topic: Option<String>,
    pub awaited: Option<String>,
    pub remaining: usize,
    pub silence: u32,
    pub corrections: u32,
    pub delegate_pending: bool,
    pub error: Option<TeacherErrorCode>,
}

#[derive(Debug, Clone)]
struct PendingDelegate {
    id: Uuid,
    topic: String,
    issued_at: u64,
}

#[derive(Debug)]
pub struct Teacher {
    config: TeacherConfig,
    state: TeacherState,
    curriculum: Curriculum,
    awaited: Option<String>,
    silence: u32,
    corrections: u32,
    pending: Option<PendingDelegate>,
    outbox: Vec<DelegateRequest>,
    delegate_failed: bool,
    rng: ChaCha8Rng,
}

impl Teacher {
    #[must_use]
    pub fn new(config: TeacherConfig, seed: u64) -> Self {
        Self {
            config,
            state: TeacherState::Idle,
            curriculum: Curriculum::default(),
            awaited: None,
            silence: 0,
            corrections: 0,
            pending: None,
            outbox: Vec::new(),
            delegate_failed: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn state(&self) -> TeacherState {
        self.state
    }

    #[must_use]
    pub fn awaited(&self) -> Option<&str> {
        self.awaited.as_deref()
    }

    #[must_use]
    pub fn error_code(&self) -> Option<TeacherErrorCode> {
        if self.state == TeacherState::Correcting || self.silence > self.config.patience {
            Some(TeacherErrorCode::StudentSilent)
        } else if self.delegate_failed {
            Some(TeacherErrorCode::DelegateUnavailable)
        } else {
            None
        }
    }

    #[must_use]
    pub fn status(&self) -> TeacherStatus {
        TeacherStatus {
            state: self.state,
            topic: (!self.curriculum.topic.is_empty()).then(|| self.curriculum.topic.clone()),
            awaited: self.awaited.clone(),
            remaining: self.curriculum.len(),
            silence: self.silence,
            corrections: self.corrections,
            delegate_pending: self.pending.is_some(),
            error: self.error_code(),
        }
    }

    /// Handles a free-text instruction.
    ///
    /// A correction punishes the recent activity. Anything else replaces the
    /// running curriculum, either right away from the built-in table or, with
    /// `delegate` set, once the generated lessons come back. The current lesson
    /// keeps running until then; a newer request orphans an older one.
    pub fn instruct<S: Student>(
        &mut self,
        instruction: &str,
        delegate: bool,
        now: u64,
        student: &mut S,
    ) -> Instruction {
        let topic = instruction.trim();
        if topic.is_empty() {
            return Instruction::Ignored;
        }
        if curriculum::is_correction(topic) {
            student.punish(now);
            tracing::info!(instruction = topic, "Correction received");
            return Instruction::Corrected;
        }

        if delegate {
            let id = uuid::Builder::from_random_bytes(self.rng.gen::<[u8; 16]>()).into_uuid();
            self.outbox.push(DelegateRequest {
                id,
                topic: topic.to_string(),
                prompt: curriculum::delegate_prompt(topic, self.config.max_generated_lessons),
                issued_at: now,
            });
            self.pending = Some(PendingDelegate {
                id,
                topic: topic.to_string(),
                issued_at: now,
            });
            tracing::info!(topic, request = %id, "Curriculum delegated");
            return Instruction::Delegated { request: id };
        }

        self.pending = None;
        self.begin(curriculum::curriculum_for(topic), now, student)
    }

    /// Clears the queue and any outstanding delegate request.
    pub fn stop(&mut self) {
        self.state = TeacherState::Idle;
        self.curriculum = Curriculum::default();
        self.awaited = None;
        self.silence = 0;
        self.corrections = 0;
        self.pending = None;
    }

    /// Requests issued since the last call.
    pub fn take_requests(&mut self) -> Vec<DelegateRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Accepts a generator reply. Returns `false` for replies nobody waits for.
    pub fn deliver<S: Student>(&mut self, reply: DelegateReply, now: u64, student: &mut S) -> bool {
        if self.pending.as_ref().map(|p| p.id) != Some(reply.id) {
            tracing::debug!(request = %reply.id, "Ignoring stale delegate reply");
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match reply.result {
            Ok(text) => {
                let lessons = curriculum::split_sentences(&text, self.config.max_generated_lessons);
                if lessons.is_empty() {
                    self.fall_back(&pending.topic, "empty reply", now, student);
                } else {
                    self.delegate_failed = false;
                    self.begin(Curriculum::new(pending.topic, lessons), now, student);
                }
            }
            Err(e) => self.fall_back(&pending.topic, &e, now, student),
        }
        true
    }

    pub fn tick<S: Student>(&mut self, now: u64, student: &mut S) {
        let timed_out = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_sub(p.issued_at) > self.config.delegate_timeout_ms);
        if timed_out {
            if let Some(p) = self.pending.take() {
                self.fall_back(&p.topic, "timed out", now, student);
            }
            return;
        }

        match self.state {
            TeacherState::Idle => {}
            TeacherState::Teaching => self.teach_next(now, student),
            TeacherState::Waiting => self.wait(now, student),
            TeacherState::Correcting => self.correct(now, student),
        }
    }

    fn begin<S: Student>(&mut self, curriculum: Curriculum, now: u64, student: &mut S) -> Instruction {
        let topic = curriculum.topic.clone();
        let lessons = curriculum.len();
        self.curriculum = curriculum;
        self.awaited = None;
        self.silence = 0;
        self.corrections = 0;
        self.state = TeacherState::Teaching;
        student.notify(Notification::TrainingStarted {
            topic: topic.clone(),
            lessons,
            timestamp: now,
        });
        tracing::info!(%topic, lessons, "Curriculum started");
        Instruction::Started { topic, lessons }
    }

    fn fall_back<S: Student>(&mut self, topic: &str, reason: &str, now: u64, student: &mut S) {
        tracing::warn!(topic, reason, "Delegate failed, using built-in lessons");
        self.delegate_failed = true;
        student.notify(Notification::Diagnostic {
            message: format!("Lesson generator unavailable ({reason}), using built-in lessons"),
            timestamp: now,
        });
        self.begin(curriculum::curriculum_for(topic), now, student);
    }

    fn teach_next<S: Student>(&mut self, now: u64, student: &mut S) {
        while let Some(sentence) = self.curriculum.lessons.pop_front() {
            let Some(word) = curriculum::key_concept(&sentence) else {
                continue;
            };
            // Anything said before the lesson does not count as an answer.
            let _ = student.take_utterance();
            student.inject_lesson(&sentence, now);
            student.notify(Notification::LessonInjected {
                sentence,
                awaited: word.clone(),
                timestamp: now,
            });
            self.awaited = Some(word);
            self.silence = 0;
            self.corrections = 0;
            self.state = TeacherState::Waiting;
            return;
        }

        student.notify(Notification::TrainingCompleted {
            topic: self.curriculum.topic.clone(),
            timestamp: now,
        });
        tracing::info!(topic = %self.curriculum.topic, "Curriculum completed");
        self.awaited = None;
        self.state = TeacherState::Idle;
    }

    fn wait<S: Student>(&mut self, now: u64, student: &mut S) {
        let Some(word) = self.awaited.as_deref() else {
            self.state = TeacherState::Teaching;
            return;
        };
        if let Some(utterance) = student.take_utterance() {
            if utterance.to_lowercase().contains(&word.to_lowercase()) {
                tracing::debug!(word, "Student answered");
                student.reward(now);
                self.state = TeacherState::Teaching;
                return;
            }
        }

        if self.rng.gen_bool(self.config.pace_probability) {
            self.silence += 1;
        }
        if self.silence > self.config.patience {
            self.state = TeacherState::Correcting;
        }
    }

    fn correct<S: Student>(&mut self, now: u64, student: &mut S) {
        let Some(word) = self.awaited.clone() else {
            self.state = TeacherState::Teaching;
            return;
        };

        if self.corrections >= self.config.max_corrections {
            tracing::info!(%word, attempts = self.corrections, "Skipping lesson");
            student.notify(Notification::LessonSkipped {
                word,
                timestamp: now,
            });
            self.awaited = None;
            self.silence = 0;
            self.corrections = 0;
            self.state = TeacherState::Teaching;
            return;
        }

        self.corrections += 1;
        if student.knows(&word) {
            student.boost_concept(&word, self.config.correction_boost);
        } else {
            student.inject_lesson(&word, now);
        }
        student.notify(Notification::CorrectionApplied {
            word,
            attempt: self.corrections,
            timestamp: now,
        });
        self.silence = 0;
        self.state = TeacherState::Waiting;
    }
}

mod common;

use bionet_core::{Instruction, TeacherErrorCode, TeacherState};
use bionet_data::Notification;
use bionet_lib::app::{Command, Session};
use bionet_observer::{CannedGenerator, DelegateError, TextGenerator};
use common::BrainBuilder;
use std::sync::Arc;
use std::time::Duration;

struct StalledGenerator;

#[async_trait::async_trait]
impl TextGenerator for StalledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, DelegateError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(DelegateError::Empty)
    }
}

/// Steps the session until the teacher leaves `Idle`, yielding to the
/// generator between steps.
async fn step_until_teaching(session: &mut Session, mut now: u64) -> (u64, Vec<Notification>) {
    let mut events = Vec::new();
    for _ in 0..400 {
        now += 50;
        events.extend(session.step(now));
        if session.brain().teacher_status().state != TeacherState::Idle {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    (now, events)
}

#[tokio::test]
async fn test_generated_lessons_become_the_curriculum() {
    let mut session = BrainBuilder::new().with_eager_teacher().build_session(
        Arc::new(CannedGenerator(
            "Der Mond ist rund. Der Mond leuchtet nachts.".into(),
        )),
        Duration::from_secs(2),
    );

    let lines = session
        .execute(Command::Teach("Mond".into()), 0)
        .expect("teach");
    assert!(lines[0].contains("generator"));
    assert!(session.brain().teacher_status().delegate_pending);

    let (_, events) = step_until_teaching(&mut session, 0).await;
    assert_notified!(
        events,
        Notification::TrainingStarted { topic, lessons: 2, .. } if topic == "Mond"
    );
    assert_eq!(session.brain().health().error, None);
}

#[tokio::test]
async fn test_failed_generator_falls_back_to_built_in_lessons() {
    let mut session = BrainBuilder::new()
        .with_eager_teacher()
        .build_session(Arc::new(CannedGenerator(String::new())), Duration::from_secs(2));

    session
        .execute(Command::Teach("Katze".into()), 0)
        .expect("teach");
    let (_, events) = step_until_teaching(&mut session, 0).await;

    assert_notified!(events, Notification::Diagnostic { .. });
    assert_notified!(
        events,
        Notification::TrainingStarted { topic, lessons: 3, .. } if topic == "Katze"
    );
    assert_eq!(
        session.brain().health().error,
        Some(TeacherErrorCode::DelegateUnavailable)
    );
}

#[tokio::test]
async fn test_unanswered_request_times_out_on_the_engine_clock() {
    let mut session = BrainBuilder::new()
        .with_eager_teacher()
        .with_config(|c| c.teacher.delegate_timeout_ms = 500)
        .build_session(Arc::new(StalledGenerator), Duration::from_secs(120));

    session
        .execute(Command::Teach("Baum".into()), 0)
        .expect("teach");
    // Nothing arrives; the engine clock alone drives the fallback.
    let mut events = Vec::new();
    for t in 1..=13 {
        events.extend(session.step(t * 50));
    }

    assert_ne!(session.brain().teacher_status().state, TeacherState::Idle);
    assert_notified!(events, Notification::TrainingStarted { topic, .. } if topic == "Baum");
    assert_eq!(
        session.brain().health().error,
        Some(TeacherErrorCode::DelegateUnavailable)
    );
}

#[tokio::test]
async fn test_restarting_the_curriculum_orphans_the_old_request() {
    let mut brain = BrainBuilder::new()
        .with_config(|c| c.teacher.use_delegate = true)
        .build();
    let Instruction::Delegated { request: first } = brain.start_curriculum("Sonne", 0) else {
        panic!("expected a delegated curriculum");
    };
    brain.stop_curriculum();
    brain.take_delegate_requests();

    let stale = bionet_data::DelegateReply {
        id: first,
        result: Ok("Die Sonne scheint.".into()),
    };
    assert!(!brain.deliver_delegate_reply(stale, 10));
    assert_eq!(brain.teacher_status().state, TeacherState::Idle);
}

//! A console session: one [`Brain`], an optional text generator and the
//! glue that moves requests, replies and notifications between them.

use crate::app::command::{Command, HELP};
use anyhow::{Context, Result};
use bionet_core::{Brain, Instruction};
use bionet_data::Notification;
use bionet_observer::DelegateDispatcher;
use std::path::{Path, PathBuf};

pub struct Session {
    brain: Brain,
    dispatcher: Option<DelegateDispatcher>,
    snapshot_dir: PathBuf,
}

impl Session {
    /// Without a dispatcher the teacher always uses its built-in lessons.
    pub fn new(mut brain: Brain, dispatcher: Option<DelegateDispatcher>) -> Self {
        let enabled = dispatcher.is_some() && brain.config().teacher.use_delegate;
        brain.set_delegate_enabled(enabled);
        Self {
            brain,
            dispatcher,
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }

    #[must_use]
    pub fn with_snapshot_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub fn brain_mut(&mut self) -> &mut Brain {
        &mut self.brain
    }

    /// One scheduler step: tick, maintenance when due, delegate traffic.
    ///
    /// Returns the notifications raised along the way.
    pub fn step(&mut self, now: u64) -> Vec<Notification> {
        self.brain.tick(now);
        if self.brain.maintenance_due(now) {
            self.brain.maintenance(now);
        }

        let requests = self.brain.take_delegate_requests();
        match &self.dispatcher {
            Some(dispatcher) => {
                for request in requests {
                    tracing::debug!(request = %request.id, topic = %request.topic, "Dispatching");
                    dispatcher.dispatch(request);
                }
                for reply in dispatcher.consume_replies() {
                    if !self.brain.deliver_delegate_reply(reply, now) {
                        tracing::debug!("Ignored stale generator reply");
                    }
                }
            }
            None if !requests.is_empty() => {
                tracing::warn!(count = requests.len(), "No generator configured, requests dropped");
            }
            None => {}
        }

        self.brain.drain_notifications()
    }

    /// Applies a console command and returns the lines to show.
    ///
    /// [`Command::Quit`] is left to the caller.
    pub fn execute(&mut self, command: Command, now: u64) -> Result<Vec<String>> {
        let lines = match command {
            Command::Say(text) => {
                if text.is_empty() {
                    return Ok(Vec::new());
                }
                let report = self.brain.process_text(&text, now);
                tracing::debug!(
                    created = report.created.len(),
                    links = report.links_created,
                    "Text processed"
                );
                Vec::new()
            }
            Command::Teach(instruction) => match self.brain.start_curriculum(&instruction, now) {
                Instruction::Delegated { request } => {
                    vec![format!("Asked the generator for lessons ({request})")]
                }
                Instruction::Corrected => vec!["Noted.".to_string()],
                Instruction::Ignored => vec!["Nothing to teach.".to_string()],
                // TrainingStarted is reported through the notification queue.
                Instruction::Started { .. } => Vec::new(),
            },
            Command::Stop => {
                self.brain.stop_curriculum();
                vec!["Curriculum stopped".to_string()]
            }
            Command::Delegate(on) => {
                if on && self.dispatcher.is_none() {
                    vec!["No generator configured; start with --generator".to_string()]
                } else {
                    self.brain.set_delegate_enabled(on);
                    vec![format!("Generator {}", if on { "enabled" } else { "disabled" })]
                }
            }
            Command::Reinforce(kind) => {
                self.brain.apply_reinforcement(kind, now);
                Vec::new()
            }
            Command::Learn => {
                let on = self.brain.toggle_learning_mode();
                vec![format!("Learning mode {}", if on { "on" } else { "off" })]
            }
            Command::Freeze => {
                let frozen = self.brain.toggle_freeze();
                vec![if frozen { "Frozen" } else { "Running" }.to_string()]
            }
            Command::Sleep => {
                self.brain.sleep(now);
                Vec::new()
            }
            Command::Think => {
                let thinking = self.brain.mode() == bionet_core::Mode::Thinking;
                if thinking {
                    self.brain.stop_thinking();
                    vec!["Stopped thinking".to_string()]
                } else {
                    self.brain.start_thinking();
                    vec!["Thinking...".to_string()]
                }
            }
            Command::See(frame) => {
                let lit = self.brain.process_image(&frame)?;
                vec![format!("{lit} pixels lit")]
            }
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.default_snapshot_path());
                self.save(&path, now)?;
                vec![format!("Saved to {}", path.display())]
            }
            Command::Load(path) => {
                self.load(&path, now)?;
                Vec::new()
            }
            Command::Stats => {
                let stats = self.brain.stats();
                vec![serde_json::to_string_pretty(&stats).context("formatting stats")?]
            }
            Command::Health => vec![self.brain.health().summary()],
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Quit => Vec::new(),
        };
        Ok(lines)
    }

    pub fn save(&self, path: &Path, now: u64) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        bionet_io::save_snapshot(&self.brain.export_snapshot(now), path)?;
        tracing::info!(path = %path.display(), "Snapshot saved");
        Ok(())
    }

    /// Loads a snapshot file. A rejected snapshot leaves the brain as it was.
    pub fn load(&mut self, path: &Path, now: u64) -> Result<()> {
        let snapshot = bionet_io::load_snapshot(path)?;
        self.brain
            .import_snapshot(snapshot, now)
            .with_context(|| format!("importing {}", path.display()))?;
        Ok(())
    }

    fn default_snapshot_path(&self) -> PathBuf {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
        self.snapshot_dir.join(format!("brain_{timestamp}.json.gz"))
    }
}

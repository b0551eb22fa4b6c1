pub mod macros;

use bionet_core::{AppConfig, Brain};
use bionet_data::{Neuron, Notification};
use bionet_lib::app::Session;
use bionet_observer::{DelegateDispatcher, TextGenerator};
use std::sync::Arc;
use std::time::Duration;

/// Builds a brain with no association neurons, so only input neurons and
/// whatever the test feeds in exist.
#[allow(dead_code)]
pub struct BrainBuilder {
    config: AppConfig,
    inputs: Vec<String>,
    learning_mode: bool,
}

#[allow(dead_code)]
impl BrainBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.engine.seed = Some(42);
        config.engine.initial_core_neurons = 0;
        Self {
            config,
            inputs: Vec::new(),
            learning_mode: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.engine.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Teacher that advances every tick and corrects after three silent ticks.
    pub fn with_eager_teacher(self) -> Self {
        self.with_config(|c| {
            c.teacher.pace_probability = 1.0;
            c.teacher.patience = 3;
        })
    }

    pub fn learning(mut self) -> Self {
        self.learning_mode = true;
        self
    }

    /// Text fed at time 0 after boot.
    pub fn with_input(mut self, text: &str) -> Self {
        self.inputs.push(text.to_string());
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> Brain {
        let mut brain = Brain::new(self.config);
        brain.set_learning_mode(self.learning_mode);
        for text in &self.inputs {
            brain.process_text(text, 0);
        }
        brain
    }

    /// Session backed by a generator. Must run inside a tokio runtime.
    pub fn build_session(mut self, generator: Arc<dyn TextGenerator>, timeout: Duration) -> Session {
        self.config.teacher.use_delegate = true;
        let dispatcher = DelegateDispatcher::new(generator, timeout);
        Session::new(self.build(), Some(dispatcher))
    }
}

#[allow(dead_code)]
pub fn concept<'a>(brain: &'a Brain, label: &str) -> &'a Neuron {
    let id = brain
        .store()
        .find_by_label(label)
        .unwrap_or_else(|| panic!("no neuron labelled {label}"));
    brain.store().get(id).expect("indexed neuron exists")
}

/// Ticks every 50 ms from `start` and returns the notifications raised.
#[allow(dead_code)]
pub fn run_ticks(brain: &mut Brain, start: u64, ticks: u64) -> Vec<Notification> {
    for t in 0..ticks {
        brain.tick(start + t * 50);
    }
    brain.drain_notifications()
}

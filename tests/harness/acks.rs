//! Recorder for frame acknowledgments.

use std::sync::{Arc, Mutex};

use rsws_endpoint::{Callback, Result};

/// Collects the outcome of every callback it hands out, in completion order.
#[derive(Clone, Default)]
pub struct Acks {
    outcomes: Arc<Mutex<Vec<Result<()>>>>,
}

impl Acks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> Callback {
        let outcomes = self.outcomes.clone();
        Callback::new(move |outcome| outcomes.lock().unwrap().push(outcome))
    }

    pub fn outcomes(&self) -> Vec<Result<()>> {
        self.outcomes.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.lock().unwrap().iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.lock().unwrap().iter().filter(|o| o.is_err()).count()
    }
}

use crate::types::{AgentId, FailureReason};

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    RoundStarted {
        round: usize,
        buyers: usize,
        sellers: usize,
        neutral: usize,
    },

    Settled {
        round: usize,
        buyer: AgentId,
        seller: AgentId,
        energy_kwh: f64,
        price_per_kwh: f64,
        tx_hash: String,
    },

    AttemptFailed {
        round: usize,
        buyer: Option<AgentId>,
        seller: Option<AgentId>,
        reason: FailureReason,
    },

    RoundFinished {
        round: usize,
        settled: usize,
        energy_kwh: f64,
    },
}

pub trait EventListener {
    fn on_event(&mut self, event: &SimEvent);
}

/// Adapts a closure into a listener.
pub struct ClosureListener<F: FnMut(&SimEvent)> {
    closure: F,
}

impl<F: FnMut(&SimEvent)> ClosureListener<F> {
    pub fn new(closure: F) -> Self {
        Self { closure }
    }
}

impl<F: FnMut(&SimEvent)> EventListener for ClosureListener<F> {
    fn on_event(&mut self, event: &SimEvent) {
        (self.closure)(event);
    }
}

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { listeners: Vec::new() }
    }

    /// Subscribe a new listener.
    pub fn subscribe(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    /// Emit an event to all listeners.
    pub fn emit(&mut self, event: SimEvent) {
        for listener in self.listeners.iter_mut() {
            listener.on_event(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

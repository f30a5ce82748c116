// src/sim_engine.rs
// High-level simulation engine wrapper around the Kernel.
// Callers build a SimEngine from a config (or the four run knobs) and run it.

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::events::EventListener;
use crate::kernel::Kernel;
use crate::logging::TracingListener;
use crate::report::RunOutput;

/// High-level simulation engine: a kernel with the tracing logger attached.
pub struct SimEngine {
    pub kernel: Kernel,
}

impl SimEngine {
    pub fn new(config: SimConfig) -> SimResult<Self> {
        let mut kernel = Kernel::new(config)?;
        kernel
            .event_bus_mut()
            .subscribe(Box::new(TracingListener::new()) as Box<dyn EventListener>);
        Ok(Self { kernel })
    }

    /// Attach an extra listener before running.
    pub fn subscribe(&mut self, listener: Box<dyn EventListener>) {
        self.kernel.event_bus_mut().subscribe(listener);
    }

    /// Run every round and hand back the attempt log, fleet snapshot and ledger.
    pub fn run(mut self) -> RunOutput {
        self.kernel.run();
        self.kernel.into_output()
    }
}

/// Run the reference configuration with the four run-level knobs.
pub fn run(agent_count: usize, round_count: usize, fast_network: bool, seed: u64) -> SimResult<RunOutput> {
    let engine = SimEngine::new(SimConfig::new(agent_count, round_count, fast_network, seed))?;
    Ok(engine.run())
}

pub mod locator;
pub mod sampler;
pub mod scheduler;
pub mod window_titles;

#[cfg(test)]
pub(crate) mod testing;

pub use locator::{ProcessLocator, ProcessTable, SystemProcessTable};
pub use sampler::{sample_once, NowPlayingSampler, SamplerPhase, SamplerState, TickOutcome};
pub use scheduler::{repeat_every, PollAction, PollScheduler};

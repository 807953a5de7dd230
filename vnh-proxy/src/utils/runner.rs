use crate::dispatcher::{EventDispatcher, Outcome};
use crate::error::PipelineError;
use crate::injector::PacketInjector;
use crate::mapping::AddressMapper;
use crate::types::PacketIn;
use crossbeam::channel::Receiver;
use futures::future::join_all;
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::runtime;
use tracing::{debug, info};

/// Counts of what happened to the events a run handled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub events: usize,
    pub not_applicable: usize,
    pub no_mapping: usize,
    pub replies: usize,
    pub inject_failures: usize,
}

impl DispatchStats {
    pub fn record(&mut self, outcome: Outcome) {
        self.events += 1;
        match outcome {
            Outcome::NotApplicable => self.not_applicable += 1,
            Outcome::NoMapping => self.no_mapping += 1,
            Outcome::Replied => self.replies += 1,
            Outcome::InjectFailed => self.inject_failures += 1,
        }
    }
}

impl AddAssign for DispatchStats {
    fn add_assign(&mut self, other: DispatchStats) {
        self.events += other.events;
        self.not_applicable += other.not_applicable;
        self.no_mapping += other.no_mapping;
        self.replies += other.replies;
        self.inject_failures += other.inject_failures;
    }
}

/// Runner is the host-side loop around an `EventDispatcher`.
///
/// It starts a multi-threaded Tokio runtime and `workers` dispatch workers (at least one). Each
/// worker pulls packet-in events off the shared `events` receiver and handles them to completion
/// on Tokio's blocking pool, since mapping lookups may read from disk. Events are not ordered
/// across workers.
///
/// The run ends once every sender for `events` has been dropped and the channel is drained. The
/// dispatcher, and with it the injector, is dropped before this returns, so a channel-backed
/// injector's receiver sees the end of the stream.
pub fn run_dispatcher<M, I>(
    dispatcher: Arc<EventDispatcher<M, I>>,
    events: Receiver<PacketIn>,
    workers: usize,
) -> Result<DispatchStats, PipelineError>
where
    M: AddressMapper + 'static,
    I: PacketInjector + 'static,
{
    let runtime = runtime::Builder::new_multi_thread()
        .thread_name("vnh-proxy")
        .build()?;

    let workers = workers.max(1);
    let stats = runtime.block_on(async move {
        let handles = (0..workers)
            .map(|worker| {
                let dispatcher = dispatcher.clone();
                let events = events.clone();
                tokio::task::spawn_blocking(move || {
                    let mut stats = DispatchStats::default();
                    for event in events.iter() {
                        stats.record(dispatcher.handle(&event));
                    }
                    debug!(worker, events = stats.events, "dispatch worker finished");
                    stats
                })
            })
            .collect::<Vec<_>>();
        // Only the workers may hold the dispatcher and receiver now
        drop(dispatcher);
        drop(events);

        // 🏃💨💨
        let mut total = DispatchStats::default();
        for result in join_all(handles).await {
            total += result?;
        }
        Ok::<DispatchStats, PipelineError>(total)
    })?;

    info!(
        events = stats.events,
        replies = stats.replies,
        no_mapping = stats.no_mapping,
        inject_failures = stats.inject_failures,
        "dispatcher drained"
    );
    Ok(stats)
}

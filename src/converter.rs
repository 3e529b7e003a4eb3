//! Fixed-cadence conversion loop
//!
//! Pulls one raw sample set per tick, runs it through the axis pipeline
//! and pushes the result to the output sink. Owns no mapping logic itself.

use crate::pipeline::AxisPipeline;
use crate::sink::{OutputSink, SinkError};
use crate::source::SampleSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, trace};

/// Loop lifecycle. `Stopped` is terminal, reached on shutdown or the first
/// per-tick error; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Running,
    Stopped,
}

/// The conversion loop: source -> pipeline -> sink at a fixed rate.
///
/// Single thread of control; the shutdown flag is observed once per tick
/// boundary, never mid-tick. Pacing is a fixed sleep between ticks
/// (best effort, not hard real-time).
pub struct Converter<S, K> {
    source: S,
    sink: K,
    pipeline: AxisPipeline,
    tick: Duration,
    shutdown: Arc<AtomicBool>,
    state: LoopState,
}

impl<S: SampleSource, K: OutputSink> Converter<S, K> {
    pub fn new(
        source: S,
        sink: K,
        pipeline: AxisPipeline,
        tick_hz: u32,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            sink,
            pipeline,
            tick: Duration::from_secs_f64(1.0 / f64::from(tick_hz.max(1))),
            shutdown,
            state: LoopState::Initializing,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Tear down the converter and return the source, sink and pipeline
    pub fn into_parts(self) -> (S, K, AxisPipeline) {
        (self.source, self.sink, self.pipeline)
    }

    /// One poll-produce-emit cycle
    fn tick(&mut self) -> Result<(), SinkError> {
        self.source.poll();
        let frame = self.pipeline.produce_frame(&self.source);
        trace!(
            "x: {:5.2}, y: {:5.2}, rx: {:5.2}, ry: {:5.2}",
            frame.x,
            frame.y,
            frame.rx,
            frame.ry
        );
        self.sink.emit(&frame)
    }

    /// Run until shutdown is requested or a tick fails.
    ///
    /// The first error aborts the loop and is returned to the caller; the
    /// sink handle is released when the converter is dropped.
    pub fn run(&mut self) -> Result<(), SinkError> {
        self.state = LoopState::Running;
        info!("Entering main loop ({} ms per tick)", self.tick.as_millis());

        let result = loop {
            if self.shutdown.load(Ordering::SeqCst) {
                info!("Shutdown requested");
                break Ok(());
            }
            if let Err(e) = self.tick() {
                break Err(e);
            }
            std::thread::sleep(self.tick);
        };

        self.state = LoopState::Stopped;
        result
    }
}

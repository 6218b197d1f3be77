use std::{sync::Arc, thread};

use anyhow::Result;
use log::{debug, info, warn};

use crate::{
    charts::{ChartRegistry, bind},
    client::{SimulationClient, SimulationRequest},
    error::DashboardError,
    matrix::present,
    metrics::{MetricsTable, PerformanceMetrics},
    render::{Renderer, Status},
    results::SimulationResult,
};

/// Response to request `seq`, as delivered by the worker thread
#[derive(Debug)]
pub struct Completion {
    pub seq: u64,
    pub outcome: Result<SimulationResult, DashboardError>,
}

#[derive(Debug)]
pub enum ApplyOutcome {
    /// The result is now the one displayed
    Applied,
    /// The request failed; the previous result, if any, is still displayed
    Failed(DashboardError),
    /// A newer request was issued after this one; the response was dropped
    Stale,
}

/// The result currently on display, with everything derived from it
#[derive(Debug)]
pub struct CurrentRun {
    pub seq: u64,
    pub result: SimulationResult,
    pub metrics: PerformanceMetrics,
    pub table: MetricsTable,
}

/// One dashboard view: owns the displayed result and the charts drawn from it.
///
/// Requests run on worker threads and report back over a channel. Only the
/// response to the most recently issued request is ever applied.
pub struct Session<R> {
    client: Arc<SimulationClient>,
    renderer: R,
    charts: ChartRegistry,
    current: Option<CurrentRun>,

    latest_seq: u64,
    tx: flume::Sender<Completion>,
    rx: flume::Receiver<Completion>,
}

impl<R: Renderer> Session<R> {
    pub fn new(client: SimulationClient, renderer: R) -> Self {
        let (tx, rx) = flume::unbounded();

        Self {
            client: Arc::new(client),
            renderer,
            charts: ChartRegistry::create(),
            current: None,
            latest_seq: 0,
            tx,
            rx,
        }
    }

    /// Allocates the sequence number of a new request and reports it as running
    pub fn issue(&mut self) -> Result<u64> {
        self.latest_seq += 1;
        debug!("Issued request {}", self.latest_seq);

        self.renderer.show_status(&Status::Running)?;

        Ok(self.latest_seq)
    }

    /// Starts a simulation in the background. Earlier requests still in flight are not cancelled.
    pub fn submit(&mut self, request: SimulationRequest) -> Result<u64> {
        let seq = self.issue()?;

        let client = self.client.clone();
        let tx = self.tx.clone();

        thread::spawn(move || {
            let outcome = client.submit(&request);

            // The session may already be gone, nobody is left to tell
            let _ = tx.send(Completion { seq, outcome });
        });

        Ok(seq)
    }

    /// Applies a response, unless a newer request has been issued since.
    ///
    /// A result is fully validated before this is called, so charts and
    /// metrics are either all replaced or not touched at all. Both are
    /// committed before the renderer sees them; a renderer error is reported
    /// as the status and leaves the new run in place.
    pub fn complete(&mut self, completion: Completion) -> Result<ApplyOutcome> {
        let Completion { seq, outcome } = completion;

        if seq != self.latest_seq {
            info!(
                "Discarding stale response to request {seq} (latest is {})",
                self.latest_seq
            );
            return Ok(ApplyOutcome::Stale);
        }

        let result = match outcome {
            Ok(result) => result,
            Err(err) => return self.fail(err),
        };

        let metrics = match PerformanceMetrics::compute(&result) {
            Ok(metrics) => metrics,
            Err(err) => return self.fail(err),
        };
        let table = MetricsTable::from_metrics(&metrics);
        let bundle = bind(&result);

        let run = self.current.insert(CurrentRun {
            seq,
            result,
            metrics,
            table,
        });

        let shown = self
            .charts
            .update(seq, bundle, &mut self.renderer)
            .and_then(|()| self.renderer.show_metrics(&run.table));

        match shown {
            Ok(()) => self.renderer.show_status(&Status::Completed)?,
            Err(err) => {
                warn!("Could not display run {seq}: {err:#}");
                self.renderer
                    .show_status(&Status::Failed(err.to_string()))?;
            }
        }

        Ok(ApplyOutcome::Applied)
    }

    fn fail(&mut self, err: DashboardError) -> Result<ApplyOutcome> {
        warn!("Request {} failed: {err}", self.latest_seq);

        self.renderer
            .show_status(&Status::Failed(err.to_string()))?;

        Ok(ApplyOutcome::Failed(err))
    }

    /// Applies every response that has already arrived, without blocking
    pub fn poll(&mut self) -> Result<Vec<ApplyOutcome>> {
        let mut outcomes = vec![];

        while let Ok(completion) = self.rx.try_recv() {
            outcomes.push(self.complete(completion)?);
        }

        Ok(outcomes)
    }

    /// Blocks until the response to the latest request has been handled
    pub fn wait(&mut self) -> Result<ApplyOutcome> {
        loop {
            let completion = self.rx.recv()?;
            let latest = completion.seq == self.latest_seq;

            let outcome = self.complete(completion)?;
            if latest {
                return Ok(outcome);
            }
        }
    }

    /// Shows the gain matrix of the displayed run, or that there is none
    pub fn show_matrix(&mut self) -> Result<()> {
        let gain = self.current.as_ref().and_then(|run| run.result.gain());

        match present(gain) {
            Ok(matrix) => self.renderer.show_matrix(Some(&matrix)),
            Err(err) => {
                info!("{err}");
                self.renderer.show_matrix(None)
            }
        }
    }

    pub fn current(&self) -> Option<&CurrentRun> {
        self.current.as_ref()
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }
}

// ABOUTME: Dedicated worker thread that performs blocking front/hide requests off the key-event path
// ABOUTME: Requests arrive over a channel and outcomes are reported back on a result channel

use crate::error::Result;
use crate::platform::Activator;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Front,
    Hide,
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Front => f.write_str("bring to front"),
            Activation::Hide => f.write_str("hide"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    pub application_id: String,
    pub activation: Activation,
}

#[derive(Debug)]
pub struct ActivationReport {
    pub request: ActivationRequest,
    pub result: Result<()>,
}

enum WorkerMessage {
    Request(ActivationRequest),
    Shutdown,
}

/// Cloneable handle used by the dispatcher to enqueue requests.
#[derive(Clone)]
pub struct ActivationQueue {
    sender: Sender<WorkerMessage>,
}

impl ActivationQueue {
    /// Returns false when the worker has already stopped.
    pub fn submit(&self, request: ActivationRequest) -> bool {
        match self.sender.send(WorkerMessage::Request(request)) {
            Ok(()) => true,
            Err(mpsc::SendError(WorkerMessage::Request(request))) => {
                tracing::warn!(
                    "Activation worker stopped; dropping request to {} {}",
                    request.activation,
                    request.application_id
                );
                false
            }
            Err(_) => false,
        }
    }
}

pub struct ActivationWorker {
    sender: Sender<WorkerMessage>,
    reports: Option<Receiver<ActivationReport>>,
    handle: Option<JoinHandle<()>>,
}

impl ActivationWorker {
    pub fn spawn(activator: Box<dyn Activator>) -> std::io::Result<Self> {
        let (sender, requests) = mpsc::channel();
        let (report_sender, reports) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("hotswitch-activation".to_string())
            .spawn(move || run_worker(activator, requests, report_sender))?;

        Ok(Self {
            sender,
            reports: Some(reports),
            handle: Some(handle),
        })
    }

    pub fn queue(&self) -> ActivationQueue {
        ActivationQueue {
            sender: self.sender.clone(),
        }
    }

    /// Hands the result channel to a consumer. Only the first call returns it.
    pub fn take_reports(&mut self) -> Option<Receiver<ActivationReport>> {
        self.reports.take()
    }

    /// Stops the worker after it drains queued requests and returns any reports nobody consumed.
    pub fn shutdown(mut self) -> Vec<ActivationReport> {
        self.stop();
        self.reports
            .take()
            .map(|reports| reports.try_iter().collect())
            .unwrap_or_default()
    }

    fn stop(&mut self) {
        let _ = self.sender.send(WorkerMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Activation worker panicked");
            }
        }
    }
}

impl Drop for ActivationWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    activator: Box<dyn Activator>,
    requests: Receiver<WorkerMessage>,
    reports: Sender<ActivationReport>,
) {
    tracing::debug!("Activation worker started");

    for message in requests {
        let request = match message {
            WorkerMessage::Request(request) => request,
            WorkerMessage::Shutdown => break,
        };

        let result = match request.activation {
            Activation::Front => activator.bring_to_front(&request.application_id),
            Activation::Hide => activator.hide(&request.application_id),
        };

        match &result {
            Ok(()) => tracing::debug!("{} {}: done", request.activation, request.application_id),
            Err(e) => tracing::debug!("{} {}: {}", request.activation, request.application_id, e),
        }

        // Nobody listening is fine: reports are informational
        let _ = reports.send(ActivationReport { request, result });
    }

    tracing::debug!("Activation worker finished");
}

/// Logs every report until the worker goes away.
pub fn run_report_loop(reports: Receiver<ActivationReport>) {
    for report in reports {
        match report.result {
            Ok(()) => tracing::info!(
                "{}: {}",
                report.request.application_id,
                report.request.activation
            ),
            Err(e) => tracing::warn!("Activation failed: {}", e),
        }
    }
    tracing::debug!("Activation report channel closed");
}

//! In-process service loop.

use {
    tokio::sync::{mpsc, oneshot},
    tracing::{debug, info},
};

use crate::{
    orchestrator::Orchestrator,
    protocol::{Request, Response},
};

/// A request paired with its reply slot.
struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Cloneable handle to the running orchestrator. Dropping every handle shuts
/// the service down.
#[derive(Clone)]
pub struct ServiceHandle {
    tx: mpsc::Sender<Envelope>,
}

impl ServiceHandle {
    /// Send one request and wait for its response. A closed service answers
    /// with a failure response rather than an error type, matching the
    /// protocol's "every failure is a response" rule.
    pub async fn send(&self, request: Request) -> Response {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Envelope { request, reply }).await.is_err() {
            return Response::failure("orchestrator is not running");
        }
        rx.await
            .unwrap_or_else(|_| Response::failure("orchestrator dropped the request"))
    }
}

/// Spawn the orchestrator's serve loop and return a handle to it. Requests
/// are handled strictly in order; the hidden browser is a serial resource
/// and interleaving two previews on one page would corrupt both.
#[must_use]
pub fn spawn(orchestrator: Orchestrator) -> ServiceHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(32);

    tokio::spawn(async move {
        info!("orchestrator service started");
        while let Some(envelope) = rx.recv().await {
            let response = orchestrator.handle(envelope.request).await;
            if envelope.reply.send(response).is_err() {
                debug!("caller went away before the response was ready");
            }
        }
        orchestrator.shutdown().await;
        info!("orchestrator service stopped");
    });

    ServiceHandle { tx }
}

//! Background worker that talks to the persistence backend without blocking
//! the UI.
//!
//! Requests go out over one channel and responses come back over another;
//! the UI polls [`Dispatcher::try_recv`] once per tick. Requests are handled
//! one at a time in the order they were sent.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use tripboard_core::{Backend, BackendError, Point, PointId, PointWire};

use crate::session::EditorKey;

/// Request sent to the background worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceRequest {
    Create {
        point: PointWire,
    },
    Update {
        id: PointId,
        point: PointWire,
        /// Only the favorite flag changed; the form stays open on success
        favorite_only: bool,
    },
    Delete {
        id: PointId,
    },
    /// Graceful shutdown
    Shutdown,
}

impl PersistenceRequest {
    /// Editor the response must be routed back to
    pub fn target(&self) -> Option<EditorKey> {
        match self {
            PersistenceRequest::Create { .. } => Some(EditorKey::Draft),
            PersistenceRequest::Update { id, .. } | PersistenceRequest::Delete { id } => {
                Some(EditorKey::Point(id.clone()))
            }
            PersistenceRequest::Shutdown => None,
        }
    }
}

/// Response from the background worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceResponse {
    /// Canonical point as stored
    Created { point: Point },
    Updated { point: Point, favorite_only: bool },
    Deleted { id: PointId },
    Failed {
        target: EditorKey,
        favorite_only: bool,
        error: BackendError,
    },
}

/// Send side of the persistence round trip as seen by the UI.
pub trait Dispatcher {
    /// Queue a request. Returns false when the worker is gone.
    fn send(&self, request: PersistenceRequest) -> bool;

    /// Try to receive a response (non-blocking)
    fn try_recv(&self) -> Option<PersistenceResponse>;
}

/// Run one request against `backend`.
pub fn execute(backend: &dyn Backend, request: PersistenceRequest) -> Option<PersistenceResponse> {
    let target = request.target()?;
    let response = match request {
        PersistenceRequest::Create { point } => backend
            .create_point(&point)
            .map(|point| PersistenceResponse::Created { point })
            .map_err(|error| (error, false)),
        PersistenceRequest::Update {
            id,
            point,
            favorite_only,
        } => backend
            .update_point(&id, &point)
            .map(|point| PersistenceResponse::Updated {
                point,
                favorite_only,
            })
            .map_err(|error| (error, favorite_only)),
        PersistenceRequest::Delete { id } => backend
            .delete_point(&id)
            .map(|()| PersistenceResponse::Deleted { id })
            .map_err(|error| (error, false)),
        PersistenceRequest::Shutdown => return None,
    };

    Some(response.unwrap_or_else(|(error, favorite_only)| {
        tracing::warn!(%target, "Persistence request failed: {error}");
        PersistenceResponse::Failed {
            target,
            favorite_only,
            error,
        }
    }))
}

/// Worker thread owning the backend
pub struct PersistenceWorker {
    request_tx: Sender<PersistenceRequest>,
    response_rx: Receiver<PersistenceResponse>,
    thread: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        let (request_tx, request_rx) = channel::<PersistenceRequest>();
        let (response_tx, response_rx) = channel();

        let thread = thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                tracing::debug!(?request, "Persistence request");
                let Some(response) = execute(backend.as_ref(), request) else {
                    break;
                };
                if response_tx.send(response).is_err() {
                    break;
                }
            }
            tracing::debug!("Persistence worker stopped");
        });

        Self {
            request_tx,
            response_rx,
            thread: Some(thread),
        }
    }

    pub fn shutdown(&self) {
        let _ = self.request_tx.send(PersistenceRequest::Shutdown);
    }
}

impl Dispatcher for PersistenceWorker {
    fn send(&self, request: PersistenceRequest) -> bool {
        self.request_tx.send(request).is_ok()
    }

    fn try_recv(&self) -> Option<PersistenceResponse> {
        self.response_rx.try_recv().ok()
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tripboard_core::{Catalog, MemoryBackend};

    fn seed() -> Vec<Point> {
        let records: Vec<serde_json::Value> =
            serde_json::from_str(include_str!("../../tripboard_core/assets/seed/points.json"))
                .unwrap();
        tripboard_core::model::parse_points(records)
    }

    #[test]
    fn test_execute_routes_failure_to_target() {
        let backend = MemoryBackend::new(seed(), Catalog::default());
        backend.fail_next("offline");
        let point = seed().remove(0);

        let response = execute(
            &backend,
            PersistenceRequest::Update {
                id: point.id.clone(),
                point: point.to_wire(),
                favorite_only: true,
            },
        );
        assert_eq!(
            response,
            Some(PersistenceResponse::Failed {
                target: EditorKey::Point(point.id),
                favorite_only: true,
                error: BackendError::Injected("offline".into()),
            })
        );
    }

    #[test]
    fn test_execute_shutdown_has_no_response() {
        let backend = MemoryBackend::default();
        assert_eq!(execute(&backend, PersistenceRequest::Shutdown), None);
    }

    #[test]
    fn test_worker_round_trip() {
        let backend = MemoryBackend::new(seed(), Catalog::default());
        let handle = backend.clone();
        let worker = PersistenceWorker::new(Box::new(backend));
        let point = seed().remove(0);

        assert!(worker.send(PersistenceRequest::Delete {
            id: point.id.clone()
        }));
        let deadline = Instant::now() + Duration::from_secs(5);
        let response = loop {
            if let Some(response) = worker.try_recv() {
                break Some(response);
            }
            if Instant::now() >= deadline {
                break None;
            }
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(response, Some(PersistenceResponse::Deleted { id: point.id }));
        assert_eq!(handle.snapshot().len(), seed().len() - 1);
    }
}

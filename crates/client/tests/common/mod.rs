//! Shared helpers for integration tests.

use std::sync::Mutex;

use axum::Router;
use tokio::net::TcpListener;

use resona_client::Notifier;

/// Kind of a recorded notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kind {
    Success,
    Error,
}

/// Notifier that records every emission for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Kind, String)>>,
}

impl RecordingNotifier {
    /// All recorded notifications, in emission order.
    pub fn messages(&self) -> Vec<(Kind, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// Recorded success messages only.
    pub fn successes(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(kind, _)| *kind == Kind::Success)
            .map(|(_, message)| message)
            .collect()
    }

    /// Recorded error messages only.
    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(kind, _)| *kind == Kind::Error)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((Kind::Success, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((Kind::Error, message.to_string()));
    }
}

/// Serve `app` on an ephemeral port, returning its base URL.
pub async fn spawn_api(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

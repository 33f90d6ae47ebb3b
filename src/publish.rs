//! Pub/Sub publisher for outbound records.
//!
//! One publisher handle per process: the project id and topic name are fixed
//! at startup, the underlying client is built lazily on first publish and
//! shared by every request afterwards. Two completion disciplines are
//! exposed, both explicit:
//!
//! - blocking: [`RecordPublisher::publish`] suspends until the broker
//!   acknowledges and returns the broker-assigned message id;
//! - detached: [`publish_detached`] spawns the publish and logs the eventual
//!   outcome without holding up the caller.
//!
//! No retries happen at this layer; a failed publish is surfaced as-is.

use async_trait::async_trait;
use google_cloud_googleapis::pubsub::v1::PubsubMessage;
use google_cloud_pubsub::client::{Client, ClientConfig};
use google_cloud_pubsub::publisher::Publisher;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

use crate::record::OutboundRecord;

/// Failures surfaced by a publish attempt. None of these are retried here;
/// retry policy, if any, belongs to the broker client.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Building or authenticating the broker client failed
    #[error("pub/sub connection failed: {0}")]
    Connect(String),

    /// The record did not serialize; should not occur with the fixed schema
    #[error("record serialization failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The broker rejected the message or was unreachable
    #[error("broker rejected publish: {0}")]
    Broker(#[from] google_cloud_gax::grpc::Status),
}

/// Boundary over the queue so handlers and tests stay independent of the
/// concrete broker client.
#[async_trait]
pub trait RecordPublisher: Send + Sync {
    /// Publishes one record and waits for the broker acknowledgment.
    ///
    /// # Returns
    /// * `Ok(String)` - Broker-assigned message id
    /// * `Err(PublishError)` - Connection, serialization, or broker failure
    async fn publish(&self, record: &OutboundRecord) -> Result<String, PublishError>;
}

/// Google Cloud Pub/Sub publisher, lazily connected.
pub struct PubSubPublisher {
    project_id: String,
    topic_name: String,
    // Race-safe one-time construction; at most one client per process even
    // under concurrent first use.
    inner: OnceCell<Publisher>,
}

impl PubSubPublisher {
    /// Creates the handle without touching the network. The connection is
    /// established on the first publish.
    pub fn new(project_id: impl Into<String>, topic_name: impl Into<String>) -> Self {
        let project_id = project_id.into();
        let topic_name = topic_name.into();
        log::info!(
            "Publisher configured for project {}, topic {}",
            project_id,
            topic_name
        );
        Self {
            project_id,
            topic_name,
            inner: OnceCell::new(),
        }
    }

    async fn publisher(&self) -> Result<&Publisher, PublishError> {
        self.inner
            .get_or_try_init(|| async {
                log::info!(
                    "Connecting Pub/Sub client for project {}, topic {}",
                    self.project_id,
                    self.topic_name
                );

                // The emulator needs no credentials; everything else does.
                let mut config = if std::env::var("PUBSUB_EMULATOR_HOST").is_ok() {
                    ClientConfig::default()
                } else {
                    ClientConfig::default()
                        .with_auth()
                        .await
                        .map_err(|e| PublishError::Connect(e.to_string()))?
                };
                config.project_id = Some(self.project_id.clone());

                let client = Client::new(config)
                    .await
                    .map_err(|e| PublishError::Connect(e.to_string()))?;
                let topic = client.topic(&self.topic_name);

                log::info!("Pub/Sub client connected, topic path: {}", topic.fully_qualified_name());
                Ok(topic.new_publisher(None))
            })
            .await
    }
}

#[async_trait]
impl RecordPublisher for PubSubPublisher {
    async fn publish(&self, record: &OutboundRecord) -> Result<String, PublishError> {
        log::info!(
            "Publishing message {} to topic {}",
            record.message_id,
            self.topic_name
        );

        let data = serde_json::to_vec(record)?;
        let publisher = self.publisher().await?;

        let awaiter = publisher
            .publish(PubsubMessage {
                data: data.into(),
                ..Default::default()
            })
            .await;

        match awaiter.get().await {
            Ok(id) => {
                log::info!("Message published successfully, broker id: {}", id);
                Ok(id)
            }
            Err(status) => {
                log::error!(
                    "Failed to publish message {} to {}: {}",
                    record.message_id,
                    self.topic_name,
                    status
                );
                Err(PublishError::Broker(status))
            }
        }
    }
}

/// Non-blocking completion mode: fire the publish on a background task and
/// log the outcome when the acknowledgment arrives. The caller's
/// request/response cycle does not wait, so by the time a failure is logged
/// the HTTP response is already out.
pub fn publish_detached(
    publisher: Arc<dyn RecordPublisher>,
    record: OutboundRecord,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match publisher.publish(&record).await {
            Ok(id) => log::info!(
                "Detached publish of message {} completed, broker id: {}",
                record.message_id,
                id
            ),
            Err(e) => log::error!(
                "Detached publish of message {} failed: {}",
                record.message_id,
                e
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    struct RecordingPublisher {
        published: Mutex<Vec<OutboundRecord>>,
    }

    #[async_trait]
    impl RecordPublisher for RecordingPublisher {
        async fn publish(&self, record: &OutboundRecord) -> Result<String, PublishError> {
            self.published.lock().unwrap().push(record.clone());
            Ok("42".to_string())
        }
    }

    fn sample_record() -> OutboundRecord {
        OutboundRecord {
            user_id: 99,
            user_name: "Ana".to_string(),
            text: "hello".to_string(),
            message_id: 7,
            chat_id: 42,
            chat_type: "private".to_string(),
            timestamp: "2023-12-31T18:00:00-06:00".to_string(),
        }
    }

    #[tokio::test]
    async fn detached_publish_completes_in_background() {
        let publisher = Arc::new(RecordingPublisher {
            published: Mutex::new(Vec::new()),
        });

        let handle = publish_detached(publisher.clone(), sample_record());
        handle.await.unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].message_id, 7);
    }

    #[test]
    fn records_encode_to_utf8_json() {
        let bytes = serde_json::to_vec(&sample_record()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"message_id\":7"));
    }
}

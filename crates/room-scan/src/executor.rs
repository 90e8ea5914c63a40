use std::sync::Arc;

use chrono::Utc;
use notification_services::EmailService;
use search_area::SearchArea;
use snapshot_cache::SnapshotStore;
use tracing::{error, info, warn};

use crate::config::MonitorConfig;
use crate::diff::diff_snapshots;
use crate::notification::build_notification;
use crate::scan_types::*;
use crate::ur_client::ListingSource;

/// Runs one detection cycle: load the cached snapshot, fetch the current
/// listings, diff them inside the search area, notify, then persist.
pub struct RoomMonitor {
    area: SearchArea,
    listing_source: Arc<dyn ListingSource>,
    snapshot_store: Arc<dyn SnapshotStore>,
    email_service: Arc<dyn EmailService>,
    config: MonitorConfig,
}

impl RoomMonitor {
    /// Creates a monitor from its collaborators.
    pub fn new(
        area: SearchArea,
        listing_source: Arc<dyn ListingSource>,
        snapshot_store: Arc<dyn SnapshotStore>,
        email_service: Arc<dyn EmailService>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            area,
            listing_source,
            snapshot_store,
            email_service,
            config,
        }
    }

    /// Executes a single run.
    ///
    /// The cache is only overwritten after the email went out, so a failed
    /// send is detected again on the next run.
    pub async fn run_once(&self) -> Result<RunOutcome, ScanError> {
        info!("Starting UR room scan");

        let previous = self.load_previous_snapshot().await?;
        info!("Previous snapshot has {} listings", previous.len());

        let current = self.listing_source.fetch_listings().await?;
        let checked_at = Utc::now();

        let diff = diff_snapshots(&previous, &current, &self.area)?;

        if diff.new_rooms == 0 {
            info!(
                "There are no new rooms on UR ({} listings in the area)",
                diff.listings_in_area
            );
            return Ok(RunOutcome::NoNewRooms {
                listings_in_area: diff.listings_in_area,
            });
        }

        info!(
            "Found {} new rooms across {} listings",
            diff.new_rooms,
            diff.changes.len()
        );

        let message = build_notification(&self.config, &diff, checked_at);
        let message_id = self.email_service.send_email(&message).await.map_err(|e| {
            error!("Failed to send notification, cache left untouched: {}", e);
            ScanError::from(e)
        })?;

        let data = current.to_json_vec()?;
        self.snapshot_store.save(data).await.map_err(|e| {
            error!("Notification sent but the cache could not be updated: {}", e);
            ScanError::from(e)
        })?;

        Ok(RunOutcome::Notified {
            new_rooms: diff.new_rooms,
            message_id,
            checked_at,
        })
    }

    /// Reads the cached snapshot, substituting an empty one when nothing is
    /// cached yet or the cached bytes cannot be decoded.
    async fn load_previous_snapshot(&self) -> Result<PreviousSnapshot, ScanError> {
        let data = match self.snapshot_store.load().await {
            Ok(data) => data,
            Err(e) if e.is_not_found() => {
                warn!("{}, assuming there is no data from previous time", e);
                return Ok(PreviousSnapshot::new());
            }
            Err(e) => return Err(e.into()),
        };

        match PreviousSnapshot::from_json_slice(&data) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                error!(
                    "Couldn't parse previous data, assuming there is no data from previous time: {}",
                    e
                );
                Ok(PreviousSnapshot::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use notification_services::{EmailMessage, NotificationError};
    use search_area::Coordinate;
    use snapshot_cache::{CacheError, MemorySnapshotStore};

    use super::*;
    use crate::config::DEFAULT_CACHE_KEY;
    use crate::ur_client::UR_MAP_MARKER_URL;

    const INSIDE: (f64, f64) = (0.5, 0.5);
    const OUTSIDE: (f64, f64) = (5.0, 5.0);

    struct StaticListingSource {
        listings: Vec<Listing>,
    }

    #[async_trait]
    impl ListingSource for StaticListingSource {
        async fn fetch_listings(&self) -> Result<Snapshot, ScanError> {
            Snapshot::from_listings(self.listings.clone())
        }
    }

    struct FailingListingSource;

    #[async_trait]
    impl ListingSource for FailingListingSource {
        async fn fetch_listings(&self) -> Result<Snapshot, ScanError> {
            Err(ScanError::EmptyResponse)
        }
    }

    #[derive(Default)]
    struct RecordingEmailService {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError> {
            if self.fail {
                return Err(NotificationError::SesError("throttled".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok("mock-email-id".to_string())
        }
    }

    /// Loads from an inner store but refuses every write.
    struct ReadOnlyStore {
        inner: MemorySnapshotStore,
    }

    #[async_trait]
    impl SnapshotStore for ReadOnlyStore {
        async fn load(&self) -> Result<Vec<u8>, CacheError> {
            self.inner.load().await
        }

        async fn save(&self, _data: Vec<u8>) -> Result<(), CacheError> {
            Err(CacheError::Backend("access denied".to_string()))
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl SnapshotStore for UnreachableStore {
        async fn load(&self) -> Result<Vec<u8>, CacheError> {
            Err(CacheError::Backend("connection reset".to_string()))
        }

        async fn save(&self, _data: Vec<u8>) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection reset".to_string()))
        }
    }

    fn area() -> SearchArea {
        SearchArea::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ])
        .unwrap()
    }

    fn config() -> MonitorConfig {
        MonitorConfig {
            recipients: vec!["a@example.com".to_string()],
            sender: "monitor@example.com".to_string(),
            cache_bucket: "bucket".to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            debug: false,
            aws_region: None,
            api_url: UR_MAP_MARKER_URL.to_string(),
        }
    }

    fn listing(id: &str, at: (f64, f64), rooms: u32) -> Listing {
        Listing::new(id, at.0, at.1, rooms)
    }

    fn cached(listings: Vec<Listing>) -> Vec<u8> {
        Snapshot::from_listings(listings)
            .unwrap()
            .to_json_vec()
            .unwrap()
    }

    fn monitor(
        current: Vec<Listing>,
        store: Arc<dyn SnapshotStore>,
        email: Arc<RecordingEmailService>,
    ) -> RoomMonitor {
        RoomMonitor::new(
            area(),
            Arc::new(StaticListingSource { listings: current }),
            store,
            email,
            config(),
        )
    }

    #[tokio::test]
    async fn test_new_rooms_are_notified_then_cached() {
        let store = Arc::new(MemorySnapshotStore::with_contents(cached(vec![listing(
            "A", INSIDE, 2,
        )])));
        let email = Arc::new(RecordingEmailService::default());
        let current = vec![listing("A", INSIDE, 5), listing("B", OUTSIDE, 3)];

        let outcome = monitor(current.clone(), store.clone(), email.clone())
            .run_once()
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Notified { new_rooms: 3, ref message_id, .. } if message_id == "mock-email-id"
        ));

        let sent = email.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "UR Property Monitor: 3 new rooms found!");
        assert_eq!(sent[0].to, vec!["a@example.com"]);

        let stored = PreviousSnapshot::from_json_slice(&store.contents().await.unwrap()).unwrap();
        assert_eq!(
            stored,
            PreviousSnapshot::from(&Snapshot::from_listings(current).unwrap())
        );
    }

    #[tokio::test]
    async fn test_first_run_counts_every_room_inside() {
        let store = Arc::new(MemorySnapshotStore::new());
        let email = Arc::new(RecordingEmailService::default());

        let outcome = monitor(vec![listing("C", INSIDE, 4)], store.clone(), email.clone())
            .run_once()
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Notified { new_rooms: 4, .. }));
        assert!(store.contents().await.is_some());
    }

    #[tokio::test]
    async fn test_no_new_rooms_sends_nothing_and_keeps_cache() {
        let previous = cached(vec![listing("D", INSIDE, 6)]);
        let store = Arc::new(MemorySnapshotStore::with_contents(previous.clone()));
        let email = Arc::new(RecordingEmailService::default());

        let outcome = monitor(vec![listing("D", INSIDE, 3)], store.clone(), email.clone())
            .run_once()
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::NoNewRooms { listings_in_area: 1 });
        assert!(email.sent.lock().unwrap().is_empty());
        assert_eq!(store.contents().await.unwrap(), previous);
    }

    #[tokio::test]
    async fn test_failed_notification_leaves_cache_untouched() {
        let previous = cached(vec![listing("A", INSIDE, 1)]);
        let store = Arc::new(MemorySnapshotStore::with_contents(previous.clone()));
        let email = Arc::new(RecordingEmailService {
            fail: true,
            ..Default::default()
        });

        let err = monitor(vec![listing("A", INSIDE, 3)], store.clone(), email)
            .run_once()
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Notification(_)));
        assert_eq!(store.contents().await.unwrap(), previous);
    }

    #[tokio::test]
    async fn test_failed_notification_is_detected_again() {
        let store = Arc::new(MemorySnapshotStore::new());
        let current = vec![listing("A", INSIDE, 2)];

        let failing = Arc::new(RecordingEmailService {
            fail: true,
            ..Default::default()
        });
        assert!(
            monitor(current.clone(), store.clone(), failing)
                .run_once()
                .await
                .is_err()
        );

        let working = Arc::new(RecordingEmailService::default());
        let outcome = monitor(current, store.clone(), working)
            .run_once()
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Notified { new_rooms: 2, .. }));
    }

    #[tokio::test]
    async fn test_cache_write_failure_after_notification_is_fatal() {
        let store = Arc::new(ReadOnlyStore {
            inner: MemorySnapshotStore::new(),
        });
        let email = Arc::new(RecordingEmailService::default());

        let err = monitor(vec![listing("A", INSIDE, 1)], store, email.clone())
            .run_once()
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Cache(CacheError::Backend(_))));
        assert_eq!(email.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_cache_is_treated_as_empty() {
        let store = Arc::new(MemorySnapshotStore::with_contents(b"{not json".to_vec()));
        let email = Arc::new(RecordingEmailService::default());

        let outcome = monitor(vec![listing("A", INSIDE, 2)], store.clone(), email)
            .run_once()
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Notified { new_rooms: 2, .. }));
        let stored = PreviousSnapshot::from_json_slice(&store.contents().await.unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_listing_without_room_count_is_fatal() {
        let store = Arc::new(MemorySnapshotStore::with_contents(
            br#"[{"id": "A", "lat": 0.5, "lng": 0.5}]"#.to_vec(),
        ));
        let email = Arc::new(RecordingEmailService::default());

        let err = monitor(vec![listing("A", INSIDE, 2)], store, email.clone())
            .run_once()
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::MissingRoomCount { .. }));
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unrelated_cached_record_without_room_count_is_ignored() {
        let store = Arc::new(MemorySnapshotStore::with_contents(
            br#"[{"id": "A", "lat": 0.5, "lng": 0.5, "roomCount": 1}, {"id": "GONE", "lat": 9, "lng": 9}]"#
                .to_vec(),
        ));
        let email = Arc::new(RecordingEmailService::default());

        let outcome = monitor(vec![listing("A", INSIDE, 1)], store.clone(), email.clone())
            .run_once()
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::NoNewRooms { listings_in_area: 1 });

        let outcome = monitor(vec![listing("A", INSIDE, 3)], store.clone(), email.clone())
            .run_once()
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Notified { new_rooms: 2, .. }));

        let stored = PreviousSnapshot::from_json_slice(&store.contents().await.unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.room_count(&ListingId::from("A")).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_cache_with_duplicate_ids_is_treated_as_empty() {
        let store = Arc::new(MemorySnapshotStore::with_contents(
            br#"[{"id": "A", "roomCount": 5}, {"id": "A", "roomCount": 5}]"#.to_vec(),
        ));
        let email = Arc::new(RecordingEmailService::default());

        let outcome = monitor(vec![listing("A", INSIDE, 2)], store, email)
            .run_once()
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Notified { new_rooms: 2, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_cache_is_fatal() {
        let email = Arc::new(RecordingEmailService::default());

        let err = monitor(vec![listing("A", INSIDE, 2)], Arc::new(UnreachableStore), email)
            .run_once()
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Cache(CacheError::Backend(_))));
    }

    #[tokio::test]
    async fn test_upstream_failure_aborts_the_run() {
        let previous = cached(vec![listing("A", INSIDE, 1)]);
        let store = Arc::new(MemorySnapshotStore::with_contents(previous.clone()));
        let email = Arc::new(RecordingEmailService::default());

        let monitor = RoomMonitor::new(
            area(),
            Arc::new(FailingListingSource),
            store.clone(),
            email.clone(),
            config(),
        );

        let err = monitor.run_once().await.unwrap_err();

        assert!(matches!(err, ScanError::EmptyResponse));
        assert!(email.sent.lock().unwrap().is_empty());
        assert_eq!(store.contents().await.unwrap(), previous);
    }
}

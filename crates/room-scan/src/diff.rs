use search_area::SearchArea;
use tracing::debug;

use crate::scan_types::{ListingId, PreviousSnapshot, ScanError, Snapshot};

/// A listing inside the area whose room count went up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingChange {
    /// Property identifier
    pub id: ListingId,
    /// Rooms in the cached snapshot, 0 if the listing is new
    pub previous_rooms: u32,
    /// Rooms in the current snapshot
    pub current_rooms: u32,
}

impl ListingChange {
    /// Rooms added since the previous snapshot.
    pub fn new_rooms(&self) -> u32 {
        self.current_rooms.saturating_sub(self.previous_rooms)
    }
}

/// Outcome of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Sum of positive room deltas inside the area
    pub new_rooms: u64,
    /// Listings that contributed to `new_rooms`, ordered by id
    pub changes: Vec<ListingChange>,
    /// Current listings inside the area
    pub listings_in_area: usize,
}

/// Compares the current snapshot against the previous one.
///
/// Only listings inside `area` are considered. A listing missing from
/// `previous` counts as having had zero rooms, and decreases are ignored, so
/// the result only ever reports rooms that became available.
///
/// Fails with `MissingRoomCount` when a listing inside the area matches a
/// cached record that has no room count.
pub fn diff_snapshots(
    previous: &PreviousSnapshot,
    current: &Snapshot,
    area: &SearchArea,
) -> Result<SnapshotDiff, ScanError> {
    let mut diff = SnapshotDiff::default();

    for listing in current.iter() {
        debug!("property id: {}", listing.id);

        if !area.contains(listing.coordinate()) {
            debug!("property {} is outside the search area", listing.id);
            continue;
        }

        diff.listings_in_area += 1;

        let previous_rooms = previous.room_count(&listing.id)?;

        debug!(
            "property {}: {} rooms now, {} before",
            listing.id, listing.room_count, previous_rooms
        );

        if listing.room_count > previous_rooms {
            let change = ListingChange {
                id: listing.id.clone(),
                previous_rooms,
                current_rooms: listing.room_count,
            };
            diff.new_rooms += u64::from(change.new_rooms());
            diff.changes.push(change);
        }
    }

    debug!(
        "{} listings in area, {} new rooms",
        diff.listings_in_area, diff.new_rooms
    );

    Ok(diff)
}

/// Total number of rooms that became available inside `area`.
pub fn count_new_rooms(
    previous: &PreviousSnapshot,
    current: &Snapshot,
    area: &SearchArea,
) -> Result<u64, ScanError> {
    Ok(diff_snapshots(previous, current, area)?.new_rooms)
}

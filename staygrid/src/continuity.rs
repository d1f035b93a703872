//! Gaps-and-islands analysis over per-room calendar rows.
//!
//! Turns a set of per-room stay dates into maximal contiguous runs
//! ("islands"), computes effective stay windows despite cancellation
//! gaps, and discovers the set of rooms logically connected to a split
//! selection when a stay continues into a different room on the
//! following day.
//!
//! Everything here is pure and store-independent so it can be unit tested
//! apart from the mutation logic that consumes it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::hotel::RoomId;

/// A maximal run of consecutive dates for one (reservation, room) pair.
///
/// Both bounds are inclusive nights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Island {
    /// First night of the run.
    pub start: NaiveDate,
    /// Last night of the run.
    pub end: NaiveDate,
}

impl Island {
    /// Returns the number of nights in the island.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether `date` is a night of this island.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Groups a set of stay dates into maximal contiguous islands.
///
/// Dates are sorted and deduplicated; each row is assigned
/// `island_id = date − sequence_number` (in day units) and rows sharing an
/// id form one island. The result is ordered by start date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use staygrid::continuity::islands;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
/// let runs = islands(&[d(1), d(2), d(5), d(6), d(3)]);
/// assert_eq!(runs.len(), 2);
/// assert_eq!((runs[0].start, runs[0].end), (d(1), d(3)));
/// assert_eq!((runs[1].start, runs[1].end), (d(5), d(6)));
/// ```
#[must_use]
pub fn islands(dates: &[NaiveDate]) -> Vec<Island> {
    let mut sorted: Vec<NaiveDate> = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut runs = Vec::new();
    let mut current: Option<(i32, Island)> = None;

    for (seq, date) in sorted.into_iter().enumerate() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let island_id = date.num_days_from_ce() - seq as i32;

        match current {
            Some((id, ref mut island)) if id == island_id => {
                island.end = date;
            }
            _ => {
                if let Some((_, island)) = current.take() {
                    runs.push(island);
                }
                current = Some((
                    island_id,
                    Island {
                        start: date,
                        end: date,
                    },
                ));
            }
        }
    }

    if let Some((_, island)) = current {
        runs.push(island);
    }

    runs
}

/// Computes the effective stay window for one room despite gaps.
///
/// Returns the range from the first island's start to the day after the
/// last island's end, or `None` for an empty date set. Cancellations in
/// the middle of a stay leave gaps; the effective window still spans them.
#[must_use]
pub fn effective_window(dates: &[NaiveDate]) -> Option<DateRange> {
    let runs = islands(dates);
    let first = runs.first()?;
    let last = runs.last()?;
    DateRange::new(first.start, last.end + Duration::days(1)).ok()
}

/// Occupancy state of a room on a given calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    /// The night is booked.
    Occupied,
    /// A stay ends this day (the previous night was the last one).
    Checkout,
    /// Neither occupied nor checking out.
    Free,
}

/// Classifies a calendar day against a room's islands.
///
/// Used by calendar displays to distinguish "occupied today" from
/// "checkout today".
#[must_use]
pub fn day_state(runs: &[Island], date: NaiveDate) -> DayState {
    if runs.iter().any(|i| i.contains(date)) {
        return DayState::Occupied;
    }
    if runs.iter().any(|i| i.end + Duration::days(1) == date) {
        return DayState::Checkout;
    }
    DayState::Free
}

/// Room-adjacency-by-date index over one reservation's active cells.
///
/// Two rooms are adjacent when a stay in one ends the night before a
/// stay in the other begins - the guest moved rooms overnight.
/// [`connected_rooms`] computes the reachability closure of a seed set
/// over this index.
#[derive(Debug, Clone, Default)]
pub struct RoomDayIndex {
    nights: BTreeMap<RoomId, BTreeSet<NaiveDate>>,
}

impl RoomDayIndex {
    /// Builds the index from (room, night) pairs.
    #[must_use]
    pub fn from_nights(nights: impl IntoIterator<Item = (RoomId, NaiveDate)>) -> Self {
        let mut index = Self::default();
        for (room, date) in nights {
            index.nights.entry(room).or_default().insert(date);
        }
        index
    }

    /// Whether the index holds no nights at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nights.is_empty()
    }

    /// Iterates the rooms present in the index.
    pub fn rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.nights.keys().copied()
    }

    /// Whether `room` has `date` booked.
    #[must_use]
    pub fn has_night(&self, room: RoomId, date: NaiveDate) -> bool {
        self.nights.get(&room).is_some_and(|set| set.contains(&date))
    }

    /// Returns the islands of one room, ordered by start date.
    #[must_use]
    pub fn islands_of(&self, room: RoomId) -> Vec<Island> {
        match self.nights.get(&room) {
            Some(set) => {
                let dates: Vec<NaiveDate> = set.iter().copied().collect();
                islands(&dates)
            }
            None => Vec::new(),
        }
    }

    /// Whether two rooms are adjacent: a stay in one continues in the
    /// other on the following day (in either direction).
    #[must_use]
    pub fn adjacent(&self, a: RoomId, b: RoomId) -> bool {
        if a == b {
            return false;
        }
        self.islands_of(a)
            .iter()
            .any(|i| self.has_night(b, i.end + Duration::days(1)))
            || self
                .islands_of(b)
                .iter()
                .any(|i| self.has_night(a, i.end + Duration::days(1)))
    }
}

/// Computes the reachability closure of a seed room set.
///
/// Breadth-first traversal over [`RoomDayIndex::adjacent`]: the result is
/// every room logically connected to the seeds through overnight room
/// changes. A split that relocates only the seeds would silently fragment
/// a still-continuous stay; callers use the closure to carry the
/// connected remainder along.
///
/// Seed rooms absent from the index are ignored.
#[must_use]
pub fn connected_rooms(
    index: &RoomDayIndex,
    seeds: impl IntoIterator<Item = RoomId>,
) -> BTreeSet<RoomId> {
    let mut visited: BTreeSet<RoomId> = seeds
        .into_iter()
        .filter(|room| index.nights.contains_key(room))
        .collect();
    let mut queue: VecDeque<RoomId> = visited.iter().copied().collect();

    while let Some(room) = queue.pop_front() {
        for other in index.rooms() {
            if !visited.contains(&other) && index.adjacent(room, other) {
                visited.insert(other);
                queue.push_back(other);
            }
        }
    }

    visited
}

/// Discovers the nights that are contiguous continuations of a selected
/// night set, without being part of it.
///
/// Works at island granularity: the islands holding a selected night are
/// the seeds; islands whose run begins the day after another reached
/// island ends (or vice versa, across any pair of rooms) are reached
/// transitively. The result is every night of a reached island that was
/// not explicitly selected - the set a double-subset split must carry
/// into its second reservation so a still-continuous stay is never
/// fragmented.
#[must_use]
pub fn continuation_nights(
    index: &RoomDayIndex,
    selected: &[(RoomId, NaiveDate)],
) -> Vec<(RoomId, NaiveDate)> {
    // Island nodes per room, in index order
    let nodes: Vec<(RoomId, Island)> = index
        .rooms()
        .flat_map(|room| {
            index
                .islands_of(room)
                .into_iter()
                .map(move |island| (room, island))
        })
        .collect();

    let selected_set: BTreeSet<(RoomId, NaiveDate)> = selected.iter().copied().collect();

    let mut reached: Vec<bool> = nodes
        .iter()
        .map(|(room, island)| {
            selected_set
                .iter()
                .any(|(r, date)| r == room && island.contains(*date))
        })
        .collect();

    // Propagate across overnight continuations until fixpoint
    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..nodes.len() {
            if !reached[i] {
                continue;
            }
            for j in 0..nodes.len() {
                if reached[j] || i == j {
                    continue;
                }
                let (_, a) = nodes[i];
                let (_, b) = nodes[j];
                let continues = a.end + Duration::days(1) == b.start
                    || b.end + Duration::days(1) == a.start;
                if continues {
                    reached[j] = true;
                    changed = true;
                }
            }
        }
    }

    let mut continuation = Vec::new();
    for (i, (room, island)) in nodes.iter().enumerate() {
        if !reached[i] {
            continue;
        }
        let mut night = island.start;
        while night <= island.end {
            if !selected_set.contains(&(*room, night)) {
                continuation.push((*room, night));
            }
            night = night + Duration::days(1);
        }
    }
    continuation
}

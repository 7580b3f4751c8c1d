//! In-memory operations on a loaded collection.
//!
//! These are the edits an editor performs between reading a collection and
//! writing it back: id assignment, insert, update, delete and reordering.
//! They never touch the store.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{IdStrategy, Record};

/// Pick an id for a new record.
///
/// Timestamp ids use `now_ms` unless that would not be larger than every
/// existing id, in which case the largest id plus one is used instead.
/// Sequential ids are always the largest id plus one (1 for an empty
/// collection).
///
/// # Errors
///
/// Returns an internal error if the largest id is already `i64::MAX`.
pub fn next_id<R: Record>(records: &[R], now_ms: i64) -> Result<i64> {
    let max = records.iter().map(Record::id).max();
    let bump = |m: i64| {
        m.checked_add(1)
            .ok_or_else(|| Error::internal(format!("{} ids exhausted", R::NAME)))
    };
    match R::ID_STRATEGY {
        IdStrategy::Sequential => max.map_or(Ok(1), bump),
        IdStrategy::Timestamp => match max {
            Some(m) if m >= now_ms => bump(m),
            _ => Ok(now_ms),
        },
    }
}

/// Index of the first record with the given id.
#[must_use]
pub fn position<R: Record>(records: &[R], id: i64) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}

/// Find the first record with the given id.
#[must_use]
pub fn find<R: Record>(records: &[R], id: i64) -> Option<&R> {
    records.iter().find(|r| r.id() == id)
}

/// Append a record, assigning it a fresh id. Returns the id.
///
/// # Errors
///
/// Returns an error if no unused id is left.
pub fn insert<R: Record>(records: &mut Vec<R>, mut record: R, now_ms: i64) -> Result<i64> {
    let id = next_id(records, now_ms)?;
    record.set_id(id);
    records.push(record);
    Ok(id)
}

/// Replace the record whose id matches `record.id()`, keeping its position.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no record has that id.
pub fn update<R: Record>(records: &mut [R], record: R, collection: &'static str) -> Result<()> {
    let index =
        position(records, record.id()).ok_or_else(|| Error::not_found(collection, record.id()))?;
    records[index] = record;
    Ok(())
}

/// Remove every record with the given id. Returns `true` if any was removed.
///
/// Ids are not guaranteed unique in stored data, so all matches go.
pub fn remove<R: Record>(records: &mut Vec<R>, id: i64) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

/// Stable sort by display order; records without an order go last.
pub fn sort_by_order<R: Record>(records: &mut [R]) {
    records.sort_by_key(Record::sort_key);
}

/// Give records explicit orders following `ids`.
///
/// Records listed in `ids` get `order = position in ids`. Records not
/// listed keep their relative order and are numbered after the listed ones.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `ids` names a record that doesn't exist.
pub fn apply_order<R: Record>(
    records: &mut [R],
    ids: &[i64],
    collection: &'static str,
) -> Result<()> {
    let mut rank: HashMap<i64, usize> = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if position(records, *id).is_none() {
            return Err(Error::not_found(collection, *id));
        }
        rank.entry(*id).or_insert(i);
    }

    sort_by_order(records);
    // Listed records first by rank; the rest keep their current order.
    records.sort_by_key(|r| rank.get(&r.id()).copied().unwrap_or(usize::MAX));

    for (i, record) in records.iter_mut().enumerate() {
        record.set_order(Some(i64::try_from(i).unwrap_or(i64::MAX)));
    }
    Ok(())
}

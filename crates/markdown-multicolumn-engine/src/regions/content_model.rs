//! Ordered, keyed collection of the content objects of one region.

use std::collections::HashMap;

use crate::models::{BreakType, ContentObject, ContentTag, Fragment, ObjectId};

/// The content objects of one region in document order.
///
/// Objects arrive in any order. Each `add` is told which fragments the host
/// rendered above and below the new object and places it between the
/// nearest of those it already holds, matched by node key and occurrence.
#[derive(Debug, Clone, Default)]
pub struct ContentObjectModel {
    objects: Vec<ContentObject>,
    index: HashMap<ObjectId, usize>,
    version: u64,
}

impl ContentObjectModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `object` between its anchors and returns its index.
    ///
    /// The previous anchor is the closest fragment in `above` with a
    /// non-empty key that is already in the list; the next anchor is the
    /// closest such fragment in `below` at or after the insertion point.
    /// Fragments are matched by key and occurrence, so repeated text in a
    /// region maps to distinct objects. Keyed objects left between the two
    /// anchors whose key matches no fragment between them are stale renders
    /// and are replaced by `object`. Without a next anchor nothing is
    /// replaced.
    ///
    /// Blank objects (empty key) cannot be told apart. Those between the
    /// anchors are kept, with as many before `object` as `above` has blank
    /// fragments after its anchor.
    pub fn add(&mut self, above: &[Fragment], below: &[Fragment], mut object: ContentObject) -> usize {
        let len = self.objects.len();

        let mut seen: HashMap<String, usize> = HashMap::new();
        let above = with_occurrence(above, &mut seen);
        object.occurrence = next_occurrence(&mut seen, &object.node_key);
        let below = with_occurrence(below, &mut seen);

        let mut blank_after_anchor = 0;
        let mut previous = None;
        let mut gap_start = 0;
        for (i, (key, occurrence)) in above.iter().enumerate().rev() {
            if key.is_empty() {
                blank_after_anchor += 1;
                continue;
            }
            if let Some(position) = self.find(key, *occurrence, 0) {
                previous = Some(position);
                gap_start = i + 1;
                break;
            }
        }

        // Without a previous anchor only blank objects can precede the new
        // one, and `above` says how many.
        let insert_at = previous.map_or(0, |p| p + 1);
        let mut gap_end = below.len();
        let mut next = None;
        for (i, (key, occurrence)) in below.iter().enumerate() {
            if key.is_empty() {
                continue;
            }
            if let Some(position) = self.find(key, *occurrence, insert_at) {
                next = Some(position);
                gap_end = i;
                break;
            }
        }
        let replace_end = next.unwrap_or_else(|| {
            let blank_run = self.objects[insert_at..len]
                .iter()
                .take_while(|o| o.node_key.is_empty())
                .count();
            insert_at + blank_run
        });

        let in_gap = |fragments: &[(String, usize)], key: &str| fragments.iter().any(|(k, _)| k == key);
        let above_gap = &above[gap_start..];
        let below_gap = &below[..gap_end];

        let mut blank = Vec::new();
        let mut kept_before = Vec::new();
        let mut kept_after = Vec::new();
        for existing in self.objects.drain(insert_at..replace_end) {
            if existing.node_key.is_empty() {
                blank.push(existing);
            } else if in_gap(above_gap, &existing.node_key) {
                kept_before.push(existing);
            } else if in_gap(below_gap, &existing.node_key) {
                kept_after.push(existing);
            } else {
                log::trace!("replacing stale object {} ({:?})", existing.id, existing.node_key);
            }
        }

        let keep_before = blank.len().min(blank_after_anchor);
        let blank_after = blank.split_off(keep_before);
        let position = insert_at + blank.len() + kept_before.len();
        let mut segment = blank;
        segment.extend(kept_before);
        segment.push(object);
        segment.extend(kept_after);
        segment.extend(blank_after);
        self.objects.splice(insert_at..insert_at, segment);

        self.reindex();
        position
    }

    /// Index of the object with `key` and `occurrence` at or after `from`.
    fn find(&self, key: &str, occurrence: usize, from: usize) -> Option<usize> {
        self.objects[from..]
            .iter()
            .position(|o| o.node_key == key && o.occurrence == occurrence)
            .map(|p| p + from)
    }

    /// Removes an object by id. Unknown ids are a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<ContentObject> {
        let position = self.index.get(&id).copied()?;
        let removed = self.objects.remove(position);
        self.reindex();
        Some(removed)
    }

    /// Re-tags an object. Returns false for unknown ids.
    pub fn update_tag(&mut self, id: ObjectId, tag: ContentTag, break_type: BreakType) -> bool {
        let Some(&position) = self.index.get(&id) else {
            return false;
        };
        let object = &mut self.objects[position];
        if object.tag != tag || object.break_type != break_type {
            object.tag = tag;
            object.break_type = break_type;
            self.version += 1;
        }
        true
    }

    /// A copy of the ordered list.
    pub fn get(&self) -> Vec<ContentObject> {
        self.objects.clone()
    }

    pub fn objects(&self) -> &[ContentObject] {
        &self.objects
    }

    pub fn get_by_id(&self, id: ObjectId) -> Option<&ContentObject> {
        self.index.get(&id).map(|&position| &self.objects[position])
    }

    pub fn position(&self, id: ObjectId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Bumped by every change to the list or a tag.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Records the column a render assigned. Does not change the version.
    pub(crate) fn set_column(&mut self, id: ObjectId, column: Option<usize>) {
        if let Some(&position) = self.index.get(&id) {
            self.objects[position].column = column;
        }
    }

    /// Caches a measured height. Does not change the version.
    pub(crate) fn set_height(&mut self, id: ObjectId, height: f32) {
        if let Some(&position) = self.index.get(&id) {
            self.objects[position].height = Some(height);
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .objects
            .iter()
            .enumerate()
            .map(|(position, object)| (object.id, position))
            .collect();
        self.version += 1;
    }
}

/// Keys of `fragments` paired with how often each key was seen before.
fn with_occurrence(fragments: &[Fragment], seen: &mut HashMap<String, usize>) -> Vec<(String, usize)> {
    fragments
        .iter()
        .map(|fragment| {
            let key = fragment.node_key();
            let occurrence = next_occurrence(seen, &key);
            (key, occurrence)
        })
        .collect()
}

fn next_occurrence(seen: &mut HashMap<String, usize>, key: &str) -> usize {
    let count = seen.entry(key.to_string()).or_default();
    let occurrence = *count;
    *count += 1;
    occurrence
}

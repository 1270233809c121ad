//! Prize segments and the ordered prize set
//!
//! Every segment occupies an equal slice; odds depend on segment count alone.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Color that marks "no color chosen" in the add-prize form
pub const DEFAULT_PRIZE_COLOR: &str = "#FFD700";
/// Icon used when none is given
pub const DEFAULT_PRIZE_ICON: &str = "❓";

/// Unique segment identifier
pub type SegmentId = u64;

/// One selectable slice of the wheel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub name: String,
    /// Display color (CSS string, not validated)
    #[serde(default)]
    pub color: String,
    /// Display icon (usually an emoji)
    #[serde(default)]
    pub icon: String,
    /// Position on the wheel (0-based, clockwise from the pointer)
    #[serde(rename = "order", default)]
    pub order_index: u32,
    /// Whether the winner dialog may remove this prize from the wheel
    #[serde(default = "default_removable")]
    pub removable: bool,
}

fn default_removable() -> bool {
    true
}

/// Ordered prize list (sorted by `order_index`, which is always 0..N-1)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct PrizeSet {
    segments: Vec<Segment>,
    next_id: SegmentId,
}

impl From<Vec<Segment>> for PrizeSet {
    fn from(mut segments: Vec<Segment>) -> Self {
        segments.sort_by_key(|s| s.order_index);
        let next_id = segments.iter().map(|s| s.id).max().map_or(1, |id| id + 1);
        let mut set = Self { segments, next_id };
        set.renumber();
        set
    }
}

impl From<PrizeSet> for Vec<Segment> {
    fn from(set: PrizeSet) -> Self {
        set.segments
    }
}

impl PrizeSet {
    /// Create an empty (inert) prize set
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            next_id: 1,
        }
    }

    /// The prize list a fresh installation starts with
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.push("Win $10", "#FFD700", "💰", true);
        set.push("Try Again", "#32CD32", "❌", false);
        set.push("Surprise Prize", "#FF6347", "🎉", true);
        set.push("Pizza Voucher", "#4682B4", "🍕", true);
        set
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn position_of(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    /// Angular size of each slice in degrees (0 when empty)
    pub fn slice_degrees(&self) -> f64 {
        if self.segments.is_empty() {
            0.0
        } else {
            crate::consts::FULL_TURN_DEG / self.segments.len() as f64
        }
    }

    /// Append a segment at the end of the wheel
    pub fn push(&mut self, name: &str, color: &str, icon: &str, removable: bool) -> SegmentId {
        let id = self.allocate_id();
        self.segments.push(Segment {
            id,
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            order_index: self.segments.len() as u32,
            removable,
        });
        id
    }

    /// Copy the segment at `index` and insert the copy right after it
    pub fn duplicate(&mut self, index: usize) -> Option<SegmentId> {
        let mut copy = self.segments.get(index)?.clone();
        copy.id = self.allocate_id();
        let id = copy.id;
        self.segments.insert(index + 1, copy);
        self.renumber();
        Some(id)
    }

    /// Remove the segment at `index`
    pub fn remove(&mut self, index: usize) -> Option<Segment> {
        if index >= self.segments.len() {
            return None;
        }
        let removed = self.segments.remove(index);
        self.renumber();
        Some(removed)
    }

    pub fn remove_by_id(&mut self, id: SegmentId) -> Option<Segment> {
        let index = self.position_of(id)?;
        self.remove(index)
    }

    /// Move the segment at `from` so that it ends up at position `to`
    pub fn move_segment(&mut self, from: usize, to: usize) -> bool {
        let len = self.segments.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let segment = self.segments.remove(from);
            self.segments.insert(to, segment);
            self.renumber();
        }
        true
    }

    fn allocate_id(&mut self) -> SegmentId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Restore the 0..N-1 permutation after any structural change
    fn renumber(&mut self) {
        for (i, segment) in self.segments.iter_mut().enumerate() {
            segment.order_index = i as u32;
        }
    }
}

/// Random opaque color, `#RRGGBB`
pub fn random_hex_color<R: Rng>(rng: &mut R) -> String {
    format!("#{:06X}", rng.random_range(0..0x0100_0000u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn orders(set: &PrizeSet) -> Vec<u32> {
        set.iter().map(|s| s.order_index).collect()
    }

    #[test]
    fn test_defaults_are_ordered() {
        let set = PrizeSet::with_defaults();
        assert_eq!(set.len(), 4);
        assert_eq!(orders(&set), vec![0, 1, 2, 3]);
        assert!(!set.get(1).unwrap().removable);
        assert!((set.slice_degrees() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_inserts_after_source() {
        let mut set = PrizeSet::with_defaults();
        let id = set.duplicate(1).unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.get(2).unwrap().id, id);
        assert_eq!(set.get(2).unwrap().name, "Try Again");
        assert_eq!(orders(&set), vec![0, 1, 2, 3, 4]);
        assert!(set.duplicate(99).is_none());
    }

    #[test]
    fn test_remove_and_move_keep_permutation() {
        let mut set = PrizeSet::with_defaults();
        let removed = set.remove(0).unwrap();
        assert_eq!(removed.name, "Win $10");
        assert_eq!(orders(&set), vec![0, 1, 2]);

        assert!(set.move_segment(2, 0));
        assert_eq!(set.get(0).unwrap().name, "Pizza Voucher");
        assert_eq!(orders(&set), vec![0, 1, 2]);
        assert!(!set.move_segment(0, 3));
    }

    #[test]
    fn test_ids_stay_unique_after_removal() {
        let mut set = PrizeSet::with_defaults();
        let last = set.get(3).unwrap().id;
        set.remove(3);
        let fresh = set.push("New", "#000000", "⭐", true);
        assert_ne!(fresh, last);
    }

    #[test]
    fn test_serde_roundtrip_resorts_by_order() {
        let json = r##"[
            {"id": 7, "name": "B", "color": "#111111", "icon": "b", "order": 1, "removable": true},
            {"id": 3, "name": "A", "color": "#222222", "icon": "a", "order": 0}
        ]"##;
        let mut set: PrizeSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.get(0).unwrap().name, "A");
        assert!(set.get(0).unwrap().removable);
        assert_eq!(set.push("C", "", "", true), 8);

        let back = serde_json::to_string(&set).unwrap();
        let again: PrizeSet = serde_json::from_str(&back).unwrap();
        assert_eq!(again.len(), 3);
    }

    #[test]
    fn test_random_hex_color_format() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            let c = random_hex_color(&mut rng);
            assert_eq!(c.len(), 7);
            assert!(c.starts_with('#'));
            assert!(c[1..].chars().all(|ch| ch.is_ascii_hexdigit()));
        }
    }
}

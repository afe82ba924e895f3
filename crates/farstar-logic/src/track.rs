//! Resizable box tracks — stress, population, people, ladders, invokes.
//!
//! Every track is an ordered run of boxes whose length follows a
//! configured size. Resizing keeps existing boxes where they are: growth
//! appends fresh boxes, shrinking drops boxes off the end for good.
//!
//! Box shape depends on the track, so each kind is its own type:
//!
//! | Box | Used by |
//! |-----|---------|
//! | [`StressBox`] | Scion and threat stress tracks, extra tracks |
//! | [`TriStateBox`] | colony population and faction people tracks |
//! | [`Rung`] | threat and extra ladders |
//! | [`InvokeBox`] | extra invoke boxes |
//!
//! ```
//! use farstar_logic::track::{resize_track, StressBox, Track};
//!
//! let mut track = Track::filled(3, StressBox::default);
//! track.boxes[0].checked = true;
//! let track = resize_track(track, 5, StressBox::default);
//! assert_eq!(track.boxes.len(), 5);
//! assert!(track.boxes[0].checked);
//! ```

use serde::{Deserialize, Serialize, Serializer};

/// A box that can be marked, so tracks can count and toggle it.
pub trait CheckBox {
    /// Whether the box counts as filled.
    fn is_checked(&self) -> bool;
    /// Advance the box to its next state.
    fn toggle(&mut self);
}

/// Plain stress box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressBox {
    #[serde(rename = "value", alias = "checked")]
    pub checked: bool,
}

impl StressBox {
    pub fn checked() -> Self {
        Self { checked: true }
    }
}

impl CheckBox for StressBox {
    fn is_checked(&self) -> bool {
        self.checked
    }

    fn toggle(&mut self) {
        self.checked = !self.checked;
    }
}

/// Population/people box: empty, committed, or expended, never both of
/// the last two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTriStateBox", into = "RawTriStateBox")]
pub enum TriStateBox {
    #[default]
    Empty,
    Committed,
    Expended,
}

impl TriStateBox {
    /// empty → committed → expended → empty
    pub fn cycle(self) -> Self {
        match self {
            Self::Empty => Self::Committed,
            Self::Committed => Self::Expended,
            Self::Expended => Self::Empty,
        }
    }

    pub fn is_committed(self) -> bool {
        self == Self::Committed
    }

    pub fn is_expended(self) -> bool {
        self == Self::Expended
    }
}

impl CheckBox for TriStateBox {
    /// Only expended boxes are spent; committed ones are still available.
    fn is_checked(&self) -> bool {
        self.is_expended()
    }

    fn toggle(&mut self) {
        *self = self.cycle();
    }
}

/// Stored two-flag form of [`TriStateBox`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawTriStateBox {
    committed: bool,
    expended: bool,
}

impl From<RawTriStateBox> for TriStateBox {
    fn from(raw: RawTriStateBox) -> Self {
        // Expended wins when a stored box carries both flags.
        if raw.expended {
            Self::Expended
        } else if raw.committed {
            Self::Committed
        } else {
            Self::Empty
        }
    }
}

impl From<TriStateBox> for RawTriStateBox {
    fn from(state: TriStateBox) -> Self {
        Self {
            committed: state.is_committed(),
            expended: state.is_expended(),
        }
    }
}

/// Ladder rung with its aspect text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rung {
    pub aspect: String,
    pub checked: bool,
}

impl Rung {
    pub fn new(aspect: impl Into<String>) -> Self {
        Self {
            aspect: aspect.into(),
            checked: false,
        }
    }
}

impl CheckBox for Rung {
    fn is_checked(&self) -> bool {
        self.checked
    }

    fn toggle(&mut self) {
        self.checked = !self.checked;
    }
}

/// Invoke box on an extra.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeBox {
    pub spent: bool,
}

impl CheckBox for InvokeBox {
    fn is_checked(&self) -> bool {
        self.spent
    }

    fn toggle(&mut self) {
        self.spent = !self.spent;
    }
}

/// Value of the box at `index` on an escalating track (1, 2, 3, ...).
pub fn indexed_value(index: usize) -> i32 {
    index as i32 + 1
}

/// An ordered run of boxes. `max` is the active length; after any resize
/// `boxes.len() == max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track<B> {
    pub boxes: Vec<B>,
    pub max: usize,
}

impl<B> Default for Track<B> {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            max: 0,
        }
    }
}

impl<B> Track<B> {
    /// A track of `size` fresh boxes.
    pub fn filled(size: usize, box_factory: impl FnMut() -> B) -> Self {
        Self::default().resized(size, box_factory)
    }

    /// Resize in place: grow by appending factory boxes, shrink by
    /// truncating from the end.
    pub fn resize(&mut self, new_size: usize, mut box_factory: impl FnMut() -> B) {
        if new_size > self.boxes.len() {
            let missing = new_size - self.boxes.len();
            self.boxes.extend((0..missing).map(|_| box_factory()));
        } else {
            self.boxes.truncate(new_size);
        }
        self.max = new_size;
    }

    pub fn resized(mut self, new_size: usize, box_factory: impl FnMut() -> B) -> Self {
        self.resize(new_size, box_factory);
        self
    }

    /// Move the active window to `size` without dropping stored boxes.
    /// Storage only grows, so rungs hidden by a smaller window come back
    /// when it widens again.
    pub fn set_window(&mut self, size: usize, mut box_factory: impl FnMut() -> B) {
        if size > self.boxes.len() {
            let missing = size - self.boxes.len();
            self.boxes.extend((0..missing).map(|_| box_factory()));
        }
        self.max = size;
    }

    /// Whether the stored boxes match the configured size.
    pub fn is_consistent(&self) -> bool {
        self.boxes.len() == self.max
    }

    /// Boxes inside the active window, ignoring any stored beyond `max`.
    pub fn active(&self) -> &[B] {
        &self.boxes[..self.max.min(self.boxes.len())]
    }

    pub fn len(&self) -> usize {
        self.active().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }
}

impl<B: CheckBox> Track<B> {
    /// Checked boxes inside the active window.
    pub fn checked_count(&self) -> usize {
        self.active().iter().filter(|b| b.is_checked()).count()
    }

    /// Sum of escalating values (index + 1) of checked boxes.
    pub fn checked_indexed_sum(&self) -> i32 {
        self.active()
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_checked())
            .map(|(i, _)| indexed_value(i))
            .sum()
    }

    /// Index of the first unchecked box in the active window. On a ladder
    /// this is the current rung.
    pub fn first_unchecked(&self) -> Option<usize> {
        self.active().iter().position(|b| !b.is_checked())
    }

    /// Toggle the box at `index`. Returns false when there is no such box.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.len() {
            return false;
        }
        self.boxes[index].toggle();
        true
    }
}

/// Resize `track` to `new_size`, building new boxes with `box_factory`.
///
/// Existing boxes keep their position and state. Truncated boxes are gone:
/// growing again yields fresh boxes. Resizing to the current size returns
/// an equivalent track.
pub fn resize_track<B>(track: Track<B>, new_size: usize, box_factory: impl FnMut() -> B) -> Track<B> {
    track.resized(new_size, box_factory)
}

/// Stored tri-state box with the value the host sums for capacity.
#[derive(Serialize)]
struct IndexedTriStateBox {
    value: i32,
    committed: bool,
    expended: bool,
}

#[derive(Serialize)]
struct IndexedTriStateTrack {
    boxes: Vec<IndexedTriStateBox>,
    max: usize,
}

/// Write a population/people track with each box's escalating `value`
/// alongside its flags. Reading ignores `value` and goes by position.
///
/// Use with `#[serde(serialize_with = "track::serialize_indexed")]`.
pub fn serialize_indexed<S: Serializer>(
    track: &Track<TriStateBox>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let boxes = track
        .boxes
        .iter()
        .enumerate()
        .map(|(i, &state)| IndexedTriStateBox {
            value: indexed_value(i),
            committed: state.is_committed(),
            expended: state.is_expended(),
        })
        .collect();
    IndexedTriStateTrack {
        boxes,
        max: track.max,
    }
    .serialize(serializer)
}

/// Inclusive size range for a +/- adjuster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    pub min: usize,
    pub max: usize,
}

impl SizeBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, size: i64) -> usize {
        size.clamp(self.min as i64, self.max as i64) as usize
    }
}

/// New size after an adjuster click of `delta`, kept inside `bounds`.
pub fn adjust_size(current: usize, delta: i32, bounds: SizeBounds) -> usize {
    bounds.clamp(current as i64 + i64::from(delta))
}

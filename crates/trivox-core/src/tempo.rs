//! Tempo-sync divisions for LFO rates.
//!
//! A [`SyncDivision`] names a musical period; [`SyncDivision::to_hz`] turns it
//! into a modulation frequency at a given tempo.

/// Lowest accepted tempo in beats per minute.
pub const MIN_BPM: f32 = 20.0;
/// Highest accepted tempo in beats per minute.
pub const MAX_BPM: f32 = 300.0;
/// Tempo used until a host reports one.
pub const DEFAULT_BPM: f32 = 120.0;

/// Musical period of one LFO cycle in sync mode.
///
/// Indices (as used by the flat parameter interface) run from the shortest
/// division to the longest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncDivision {
    /// Sixteenth note (1/4 beat)
    Sixteenth,
    /// Eighth note (1/2 beat)
    Eighth,
    /// Quarter note (1 beat)
    #[default]
    Quarter,
    /// Half note (2 beats)
    Half,
    /// Whole note, one bar of 4/4 (4 beats)
    Whole,
    /// Two bars (8 beats)
    TwoBars,
    /// Four bars (16 beats)
    FourBars,
}

impl SyncDivision {
    /// All divisions in index order.
    pub const ALL: [SyncDivision; 7] = [
        SyncDivision::Sixteenth,
        SyncDivision::Eighth,
        SyncDivision::Quarter,
        SyncDivision::Half,
        SyncDivision::Whole,
        SyncDivision::TwoBars,
        SyncDivision::FourBars,
    ];

    /// Number of beats one cycle spans.
    pub fn beats(self) -> f32 {
        match self {
            SyncDivision::Sixteenth => 0.25,
            SyncDivision::Eighth => 0.5,
            SyncDivision::Quarter => 1.0,
            SyncDivision::Half => 2.0,
            SyncDivision::Whole => 4.0,
            SyncDivision::TwoBars => 8.0,
            SyncDivision::FourBars => 16.0,
        }
    }

    /// Cycle frequency in Hz at the given tempo.
    ///
    /// # Example
    ///
    /// ```rust
    /// use trivox_core::SyncDivision;
    ///
    /// // At 120 BPM a quarter note lasts 0.5 s
    /// assert!((SyncDivision::Quarter.to_hz(120.0) - 2.0).abs() < 1e-6);
    /// // and four bars last 8 s
    /// assert!((SyncDivision::FourBars.to_hz(120.0) - 0.125).abs() < 1e-6);
    /// ```
    pub fn to_hz(self, bpm: f32) -> f32 {
        (bpm / 60.0) / self.beats()
    }

    /// Division for a flat parameter index, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position of this division in [`SyncDivision::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

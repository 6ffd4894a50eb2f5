//! Session segment classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-type phase within a recorded session.
///
/// A new segment begins whenever a session-describing event reports a type
/// different from the currently active one. Maps to the simulator's
/// session-type identifiers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    #[default]
    Unknown,
    Practice1,
    Practice2,
    Practice3,
    ShortPractice,
    Qualifying1,
    Qualifying2,
    Qualifying3,
    ShortQualifying,
    OneShotQualifying,
    Race,
    Race2,
    TimeTrial,
}

impl SegmentKind {
    /// All segment kinds, in simulator identifier order.
    pub const ALL: [SegmentKind; 13] = [
        SegmentKind::Unknown,
        SegmentKind::Practice1,
        SegmentKind::Practice2,
        SegmentKind::Practice3,
        SegmentKind::ShortPractice,
        SegmentKind::Qualifying1,
        SegmentKind::Qualifying2,
        SegmentKind::Qualifying3,
        SegmentKind::ShortQualifying,
        SegmentKind::OneShotQualifying,
        SegmentKind::Race,
        SegmentKind::Race2,
        SegmentKind::TimeTrial,
    ];

    /// The simulator's numeric session-type identifier.
    pub const fn id(self) -> u8 {
        match self {
            SegmentKind::Unknown => 0,
            SegmentKind::Practice1 => 1,
            SegmentKind::Practice2 => 2,
            SegmentKind::Practice3 => 3,
            SegmentKind::ShortPractice => 4,
            SegmentKind::Qualifying1 => 5,
            SegmentKind::Qualifying2 => 6,
            SegmentKind::Qualifying3 => 7,
            SegmentKind::ShortQualifying => 8,
            SegmentKind::OneShotQualifying => 9,
            SegmentKind::Race => 10,
            SegmentKind::Race2 => 11,
            SegmentKind::TimeTrial => 12,
        }
    }

    /// Directory name for this segment under a session directory.
    ///
    /// Load-bearing: the reconstructor resolves recorded files through the
    /// same name, so recorder and reader can never disagree.
    pub const fn dir_name(self) -> &'static str {
        match self {
            SegmentKind::Unknown => "unknown",
            SegmentKind::Practice1 => "fp1",
            SegmentKind::Practice2 => "fp2",
            SegmentKind::Practice3 => "fp3",
            SegmentKind::ShortPractice => "short_practice",
            SegmentKind::Qualifying1 => "q1",
            SegmentKind::Qualifying2 => "q2",
            SegmentKind::Qualifying3 => "q3",
            SegmentKind::ShortQualifying => "short_quali",
            SegmentKind::OneShotQualifying => "oneshot_quali",
            SegmentKind::Race => "race",
            SegmentKind::Race2 => "race2",
            SegmentKind::TimeTrial => "timetrial",
        }
    }

    /// Inverse of [`dir_name`](Self::dir_name), used when scanning a
    /// recorded session directory.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.dir_name() == name)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

//! Letter grades.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A letter grade awarded for a subject.
///
/// Variants are declared best first, so the derived ordering ranks `APlus`
/// lowest and `F` highest. Use [`Grade::rank`] when a numeric position is
/// clearer.
///
/// # Example
///
/// ```
/// use academic_engine::models::Grade;
///
/// assert_eq!(Grade::APlus.to_string(), "A+");
/// assert!(Grade::A < Grade::B);
/// assert!(!Grade::F.is_passing());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// 90% and above.
    #[serde(rename = "A+")]
    APlus,
    /// 80% to below 90%.
    A,
    /// 70% to below 80%.
    B,
    /// 60% to below 70%.
    C,
    /// 50% to below 60%.
    D,
    /// 40% to below 50%.
    E,
    /// Below 40%.
    F,
}

impl Grade {
    /// All grades, best first.
    pub const ALL: [Grade; 7] = [
        Grade::APlus,
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::E,
        Grade::F,
    ];

    /// Position of the grade, 0 for `A+` through 6 for `F`.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Returns true for every grade except `F`.
    pub fn is_passing(self) -> bool {
        self != Grade::F
    }

    /// The letter as printed on a marksheet.
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Types for classifying loads by addressing mode and access width.

/// The role of the base register in a load's memory operand.
///
/// NOTE: The discriminants are kept in-sync *manually* with the trace
/// records written by the instrumentation client (see [crate::trace]).
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseRole {
    /// The base register is the program counter (RIP-relative).
    ProgramCounter = 0,

    /// The base register is the stack or frame pointer.
    StackPointer   = 1,

    /// Any other base register (or none at all).
    Other          = 2,
}
impl BaseRole {
    /// Decode a role from its trace encoding.
    pub fn from_raw(x: u8) -> Option<Self> {
        match x {
            0 => Some(Self::ProgramCounter),
            1 => Some(Self::StackPointer),
            2 => Some(Self::Other),
            _ => None,
        }
    }
}

/// The addressing-mode classification of a load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadKind {
    /// Instruction-relative load.
    Rip,
    /// Stack-relative load.
    Stack,
    /// Load through a general-purpose register.
    Reg,
}
impl LoadKind {
    pub const NUM: usize = 3;
    pub const ALL: [Self; Self::NUM] = [Self::Rip, Self::Stack, Self::Reg];

    /// Classify a load from the role of its base register.
    pub fn from_role(role: BaseRole) -> Self {
        match role {
            BaseRole::ProgramCounter => Self::Rip,
            BaseRole::StackPointer   => Self::Stack,
            BaseRole::Other          => Self::Reg,
        }
    }

    /// Label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rip   => "RIP",
            Self::Stack => "STACK",
            Self::Reg   => "REG",
        }
    }

    /// Row index into a [crate::stats::LoadTable].
    pub fn index(&self) -> usize { *self as usize }
}

impl std::fmt::Display for LoadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A bucket for the width of a load.
///
/// Buckets `0..=6` hold widths of `1 << bucket` bytes. Bucket `7` holds
/// everything else (not a power of two, or wider than 64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SizeBucket(u8);
impl SizeBucket {
    pub const NUM: usize = 8;
    pub const UNCATEGORIZED: Self = Self(7);

    /// Widths above this many bytes are never tracked for stability.
    pub const MAX_TRACKED_WIDTH: u32 = 8;

    const LABELS: [&'static str; Self::NUM] = [
        "1B", "2B", "4B", "8B", "16B", "32B", "64B", "UNCATEGORIZED"
    ];

    /// Bucket the width of an access (in bytes).
    pub fn from_width(width: u32) -> Self {
        if width.is_power_of_two() && width <= 64 {
            Self(width.trailing_zeros() as u8)
        } else {
            Self::UNCATEGORIZED
        }
    }

    /// Iterate over all buckets in order.
    pub fn all() -> impl Iterator<Item = Self> + Clone {
        (0..Self::NUM as u8).map(Self)
    }

    pub fn index(&self) -> usize { self.0 as usize }

    pub fn label(&self) -> &'static str {
        Self::LABELS[self.index()]
    }

    /// Returns 'true' for buckets that hold vector-width loads.
    ///
    /// This follows the summary split of the report, where everything above
    /// 8 bytes (including the uncategorized bucket) counts as "vector".
    pub fn is_vector(&self) -> bool { self.0 >= 4 }
}

impl std::fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classify a load.
pub fn classify(role: BaseRole, width: u32) -> (LoadKind, SizeBucket) {
    (LoadKind::from_role(role), SizeBucket::from_width(width))
}

/// Returns 'true' if a load of this width takes part in stability tracking.
pub fn is_trackable(width: u32) -> bool {
    width <= SizeBucket::MAX_TRACKED_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_buckets() {
        let expected = [(1, 0), (2, 1), (4, 2), (8, 3), (16, 4), (32, 5), (64, 6)];
        for (width, bucket) in expected {
            assert_eq!(SizeBucket::from_width(width).index(), bucket);
        }
        for width in [0, 3, 5, 17, 128] {
            assert_eq!(SizeBucket::from_width(width), SizeBucket::UNCATEGORIZED);
        }
    }

    #[test]
    fn kinds_from_roles() {
        assert_eq!(classify(BaseRole::ProgramCounter, 8).0, LoadKind::Rip);
        assert_eq!(classify(BaseRole::StackPointer, 8).0, LoadKind::Stack);
        assert_eq!(classify(BaseRole::Other, 8).0, LoadKind::Reg);
        for kind in LoadKind::ALL {
            assert_eq!(LoadKind::ALL[kind.index()], kind);
        }
    }

    #[test]
    fn labels() {
        assert_eq!(LoadKind::Stack.label(), "STACK");
        assert_eq!(SizeBucket::from_width(16).label(), "16B");
        assert_eq!(SizeBucket::from_width(3).to_string(), "UNCATEGORIZED");
    }

    #[test]
    fn trackable_widths() {
        assert!(is_trackable(0));
        assert_eq!(SizeBucket::from_width(0), SizeBucket::UNCATEGORIZED);
        assert!(is_trackable(1));
        assert!(is_trackable(8));
        assert!(!is_trackable(16));
        assert!(SizeBucket::from_width(16).is_vector());
        assert!(!SizeBucket::from_width(8).is_vector());
    }
}

//! Neutral scores used when one side of a pair has nothing to compare.
//! Incomplete profiles land mid-scale rather than at zero.

/// Either side has no cultural background on file.
pub const CULTURAL_WHEN_MISSING: u8 = 50;

/// Either side has no personality assessment, or no trait is answered on both sides.
pub const PERSONALITY_WHEN_MISSING: u8 = 70;

/// Either side has no date of birth.
pub const AGE_WHEN_MISSING: u8 = 60;

//! Named arena layouts.
//!
//! Player fighters conventionally start on row 4 and enemies on row 0, so
//! every preset keeps both of those rows free of walls and pits.

use super::Grid;
use crate::error::SetupError;

/// Names accepted by [`Grid::preset`], matched case-insensitively.
pub const PRESET_NAMES: [&str; 4] = [
    "Training Grounds",
    "Mountain Pass",
    "Sunken Marsh",
    "Forest Clearing",
];

fn layout(name: &str) -> Option<[&'static str; 5]> {
    let rows = match name.to_ascii_lowercase().as_str() {
        "training grounds" => [
            ".....",
            ".,.,.",
            "..r..",
            ".,.,.",
            ".....",
        ],
        "mountain pass" => [
            "r...r",
            "#^.^#",
            "#.v.#",
            "#r.r#",
            ".....",
        ],
        "sunken marsh" => [
            ",,.,,",
            "m~~~m",
            ".~v~.",
            "m.~.m",
            ",,.,,",
        ],
        "forest clearing" => [
            ".F.F.",
            "F...F",
            "..^..",
            "F...F",
            ".F.F.",
        ],
        _ => return None,
    };
    Some(rows)
}

impl Grid {
    /// Builds one of the named layouts in [`PRESET_NAMES`].
    ///
    /// # Errors
    ///
    /// [`SetupError::UnknownPreset`] for names not in the list.
    pub fn preset(name: &str) -> Result<Self, SetupError> {
        let rows = layout(name).ok_or_else(|| SetupError::UnknownPreset(name.to_owned()))?;
        Self::from_rows(&rows)
    }
}

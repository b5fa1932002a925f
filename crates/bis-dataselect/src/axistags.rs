//! Axis-tag metadata for realized images.
//!
//! Axis tags describe the semantic ordering of an array's dimensions
//! (space, time, channels). They are persisted as a JSON string attribute
//! next to embedded data, in the vigra-compatible `{"axes": [...]}`
//! encoding, and must survive a save/load round trip verbatim.

use serde::{Deserialize, Serialize};

use crate::error::{DataSelectionError, Result};

/// Ordered axis metadata for one image volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisTags {
    pub axes: Vec<AxisTag>,
}

/// One axis of an image volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTag {
    /// Single-letter axis key ("x", "y", "z", "t", "c").
    pub key: String,
    /// Axis kind bitfield (vigra encoding).
    pub type_flags: u32,
    /// Physical resolution along the axis; 0 when unknown.
    pub resolution: f64,
    /// Free-form axis description.
    pub description: String,
}

impl AxisTag {
    /// Kind flag for channel axes.
    pub const CHANNELS: u32 = 1;
    /// Kind flag for spatial axes.
    pub const SPACE: u32 = 2;
    /// Kind flag for temporal axes.
    pub const TIME: u32 = 8;

    fn new(key: impl Into<String>, type_flags: u32) -> Self {
        Self {
            key: key.into(),
            type_flags,
            resolution: 0.0,
            description: String::new(),
        }
    }

    /// A spatial axis with the given key.
    pub fn space(key: impl Into<String>) -> Self {
        Self::new(key, Self::SPACE)
    }

    /// The temporal axis.
    pub fn time() -> Self {
        Self::new("t", Self::TIME)
    }

    /// The channel axis.
    pub fn channel() -> Self {
        Self::new("c", Self::CHANNELS)
    }
}

impl AxisTags {
    pub fn new(axes: Vec<AxisTag>) -> Self {
        Self { axes }
    }

    /// Conventional y/x ordering for a 2D image.
    pub fn spatial_2d() -> Self {
        Self::new(vec![AxisTag::space("y"), AxisTag::space("x")])
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Encode as the persisted JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|source| DataSelectionError::AxisTagsJson { source })
    }

    /// Decode from the persisted JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| DataSelectionError::AxisTagsJson { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let tags = AxisTags::new(vec![
            AxisTag::time(),
            AxisTag::space("y"),
            AxisTag::space("x"),
            AxisTag::channel(),
        ]);
        let json = tags.to_json().unwrap();
        assert_eq!(AxisTags::from_json(&json).unwrap(), tags);
    }

    #[test]
    fn test_json_field_names_are_wire_format() {
        let json = AxisTags::new(vec![AxisTag::space("x")]).to_json().unwrap();
        assert!(json.contains("\"axes\""));
        assert!(json.contains("\"typeFlags\":2"));
        assert!(json.contains("\"key\":\"x\""));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let result = AxisTags::from_json("not json");
        assert!(matches!(
            result,
            Err(DataSelectionError::AxisTagsJson { .. })
        ));
    }
}

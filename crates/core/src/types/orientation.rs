//! EXIF orientation codes and their corrective CSS transforms.
//!
//! Cameras store pixels in sensor order and record how the image should be
//! displayed in the EXIF `Orientation` tag (values 1 through 8). Browsers that
//! ignore the tag need an explicit transform to show the photo upright.

use serde::{Deserialize, Serialize};

/// One of the eight EXIF orientation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Orientation {
    /// Upright, no transform needed.
    #[default]
    Normal = 1,
    /// Mirrored horizontally.
    FlipHorizontal = 2,
    /// Upside down.
    Rotate180 = 3,
    /// Mirrored vertically.
    FlipVertical = 4,
    /// Mirrored horizontally, then rotated 90° clockwise.
    Transpose = 5,
    /// Rotated 90° clockwise.
    Rotate90 = 6,
    /// Mirrored horizontally, then rotated 90° counter-clockwise.
    Transverse = 7,
    /// Rotated 90° counter-clockwise.
    Rotate270 = 8,
}

impl Orientation {
    /// Look up an orientation by its EXIF code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => Self::Normal,
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => return None,
        })
    }

    /// The EXIF code (1-8).
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// CSS `transform` value that displays the image upright.
    #[must_use]
    pub const fn css_transform(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::FlipHorizontal => "scaleX(-1)",
            Self::Rotate180 => "rotate(180deg)",
            Self::FlipVertical => "scaleY(-1)",
            Self::Transpose => "scaleX(-1) rotate(90deg)",
            Self::Rotate90 => "rotate(90deg)",
            Self::Transverse => "scaleX(-1) rotate(-90deg)",
            Self::Rotate270 => "rotate(-90deg)",
        }
    }

    /// Transform for an arbitrary code; unknown codes get no transform.
    ///
    /// ```
    /// use parti_poodles_core::Orientation;
    ///
    /// assert_eq!(Orientation::transform(6), "rotate(90deg)");
    /// assert_eq!(Orientation::transform(0), "");
    /// assert_eq!(Orientation::transform(42), "");
    /// ```
    #[must_use]
    pub const fn transform(code: i64) -> &'static str {
        match Self::from_code(code) {
            Some(orientation) => orientation.css_transform(),
            None => "",
        }
    }
}

impl From<Orientation> for u8 {
    fn from(orientation: Orientation) -> Self {
        orientation.code()
    }
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(code)).ok_or_else(|| format!("invalid EXIF orientation: {code}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_table() {
        let expected = [
            (1, ""),
            (2, "scaleX(-1)"),
            (3, "rotate(180deg)"),
            (4, "scaleY(-1)"),
            (5, "scaleX(-1) rotate(90deg)"),
            (6, "rotate(90deg)"),
            (7, "scaleX(-1) rotate(-90deg)"),
            (8, "rotate(-90deg)"),
        ];
        for (code, css) in expected {
            assert_eq!(Orientation::transform(code), css, "code {code}");
        }
    }

    #[test]
    fn test_out_of_range_codes_have_no_transform() {
        for code in [-1, 0, 9, 255, i64::MAX] {
            assert_eq!(Orientation::transform(code), "");
        }
    }

    #[test]
    fn test_code_roundtrip() {
        for code in 1..=8_u8 {
            let orientation = Orientation::try_from(code).unwrap();
            assert_eq!(orientation.code(), code);
        }
        assert!(Orientation::try_from(9).is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Orientation::Rotate90).unwrap(), "6");
        let parsed: Orientation = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, Orientation::Rotate180);
    }
}

//! Core types for tunable parameters, source images and backend payloads.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::utils::{ImagifyError, ImagifyResult, InputError};

/// Lowest value any knob can take.
pub const KNOB_MIN: f64 = 0.0;
/// Highest value any knob can take.
pub const KNOB_MAX: f64 = 100.0;
/// Value every knob starts at.
pub const KNOB_DEFAULT: f64 = 50.0;

/// One tunable numeric parameter of the enhance operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Knob {
    Enhancement,
    Sharpness,
    Clarity,
}

impl Knob {
    /// All knobs in display and query order
    pub const ALL: [Knob; 3] = [Knob::Enhancement, Knob::Sharpness, Knob::Clarity];

    /// Name of the query parameter the enhance endpoint reads
    pub fn query_key(&self) -> &'static str {
        match self {
            Self::Enhancement => "enh",
            Self::Sharpness => "sharp",
            Self::Clarity => "clarity",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Enhancement => "enhancement",
            Self::Sharpness => "sharpness",
            Self::Clarity => "clarity",
        }
    }

    /// Clamps arbitrary input into the knob range. NaN falls to the lower bound.
    pub fn clamp(value: f64) -> f64 {
        if value.is_nan() {
            return KNOB_MIN;
        }
        value.clamp(KNOB_MIN, KNOB_MAX)
    }
}

impl fmt::Display for Knob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Knob {
    type Err = ImagifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enhancement" | "enh" => Ok(Self::Enhancement),
            "sharpness" | "sharp" => Ok(Self::Sharpness),
            "clarity" => Ok(Self::Clarity),
            other => Err(ImagifyError::config(format!("Unknown parameter: {}", other))),
        }
    }
}

/// Immutable snapshot of every knob value.
///
/// Values always lie in `[KNOB_MIN, KNOB_MAX]`; the only way to build one with
/// other values is through [`ParameterSet::new`], which clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSet {
    enhancement: f64,
    sharpness: f64,
    clarity: f64,
}

impl ParameterSet {
    pub fn new(enhancement: f64, sharpness: f64, clarity: f64) -> Self {
        Self {
            enhancement: Knob::clamp(enhancement),
            sharpness: Knob::clamp(sharpness),
            clarity: Knob::clamp(clarity),
        }
    }

    pub fn get(&self, knob: Knob) -> f64 {
        match knob {
            Knob::Enhancement => self.enhancement,
            Knob::Sharpness => self.sharpness,
            Knob::Clarity => self.clarity,
        }
    }

    /// Knob values in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Knob, f64)> + '_ {
        Knob::ALL.iter().map(move |knob| (*knob, self.get(*knob)))
    }

    /// Returns a copy with `patch` merged in, clamping every supplied value.
    pub fn merged(&self, patch: &ParameterPatch) -> Self {
        Self::new(
            patch.enhancement.unwrap_or(self.enhancement),
            patch.sharpness.unwrap_or(self.sharpness),
            patch.clarity.unwrap_or(self.clarity),
        )
    }

    /// Query pairs for the enhance endpoint, e.g. `enh=50`
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.iter()
            .map(|(knob, value)| (knob.query_key(), value.to_string()))
            .collect()
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::new(KNOB_DEFAULT, KNOB_DEFAULT, KNOB_DEFAULT)
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(knob, value)| format!("{}={}", knob, value)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// A partial change to the live parameters. Unset knobs keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterPatch {
    #[serde(default)]
    pub enhancement: Option<f64>,
    #[serde(default)]
    pub sharpness: Option<f64>,
    #[serde(default)]
    pub clarity: Option<f64>,
}

impl ParameterPatch {
    pub fn with(mut self, knob: Knob, value: f64) -> Self {
        match knob {
            Knob::Enhancement => self.enhancement = Some(value),
            Knob::Sharpness => self.sharpness = Some(value),
            Knob::Clarity => self.clarity = Some(value),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.enhancement.is_none() && self.sharpness.is_none() && self.clarity.is_none()
    }
}

/// The photo the user selected. Cheap to clone; the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    file_name: String,
    content_type: String,
    data: Arc<[u8]>,
}

impl SourceImage {
    /// Wraps raw bytes, rejecting anything whose content type is not a
    /// well-formed `image/<subtype>`.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> ImagifyResult<Self> {
        let content_type = content_type.into();
        if !is_image_media_type(&content_type) {
            return Err(InputError::NotAnImage(content_type).into());
        }

        Ok(Self {
            file_name: file_name.into(),
            content_type,
            data: data.into(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// `image/<subtype>` with an RFC 2045 token as subtype, parameters allowed.
fn is_image_media_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((kind, subtype)) => {
            kind.eq_ignore_ascii_case("image")
                && !subtype.is_empty()
                && subtype.chars().all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
        }
        None => false,
    }
}

/// Shape of the media a backend operation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// The remote operation a coordinator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Slider-driven enhancement returning a still image
    Enhance,
    /// One-shot smile generation returning a still image
    Smile,
    /// One-shot video generation
    Video,
}

impl OperationKind {
    /// Endpoint path relative to the API base
    pub fn path(&self) -> &'static str {
        match self {
            Self::Enhance => "/api/enhance/",
            Self::Smile => "/api/animate/smile",
            Self::Video => "/api/animate/video",
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::Enhance | Self::Smile => MediaKind::Image,
            Self::Video => MediaKind::Video,
        }
    }

    /// Whether parameter changes and image selection schedule requests on their own.
    ///
    /// Smile and video are one-shot: they only run on an explicit apply.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Enhance)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enhance => "enhance",
            Self::Smile => "smile",
            Self::Video => "video",
        };
        f.write_str(name)
    }
}

/// Media returned by a successful backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPayload {
    media: MediaKind,
    content_type: String,
    file_name: String,
    data: Arc<[u8]>,
}

impl ResultPayload {
    pub fn new(
        media: MediaKind,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            media,
            content_type: content_type.into(),
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    pub fn media(&self) -> MediaKind {
        self.media
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Suggested name when the payload is downloaded
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

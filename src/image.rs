//! Image descriptor normalization.
//!
//! Raw image records arrive next to the document as a JSON array:
//!
//! ```json
//! [{"image": {"url": "/uploads/camp.jpg"}, "alt": "Camp", "position": "left",
//!   "width": 40, "pairWithNext": true, "showCaption": false}]
//! ```
//!
//! Normalization resolves URLs, fills defaults and drops records without a
//! usable URL. It never fails per record; only a non-array top level is an
//! error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::diagnostic::{DiagnosticSink, LayoutDiagnostic, LogDiagnostics};
use crate::document::json_kind;
use crate::error::LayoutError;

/// Declared placement of an image relative to the text column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePosition {
    #[default]
    Left,
    Right,
    Center,
    Full,
}

impl ImagePosition {
    /// Lenient, case-insensitive parse. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if value.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else if value.eq_ignore_ascii_case("center") || value.eq_ignore_ascii_case("centre") {
            Some(Self::Center)
        } else if value.eq_ignore_ascii_case("full")
            || value.eq_ignore_ascii_case("full-width")
            || value.eq_ignore_ascii_case("fullwidth")
        {
            Some(Self::Full)
        } else {
            None
        }
    }

    /// Side this position floats to, or [`FloatSide::None`] for block-level images.
    pub fn float_side(self) -> FloatSide {
        match self {
            Self::Left => FloatSide::Left,
            Self::Right => FloatSide::Right,
            Self::Center | Self::Full => FloatSide::None,
        }
    }

    /// `true` when `self` and `other` are `Left` and `Right` in either order.
    pub fn is_horizontal_opposite(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Left, Self::Right) | (Self::Right, Self::Left)
        )
    }
}

/// Edge an element is floated against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatSide {
    #[default]
    None,
    Left,
    Right,
}

/// Declared image width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageWidth {
    /// Percentage of the text column; one of [`ImageWidth::PERCENT_STEPS`].
    Percent(u8),
    Small,
    Medium,
    Large,
}

impl ImageWidth {
    /// Percent widths accepted by the percent scale.
    pub const PERCENT_STEPS: [u8; 5] = [30, 40, 50, 60, 100];

    /// Percent width if it is one of the allowed steps.
    pub fn percent(value: u8) -> Option<Self> {
        Self::PERCENT_STEPS
            .contains(&value)
            .then_some(Self::Percent(value))
    }

    fn parse_str(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("small") {
            return Some(Self::Small);
        }
        if value.eq_ignore_ascii_case("medium") {
            return Some(Self::Medium);
        }
        if value.eq_ignore_ascii_case("large") {
            return Some(Self::Large);
        }
        let digits = value.strip_suffix('%').unwrap_or(value).trim();
        digits.parse::<u8>().ok().and_then(Self::percent)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                let raw = n.as_f64()?;
                if !(0.0..=255.0).contains(&raw) {
                    return None;
                }
                Self::percent(raw.round() as u8)
            }
            Value::String(s) => Self::parse_str(s),
            _ => None,
        }
    }
}

/// Which width vocabulary a content variant uses, and so its default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WidthScale {
    /// `30/40/50/60/100` percent; default `50`.
    #[default]
    Percent,
    /// `small/medium/large`; default `medium`.
    Named,
}

impl WidthScale {
    pub fn default_width(self) -> ImageWidth {
        match self {
            Self::Percent => ImageWidth::Percent(50),
            Self::Named => ImageWidth::Medium,
        }
    }
}

/// A normalized image, ready for placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageDescriptor {
    /// Resolved URL; never empty.
    pub source_url: String,
    pub alt_text: String,
    pub caption: Option<String>,
    pub position: ImagePosition,
    pub width: ImageWidth,
    /// Intent to merge with the following descriptor into a side-by-side unit.
    pub pair_with_next: bool,
    pub show_caption: bool,
    pub rounded: bool,
    pub shadow: bool,
}

impl ImageDescriptor {
    /// Descriptor with default presentation flags.
    pub fn new(source_url: impl Into<String>, position: ImagePosition) -> Self {
        Self {
            source_url: source_url.into(),
            alt_text: String::new(),
            caption: None,
            position,
            width: WidthScale::Percent.default_width(),
            pair_with_next: false,
            show_caption: true,
            rounded: true,
            shadow: true,
        }
    }

    pub fn with_pair_with_next(mut self, pair_with_next: bool) -> Self {
        self.pair_with_next = pair_with_next;
        self
    }

    pub fn with_width(mut self, width: ImageWidth) -> Self {
        self.width = width;
        self
    }

    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = alt_text.into();
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// Normalization options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Base for resolving relative image URLs (the content host).
    pub base_url: Option<Url>,
    /// Width vocabulary used for defaults.
    pub width_scale: WidthScale,
}

impl NormalizeOptions {
    /// Set the content-host base URL. An empty string clears it.
    ///
    /// A trailing `/` is added to the path so that relative paths resolve
    /// beneath it.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, LayoutError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            self.base_url = None;
            return Ok(self);
        }
        let mut url = Url::parse(trimmed)?;
        if url.cannot_be_a_base() {
            return Err(LayoutError::invalid_config(
                "base_url",
                format!("'{}' cannot be used as a base", trimmed),
            ));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn with_width_scale(mut self, width_scale: WidthScale) -> Self {
        self.width_scale = width_scale;
        self
    }
}

/// One raw image record as authored in the content store.
///
/// Every field is optional and loosely typed; see [`RawImageRecord::normalize`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawImageRecord {
    /// Media reference: `{url}`, `{data: {attributes: {url}}}`, or a bare string.
    pub image: Option<Value>,
    /// Top-level URL, used when `image` carries none or only a blank one.
    pub url: Option<Value>,
    pub alt: Option<Value>,
    pub caption: Option<Value>,
    pub position: Option<Value>,
    pub width: Option<Value>,
    pub pair_with_next: Option<Value>,
    pub show_caption: Option<Value>,
    pub rounded: Option<Value>,
    pub shadow: Option<Value>,
}

impl RawImageRecord {
    /// Read one record from a JSON object, or `None` when `value` is not one.
    ///
    /// Flags may be spelled in camelCase or snake_case; when both appear the
    /// camelCase key wins.
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        let field = |keys: &[&str]| keys.iter().find_map(|key| fields.get(*key)).cloned();
        Some(Self {
            image: field(&["image"]),
            url: field(&["url"]),
            alt: field(&["alt"]),
            caption: field(&["caption"]),
            position: field(&["position"]),
            width: field(&["width"]),
            pair_with_next: field(&["pairWithNext", "pair_with_next"]),
            show_caption: field(&["showCaption", "show_caption"]),
            rounded: field(&["rounded"]),
            shadow: field(&["shadow"]),
        })
    }

    /// Raw URL as authored, before resolution.
    ///
    /// A blank media URL does not hide a usable top-level `url`.
    pub fn raw_url(&self) -> Option<&str> {
        first_usable([
            self.image.as_ref().and_then(media_url),
            self.url.as_ref().and_then(Value::as_str),
        ])
    }

    /// Normalize into a descriptor, or `None` when no usable URL remains.
    pub fn normalize(&self, options: &NormalizeOptions) -> Option<ImageDescriptor> {
        let source_url = resolve_source_url(self.raw_url()?, options.base_url.as_ref());
        if source_url.is_empty() {
            return None;
        }

        let position = self
            .position
            .as_ref()
            .and_then(Value::as_str)
            .and_then(ImagePosition::parse)
            .unwrap_or_default();
        let width = self
            .width
            .as_ref()
            .and_then(ImageWidth::from_value)
            .unwrap_or_else(|| options.width_scale.default_width());

        Some(ImageDescriptor {
            source_url,
            alt_text: self.alt_text(),
            caption: self
                .caption
                .as_ref()
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|caption| !caption.is_empty())
                .map(str::to_string),
            position,
            width,
            pair_with_next: flag_default_false(self.pair_with_next.as_ref()),
            show_caption: flag_default_true(self.show_caption.as_ref()),
            rounded: flag_default_true(self.rounded.as_ref()),
            shadow: flag_default_true(self.shadow.as_ref()),
        })
    }

    fn alt_text(&self) -> String {
        self.alt
            .as_ref()
            .and_then(Value::as_str)
            .or_else(|| self.image.as_ref().and_then(media_alternative_text))
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

fn media_attributes(media: &Value) -> Option<&Value> {
    media.get("data").and_then(|data| data.get("attributes"))
}

fn media_url(media: &Value) -> Option<&str> {
    match media {
        Value::String(s) => Some(s.as_str()),
        Value::Object(_) => first_usable([
            media.get("url").and_then(Value::as_str),
            media_attributes(media).and_then(|attrs| attrs.get("url")?.as_str()),
        ]),
        _ => None,
    }
}

/// First non-blank candidate; failing that, the first present one.
fn first_usable<const N: usize>(candidates: [Option<&str>; N]) -> Option<&str> {
    candidates
        .iter()
        .flatten()
        .find(|url| !url.trim().is_empty())
        .or_else(|| candidates.iter().flatten().next())
        .copied()
}

fn media_alternative_text(media: &Value) -> Option<&str> {
    media
        .get("alternativeText")
        .and_then(Value::as_str)
        .or_else(|| media_attributes(media)?.get("alternativeText")?.as_str())
}

fn flag_default_true(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => !s.trim().eq_ignore_ascii_case("false"),
        _ => true,
    }
}

fn flag_default_false(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn is_absolute_http(url: &str) -> bool {
    let lower_prefix = |prefix: &str| {
        url.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    lower_prefix("http://") || lower_prefix("https://")
}

/// Resolve an authored image URL against the content-host base.
///
/// `http(s)://` URLs are returned unchanged. Relative URLs are joined onto
/// `base`; without a base they are kept verbatim. Blank input resolves to an
/// empty string.
pub fn resolve_source_url(raw: &str, base: Option<&Url>) -> String {
    let raw = raw.trim();
    if raw.is_empty() || is_absolute_http(raw) {
        return raw.to_string();
    }
    let Some(base) = base else {
        return raw.to_string();
    };
    match base.join(raw) {
        Ok(url) => url.to_string(),
        Err(err) => {
            log::debug!("could not join '{}' onto {}: {}", raw, base, err);
            raw.to_string()
        }
    }
}

/// Normalize a JSON image list, logging dropped records.
pub fn normalize_images(
    value: &Value,
    options: &NormalizeOptions,
) -> Result<Vec<ImageDescriptor>, LayoutError> {
    normalize_images_with(value, options, &mut LogDiagnostics)
}

/// Normalize an image list from JSON text.
pub fn normalize_images_str(
    json: &str,
    options: &NormalizeOptions,
) -> Result<Vec<ImageDescriptor>, LayoutError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|err| LayoutError::invalid_input("images", err.to_string()))?;
    normalize_images(&value, options)
}

/// Normalize a JSON image list, reporting degradations to `sink`.
///
/// Returns [`LayoutError::InvalidInput`] only when `value` is not an array.
pub fn normalize_images_with(
    value: &Value,
    options: &NormalizeOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<ImageDescriptor>, LayoutError> {
    let Some(records) = value.as_array() else {
        log::warn!("rejecting image list: expected array, got {}", json_kind(value));
        return Err(LayoutError::invalid_input(
            "images",
            format!("expected array, got {}", json_kind(value)),
        ));
    };

    let mut images = Vec::with_capacity(records.len());
    for (record_index, raw) in records.iter().enumerate() {
        let record = RawImageRecord::from_value(raw).unwrap_or_else(|| {
            sink.report(LayoutDiagnostic::ImageRecordMalformed { record_index });
            RawImageRecord::default()
        });
        push_normalized(&record, record_index, options, sink, &mut images);
    }
    Ok(images)
}

/// Normalize already-deserialized records.
pub fn normalize_records(
    records: &[RawImageRecord],
    options: &NormalizeOptions,
    sink: &mut dyn DiagnosticSink,
) -> Vec<ImageDescriptor> {
    let mut images = Vec::with_capacity(records.len());
    for (record_index, record) in records.iter().enumerate() {
        push_normalized(record, record_index, options, sink, &mut images);
    }
    images
}

fn push_normalized(
    record: &RawImageRecord,
    record_index: usize,
    options: &NormalizeOptions,
    sink: &mut dyn DiagnosticSink,
    out: &mut Vec<ImageDescriptor>,
) {
    match record.normalize(options) {
        Some(image) => out.push(image),
        None => sink.report(LayoutDiagnostic::ImageDropped {
            record_index,
            reason: if record.raw_url().is_some() {
                "empty url after resolution"
            } else {
                "missing url"
            },
        }),
    }
}

//! Comic project document types.
//!
//! These are the persisted shapes of a project as the browser client reads
//! and writes them, so every struct serializes with camelCase field names.
//! [`SceneInfo`] is the one exception: it mirrors the scene-analysis schema
//! and keeps snake_case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// A base64-encoded PNG payload.
///
/// Kept opaque: the backend never decodes panel or reference images, it only
/// forwards them to the generation service and back to the client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageData(String);

impl ImageData {
    pub fn new(base64: impl Into<String>) -> Self {
        Self(base64.into())
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Length of the encoded payload in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Render as a `data:` URL for multimodal model inputs.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.0)
    }
}

// Payloads run to megabytes; never dump them into logs.
impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageData({} bytes)", self.0.len())
    }
}

/// How a character's reference image was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Generate,
    Upscale,
    Query,
}

impl ImageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Upscale => "upscale",
            Self::Query => "query",
        }
    }
}

/// Quality tier requested from the image-generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ImageQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for ImageQuality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(CoreError::Validation(format!(
                "Invalid image quality '{other}'. Must be one of: low, medium, high"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// A member of the comic's cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub image_prompt: String,
    /// Canonical portrait used to keep the character consistent across panels.
    #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<ImageData>,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<ImageKind>,
    /// Job id from the asynchronous generation service, if one was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
}

impl Character {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            traits: Vec::new(),
            image_prompt: String::new(),
            reference_image: None,
            kind: None,
            image_id: None,
        }
    }

    /// The reference image, if present and non-empty.
    ///
    /// Only characters with a reference can condition panel generation.
    pub fn reference(&self) -> Option<&ImageData> {
        self.reference_image.as_ref().filter(|img| !img.is_empty())
    }

    /// Record a freshly produced reference image.
    pub fn set_reference(&mut self, image: ImageData, kind: ImageKind) {
        self.reference_image = Some(image);
        self.kind = Some(kind);
    }
}

/// Older clients wrote `"type": ""` for characters without an image.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<ImageKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("generate") => Ok(Some(ImageKind::Generate)),
        Some("upscale") => Ok(Some(ImageKind::Upscale)),
        Some("query") => Ok(Some(ImageKind::Query)),
        Some(other) => Err(serde::de::Error::unknown_variant(
            other,
            &["generate", "upscale", "query"],
        )),
    }
}

// ---------------------------------------------------------------------------
// Pages and panels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// One illustrated frame of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: EntityId,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,
    /// Character ids the author tagged. Advisory: generation re-detects
    /// the cast from `content` every time.
    #[serde(default)]
    pub characters: Vec<EntityId>,
    pub position: usize,
    #[serde(default)]
    pub size: PanelSize,
}

impl Panel {
    /// A blank panel at `index`, with the positional id `panel-<index>`.
    pub fn empty(index: usize) -> Self {
        Self {
            id: format!("panel-{index}"),
            content: String::new(),
            image: None,
            characters: Vec::new(),
            position: index,
            size: PanelSize::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: EntityId,
    pub page_number: u32,
    pub panel_count: usize,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub panels: Vec<Panel>,
}

impl Page {
    /// A new page with `panel_count` blank panels.
    pub fn new(page_number: u32, panel_count: usize) -> Self {
        let mut page = Self {
            id: uuid::Uuid::new_v4().to_string(),
            page_number,
            panel_count: 0,
            orientation: Orientation::Horizontal,
            panels: Vec::new(),
        };
        crate::layout::resize_panels(&mut page, panel_count);
        page
    }

    pub fn panel_mut(&mut self, panel_id: &str) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id == panel_id)
    }
}

// ---------------------------------------------------------------------------
// Comic and project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub pages: Vec<Page>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Comic {
    pub fn new(title: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: format!("comic-{}", uuid::Uuid::new_v4()),
            title: title.into(),
            description: String::new(),
            characters: Vec::new(),
            pages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    /// Next page number: one past the highest existing number.
    pub fn next_page_number(&self) -> u32 {
        self.pages.iter().map(|p| p.page_number).max().unwrap_or(0) + 1
    }
}

/// A named wrapper around one comic; the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub comic: Comic,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// A new project whose comic is titled after the project.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = chrono::Utc::now();
        Self {
            id: format!("project-{}", uuid::Uuid::new_v4()),
            comic: Comic::new(name.clone()),
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Generation-time types (never persisted)
// ---------------------------------------------------------------------------

/// A character the scene analyzer found in panel text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectedCharacter {
    pub name: String,
    pub description: String,
    pub role: String,
}

/// Structured reading of one panel's scene text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneInfo {
    pub characters: Vec<DetectedCharacter>,
    pub scene_description: String,
    pub mood: String,
    pub setting: String,
}

impl SceneInfo {
    pub fn detected_names(&self) -> Vec<String> {
        self.characters.iter().map(|c| c.name.clone()).collect()
    }
}

/// A previously generated panel carried forward as continuity context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorPanel {
    pub scene: String,
    pub image: ImageData,
}

/// A roster character resolved as a visual reference for one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterReference {
    pub name: String,
    pub image: ImageData,
}

/// One segment of a multimodal generation prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    Image(ImageData),
}

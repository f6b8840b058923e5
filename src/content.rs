//! The content document: every piece of copy, link, and image filename that
//! ends up on the page.
//!
//! The document is authored by hand as `content.json` and parsed straight into
//! the typed records below. Required sections and fields are plain struct
//! fields, so a missing key is a parse error and the build aborts before any
//! output is written. Optional sections (`testimonials`, `videos`) fall back to
//! stock labels when absent.
//!
//! Two shapes need custom handling:
//!
//! - [`Album`] is either a Bandcamp embed or a flip card. The variant is chosen
//!   at parse time from `bandcamp_album_id` (see [`Album`]).
//! - [`LinkList`] is a JSON object of label → URL whose key order is the
//!   render order, so it is read entry by entry instead of into a map.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Album id value left in freshly scaffolded content files.
pub const ALBUM_ID_PLACEHOLDER: &str = "PASTE_ALBUM_ID_HERE";

/// Video id value meaning "no video yet".
pub const VIDEO_ID_PLACEHOLDER: &str = "PLACEHOLDER";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid content document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{section}: missing field `{field}`")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },
    #[error("{section}: `{field}` {reason}")]
    InvalidField {
        section: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// Read and parse a content document from disk.
pub fn load_content(path: &Path) -> Result<Content, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_content(&raw)
}

/// Parse a content document from a JSON string.
pub fn parse_content(json: &str) -> Result<Content, ContentError> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Document
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    pub site: Site,
    pub hero: Hero,
    pub music: Music,
    pub studio: Studio,
    pub photo_break: PhotoBreak,
    pub gear: Gear,
    pub teaching: Teaching,
    pub genre_marquee: Marquee,
    pub events: Events,
    pub contact: Contact,
    pub calendar: Calendar,
    pub marquee: Marquee,
    #[serde(default)]
    pub testimonials: Testimonials,
    #[serde(default)]
    pub videos: Videos,
}

impl Content {
    /// Every image filename the page references, in render order, without
    /// duplicates. Empty names are left out.
    pub fn image_refs(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = Vec::new();
        let candidates = [
            self.hero.image_main.as_str(),
            self.hero.image_accent.as_str(),
        ]
        .into_iter()
        .chain(self.music.banner_images.iter().map(String::as_str))
        .chain([
            self.music.image_1.as_str(),
            self.music.image_2.as_str(),
            self.studio.image_1.as_str(),
            self.studio.image_2.as_str(),
            self.photo_break.image.as_str(),
            self.gear.story_image.as_str(),
        ])
        .chain(
            self.testimonials
                .items
                .iter()
                .filter_map(|t| t.image.as_deref()),
        )
        .chain([
            self.teaching.image_1.as_str(),
            self.teaching.image_2.as_str(),
            self.events.image.as_str(),
        ]);
        for name in candidates {
            if !name.is_empty() && !refs.contains(&name) {
                refs.push(name);
            }
        }
        refs
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub title: String,
    pub nav_logo: String,
    #[serde(deserialize_with = "scalar")]
    pub copyright_year: String,
    /// Artist name for the footer and image alt text. Defaults to `nav_logo`.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
    /// Web font stylesheet; font host preconnect hints are emitted with it.
    #[serde(default)]
    pub fonts_url: Option<String>,
}

fn default_stylesheet() -> String {
    "styles.css".to_string()
}

impl Site {
    pub fn owner_name(&self) -> &str {
        self.owner.as_deref().unwrap_or(&self.nav_logo)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hero {
    pub tagline: String,
    pub name_line1: String,
    pub name_line2: String,
    pub name_line3: String,
    pub subtitle: String,
    pub btn_primary: String,
    pub btn_secondary: String,
    pub stamp_1: String,
    pub stamp_2: String,
    pub image_main: String,
    pub image_accent: String,
    #[serde(default)]
    pub video_youtube_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Music {
    pub label: String,
    pub title: String,
    pub subtitle: String,
    pub badge: String,
    pub image_1: String,
    pub image_2: String,
    pub albums: Vec<Album>,
    pub streaming_links: LinkList,
    #[serde(default)]
    pub banner_images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Studio {
    pub label: String,
    pub title: String,
    pub subtitle: String,
    pub copy: String,
    pub image_1: String,
    pub image_2: String,
    pub stamp: String,
    pub services: Vec<Service>,
    pub quote: String,
    pub quote_author: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    #[serde(deserialize_with = "scalar")]
    pub num: String,
    pub title: String,
    pub desc: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoBreak {
    pub image: String,
    pub stamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gear {
    pub label: String,
    pub title: String,
    pub story_image: String,
    pub story_text: String,
    pub categories: Vec<GearCategory>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GearCategory {
    pub name: String,
    pub items: Vec<GearItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GearItem {
    pub name: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Teaching {
    pub label: String,
    pub title: String,
    pub stamp: String,
    pub image_1: String,
    pub image_2: String,
    pub intro: String,
    pub classes: Vec<Class>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Class {
    pub tag: String,
    pub title: String,
    pub desc: String,
    pub foot_1: String,
    pub foot_2: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Marquee {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Events {
    pub label: String,
    pub title: String,
    pub booking_text: String,
    pub booking_link_text: String,
    pub image: String,
    pub hotties_title: String,
    pub hotties_desc: String,
    pub hotties_link: String,
    pub hotties_link_text: String,
    /// Rows shown until the calendar script replaces them.
    #[serde(default)]
    pub placeholders: Vec<EventPlaceholder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventPlaceholder {
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub label: String,
    pub title: String,
    pub heading: String,
    pub copy: String,
    pub location: String,
    pub socials: LinkList,
    pub formspree_id: String,
    #[serde(default = "default_inquiry_options")]
    pub inquiry_options: Vec<InquiryOption>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InquiryOption {
    pub value: String,
    pub label: String,
}

fn default_inquiry_options() -> Vec<InquiryOption> {
    [
        ("studio", "studio session"),
        ("teaching", "lessons"),
        ("session", "session musician"),
        ("booking", "live booking"),
        ("other", "something else"),
    ]
    .into_iter()
    .map(|(value, label)| InquiryOption {
        value: value.to_string(),
        label: label.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Calendar {
    pub calendar_id: String,
    pub api_key: String,
    #[serde(default = "default_empty_message")]
    pub empty_message: String,
}

fn default_empty_message() -> String {
    "New shows coming soon".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Testimonials {
    #[serde(default = "default_testimonials_label")]
    pub label: String,
    #[serde(default = "default_testimonials_title")]
    pub title: String,
    #[serde(default)]
    pub items: Vec<Testimonial>,
}

fn default_testimonials_label() -> String {
    "Kind Words".to_string()
}

fn default_testimonials_title() -> String {
    "What People Say".to_string()
}

impl Default for Testimonials {
    fn default() -> Self {
        Self {
            label: default_testimonials_label(),
            title: default_testimonials_title(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Testimonial {
    /// First character of the name, shown when there is no photo.
    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Videos {
    #[serde(default = "default_videos_label")]
    pub label: String,
    #[serde(default = "default_videos_title")]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub items: Vec<Video>,
}

fn default_videos_label() -> String {
    "Watch".to_string()
}

fn default_videos_title() -> String {
    "Sessions & Lessons".to_string()
}

impl Default for Videos {
    fn default() -> Self {
        Self {
            label: default_videos_label(),
            title: default_videos_title(),
            subtitle: String::new(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub title: String,
    pub desc: String,
    #[serde(default)]
    pub youtube_id: Option<String>,
}

impl Video {
    /// The YouTube id to embed, if a real one is set.
    pub fn embed_id(&self) -> Option<&str> {
        self.youtube_id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != VIDEO_ID_PLACEHOLDER)
    }
}

// ============================================================================
// Albums
// ============================================================================

/// A release in the music section.
///
/// An album with a real `bandcamp_album_id` becomes an [`Album::Embed`]; the
/// placeholder id or no id at all selects [`Album::FlipCard`], which then
/// requires the card fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawAlbum")]
pub enum Album {
    Embed(EmbedAlbum),
    FlipCard(FlipCard),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedAlbum {
    pub album_id: String,
    /// Purchase link. Empty when the document has none.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlipCard {
    pub title: String,
    pub year: String,
    pub num: String,
    pub colors: [String; 3],
    pub tracks: Vec<String>,
    pub badge: Option<String>,
}

#[derive(Deserialize)]
struct RawAlbum {
    #[serde(default, deserialize_with = "opt_scalar")]
    bandcamp_album_id: Option<String>,
    #[serde(default)]
    bandcamp_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar")]
    year: Option<String>,
    #[serde(default, deserialize_with = "opt_scalar")]
    num: Option<String>,
    #[serde(default)]
    colors: Option<Vec<String>>,
    #[serde(default)]
    tracks: Vec<String>,
    #[serde(default)]
    badge: Option<String>,
}

const ALBUM_SECTION: &str = "music.albums";

impl TryFrom<RawAlbum> for Album {
    type Error = ContentError;

    fn try_from(raw: RawAlbum) -> Result<Self, Self::Error> {
        if let Some(album_id) = raw
            .bandcamp_album_id
            .filter(|id| !id.is_empty() && id != ALBUM_ID_PLACEHOLDER)
        {
            return Ok(Album::Embed(EmbedAlbum {
                album_id,
                url: raw.bandcamp_url.unwrap_or_default(),
            }));
        }

        let missing = |field| ContentError::MissingField {
            section: ALBUM_SECTION,
            field,
        };
        let colors = raw.colors.ok_or_else(|| missing("colors"))?;
        let count = colors.len();
        let colors: [String; 3] =
            colors
                .try_into()
                .map_err(|_| ContentError::InvalidField {
                    section: ALBUM_SECTION,
                    field: "colors",
                    reason: format!("must hold exactly 3 colors, found {count}"),
                })?;

        Ok(Album::FlipCard(FlipCard {
            title: raw.title.ok_or_else(|| missing("title"))?,
            year: raw.year.ok_or_else(|| missing("year"))?,
            num: raw.num.ok_or_else(|| missing("num"))?,
            colors,
            tracks: raw.tracks,
            badge: raw.badge.filter(|b| !b.is_empty()),
        }))
    }
}

// ============================================================================
// Ordered link lists
// ============================================================================

/// Label → URL pairs in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkList(pub Vec<(String, String)>);

impl LinkList {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(label, url)| (label.as_str(), url.as_str()))
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.iter().find(|(l, _)| *l == label).map(|(_, url)| url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for LinkList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LinkListVisitor;

        impl<'de> Visitor<'de> for LinkListVisitor {
            type Value = LinkList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping labels to URLs")
            }

            fn visit_map<A>(self, mut map: A) -> Result<LinkList, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut links = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((label, url)) = map.next_entry::<String, String>()? {
                    links.push((label, url));
                }
                Ok(LinkList(links))
            }
        }

        deserializer.deserialize_map(LinkListVisitor)
    }
}

// ============================================================================
// Scalars written as either strings or numbers
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
        }
    }
}

fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer)
        .map(String::from)
        .map_err(|_| de::Error::custom("expected a string or a number"))
}

fn opt_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer).map(|v| v.map(String::from))
}

// ============================================================================
// Tests
// ============================================================================

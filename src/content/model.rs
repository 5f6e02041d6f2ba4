//! Algorithm catalog records.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DalilError, Result};

/// Kind of learning resource.
///
/// Types this version does not know about deserialize as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Video,
    Article,
    Interactive,
    Book,
    #[serde(other)]
    Other,
}

impl ResourceType {
    /// Icon shown before the resource title.
    pub fn icon(&self) -> &'static str {
        match self {
            ResourceType::Video => "📹",
            ResourceType::Article => "📄",
            ResourceType::Interactive => "💻",
            ResourceType::Book => "📚",
            ResourceType::Other => "📎",
        }
    }
}

/// Language a resource is written or recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
}

impl Language {
    /// Badge text shown next to a resource.
    pub fn badge(&self) -> &'static str {
        match self {
            Language::Ar => "عربي",
            Language::En => "English",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub language: Language,
    #[serde(default)]
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    pub url: String,
    pub platform: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTopic {
    pub id: String,
    pub title: String,
}

/// One algorithm page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Algorithm {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    /// Free text, e.g. `متوسط`, `beginner`, `مبتدئ - متوسط`
    pub difficulty: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub what: String,
    #[serde(default)]
    pub why: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub related: Vec<RelatedTopic>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub problems: Vec<Problem>,
}

/// Accepted document shapes: a bare array or `{ "algorithms": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Wrapped { algorithms: Vec<Algorithm> },
    Bare(Vec<Algorithm>),
}

/// All algorithm records, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    algorithms: Vec<Algorithm>,
}

impl Catalog {
    /// Create a catalog from parsed algorithms.
    pub fn new(algorithms: Vec<Algorithm>) -> Self {
        Self { algorithms }
    }

    /// Parse a catalog document.
    pub fn from_json(json: &str) -> Result<Self> {
        let algorithms = match serde_json::from_str::<Document>(json) {
            Ok(Document::Wrapped { algorithms }) | Ok(Document::Bare(algorithms)) => algorithms,
            Err(e) => {
                return Err(DalilError::Content(format!(
                    "Failed to parse algorithms data: {}",
                    e
                )))
            }
        };
        debug!(count = algorithms.len(), "Catalog parsed");
        Ok(Self { algorithms })
    }

    /// Load a catalog from a local file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading algorithms data");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Fetch a catalog over HTTP. A non-success status is an error.
    pub async fn fetch(url: &str) -> Result<Self> {
        info!(url = %url, "Fetching algorithms data");
        let response = reqwest::get(url).await?;
        if !response.status().is_success() {
            return Err(DalilError::Content(format!(
                "Failed to load algorithms data: status {}",
                response.status()
            )));
        }
        let body = response.text().await?;
        Self::from_json(&body)
    }

    /// Load from `source`, fetching when it is an http(s) URL.
    pub async fn load(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::fetch(source).await
        } else {
            Self::from_path(source)
        }
    }

    /// Find an algorithm by id.
    pub fn find(&self, id: &str) -> Option<&Algorithm> {
        self.algorithms.iter().find(|a| a.id == id)
    }

    /// Get every algorithm in document order.
    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    /// Number of algorithms.
    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }
}

#[cfg(test)]
pub(crate) const SAMPLE: &str = r#"{
  "algorithms": [
    {
      "id": "binary-search",
      "title": "البحث الثنائي",
      "category": "البحث",
      "description": "بحث في مصفوفة مرتبة",
      "difficulty": "مبتدئ",
      "duration": "2 ساعات",
      "what": "خوارزمية **سريعة**\n• تقسم المجال إلى نصفين",
      "why": "تستخدم كثيراً",
      "prerequisites": ["المصفوفات"],
      "related": [{ "id": "two-pointers", "title": "المؤشرين" }],
      "resources": [
        { "title": "Binary Search", "url": "https://example.com/bs", "type": "video", "language": "en", "difficulty": "beginner" }
      ],
      "problems": [
        { "title": "Guess Number", "url": "https://example.com/p", "platform": "LeetCode", "difficulty": "easy", "tags": ["binary-search"] }
      ]
    },
    {
      "id": "dp",
      "title": "البرمجة الديناميكية",
      "category": "البرمجة الديناميكية",
      "description": "حل المسائل بتقسيمها",
      "difficulty": "مبتدئ - متوسط"
    }
  ]
}"#;

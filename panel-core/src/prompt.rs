use crate::parser::{normalize_tag, parse_tags};
use chrono::Utc;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A titled text snippet with optional tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

/// The shapes `tags` has been stored in over time.
///
/// Anything else reads as no tags rather than failing the whole record.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTags {
    List(Vec<Value>),
    Joined(String),
    Other(IgnoredAny),
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<StoredTags>::deserialize(deserializer)? {
        Some(StoredTags::List(tags)) => {
            normalize_tags(tags.iter().filter_map(Value::as_str))
        }
        Some(StoredTags::Joined(tags)) => parse_tags(&tags),
        Some(StoredTags::Other(_)) | None => Vec::new(),
    };
    Ok(tags)
}

/// Trims every tag, strips its leading `#` and drops the ones left empty.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .collect()
}

/// Generates a fresh prompt id: `prompt_<unix millis><7 random characters>`.
pub fn generate_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(7).collect();
    format!("prompt_{}{}", Utc::now().timestamp_millis(), suffix)
}

impl Prompt {
    /// Creates a prompt with a newly generated id.
    pub fn new(title: String, content: String, tags: Vec<String>) -> Prompt {
        Prompt::with_id(generate_id(), title, content, tags)
    }

    pub fn with_id(id: String, title: String, content: String, tags: Vec<String>) -> Prompt {
        Prompt {
            id,
            title,
            content,
            tags: normalize_tags(tags),
        }
    }

    pub fn normalized(mut self) -> Prompt {
        self.tags = normalize_tags(self.tags);
        self
    }

    /// Case-insensitive substring match against title, content and tags.
    ///
    /// An empty (or blank) term matches every prompt.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&term)
            || self.content.to_lowercase().contains(&term)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
    }
}

/// Returns the prompts matching `term`, keeping the collection order.
pub fn filter_prompts<'a>(prompts: &'a [Prompt], term: &str) -> Vec<&'a Prompt> {
    prompts.iter().filter(|prompt| prompt.matches(term)).collect()
}

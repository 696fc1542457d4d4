use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Preferences extracted from the user's query by the plan stage.
///
/// Every field is optional: the model only fills what the query mentions.
/// Numbers and booleans are stringified; empty strings and `null` become `None`.
/// Keys outside the known set are kept in `other` and travel with the state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPersona {
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub campus_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub degree_level: Option<String>,
    /// Comma-separated when the query compares several institutions
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl UserPersona {
    /// Parse model output, tolerating code fences and prose around the object
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value = uniplan_llm::extract_json(text)?;
        serde_json::from_value(value)
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.major.is_none()
            && self.budget.is_none()
            && self.campus_size.is_none()
            && self.degree_level.is_none()
            && self.institution.is_none()
            && self.other.is_empty()
    }

    /// Institutions named in `institution`, split on commas and " and "
    pub fn institutions(&self) -> Vec<String> {
        self.institution
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .flat_map(|part| part.split(" and "))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Array(items)) => {
            let joined: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined.join(", "))
            }
        }
        Some(other) => Some(other.to_string()),
    })
}

use serde::{Deserialize, Deserializer, Serialize};

/// One posting from the jobs feed. Identified by `url`; the whole list is
/// replaced on every fetch, never merged, so duplicates resolve by list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub source: Option<String>,
    #[serde(default = "default_priority", deserialize_with = "lenient_priority")]
    pub priority: u8,
    // Older feed snapshots used camelCase for this key.
    #[serde(alias = "fetchedAt")]
    pub fetched_at: Option<String>,
}

/// Wire shape of `jobs.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsFeed {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// Wire shape of `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub search_terms: Vec<String>,
}

/// User-assigned disposition of a job. Absence from the triage map means
/// untriaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriageStatus {
    Todo,
    Done,
    Skip,
}

impl TriageStatus {
    pub fn label(self) -> &'static str {
        match self {
            TriageStatus::Todo => "todo",
            TriageStatus::Done => "done",
            TriageStatus::Skip => "skip",
        }
    }
}

fn default_priority() -> u8 {
    1
}

// The feed is scraped from messy sources, so priority values can be numbers,
// strings, null, or absent. Anything that is not a recognizable 2 reads as 1.
fn lenient_priority<'de, D>(de: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    let priority = match &value {
        serde_json::Value::Number(n) if n.as_u64() == Some(2) => 2,
        serde_json::Value::String(s) if s.trim() == "2" => 2,
        _ => 1,
    };
    Ok(priority)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_job(json: &str) -> Job {
        serde_json::from_str(json).expect("job should parse")
    }

    #[test]
    fn priority_defaults_to_one_when_missing() {
        let job = parse_job(r#"{"title":"Dev","url":"a"}"#);
        assert_eq!(job.priority, 1);
    }

    #[test]
    fn priority_accepts_two_as_number_or_string() {
        assert_eq!(parse_job(r#"{"title":"x","url":"a","priority":2}"#).priority, 2);
        assert_eq!(parse_job(r#"{"title":"x","url":"a","priority":"2"}"#).priority, 2);
    }

    #[test]
    fn malformed_priority_reads_as_one() {
        assert_eq!(parse_job(r#"{"title":"x","url":"a","priority":null}"#).priority, 1);
        assert_eq!(parse_job(r#"{"title":"x","url":"a","priority":"high"}"#).priority, 1);
        assert_eq!(parse_job(r#"{"title":"x","url":"a","priority":3}"#).priority, 1);
    }

    #[test]
    fn fetched_at_accepts_camel_case_alias() {
        let job = parse_job(r#"{"title":"x","url":"a","fetchedAt":"2024-01-01T00:00:00Z"}"#);
        assert_eq!(job.fetched_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn feed_tolerates_missing_jobs_key() {
        let feed: JobsFeed = serde_json::from_str("{}").expect("feed should parse");
        assert!(feed.jobs.is_empty());
    }

    #[test]
    fn triage_status_round_trips_as_lowercase() {
        let json = serde_json::to_string(&TriageStatus::Skip).unwrap();
        assert_eq!(json, r#""skip""#);
        let back: TriageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TriageStatus::Skip);
    }
}

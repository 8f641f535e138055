use std::collections::HashMap;

use clap::ValueEnum;

use crate::models::{Job, TriageStatus};

/// Priority selector: everything, or only one of the two feed priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PriorityFilter {
    #[default]
    All,
    #[value(name = "1")]
    Normal,
    #[value(name = "2")]
    High,
}

impl PriorityFilter {
    pub fn matches(self, priority: u8) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Normal => priority == 1,
            PriorityFilter::High => priority == 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityFilter::All => "all",
            PriorityFilter::Normal => "1",
            PriorityFilter::High => "2",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            PriorityFilter::All => PriorityFilter::Normal,
            PriorityFilter::Normal => PriorityFilter::High,
            PriorityFilter::High => PriorityFilter::All,
        }
    }
}

/// Transient filter inputs. Never persisted; reset only by user input.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub term: String,
    pub priority: PriorityFilter,
}

/// Derive the visible subset of jobs. Exclusion order: skip-marked jobs
/// first, then priority mismatches, then (when a term is present) jobs whose
/// `title + " " + url` does not contain the term case-insensitively. Source
/// order is preserved.
pub fn apply(
    jobs: &[Job],
    criteria: &FilterCriteria,
    triage: &HashMap<String, TriageStatus>,
) -> Vec<Job> {
    let term = criteria.term.trim().to_lowercase();
    jobs.iter()
        .filter(|job| triage.get(&job.url) != Some(&TriageStatus::Skip))
        .filter(|job| criteria.priority.matches(job.priority))
        .filter(|job| {
            if term.is_empty() {
                return true;
            }
            let haystack = format!("{} {}", job.title, job.url).to_lowercase();
            haystack.contains(&term)
        })
        .cloned()
        .collect()
}

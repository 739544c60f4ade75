//! Research depth profiles and sub-query planning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::SearchQuery;

/// How broad a research run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    Quick,
    #[default]
    Standard,
    Deep,
}

/// Sub-query shape for one depth.
///
/// `{topic}` in a template is replaced by the trimmed topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthProfile {
    pub depth: ResearchDepth,
    pub results_per_query: usize,
    pub templates: &'static [&'static str],
}

/// Every depth's profile, one row per depth.
pub const DEPTH_PROFILES: [DepthProfile; 3] = [
    DepthProfile {
        depth: ResearchDepth::Quick,
        results_per_query: 5,
        templates: &["{topic}"],
    },
    DepthProfile {
        depth: ResearchDepth::Standard,
        results_per_query: 6,
        templates: &["{topic}", "{topic} overview", "{topic} latest developments"],
    },
    DepthProfile {
        depth: ResearchDepth::Deep,
        results_per_query: 8,
        templates: &[
            "{topic}",
            "{topic} analysis",
            "{topic} examples",
            "{topic} best practices",
            "latest {topic} trends",
        ],
    },
];

impl ResearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Deep => "deep",
        }
    }

    pub fn profile(&self) -> &'static DepthProfile {
        match self {
            Self::Quick => &DEPTH_PROFILES[0],
            Self::Standard => &DEPTH_PROFILES[1],
            Self::Deep => &DEPTH_PROFILES[2],
        }
    }

    /// Number of sub-queries a plan at this depth issues.
    pub fn query_count(&self) -> usize {
        self.profile().templates.len()
    }

    pub fn results_per_query(&self) -> usize {
        self.profile().results_per_query
    }
}

impl fmt::Display for ResearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchDepth {
    type Err = SearchError;

    /// Accepts exactly `quick`, `standard` or `deep`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            _ => Err(SearchError::InvalidDepth(s.to_owned())),
        }
    }
}

/// The ordered sub-queries for one research run.
///
/// Deterministic: the same topic and depth always give the same plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchPlan {
    topic: String,
    depth: ResearchDepth,
    sub_queries: Vec<SearchQuery>,
}

impl ResearchPlan {
    /// Expand `topic` into the sub-queries for `depth`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] if the topic is blank.
    pub fn new(topic: &str, depth: ResearchDepth) -> Result<Self, SearchError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SearchError::InvalidQuery("topic must not be empty".into()));
        }
        let profile = depth.profile();
        let sub_queries = profile
            .templates
            .iter()
            .map(|template| {
                SearchQuery::new(
                    &template.replace("{topic}", topic),
                    profile.results_per_query,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            topic: topic.to_owned(),
            depth,
            sub_queries,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn depth(&self) -> ResearchDepth {
        self.depth
    }

    pub fn sub_queries(&self) -> &[SearchQuery] {
        &self.sub_queries
    }
}

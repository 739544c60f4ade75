//! Multi-query research over the fallback router.
//!
//! A topic is expanded into the sub-queries of its [`ResearchPlan`], all of
//! which are routed concurrently. Each sub-query gets its own full fallback
//! chain, so one failing sub-query only degrades its own section. Results
//! are reassembled in plan order and deduplicated across sections.

pub mod dedup;
pub mod plan;

pub use plan::{DepthProfile, ResearchDepth, ResearchPlan, DEPTH_PROFILES};

use futures::future::join_all;
use tokio::time::Instant;

use crate::error::SearchError;
use crate::provider::{Provider, SearchProvider};
use crate::router::FallbackRouter;
use crate::types::{SearchQuery, SearchResultSet};

/// What happened to one sub-query.
#[derive(Debug, Clone)]
pub enum SectionOutcome {
    /// A provider answered. May be empty after deduplication.
    Found(SearchResultSet),
    /// Every provider failed for this sub-query.
    Failed(SearchError),
    /// The caller's deadline passed before the sub-query finished.
    DeadlineExceeded,
}

/// One sub-query and its outcome.
#[derive(Debug, Clone)]
pub struct ResearchSection {
    pub sub_query: String,
    pub outcome: SectionOutcome,
}

impl ResearchSection {
    /// Items in this section, empty unless [`SectionOutcome::Found`].
    pub fn items(&self) -> &[crate::types::SearchResultItem] {
        match self.outcome {
            SectionOutcome::Found(ref set) => set.items(),
            _ => &[],
        }
    }
}

/// The result of one research run, sections in plan order.
#[derive(Debug, Clone)]
pub struct ResearchReport {
    pub topic: String,
    pub depth: ResearchDepth,
    pub sections: Vec<ResearchSection>,
}

impl ResearchReport {
    /// Items across all sections after deduplication.
    pub fn total_sources(&self) -> usize {
        self.sections.iter().map(|s| s.items().len()).sum()
    }

    /// Number of sections that produced at least one item.
    pub fn answered_sections(&self) -> usize {
        self.sections.iter().filter(|s| !s.items().is_empty()).count()
    }
}

/// Runs research plans through a [`FallbackRouter`].
#[derive(Debug)]
pub struct ResearchOrchestrator<P: SearchProvider = Provider> {
    router: FallbackRouter<P>,
}

impl<P: SearchProvider> Clone for ResearchOrchestrator<P> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
        }
    }
}

impl<P: SearchProvider> ResearchOrchestrator<P> {
    pub fn new(router: FallbackRouter<P>) -> Self {
        Self { router }
    }

    /// Research `topic` at `depth` with no overall deadline.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for a blank topic. Provider
    /// failures never fail the run; they are recorded per section.
    pub async fn research(
        &self,
        topic: &str,
        depth: ResearchDepth,
    ) -> Result<ResearchReport, SearchError> {
        let plan = ResearchPlan::new(topic, depth)?;
        Ok(self.execute(&plan, None).await)
    }

    /// Research `topic`, abandoning sub-queries still running at `deadline`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::research`].
    pub async fn research_with_deadline(
        &self,
        topic: &str,
        depth: ResearchDepth,
        deadline: Instant,
    ) -> Result<ResearchReport, SearchError> {
        let plan = ResearchPlan::new(topic, depth)?;
        Ok(self.execute(&plan, Some(deadline)).await)
    }

    /// Route every sub-query of `plan` concurrently and assemble the report.
    pub async fn execute(&self, plan: &ResearchPlan, deadline: Option<Instant>) -> ResearchReport {
        tracing::debug!(
            topic = plan.topic(),
            depth = %plan.depth(),
            sub_queries = plan.sub_queries().len(),
            "research started"
        );

        let outcomes = join_all(
            plan.sub_queries()
                .iter()
                .map(|query| self.run_sub_query(query, deadline)),
        )
        .await;

        let mut sections: Vec<ResearchSection> = plan
            .sub_queries()
            .iter()
            .zip(outcomes)
            .map(|(query, outcome)| ResearchSection {
                sub_query: query.text().to_owned(),
                outcome,
            })
            .collect();

        let removed = dedup::dedup_sections(&mut sections);

        let report = ResearchReport {
            topic: plan.topic().to_owned(),
            depth: plan.depth(),
            sections,
        };
        tracing::info!(
            depth = %report.depth,
            sections = report.sections.len(),
            answered = report.answered_sections(),
            sources = report.total_sources(),
            duplicates_removed = removed,
            "research finished"
        );
        report
    }

    async fn run_sub_query(&self, query: &SearchQuery, deadline: Option<Instant>) -> SectionOutcome {
        let routed = self.router.route(query, None);
        let result = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, routed).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(sub_query = query.text(), "research deadline passed");
                    return SectionOutcome::DeadlineExceeded;
                }
            },
            None => routed.await,
        };
        match result {
            Ok(set) => SectionOutcome::Found(set),
            Err(err) => SectionOutcome::Failed(err),
        }
    }
}

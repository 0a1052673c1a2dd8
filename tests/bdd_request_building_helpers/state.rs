//! Scenario state for request building behavioural tests.

use icgroup::request::{CreationRequest, GroupOptions};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// Outcome of building a request.
#[derive(Debug, Clone)]
pub(crate) enum BuildResult {
    /// The builder produced a document.
    Built(Box<CreationRequest>),
    /// The builder rejected the options; holds the offending field.
    Rejected { field: String },
}

#[derive(Default, ScenarioState)]
pub(crate) struct RequestState {
    pub(crate) options: Slot<GroupOptions>,
    pub(crate) result: Slot<BuildResult>,
}

#[fixture]
pub(crate) fn request_state() -> RequestState {
    RequestState::default()
}

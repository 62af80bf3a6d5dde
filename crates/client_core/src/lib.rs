//! Client core for the band directory: fetches a band, drives the edit
//! form through validation and submission, and projects a read-only detail
//! view. Rendering is left to the caller, which observes view state through
//! `watch` channels.

pub mod detail;
pub mod error;
pub mod fetcher;
pub mod navigation;
pub mod source;
pub mod validation;
pub mod workflow;

pub use detail::{BandDetail, DetailView, DetailViewState, MemberItem};
pub use error::{ClientBuildError, FetchError, SubmitError, GENERIC_UPDATE_FAILURE};
pub use fetcher::{BandFetcher, FetchTicket, RequestTracker};
pub use navigation::{ChannelNavigator, Navigator, Route};
pub use source::{BandSource, BandUpdater, FallbackBandSource, HttpBandClient};
pub use validation::{BandFormValues, Field, ValidationErrors, ValidationSchema};
pub use workflow::{
    EditForm, EditViewState, EditWorkflow, StatusBanner, SubmitOutcome, WorkflowOptions,
    WorkflowPhase, NAVIGATION_DELAY,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

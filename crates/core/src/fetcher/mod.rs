//! External data feeds.
//!
//! A fixed catalog of datasets is fetched in turn. Every dataset ends up at
//! a deterministic path in the session directory: either the retrieved
//! payload or a `No Data` placeholder.

mod archiver;
mod catalog;
mod error;
mod http;
mod pages;
mod types;

pub use archiver::{filter_samples, ArchiverChannel, ArchiverSample, TelemetryDocument, TelemetrySample};
pub use catalog::{dataset_catalog, fwhm_channels, weather_channels, SEEING_KINDS};
pub use error::FetchError;
pub use http::HttpFetcher;
pub use pages::{render_massdimm_page, render_skyprobe_page};
pub use types::{DatasetGroup, DatasetRequest, DatasetSource, PLACEHOLDER_CONTENT};

//! DealHub SDK - Rust Client Library
//!
//! REST adapter for the DealHub API gateway. Implements the core ports so the
//! extraction job client and the agreement lifecycle service can run against
//! a live server.
//!
//! # Example
//!
//! ```no_run
//! use dealhub_core::application::{ExtractionJobClient, PollOptions};
//! use dealhub_core::domain::{ExtractionProfile, StartExtractionRequest};
//! use dealhub_sdk::{HttpApiClient, Session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new("http://localhost:8080").with_token("eyJ...");
//!     let api = Arc::new(HttpApiClient::new(session)?);
//!
//!     let jobs = ExtractionJobClient::new(api);
//!     let request = StartExtractionRequest::new(7, 3)
//!         .with_profile(ExtractionProfile::FacilityAgreement);
//!
//!     let (job_key, outcome) = jobs.submit_and_poll(&request, PollOptions::default()).await?;
//!     println!("{}: {}", job_key, outcome.label());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod session;
mod types;

pub use client::HttpApiClient;
pub use error::{Result, SdkError};
pub use session::{Session, DEFAULT_API_URL};
pub use types::{LoginRequest, LoginResponse, MeResponse, UploadDocumentResponse};

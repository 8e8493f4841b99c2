pub mod job;
pub mod profile;

pub use job::JobListing;
pub use profile::ResumeProfile;

//! Price source port trait.

use crate::domain::error::ScrapError;
use crate::domain::ingest::SourceSnapshot;

/// A vendor price page.
///
/// One call is one fetch: no retries, and a failure is terminal for the
/// update that requested it.
pub trait PriceSource {
    fn fetch(&self) -> Result<SourceSnapshot, ScrapError>;
}

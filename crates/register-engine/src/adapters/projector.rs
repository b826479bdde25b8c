//! Default index projector: one klapper row per appearer name.

use crate::domain::entities::{IndexEntry, RegisterEntry};
use crate::domain::errors::ProjectionError;
use crate::domain::projector::project_entry;
use crate::ports::outbound::IndexProjector;

/// Projects register entries into name-index rows.
#[derive(Default)]
pub struct NameIndexProjector;

impl IndexProjector for NameIndexProjector {
    fn project(&self, entry: &RegisterEntry) -> Result<Vec<IndexEntry>, ProjectionError> {
        project_entry(entry)
    }
}

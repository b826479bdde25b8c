//! # Administrative Corrections
//!
//! The only mutation after creation. Touches `notes` and
//! `linked_document_id` of the stored entry; numbers, execution date,
//! counters and index rows stay as they were.

use super::*;
use crate::domain::entities::{AdministrativePatch, RegisterEntry};
use crate::domain::errors::StorageError;
use crate::domain::validation::validate_patch;
use crate::domain::value_objects::{ActorId, EntryId, KeyPrefix};
use crate::ports::outbound::StoreTransaction;
use register_telemetry::record_validation_rejection;

impl<ST, TS, IG, PJ, RS> RegisterService<ST, TS, IG, PJ, RS>
where
    ST: TransactionalStore,
    TS: TimeSource,
    IG: IdGenerator,
    PJ: IndexProjector,
    RS: RecordSerializer,
{
    pub(crate) fn amend(
        &self,
        id: EntryId,
        patch: AdministrativePatch,
        actor: ActorId,
    ) -> Result<RegisterEntry, RegisterError> {
        let patch = validate_patch(&patch, self.config.max_text_len).map_err(|e| {
            record_validation_rejection();
            RegisterError::from(e)
        })?;

        let entry = self.with_retry(|| format!("entry/{id}"), |_| {
            self.try_amend(id, &patch, &actor)
        })?;

        tracing::info!(
            office = %self.config.office_id,
            id = %entry.id,
            yearly_seq = entry.yearly_seq,
            actor = %actor,
            "[register] administrative fields amended"
        );
        Ok(entry)
    }

    fn try_amend(
        &self,
        id: EntryId,
        patch: &AdministrativePatch,
        actor: &ActorId,
    ) -> Result<RegisterEntry, RegisterError> {
        let office = self.config.office_id.as_str();
        let mut tx = self.store.begin()?;

        let entry_key = tx
            .get(&KeyPrefix::id_key(office, &id))?
            .ok_or_else(|| RegisterError::not_found(id))?;
        let data = tx
            .get_for_update(&entry_key)?
            .ok_or_else(|| StorageError::Corruption {
                message: format!("id pointer {id} refers to a missing entry"),
            })?;

        let mut entry = self.serializer.deserialize_entry(&data)?;
        patch.apply(&mut entry, actor.clone(), self.time_source.now());

        tx.put(&entry_key, &self.serializer.serialize_entry(&entry)?)?;
        tx.commit()?;
        Ok(entry)
    }
}

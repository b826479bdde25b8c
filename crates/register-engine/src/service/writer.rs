//! # Register Writer
//!
//! Creation path: validate, then in ONE transaction lock the yearly counter,
//! lock the monthly counter, build the entry, project its index rows and
//! insert everything. Counters are always locked yearly first so two
//! writers can never deadlock on the same pair.
//!
//! Transient conflicts restart the whole transaction with bounded
//! exponential backoff; an exhausted budget surfaces as `Contention` naming
//! the counter whose lock timed out last (yearly when the conflict came from
//! the commit itself).

use super::counter::allocate_next;
use super::*;
use crate::domain::entities::{NewRegisterEntry, RegisterEntry};
use crate::domain::errors::StorageError;
use crate::domain::validation::{validate_new_entry, ValidatedEntry};
use crate::domain::value_objects::{KeyPrefix, ScopeKey, ScopePair};
use crate::ports::outbound::StoreTransaction;
use std::cell::Cell;
use register_telemetry::{
    record_allocation_retry, record_contention_failure, record_entry_created, record_index_rows,
    record_validation_rejection,
};

impl<ST, TS, IG, PJ, RS> RegisterService<ST, TS, IG, PJ, RS>
where
    ST: TransactionalStore,
    TS: TimeSource,
    IG: IdGenerator,
    PJ: IndexProjector,
    RS: RecordSerializer,
{
    pub(crate) fn create(&self, input: NewRegisterEntry) -> Result<RegisterEntry, RegisterError> {
        let validated = validate_new_entry(&input, self.config.max_text_len).map_err(|e| {
            record_validation_rejection();
            tracing::debug!(error = %e, "[register] creation rejected");
            RegisterError::from(e)
        })?;

        let scopes = self
            .config
            .scope_keys_for(validated.executed_at, validated.is_land_registry_act);
        let contended = Cell::new(None);
        let (entry, index_rows) = self.with_retry(
            || contended.get().unwrap_or(&scopes.yearly).to_string(),
            |_| self.try_create(&validated, &scopes, &contended),
        )?;

        self.stats_cache.invalidate(entry.year());
        record_entry_created(entry.pool.tag());
        record_index_rows(index_rows as u64);

        tracing::info!(
            office = %self.config.office_id,
            id = %entry.id,
            year = entry.year(),
            month = entry.month(),
            pool = entry.pool.tag(),
            yearly_seq = entry.yearly_seq,
            monthly_seq = entry.monthly_seq,
            index_rows,
            "[register] entry created"
        );
        Ok(entry)
    }

    /// One attempt. Any error drops `tx`, which rolls back both counters.
    ///
    /// `contended` is left pointing at the counter whose allocation failed,
    /// or `None` when the attempt failed elsewhere.
    fn try_create<'s>(
        &self,
        input: &ValidatedEntry,
        scopes: &'s ScopePair,
        contended: &Cell<Option<&'s ScopeKey>>,
    ) -> Result<(RegisterEntry, usize), RegisterError> {
        let office = self.config.office_id.as_str();
        contended.set(None);
        let mut tx = self.store.begin()?;

        let yearly_seq = allocate_next(&mut tx, office, &scopes.yearly)
            .inspect_err(|_| contended.set(Some(&scopes.yearly)))?;
        let monthly_seq = allocate_next(&mut tx, office, &scopes.monthly)
            .inspect_err(|_| contended.set(Some(&scopes.monthly)))?;

        let entry = RegisterEntry {
            id: self.id_generator.next_id(),
            yearly_seq,
            monthly_seq,
            pool: scopes.yearly.pool,
            executed_at: input.executed_at,
            nature_of_deed: input.nature_of_deed.clone(),
            appearer_names: input.appearer_names.clone(),
            notes: input.notes.clone(),
            is_land_registry_act: input.is_land_registry_act,
            linked_document_id: input.linked_document_id.clone(),
            created_by_actor_id: input.created_by_actor_id.clone(),
            created_at: self.time_source.now(),
            amended_at: None,
            amended_by_actor_id: None,
        };
        let rows = self.projector.project(&entry)?;

        let entry_key = KeyPrefix::entry_key(office, entry.year(), entry.pool, yearly_seq);
        if tx.get(&entry_key)?.is_some() {
            return Err(StorageError::Corruption {
                message: format!(
                    "register number {}/{}/{} already taken while counter said free",
                    entry.year(),
                    entry.pool.tag(),
                    yearly_seq
                ),
            }
            .into());
        }

        tx.put(&entry_key, &self.serializer.serialize_entry(&entry)?)?;
        tx.put(&KeyPrefix::id_key(office, &entry.id), &entry_key)?;
        for row in &rows {
            let key =
                KeyPrefix::index_key(office, row.year(), row.pool, row.yearly_seq, row.id.position);
            tx.put(&key, &self.serializer.serialize_index(row)?)?;
        }
        tx.commit()?;

        Ok((entry, rows.len()))
    }

    /// Run `op` until it succeeds, fails permanently, or the retry budget
    /// runs out. `op` receives the 1-based attempt number and must start a
    /// fresh transaction each time. `scope` names what the last failed
    /// attempt was waiting on and is asked after each failure.
    pub(crate) fn with_retry<T, S, F>(&self, scope: S, mut op: F) -> Result<T, RegisterError>
    where
        S: Fn() -> String,
        F: FnMut(u32) -> Result<T, RegisterError>,
    {
        let policy = &self.config.retry;
        let mut rng = rand::thread_rng();
        let mut attempt = 1;

        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    let scope = scope();
                    if attempt >= policy.max_attempts {
                        record_contention_failure();
                        tracing::error!(
                            office = %self.config.office_id,
                            scope = %scope,
                            attempts = attempt,
                            error = %e,
                            "[register] retry budget exhausted"
                        );
                        return Err(RegisterError::Contention {
                            scope,
                            attempts: attempt,
                        });
                    }

                    let delay = policy.backoff(attempt, &mut rng);
                    record_allocation_retry();
                    tracing::warn!(
                        office = %self.config.office_id,
                        scope = %scope,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "[register] transient conflict, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

//! In-memory collaborator implementations backing the server binary and the
//! test suites. A single mutex per store keeps the capacity-guarded write
//! atomic with respect to concurrent round moves.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use super::domain::{
    ApplicationId, ApplicationRecord, CandidateId, JobId, JobPosting, LearningRecord,
};
use super::repository::{
    ApplicationStore, CandidateDirectory, HiringNotifier, HiringUpdate, JobStore,
    NotificationError, RoundCapacityGuard, StoreError,
};

#[derive(Default)]
pub struct MemoryApplicationStore {
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl MemoryApplicationStore {
    /// Snapshot of every stored record, for demos and assertions.
    pub fn all(&self) -> Vec<ApplicationRecord> {
        let guard = self.records.lock().expect("application store poisoned");
        guard.values().cloned().collect()
    }
}

impl ApplicationStore for MemoryApplicationStore {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, StoreError> {
        let mut guard = self.records.lock().expect("application store poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.application_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("application store poisoned");
        if !guard.contains_key(&record.application_id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, StoreError> {
        let guard = self.records.lock().expect("application store poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_with_capacity(
        &self,
        record: ApplicationRecord,
        capacity: RoundCapacityGuard,
    ) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("application store poisoned");

        let occupants = guard
            .values()
            .filter(|other| {
                other.application_id != record.application_id
                    && other.job_id == capacity.job_id
                    && other.status.is_active()
                    && other.current_round_index() == Some(capacity.round_index)
            })
            .count();

        if occupants as u32 >= capacity.capacity {
            return Err(StoreError::CapacityExceeded {
                round_index: capacity.round_index,
                capacity: capacity.capacity,
            });
        }

        guard.insert(record.application_id.clone(), record);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, JobPosting>>,
}

impl MemoryJobStore {
    pub fn put(&self, job: JobPosting) {
        let mut guard = self.jobs.lock().expect("job store poisoned");
        guard.insert(job.job_id.clone(), job);
    }
}

impl JobStore for MemoryJobStore {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, StoreError> {
        let guard = self.jobs.lock().expect("job store poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryCandidateDirectory {
    records: Mutex<HashMap<CandidateId, LearningRecord>>,
}

impl MemoryCandidateDirectory {
    pub fn put(&self, id: CandidateId, record: LearningRecord) {
        let mut guard = self.records.lock().expect("candidate directory poisoned");
        guard.insert(id, record);
    }
}

impl CandidateDirectory for MemoryCandidateDirectory {
    fn learning_record(&self, id: &CandidateId) -> LearningRecord {
        let guard = self.records.lock().expect("candidate directory poisoned");
        guard.get(id).cloned().unwrap_or_default()
    }
}

/// Default notifier: logs the update instead of sending mail. Real e-mail
/// delivery lives in an external adapter behind the same trait.
#[derive(Default)]
pub struct LoggingNotifier;

impl HiringNotifier for LoggingNotifier {
    fn send_update(&self, update: HiringUpdate) -> Result<(), NotificationError> {
        info!(
            to = %update.to,
            template = %update.template,
            subject = %update.subject,
            "hiring update dispatched"
        );
        Ok(())
    }
}

//! In-memory registry repository.
//!
//! Records live in an arena where every parent slot owns the identifiers of
//! its children. Deletes walk those owned collections, so a cascade never
//! has to scan unrelated records.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::registry::{
    domain::{
        AlgorithmId, AlgorithmStatusId, CascadeSummary, Endpoint, EndpointId, MlAlgorithm,
        MlAlgorithmStatus, MlRequest, RecordRef, RequestId,
    },
    ports::{AlgorithmFilter, RegistryError, RegistryRepository, RegistryResult},
};

/// Thread-safe in-memory registry repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    state: Arc<RwLock<RegistryArena>>,
}

#[derive(Debug, Default)]
struct RegistryArena {
    endpoints: HashMap<EndpointId, EndpointSlot>,
    algorithms: HashMap<AlgorithmId, AlgorithmSlot>,
    statuses: HashMap<AlgorithmStatusId, MlAlgorithmStatus>,
    requests: HashMap<RequestId, MlRequest>,
}

#[derive(Debug)]
struct EndpointSlot {
    record: Endpoint,
    algorithms: BTreeSet<AlgorithmId>,
}

#[derive(Debug)]
struct AlgorithmSlot {
    record: MlAlgorithm,
    statuses: BTreeSet<AlgorithmStatusId>,
    requests: BTreeSet<RequestId>,
}

impl InMemoryRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RegistryResult<RwLockReadGuard<'_, RegistryArena>> {
        self.state
            .read()
            .map_err(|err| RegistryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> RegistryResult<RwLockWriteGuard<'_, RegistryArena>> {
        self.state
            .write()
            .map_err(|err| RegistryError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl RegistryArena {
    fn remove_algorithm(&mut self, id: AlgorithmId) -> Option<(EndpointId, CascadeSummary)> {
        let slot = self.algorithms.remove(&id)?;
        let mut summary = CascadeSummary {
            algorithms: 1,
            ..CascadeSummary::default()
        };
        for status_id in &slot.statuses {
            if self.statuses.remove(status_id).is_some() {
                summary.statuses += 1;
            }
        }
        for request_id in &slot.requests {
            if self.requests.remove(request_id).is_some() {
                summary.requests += 1;
            }
        }
        Some((slot.record.parent_endpoint(), summary))
    }

    fn algorithm_slot_mut(&mut self, id: AlgorithmId) -> RegistryResult<&mut AlgorithmSlot> {
        self.algorithms
            .get_mut(&id)
            .ok_or(RegistryError::MissingParent(RecordRef::Algorithm(id)))
    }
}

fn sorted_by_creation<T, K: Ord>(mut records: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    records.sort_by_key(key);
    records
}

#[async_trait]
impl RegistryRepository for InMemoryRegistry {
    async fn insert_endpoint(&self, endpoint: &Endpoint) -> RegistryResult<()> {
        let mut state = self.write()?;
        if state.endpoints.contains_key(&endpoint.id()) {
            return Err(RegistryError::Duplicate(endpoint.id().into()));
        }
        state.endpoints.insert(
            endpoint.id(),
            EndpointSlot {
                record: endpoint.clone(),
                algorithms: BTreeSet::new(),
            },
        );
        Ok(())
    }

    async fn find_endpoint(&self, id: EndpointId) -> RegistryResult<Option<Endpoint>> {
        let state = self.read()?;
        Ok(state.endpoints.get(&id).map(|slot| slot.record.clone()))
    }

    async fn list_endpoints(&self) -> RegistryResult<Vec<Endpoint>> {
        let state = self.read()?;
        let endpoints = state
            .endpoints
            .values()
            .map(|slot| slot.record.clone())
            .collect();
        Ok(sorted_by_creation(endpoints, |e: &Endpoint| {
            (e.created_at(), e.id())
        }))
    }

    async fn delete_endpoint(&self, id: EndpointId) -> RegistryResult<CascadeSummary> {
        let mut state = self.write()?;
        let slot = state
            .endpoints
            .remove(&id)
            .ok_or(RegistryError::NotFound(RecordRef::Endpoint(id)))?;

        let mut summary = CascadeSummary {
            endpoints: 1,
            ..CascadeSummary::default()
        };
        for algorithm_id in slot.algorithms {
            if let Some((_, removed)) = state.remove_algorithm(algorithm_id) {
                summary += removed;
            }
        }
        Ok(summary)
    }

    async fn insert_algorithm(&self, algorithm: &MlAlgorithm) -> RegistryResult<()> {
        let mut state = self.write()?;
        if state.algorithms.contains_key(&algorithm.id()) {
            return Err(RegistryError::Duplicate(algorithm.id().into()));
        }

        let parent = algorithm.parent_endpoint();
        state
            .endpoints
            .get_mut(&parent)
            .ok_or(RegistryError::MissingParent(RecordRef::Endpoint(parent)))?
            .algorithms
            .insert(algorithm.id());
        state.algorithms.insert(
            algorithm.id(),
            AlgorithmSlot {
                record: algorithm.clone(),
                statuses: BTreeSet::new(),
                requests: BTreeSet::new(),
            },
        );
        Ok(())
    }

    async fn find_algorithm(&self, id: AlgorithmId) -> RegistryResult<Option<MlAlgorithm>> {
        let state = self.read()?;
        Ok(state.algorithms.get(&id).map(|slot| slot.record.clone()))
    }

    async fn list_algorithms(
        &self,
        filter: &AlgorithmFilter,
    ) -> RegistryResult<Vec<MlAlgorithm>> {
        let state = self.read()?;
        let algorithms = match filter.parent_endpoint() {
            Some(endpoint) => state
                .endpoints
                .get(&endpoint)
                .map(|slot| {
                    slot.algorithms
                        .iter()
                        .filter_map(|id| state.algorithms.get(id))
                        .map(|slot| slot.record.clone())
                        .filter(|algorithm| filter.matches(algorithm))
                        .collect()
                })
                .unwrap_or_default(),
            None => state
                .algorithms
                .values()
                .map(|slot| slot.record.clone())
                .filter(|algorithm| filter.matches(algorithm))
                .collect(),
        };
        Ok(sorted_by_creation(algorithms, |a: &MlAlgorithm| {
            (a.created_at(), a.id())
        }))
    }

    async fn delete_algorithm(&self, id: AlgorithmId) -> RegistryResult<CascadeSummary> {
        let mut state = self.write()?;
        let (parent, summary) = state
            .remove_algorithm(id)
            .ok_or(RegistryError::NotFound(RecordRef::Algorithm(id)))?;
        if let Some(endpoint) = state.endpoints.get_mut(&parent) {
            endpoint.algorithms.remove(&id);
        }
        Ok(summary)
    }

    async fn insert_status(&self, status: &MlAlgorithmStatus) -> RegistryResult<()> {
        let mut guard = self.write()?;
        let state = &mut *guard;
        if state.statuses.contains_key(&status.id()) {
            return Err(RegistryError::Duplicate(status.id().into()));
        }

        let parent = status.parent_mlalgorithm();
        let slot = state
            .algorithms
            .get_mut(&parent)
            .ok_or(RegistryError::MissingParent(RecordRef::Algorithm(parent)))?;
        slot.statuses.insert(status.id());
        if status.is_active() {
            for sibling_id in &slot.statuses {
                if let Some(sibling) = state.statuses.get_mut(sibling_id) {
                    sibling.deactivate();
                }
            }
        }
        state.statuses.insert(status.id(), status.clone());
        Ok(())
    }

    async fn find_status(
        &self,
        id: AlgorithmStatusId,
    ) -> RegistryResult<Option<MlAlgorithmStatus>> {
        let state = self.read()?;
        Ok(state.statuses.get(&id).cloned())
    }

    async fn list_statuses(
        &self,
        algorithm: AlgorithmId,
    ) -> RegistryResult<Vec<MlAlgorithmStatus>> {
        let state = self.read()?;
        let statuses = state
            .algorithms
            .get(&algorithm)
            .map(|slot| {
                slot.statuses
                    .iter()
                    .filter_map(|id| state.statuses.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(sorted_by_creation(statuses, |s: &MlAlgorithmStatus| {
            (s.created_at(), s.id())
        }))
    }

    async fn delete_status(&self, id: AlgorithmStatusId) -> RegistryResult<CascadeSummary> {
        let mut state = self.write()?;
        let status = state
            .statuses
            .remove(&id)
            .ok_or(RegistryError::NotFound(RecordRef::AlgorithmStatus(id)))?;
        if let Some(slot) = state.algorithms.get_mut(&status.parent_mlalgorithm()) {
            slot.statuses.remove(&id);
        }
        Ok(CascadeSummary {
            statuses: 1,
            ..CascadeSummary::default()
        })
    }

    async fn insert_request(&self, request: &MlRequest) -> RegistryResult<()> {
        let mut state = self.write()?;
        if state.requests.contains_key(&request.id()) {
            return Err(RegistryError::Duplicate(request.id().into()));
        }

        state
            .algorithm_slot_mut(request.parent_mlalgorithm())?
            .requests
            .insert(request.id());
        state.requests.insert(request.id(), request.clone());
        Ok(())
    }

    async fn update_request(&self, request: &MlRequest) -> RegistryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .requests
            .get_mut(&request.id())
            .ok_or(RegistryError::NotFound(RecordRef::Request(request.id())))?;
        match request.feedback() {
            Some(feedback) => stored.record_feedback(feedback.clone()),
            None => stored.clear_feedback(),
        }
        Ok(())
    }

    async fn find_request(&self, id: RequestId) -> RegistryResult<Option<MlRequest>> {
        let state = self.read()?;
        Ok(state.requests.get(&id).cloned())
    }

    async fn list_requests(&self, algorithm: AlgorithmId) -> RegistryResult<Vec<MlRequest>> {
        let state = self.read()?;
        let requests = state
            .algorithms
            .get(&algorithm)
            .map(|slot| {
                slot.requests
                    .iter()
                    .filter_map(|id| state.requests.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(sorted_by_creation(requests, |r: &MlRequest| {
            (r.created_at(), r.id())
        }))
    }

    async fn delete_request(&self, id: RequestId) -> RegistryResult<CascadeSummary> {
        let mut state = self.write()?;
        let request = state
            .requests
            .remove(&id)
            .ok_or(RegistryError::NotFound(RecordRef::Request(id)))?;
        if let Some(slot) = state.algorithms.get_mut(&request.parent_mlalgorithm()) {
            slot.requests.remove(&id);
        }
        Ok(CascadeSummary {
            requests: 1,
            ..CascadeSummary::default()
        })
    }
}

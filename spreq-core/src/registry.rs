//! Endpoint registry with round-robin send selection.
//!
//! - Owns every attached endpoint (`Arc<dyn Endpoint>`)
//! - `next()` rotates through live endpoints
//! - "Ghost" ids left in the rotation list are dropped when encountered

use std::sync::Arc;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::endpoint::{Endpoint, EndpointId};
use crate::error::{Result, SpError};

/// Attached endpoints plus the rotation used for send selection.
#[derive(Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<EndpointId, Arc<dyn Endpoint>>,

    // rotation list; may briefly hold ids that were removed
    rr_list: SmallVec<[EndpointId; 8]>,
    rr_cursor: usize,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint and append it to the rotation.
    ///
    /// # Errors
    ///
    /// [`SpError::DuplicateEndpoint`] if the id is already attached.
    pub fn add(&mut self, endpoint: Arc<dyn Endpoint>) -> Result<()> {
        let id = endpoint.id();
        if self.endpoints.contains_key(&id) {
            return Err(SpError::DuplicateEndpoint(id.get()));
        }
        self.rr_list.push(id);
        self.endpoints.insert(id, endpoint);
        Ok(())
    }

    /// Remove an endpoint, returning it if it was attached.
    pub fn remove(&mut self, id: EndpointId) -> Option<Arc<dyn Endpoint>> {
        let removed = self.endpoints.remove(&id)?;

        // O(N), but churn is not hot-path.
        if let Some(pos) = self.rr_list.iter().position(|x| *x == id) {
            self.unlink(pos);
        }
        Some(removed)
    }

    /// Drop a rotation slot, keeping the cursor on the same successor.
    fn unlink(&mut self, pos: usize) {
        self.rr_list.remove(pos);
        if pos < self.rr_cursor {
            self.rr_cursor -= 1;
        }
        if self.rr_cursor >= self.rr_list.len() {
            self.rr_cursor = 0;
        }
    }

    /// Look up an attached endpoint.
    pub fn get(&self, id: EndpointId) -> Option<&Arc<dyn Endpoint>> {
        self.endpoints.get(&id)
    }

    /// Self-healing round-robin selection.
    ///
    /// Returns the next live endpoint, repairing stale rotation entries.
    pub fn next(&mut self) -> Option<Arc<dyn Endpoint>> {
        let mut attempts = 0usize;
        let max_attempts = self.rr_list.len();

        while !self.rr_list.is_empty() && attempts <= max_attempts {
            if self.rr_cursor >= self.rr_list.len() {
                self.rr_cursor = 0;
            }

            let id = self.rr_list[self.rr_cursor];
            self.rr_cursor = (self.rr_cursor + 1) % self.rr_list.len();

            if let Some(ep) = self.endpoints.get(&id) {
                return Some(Arc::clone(ep));
            }

            // stale entry => repair
            if let Some(pos) = self.rr_list.iter().position(|x| *x == id) {
                self.unlink(pos);
            }
            attempts += 1;
        }

        None
    }

    /// Ids of all attached endpoints, in rotation order.
    pub fn ids(&self) -> Vec<EndpointId> {
        self.rr_list
            .iter()
            .copied()
            .filter(|id| self.endpoints.contains_key(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Drop every endpoint.
    pub fn clear(&mut self) {
        self.endpoints.clear();
        self.rr_list.clear();
        self.rr_cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe;
    use crate::protocol::ProtocolId;

    fn endpoint() -> (Arc<dyn Endpoint>, pipe::PipeRemote) {
        let (ep, remote) = pipe::pair(ProtocolId::Rep.number(), 4);
        (Arc::new(ep), remote)
    }

    #[test]
    fn test_round_robin_rotation() {
        let mut reg = EndpointRegistry::new();
        let (a, _ra) = endpoint();
        let (b, _rb) = endpoint();
        let (a_id, b_id) = (a.id(), b.id());
        reg.add(a).unwrap();
        reg.add(b).unwrap();

        assert_eq!(reg.next().unwrap().id(), a_id);
        assert_eq!(reg.next().unwrap().id(), b_id);
        assert_eq!(reg.next().unwrap().id(), a_id);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut reg = EndpointRegistry::new();
        let (a, _ra) = endpoint();
        reg.add(Arc::clone(&a)).unwrap();

        let err = reg.add(a).unwrap_err();
        assert!(matches!(err, SpError::DuplicateEndpoint(_)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_remove_skips_endpoint() {
        let mut reg = EndpointRegistry::new();
        let (a, _ra) = endpoint();
        let (b, _rb) = endpoint();
        let (a_id, b_id) = (a.id(), b.id());
        reg.add(a).unwrap();
        reg.add(b).unwrap();

        assert!(reg.remove(a_id).is_some());
        assert!(reg.remove(a_id).is_none());
        assert_eq!(reg.next().unwrap().id(), b_id);
        assert_eq!(reg.next().unwrap().id(), b_id);
        assert_eq!(reg.ids(), vec![b_id]);
    }

    #[test]
    fn test_empty_registry_yields_none() {
        let mut reg = EndpointRegistry::new();
        assert!(reg.next().is_none());
        assert!(reg.is_empty());

        let (a, _ra) = endpoint();
        reg.add(a).unwrap();
        reg.clear();
        assert!(reg.next().is_none());
    }

    #[test]
    fn test_remove_before_cursor_keeps_rotation() {
        let mut reg = EndpointRegistry::new();
        let (a, _ra) = endpoint();
        let (b, _rb) = endpoint();
        let (c, _rc) = endpoint();
        let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());
        reg.add(a).unwrap();
        reg.add(b).unwrap();
        reg.add(c).unwrap();

        assert_eq!(reg.next().unwrap().id(), a_id);
        reg.remove(a_id).unwrap();

        // b is still due next; nothing is skipped.
        assert_eq!(reg.next().unwrap().id(), b_id);
        assert_eq!(reg.next().unwrap().id(), c_id);
        assert_eq!(reg.next().unwrap().id(), b_id);
    }

    #[test]
    fn test_remove_after_cursor_keeps_rotation() {
        let mut reg = EndpointRegistry::new();
        let (a, _ra) = endpoint();
        let (b, _rb) = endpoint();
        let (c, _rc) = endpoint();
        let (a_id, c_id) = (a.id(), c.id());
        let b_id = b.id();
        reg.add(a).unwrap();
        reg.add(b).unwrap();
        reg.add(c).unwrap();

        assert_eq!(reg.next().unwrap().id(), a_id);
        reg.remove(c_id).unwrap();

        assert_eq!(reg.next().unwrap().id(), b_id);
        assert_eq!(reg.next().unwrap().id(), a_id);
    }
}

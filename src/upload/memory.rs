use crate::{
    errors::StoreError,
    upload::store::{AssetStore, Part},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// A store operation, as recorded by [`MemoryStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Lookup { key: String },
    Single { name: String, size: usize },
    Start { name: String },
    Part { upload_id: String, number: u32, size: usize },
    Complete { upload_id: String, parts: usize },
}

/// Operations that can be made to fail on purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Single,
    Start,
    Part,
    Complete,
}

struct Upload {
    name: String,
    keys: Vec<String>,
    parts: BTreeMap<u32, (String, Vec<u8>)>,
}

#[derive(Default)]
struct State {
    objects: HashMap<String, Vec<u8>>,
    keys: HashMap<String, String>,
    uploads: HashMap<String, Upload>,
    calls: Vec<Call>,
    failing: HashSet<Phase>,
    counter: u64,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn store_object(&mut self, name: &str, data: Vec<u8>, keys: &[String]) -> String {
        let url = format!("memory://objects/{}/{}", self.next_id(), name);
        for key in keys {
            self.keys.insert(key.clone(), url.clone());
        }
        self.objects.insert(url.clone(), data);
        url
    }

    fn check(&self, phase: Phase) -> Result<(), StoreError> {
        if self.failing.contains(&phase) {
            return Err(StoreError::Rejected(format!("{phase:?} is configured to fail")));
        }
        Ok(())
    }
}

/// In-process asset store. It keeps every object in memory and records each call, which makes it
/// the collaborator of choice for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an existing object under `key`.
    pub fn preload(&self, key: &str, url: &str) {
        self.state().keys.insert(key.to_string(), url.to_string());
    }

    pub fn fail_on(&self, phase: Phase) {
        self.state().failing.insert(phase);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn object(&self, url: &str) -> Option<Vec<u8>> {
        self.state().objects.get(url).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.state().objects.len()
    }

    pub fn lookups(&self) -> usize {
        self.count(|call| matches!(call, Call::Lookup { .. }))
    }

    pub fn single_uploads(&self) -> usize {
        self.count(|call| matches!(call, Call::Single { .. }))
    }

    pub fn parts_uploaded(&self) -> usize {
        self.count(|call| matches!(call, Call::Part { .. }))
    }

    pub fn completed_uploads(&self) -> usize {
        self.count(|call| matches!(call, Call::Complete { .. }))
    }

    /// Bytes received by single and part uploads.
    pub fn bytes_received(&self) -> usize {
        self.state()
            .calls
            .iter()
            .map(|call| match call {
                Call::Single { size, .. } | Call::Part { size, .. } => *size,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, filter: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|call| filter(call)).count()
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn lookup(&self, key: &str) -> Result<String, StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Lookup {
            key: key.to_string(),
        });
        state.keys.get(key).cloned().ok_or(StoreError::NotFound)
    }

    async fn upload_single(
        &self,
        name: &str,
        data: Vec<u8>,
        keys: &[String],
    ) -> Result<String, StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Single {
            name: name.to_string(),
            size: data.len(),
        });
        state.check(Phase::Single)?;
        Ok(state.store_object(name, data, keys))
    }

    async fn start_multipart(
        &self,
        name: &str,
        _content_type: &str,
        keys: &[String],
    ) -> Result<String, StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Start {
            name: name.to_string(),
        });
        state.check(Phase::Start)?;

        let upload_id = format!("upload-{}", state.next_id());
        state.uploads.insert(
            upload_id.clone(),
            Upload {
                name: name.to_string(),
                keys: keys.to_vec(),
                parts: BTreeMap::new(),
            },
        );
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        upload_id: &str,
        number: u32,
        data: Vec<u8>,
    ) -> Result<String, StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Part {
            upload_id: upload_id.to_string(),
            number,
            size: data.len(),
        });
        state.check(Phase::Part)?;

        let token = format!("{upload_id}/{number}/{}", data.len());
        let upload = state
            .uploads
            .get_mut(upload_id)
            .ok_or_else(|| StoreError::UnknownUpload(upload_id.to_string()))?;
        upload.parts.insert(number, (token.clone(), data));
        Ok(token)
    }

    async fn complete_multipart(
        &self,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<String, StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Complete {
            upload_id: upload_id.to_string(),
            parts: parts.len(),
        });
        state.check(Phase::Complete)?;

        let upload = state
            .uploads
            .remove(upload_id)
            .ok_or_else(|| StoreError::UnknownUpload(upload_id.to_string()))?;

        let mut data = Vec::new();
        for part in parts {
            match upload.parts.get(&part.number) {
                Some((token, chunk)) if *token == part.token => data.extend_from_slice(chunk),
                _ => return Err(StoreError::PartMismatch(part.number)),
            }
        }

        Ok(state.store_object(&upload.name, data, &upload.keys))
    }
}

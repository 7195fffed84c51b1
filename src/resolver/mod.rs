//! Registry mapping schema ids, curies, qnames and mixins to message schemas.
//!
//! Bindings are keyed by curie-major (`vendor:package:category:message:vN`),
//! though any string key works. A binding is either a schema registered up
//! front or a deferred loader, run at most once no matter how many callers
//! race on it. A failed load is not remembered, so the next caller retries.

pub mod manifest;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::OnceCell;

use crate::constants::WILDCARD_VENDOR;
use crate::error::{MessageError, MessageResult};
use crate::schema::{Schema, SchemaCurie, SchemaId, SchemaQName};

pub use manifest::{ManifestResolver, StaticManifest};

/// Produces a schema on first use.
pub type SchemaLoader =
    Arc<dyn Fn() -> BoxFuture<'static, MessageResult<Arc<Schema>>> + Send + Sync>;

static GLOBAL: Lazy<Arc<MessageResolver>> = Lazy::new(|| Arc::new(MessageResolver::new()));

struct Binding {
    loader: Option<SchemaLoader>,
    cell: OnceCell<Arc<Schema>>,
}

impl Binding {
    fn bound(schema: Arc<Schema>) -> Self {
        Self {
            loader: None,
            cell: OnceCell::new_with(Some(schema)),
        }
    }

    fn deferred(loader: SchemaLoader) -> Self {
        Self {
            loader: Some(loader),
            cell: OnceCell::new(),
        }
    }

    fn get_now(&self) -> Option<Arc<Schema>> {
        self.cell.get().cloned()
    }

    async fn load(&self, key: &str) -> MessageResult<Arc<Schema>> {
        if let Some(schema) = self.get_now() {
            return Ok(schema);
        }
        let loader = self.loader.as_ref().ok_or_else(|| {
            MessageError::LogicException(format!("Binding [{key}] has neither schema nor loader"))
        })?;
        self.cell.get_or_try_init(|| loader()).await.cloned()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Default)]
pub struct MessageResolver {
    bindings: RwLock<HashMap<String, Arc<Binding>>>,
    /// Requested key -> registered key chosen by the latest-major fallback.
    fallbacks: RwLock<HashMap<String, String>>,
    /// QName -> curie.
    qnames: RwLock<HashMap<String, String>>,
    /// Mixin -> curie-majors, as answered by the manifest.
    mixins: RwLock<HashMap<String, Vec<String>>>,
    default_vendor: RwLock<Option<String>>,
    manifest: RwLock<Option<Arc<dyn ManifestResolver>>>,
}

impl MessageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance used by the default serializers.
    pub fn global() -> Arc<Self> {
        GLOBAL.clone()
    }

    pub fn register(&self, key: &str, schema: Arc<Schema>) {
        debug!("Registering schema [{}] under [{key}]", schema.id());
        self.bind(key, Binding::bound(schema));
    }

    /// Registers a schema under its own curie-major.
    pub fn register_schema(&self, schema: Arc<Schema>) {
        let key = schema.curie_major().to_string();
        self.register(&key, schema);
    }

    /// Registers a loader that runs the first time `key` is resolved.
    pub fn register_deferred<F, Fut>(&self, key: &str, loader: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MessageResult<Arc<Schema>>> + Send + 'static,
    {
        debug!("Registering deferred schema loader under [{key}]");
        let loader: SchemaLoader = Arc::new(move || loader().boxed());
        self.bind(key, Binding::deferred(loader));
    }

    fn bind(&self, key: &str, binding: Binding) {
        write(&self.bindings).insert(key.to_string(), Arc::new(binding));
        write(&self.fallbacks).clear();
        write(&self.qnames).clear();
    }

    pub fn registered_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = read(&self.bindings).keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn set_default_vendor(&self, vendor: Option<&str>) {
        *write(&self.default_vendor) = vendor.map(str::to_string);
        write(&self.fallbacks).clear();
        write(&self.qnames).clear();
    }

    pub fn default_vendor(&self) -> Option<String> {
        read(&self.default_vendor).clone()
    }

    pub fn set_manifest(&self, manifest: Arc<dyn ManifestResolver>) {
        *write(&self.manifest) = Some(manifest);
        write(&self.mixins).clear();
    }

    /// Replaces a leading `*` vendor with the default vendor, when one is set.
    fn substitute_vendor(&self, key: &str) -> String {
        match (key.split_once(':'), self.default_vendor()) {
            (Some((WILDCARD_VENDOR, rest)), Some(vendor)) => format!("{vendor}:{rest}"),
            _ => key.to_string(),
        }
    }

    fn binding(&self, key: &str) -> Option<Arc<Binding>> {
        read(&self.bindings).get(key).cloned()
    }

    /// Registered key with the greatest major for `curie`.
    ///
    /// Majors are compared as numbers, not lexicographically, so `v10` wins
    /// over `v9`.
    fn latest_major_key(&self, curie: &str) -> Option<String> {
        if let Some(key) = read(&self.fallbacks).get(curie) {
            return Some(key.clone());
        }

        let prefix = format!("{curie}:v");
        let latest = read(&self.bindings)
            .keys()
            .filter_map(|key| {
                let major = key.strip_prefix(&prefix)?.parse::<u32>().ok()?;
                Some((major, key.clone()))
            })
            .max_by_key(|(major, _)| *major)
            .map(|(_, key)| key)?;

        debug!("Falling back from [{curie}] to latest major [{latest}]");
        write(&self.fallbacks).insert(curie.to_string(), latest.clone());
        Some(latest)
    }

    /// Candidate keys for an id: curie-major, curie, then the latest major.
    fn keys_for_id(&self, id: &SchemaId) -> Vec<String> {
        let curie = self.substitute_vendor(id.curie().as_str());
        let mut keys = vec![self.substitute_vendor(id.curie_major()), curie.clone()];
        keys.extend(self.latest_major_key(&curie));
        keys
    }

    pub async fn resolve_id(&self, id: &SchemaId) -> MessageResult<Arc<Schema>> {
        for key in self.keys_for_id(id) {
            let Some(binding) = self.binding(&key) else {
                continue;
            };
            return binding.load(&key).await.map_err(|e| {
                warn!("Unable to load schema for [{id}] from [{key}]: {e}");
                MessageError::NoMessageForSchemaId(id.to_string())
            });
        }
        Err(MessageError::NoMessageForSchemaId(id.to_string()))
    }

    /// Like [`resolve_id`](Self::resolve_id) but never runs a loader; deferred
    /// bindings that have not completed yet count as absent.
    pub fn resolve_id_now(&self, id: &SchemaId) -> MessageResult<Arc<Schema>> {
        self.keys_for_id(id)
            .iter()
            .filter_map(|key| self.binding(key))
            .find_map(|binding| binding.get_now())
            .ok_or_else(|| MessageError::NoMessageForSchemaId(id.to_string()))
    }

    /// Resolves a curie (or any registered key), falling back to the latest
    /// registered major of that curie.
    pub async fn resolve_curie(&self, curie: &str) -> MessageResult<Arc<Schema>> {
        let curie = self.substitute_vendor(curie);
        let key = if self.binding(&curie).is_some() {
            Some(curie.clone())
        } else {
            self.latest_major_key(&curie)
        };
        let binding = key
            .as_deref()
            .and_then(|key| self.binding(key))
            .ok_or_else(|| MessageError::NoMessageForCurie(curie.clone()))?;

        binding.load(&curie).await.map_err(|e| {
            warn!("Unable to load schema for curie [{curie}]: {e}");
            MessageError::NoMessageForCurie(curie.clone())
        })
    }

    /// Curie of the registered message matching the qname's vendor and message.
    pub fn find_curie_by_qname(&self, qname: &str) -> MessageResult<String> {
        let qname = self.substitute_vendor(qname);
        if let Some(curie) = read(&self.qnames).get(&qname) {
            return Ok(curie.clone());
        }

        let parsed = SchemaQName::from_string(&qname)
            .map_err(|_| MessageError::NoMessageForQName(qname.clone()))?;
        let curie = self
            .registered_keys()
            .iter()
            .filter_map(|key| curie_of_key(key))
            .find(|curie| {
                curie.vendor() == parsed.vendor() && curie.message() == parsed.message()
            })
            .map(|curie| curie.as_str().to_string())
            .ok_or_else(|| MessageError::NoMessageForQName(qname.clone()))?;

        write(&self.qnames).insert(qname, curie.clone());
        Ok(curie)
    }

    pub async fn resolve_qname(&self, qname: &str) -> MessageResult<Arc<Schema>> {
        let curie = self.find_curie_by_qname(qname)?;
        self.resolve_curie(&curie).await
    }

    /// Every message using `mixin` (an id, curie or curie-major), ordered by id.
    pub async fn find_all_using_mixin(&self, mixin: &str) -> MessageResult<Vec<Arc<Schema>>> {
        let mixin = self.substitute_vendor(mixin);
        let manifest = read(&self.manifest).clone();

        let mut found = match manifest {
            Some(manifest) => {
                let keys = self.manifest_entries(&manifest, &mixin).await?;
                try_join_all(keys.iter().map(|key| self.resolve_curie(key))).await?
            }
            None => self.bound_schemas_using(&mixin),
        };

        if found.is_empty() {
            return Err(MessageError::NoMessageForMixin(mixin));
        }
        found.sort_by(|a, b| a.id().as_str().cmp(b.id().as_str()));
        found.dedup_by(|a, b| Arc::ptr_eq(a, b));
        Ok(found)
    }

    pub async fn find_one_using_mixin(&self, mixin: &str) -> MessageResult<Arc<Schema>> {
        let mut found = self.find_all_using_mixin(mixin).await?;
        if found.len() > 1 {
            return Err(MessageError::MoreThanOneMessageForMixin {
                mixin: mixin.to_string(),
                found: found.iter().map(|s| s.curie_major().to_string()).collect(),
            });
        }
        found
            .pop()
            .ok_or_else(|| MessageError::NoMessageForMixin(mixin.to_string()))
    }

    async fn manifest_entries(
        &self,
        manifest: &Arc<dyn ManifestResolver>,
        mixin: &str,
    ) -> MessageResult<Vec<String>> {
        if let Some(keys) = read(&self.mixins).get(mixin) {
            return Ok(keys.clone());
        }
        let keys = manifest.resolve(mixin).await?;
        debug!("Manifest lists {} message(s) using [{mixin}]", keys.len());
        write(&self.mixins).insert(mixin.to_string(), keys.clone());
        Ok(keys)
    }

    fn bound_schemas_using(&self, mixin: &str) -> Vec<Arc<Schema>> {
        let bindings: Vec<Arc<Binding>> = read(&self.bindings).values().cloned().collect();
        let mut by_id: BTreeMap<String, Arc<Schema>> = BTreeMap::new();
        for schema in bindings.iter().filter_map(|b| b.get_now()) {
            if schema.has_mixin(mixin) {
                by_id.insert(schema.id().to_string(), schema);
            }
        }
        by_id.into_values().collect()
    }
}

fn curie_of_key(key: &str) -> Option<Arc<SchemaCurie>> {
    SchemaCurie::from_curie_major(key)
        .map(|(curie, _)| curie)
        .or_else(|_| SchemaCurie::from_string(key))
        .ok()
}

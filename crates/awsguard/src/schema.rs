//! Resource definitions as seen by the decoration layer
//!
//! This is the small slice of the resource-management engine's model that
//! error decoration needs: the state of one resource instance and the
//! optional lifecycle function slots of a resource type. Concrete resource
//! implementations and the engine itself live elsewhere.

use crate::client::AwsClient;
use crate::error::{Error, Result};
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Create, read, update or delete one resource instance.
pub type CrudFn = Arc<
    dyn for<'a> Fn(&'a mut ResourceData, &'a AwsClient) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync,
>;

/// Check whether a resource instance still exists remotely.
pub type ExistsFn = Arc<
    dyn for<'a> Fn(&'a ResourceData, &'a AwsClient) -> BoxFuture<'a, Result<bool>> + Send + Sync,
>;

/// Expand an import stub into one or more resource states.
pub type ImportStateFn = Arc<
    dyn for<'a> Fn(ResourceData, &'a AwsClient) -> BoxFuture<'a, Result<Vec<ResourceData>>>
        + Send
        + Sync,
>;

/// Resource definitions keyed by resource type name.
pub type ResourceMap = HashMap<String, Resource>;

/// Box a closure as a [`CrudFn`].
///
/// ```rust
/// use awsguard::schema::crud_fn;
/// use futures::FutureExt;
///
/// let create = crud_fn(|d, _client| {
///     async move {
///         d.set_id("vpc-0abc");
///         Ok(())
///     }
///     .boxed()
/// });
/// ```
pub fn crud_fn<F>(f: F) -> CrudFn
where
    F: for<'a> Fn(&'a mut ResourceData, &'a AwsClient) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Box a closure as an [`ExistsFn`].
pub fn exists_fn<F>(f: F) -> ExistsFn
where
    F: for<'a> Fn(&'a ResourceData, &'a AwsClient) -> BoxFuture<'a, Result<bool>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Box a closure as an [`ImportStateFn`].
pub fn import_state_fn<F>(f: F) -> ImportStateFn
where
    F: for<'a> Fn(ResourceData, &'a AwsClient) -> BoxFuture<'a, Result<Vec<ResourceData>>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// State of one resource instance: its remote ID and attribute values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    attributes: BTreeMap<String, Value>,
}

impl ResourceData {
    /// Empty state with no ID.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for an existing remote object.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// Remote ID, if the resource has been created or imported.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set the remote ID.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Forget the remote ID, marking the resource as gone.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Raw attribute value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Attribute value converted to `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.attributes
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(Error::from)
    }

    /// Set an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        self.attributes
            .insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }
}

/// Import support of a resource type.
#[derive(Clone, Default)]
pub struct Importer {
    /// Turns an import stub into full resource states
    pub state: Option<ImportStateFn>,
}

impl fmt::Debug for Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Importer")
            .field("state", &self.state.is_some())
            .finish()
    }
}

/// A resource type definition with up to six lifecycle slots.
#[derive(Clone, Default)]
pub struct Resource {
    /// Create a new remote object
    pub create: Option<CrudFn>,
    /// Refresh state from the remote object
    pub read: Option<CrudFn>,
    /// Apply changed attributes to the remote object
    pub update: Option<CrudFn>,
    /// Remove the remote object
    pub delete: Option<CrudFn>,
    /// Check whether the remote object still exists
    pub exists: Option<ExistsFn>,
    /// Import support
    pub importer: Option<Importer>,
    pub(crate) decorated: bool,
}

impl Resource {
    /// Definition with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the create slot.
    pub fn with_create(mut self, create: CrudFn) -> Self {
        self.create = Some(create);
        self
    }

    /// Set the read slot.
    pub fn with_read(mut self, read: CrudFn) -> Self {
        self.read = Some(read);
        self
    }

    /// Set the update slot.
    pub fn with_update(mut self, update: CrudFn) -> Self {
        self.update = Some(update);
        self
    }

    /// Set the delete slot.
    pub fn with_delete(mut self, delete: CrudFn) -> Self {
        self.delete = Some(delete);
        self
    }

    /// Set the exists slot.
    pub fn with_exists(mut self, exists: ExistsFn) -> Self {
        self.exists = Some(exists);
        self
    }

    /// Set the import-state slot.
    pub fn with_import_state(mut self, state: ImportStateFn) -> Self {
        self.importer = Some(Importer { state: Some(state) });
        self
    }

    /// Whether the lifecycle slots have been wrapped for error decoding.
    pub fn is_decorated(&self) -> bool {
        self.decorated
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("create", &self.create.is_some())
            .field("read", &self.read.is_some())
            .field("update", &self.update.is_some())
            .field("delete", &self.delete.is_some())
            .field("exists", &self.exists.is_some())
            .field("importer", &self.importer)
            .field("decorated", &self.decorated)
            .finish()
    }
}

//! Wrapping of resource lifecycle operations with error decoding
//!
//! Decoration replaces every populated lifecycle slot of a resource with a
//! wrapper that runs the original function and routes any error through the
//! client's authorization message decoder. Successful results pass through
//! untouched and empty slots stay empty.
//!
//! ```rust
//! use awsguard::decorate::make_authz_message_decoding_resources;
//! use awsguard::schema::{Resource, ResourceMap, crud_fn};
//! use futures::FutureExt;
//!
//! let mut resources = ResourceMap::new();
//! resources.insert(
//!     "aws_vpc".to_string(),
//!     Resource::new().with_create(crud_fn(|d, _client| {
//!         async move {
//!             d.set_id("vpc-0abc");
//!             Ok(())
//!         }
//!         .boxed()
//!     })),
//! );
//!
//! let resources = make_authz_message_decoding_resources(resources);
//! assert!(resources["aws_vpc"].is_decorated());
//! ```

use crate::observability::{log_resource_already_decorated, log_resource_decorated};
use crate::schema::{
    CrudFn, ExistsFn, ImportStateFn, Resource, ResourceMap, crud_fn, exists_fn, import_state_fn,
};
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;

/// The kinds of lifecycle operation a resource can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOperation {
    /// Create a remote object
    Create,
    /// Refresh state from the remote object
    Read,
    /// Apply changes to the remote object
    Update,
    /// Remove the remote object
    Delete,
    /// Existence check
    Exists,
    /// Import-state expansion
    ImportState,
}

impl LifecycleOperation {
    /// Every kind, in slot order.
    pub const ALL: [LifecycleOperation; 6] = [
        LifecycleOperation::Create,
        LifecycleOperation::Read,
        LifecycleOperation::Update,
        LifecycleOperation::Delete,
        LifecycleOperation::Exists,
        LifecycleOperation::ImportState,
    ];

    /// Name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleOperation::Create => "create",
            LifecycleOperation::Read => "read",
            LifecycleOperation::Update => "update",
            LifecycleOperation::Delete => "delete",
            LifecycleOperation::Exists => "exists",
            LifecycleOperation::ImportState => "import_state",
        }
    }
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decorate every resource in `resources` in place.
pub fn decorate_all(resources: &mut ResourceMap) {
    for (name, resource) in resources.iter_mut() {
        if resource.is_decorated() {
            log_resource_already_decorated(name);
            continue;
        }

        let wrapped = decorate_resource(resource);
        let operations: Vec<&'static str> =
            wrapped.iter().map(LifecycleOperation::as_str).collect();
        log_resource_decorated(name, &operations);
    }
}

/// Decorate every resource in `resources` and hand the map back.
pub fn make_authz_message_decoding_resources(mut resources: ResourceMap) -> ResourceMap {
    decorate_all(&mut resources);
    resources
}

/// Wrap every populated lifecycle slot of `resource`.
///
/// Returns the operations that were wrapped. A resource that is already
/// decorated is left alone and nothing is returned.
pub fn decorate_resource(resource: &mut Resource) -> Vec<LifecycleOperation> {
    if resource.decorated {
        return Vec::new();
    }

    let mut wrapped = Vec::new();
    for operation in LifecycleOperation::ALL {
        if wrap_slot(resource, operation) {
            wrapped.push(operation);
        }
    }

    resource.decorated = true;
    wrapped
}

fn wrap_slot(resource: &mut Resource, operation: LifecycleOperation) -> bool {
    let slot = match operation {
        LifecycleOperation::Create => &mut resource.create,
        LifecycleOperation::Read => &mut resource.read,
        LifecycleOperation::Update => &mut resource.update,
        LifecycleOperation::Delete => &mut resource.delete,
        LifecycleOperation::Exists => {
            return match resource.exists.take() {
                Some(inner) => {
                    resource.exists = Some(wrap_exists(inner));
                    true
                }
                None => false,
            };
        }
        LifecycleOperation::ImportState => {
            let Some(importer) = resource.importer.as_mut() else {
                return false;
            };
            return match importer.state.take() {
                Some(inner) => {
                    importer.state = Some(wrap_import_state(inner));
                    true
                }
                None => false,
            };
        }
    };

    match slot.take() {
        Some(inner) => {
            *slot = Some(wrap_crud(inner));
            true
        }
        None => false,
    }
}

/// Wrap a create, read, update or delete function.
pub fn wrap_crud(inner: CrudFn) -> CrudFn {
    crud_fn(move |d, client| {
        let inner = Arc::clone(&inner);
        async move {
            let result = inner(d, client).await;
            client.decode_result(result).await
        }
        .boxed()
    })
}

/// Wrap an existence check.
pub fn wrap_exists(inner: ExistsFn) -> ExistsFn {
    exists_fn(move |d, client| {
        let inner = Arc::clone(&inner);
        async move {
            let result = inner(d, client).await;
            client.decode_result(result).await
        }
        .boxed()
    })
}

/// Wrap an import-state function.
pub fn wrap_import_state(inner: ImportStateFn) -> ImportStateFn {
    import_state_fn(move |d, client| {
        let inner = Arc::clone(&inner);
        async move {
            let result = inner(d, client).await;
            client.decode_result(result).await
        }
        .boxed()
    })
}

//! The workspace service's method tables, and the typed wrappers generated from them.
//!
//! The service has gone through two interface revisions:
//!
//! - [`ServiceRevision::Legacy`]: positional parameters (`get_object(id, type, workspace)`), with
//!   `get_object` returning both the object and its metadata.
//! - [`ServiceRevision::Current`]: every method takes a single parameters object and returns a
//!   single value.
//!
//! Both are described by static tables of [`MethodSpec`] rows.  The typed methods on
//! [`WorkspaceClient`] and [`BlockingWorkspaceClient`] are generated from the current table, so
//! adding a method to the service means adding one name below.
use crate::client::{BlockingWorkspaceClient, WorkspaceClient};
use crate::error::*;
use serde::Serialize;
use serde_json::Value;
use wsclient_jsonrpc::ResultArity;

/// Prefix of every fully qualified method name.
pub const SERVICE_NAME: &str = "workspaceService";

/// One row of a service method table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodSpec {
    /// Unqualified method name, e.g. `save_object`
    pub name: &'static str,

    /// Names of the positional parameters, in order
    pub params: &'static [&'static str],

    pub result: ResultArity,
}

impl MethodSpec {
    pub const fn new(
        name: &'static str,
        params: &'static [&'static str],
        result: ResultArity,
    ) -> Self {
        Self {
            name,
            params,
            result,
        }
    }

    /// The name as it appears in the `method` member of a request, e.g.
    /// `workspaceService.save_object`.
    pub fn qualified_name(&self) -> String {
        format!("{SERVICE_NAME}.{}", self.name)
    }

    /// Check that `count` positional arguments is what this method takes.
    pub fn check_arity(&self, count: usize) -> Result<()> {
        if count == self.params.len() {
            Ok(())
        } else {
            Err(WorkspaceError::ArityMismatch {
                method: self.name,
                params: self.params.join(", "),
                expected: self.params.len(),
                actual: count,
            })
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceRevision {
    #[default]
    Current,
    Legacy,
}

impl ServiceRevision {
    pub fn methods(self) -> &'static [MethodSpec] {
        match self {
            ServiceRevision::Current => METHODS,
            ServiceRevision::Legacy => LEGACY_METHODS,
        }
    }

    /// Look up a method by name.  Both `save_object` and `workspaceService.save_object` work.
    pub fn find(self, name: &str) -> Option<&'static MethodSpec> {
        let name = name
            .strip_prefix(SERVICE_NAME)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name);

        self.methods().iter().find(|spec| spec.name == name)
    }

    /// Look up a method and check that it takes `arg_count` arguments.
    pub fn resolve(self, name: &str, arg_count: usize) -> Result<&'static MethodSpec> {
        let spec = self.find(name).ok_or_else(|| WorkspaceError::UnknownMethod {
            name: name.to_string(),
            revision: self,
        })?;
        spec.check_arity(arg_count)?;
        Ok(spec)
    }
}

/// Generate the current method table along with one typed method per row on both clients.
///
/// Every method of the current revision takes exactly one parameters object and returns the
/// first element of the result array.
macro_rules! current_revision {
    ($($name:ident),* $(,)?) => {
        /// Methods of the current service revision.
        pub static METHODS: &[MethodSpec] = &[
            $(MethodSpec::new(stringify!($name), &["params"], ResultArity::Single),)*
        ];

        impl WorkspaceClient {
            $(
                #[doc = concat!("Call `", "workspaceService.", stringify!($name), "`.")]
                pub async fn $name(&self, params: impl Serialize) -> Result<Value> {
                    self.invoke(stringify!($name), params).await
                }
            )*
        }

        impl BlockingWorkspaceClient {
            $(
                #[doc = concat!("Call `", "workspaceService.", stringify!($name), "`, blocking until it completes.")]
                pub fn $name(&self, params: impl Serialize) -> Result<Value> {
                    self.invoke(stringify!($name), params)
                }
            )*
        }
    };
}

/// Generate the legacy method table.  Legacy methods are only reachable by name, through
/// `call_method`.
macro_rules! legacy_revision {
    ($($name:ident($($param:literal),*) -> $arity:ident;)*) => {
        /// Methods of the legacy, positional-parameter service revision.
        pub static LEGACY_METHODS: &[MethodSpec] = &[
            $(MethodSpec::new(stringify!($name), &[$($param),*], ResultArity::$arity),)*
        ];
    };
}

current_revision! {
    load_media_from_bio,
    import_bio,
    import_map,
    save_object,
    delete_object,
    delete_object_permanently,
    get_object,
    get_object_by_ref,
    save_object_by_ref,
    get_objectmeta,
    get_objectmeta_by_ref,
    revert_object,
    copy_object,
    move_object,
    has_object,
    object_history,
    create_workspace,
    get_workspacemeta,
    get_workspacepermissions,
    delete_workspace,
    clone_workspace,
    list_workspaces,
    list_workspace_objects,
    set_global_workspace_permissions,
    set_workspace_permissions,
    get_user_settings,
    set_user_settings,
    queue_job,
    set_job_status,
    get_jobs,
    get_types,
    add_type,
    remove_type,
    patch,
}

legacy_revision! {
    save_object("id", "type", "data", "workspace", "options") -> Single;
    delete_object("id", "type", "workspace") -> Single;
    delete_object_permanently("id", "type", "workspace") -> Single;
    get_object("id", "type", "workspace") -> Multiple;
    get_objectmeta("id", "type", "workspace") -> Single;
    revert_object("id", "type", "workspace") -> Single;
    unrevert_object("id", "type", "workspace", "options") -> Single;
    copy_object("new_id", "new_workspace", "source_id", "type", "source_workspace") -> Single;
    move_object("new_id", "new_workspace", "source_id", "type", "source_workspace") -> Single;
    has_object("id", "type", "workspace") -> Single;
    create_workspace("name", "default_permission") -> Single;
    delete_workspace("name") -> Single;
    clone_workspace("new_workspace", "current_workspace", "default_permission") -> Single;
    list_workspaces() -> Single;
    list_workspace_objects("workspace", "options") -> Single;
    set_global_workspace_permissions("new_permission", "workspace") -> Single;
    set_workspace_permissions("users", "new_permission", "workspace") -> Single;
}

//! Create and delete [`Manifest`] objects through the typed kube API.

use kube::Client;
use kube::api::{Api, DeleteParams, PostParams};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::error::Result;
use crate::manifests::Manifest;

/// Whether a kube error is a 404 from the API server
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(response) if response.code == 404)
}

async fn create<K>(api: Api<K>, obj: &K) -> Result<()>
where
    K: Clone + DeserializeOwned + Serialize + Debug,
{
    api.create(&PostParams::default(), obj).await?;
    Ok(())
}

async fn delete<K>(api: Api<K>, name: &str) -> Result<()>
where
    K: Clone + DeserializeOwned + Debug,
{
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => Ok(()),
        Err(e) if is_not_found(&e) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Create one object, namespaced objects in their own namespace.
pub async fn create_manifest(client: &Client, manifest: &Manifest) -> Result<()> {
    let ns = manifest.namespace().unwrap_or("default");
    let c = client.clone();

    match manifest {
        Manifest::ServiceAccount(o) => create(Api::namespaced(c, ns), o).await?,
        Manifest::Deployment(o) => create(Api::namespaced(c, ns), o).await?,
        Manifest::Service(o) => create(Api::namespaced(c, ns), o).await?,
        Manifest::Role(o) => create(Api::namespaced(c, ns), o).await?,
        Manifest::RoleBinding(o) => create(Api::namespaced(c, ns), o).await?,
        Manifest::Pod(o) => create(Api::namespaced(c, ns), o).await?,
        Manifest::ClusterRole(o) => create(Api::all(c), o).await?,
        Manifest::ClusterRoleBinding(o) => create(Api::all(c), o).await?,
        Manifest::ApiService(o) => create(Api::all(c), o).await?,
    }

    log::info!("Created {}", manifest.identifier());
    Ok(())
}

/// Delete one object. Missing objects count as deleted.
pub async fn delete_manifest(client: &Client, manifest: &Manifest) -> Result<()> {
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::core::v1::{Pod, Service, ServiceAccount};
    use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
    use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::APIService;

    let ns = manifest.namespace().unwrap_or("default");
    let name = manifest.name();
    let c = client.clone();

    match manifest {
        Manifest::ServiceAccount(_) => delete(Api::<ServiceAccount>::namespaced(c, ns), name).await?,
        Manifest::Deployment(_) => delete(Api::<Deployment>::namespaced(c, ns), name).await?,
        Manifest::Service(_) => delete(Api::<Service>::namespaced(c, ns), name).await?,
        Manifest::Role(_) => delete(Api::<Role>::namespaced(c, ns), name).await?,
        Manifest::RoleBinding(_) => delete(Api::<RoleBinding>::namespaced(c, ns), name).await?,
        Manifest::Pod(_) => delete(Api::<Pod>::namespaced(c, ns), name).await?,
        Manifest::ClusterRole(_) => delete(Api::<ClusterRole>::all(c), name).await?,
        Manifest::ClusterRoleBinding(_) => delete(Api::<ClusterRoleBinding>::all(c), name).await?,
        Manifest::ApiService(_) => delete(Api::<APIService>::all(c), name).await?,
    }

    log::info!("Deleted {}", manifest.identifier());
    Ok(())
}

use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef, Subject,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::{ADAPTER_NAME, CUSTOM_METRICS_GROUP, ManifestParams, RBAC_GROUP};

const READ_VERBS: &[&str] = &["list", "get", "watch"];
const AUTH_READER_ROLE: &str = "custom-metrics-authentication-reader";
const AUTH_CONFIG_MAP: &str = "extension-apiserver-authentication";

fn role_ref(kind: &str, name: &str) -> RoleRef {
    RoleRef {
        api_group: RBAC_GROUP.to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
    }
}

fn service_account(name: &str, namespace: &str) -> Subject {
    Subject {
        api_group: Some(String::new()),
        kind: "ServiceAccount".to_string(),
        name: name.to_string(),
        namespace: Some(namespace.to_string()),
    }
}

fn group(name: &str) -> Subject {
    Subject {
        api_group: Some(RBAC_GROUP.to_string()),
        kind: "Group".to_string(),
        name: name.to_string(),
        namespace: None,
    }
}

fn custom_metrics_rule(resources: &[&str]) -> PolicyRule {
    PolicyRule {
        api_groups: Some(vec![CUSTOM_METRICS_GROUP.to_string()]),
        resources: Some(resources.iter().map(|r| r.to_string()).collect()),
        verbs: READ_VERBS.iter().map(|v| v.to_string()).collect(),
        ..Default::default()
    }
}

/// Lets the adapter read the extension-apiserver authentication config.
pub fn extension_auth_reader(params: &ManifestParams) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(AUTH_READER_ROLE.to_string()),
            namespace: Some("kube-system".to_string()),
            ..Default::default()
        },
        role_ref: role_ref("Role", "extension-apiserver-authentication-reader"),
        subjects: Some(vec![
            service_account(ADAPTER_NAME, &params.namespace),
            service_account("default", &params.namespace),
        ]),
    }
}

/// Delegated authn/authz for the adapter. Bound to `cluster-admin` because
/// `system:auth-delegator` alone cannot read the pods the adapter resolves.
pub fn system_auth_delegator(params: &ManifestParams) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some("custom-metrics:system:auth-delegator".to_string()),
            ..Default::default()
        },
        role_ref: role_ref("ClusterRole", "cluster-admin"),
        subjects: Some(vec![
            service_account(ADAPTER_NAME, &params.namespace),
            service_account("default", &params.namespace),
        ]),
    }
}

/// Read access to the authentication ConfigMap, by name only.
pub fn auth_reader_role(params: &ManifestParams) -> Role {
    Role {
        metadata: ObjectMeta {
            name: Some(AUTH_READER_ROLE.to_string()),
            namespace: Some(params.namespace.clone()),
            ..Default::default()
        },
        rules: Some(vec![PolicyRule {
            api_groups: Some(vec![String::new()]),
            resources: Some(vec!["configmaps".to_string()]),
            resource_names: Some(vec![AUTH_CONFIG_MAP.to_string()]),
            verbs: vec!["get".to_string()],
            ..Default::default()
        }]),
    }
}

pub fn auth_reader(params: &ManifestParams) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some("custom-metrics-auth-reader".to_string()),
            namespace: Some(params.namespace.clone()),
            ..Default::default()
        },
        role_ref: role_ref("Role", AUTH_READER_ROLE),
        subjects: Some(vec![
            service_account(ADAPTER_NAME, &params.namespace),
            service_account("default", &params.namespace),
        ]),
    }
}

pub fn metrics_reader_role() -> ClusterRole {
    ClusterRole {
        metadata: ObjectMeta {
            name: Some("custom-metrics-reader".to_string()),
            ..Default::default()
        },
        rules: Some(vec![custom_metrics_rule(&["*"])]),
        ..Default::default()
    }
}

/// Opens the Custom Metrics API to anonymous readers and the default account.
pub fn metrics_reader_binding(params: &ManifestParams) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some("all-metrics-reader".to_string()),
            ..Default::default()
        },
        role_ref: role_ref("ClusterRole", "custom-metrics-reader"),
        subjects: Some(vec![
            group("system:anonymous"),
            group("system:unauthenticated"),
            service_account("default", &params.namespace),
        ]),
    }
}

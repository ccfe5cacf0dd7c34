//! Orchestrator document types (Kubernetes Deployments and Services)

use std::collections::BTreeMap;

use serde::Serialize;

use super::TunnelSpec;

/// A set of orchestrator objects: one workload per service, one exposure
/// per service that declares ports
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorDocument {
    pub name: String,
    pub namespace: Option<String>,
    pub workloads: Vec<Workload>,
    pub exposures: Vec<Exposure>,
    pub tunnels: Vec<TunnelSpec>,
}

impl OrchestratorDocument {
    /// Multi-document YAML stream, each workload followed by its exposure
    pub fn render(&self) -> Result<String, serde_yaml_ng::Error> {
        let mut documents = Vec::with_capacity(self.workloads.len() + self.exposures.len());
        for workload in &self.workloads {
            documents.push(serde_yaml_ng::to_string(workload)?);
            if let Some(exposure) = self
                .exposures
                .iter()
                .find(|e| e.metadata.name == workload.metadata.name)
            {
                documents.push(serde_yaml_ng::to_string(exposure)?);
            }
        }

        let mut out = String::new();
        for doc in documents {
            out.push_str("---\n");
            out.push_str(&doc);
        }
        Ok(out)
    }

    /// Number of port entries across all exposures
    pub fn exposed_port_count(&self) -> usize {
        self.exposures.iter().map(|e| e.spec.ports.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
}

/// `apps/v1 Deployment`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: DeploymentSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentSpec {
    pub replicas: u32,
    pub selector: LabelSelector,
    pub template: PodTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodTemplate {
    pub metadata: TemplateMeta,
    pub spec: PodSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMeta {
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodSpec {
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    pub name: String,
    pub container_port: u16,
    pub protocol: String,
}

/// `v1 Service` - cluster-internal routing for a workload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exposure {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ServiceSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSpec {
    pub selector: BTreeMap<String, String>,
    pub ports: Vec<ServicePortSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortSpec {
    pub name: String,
    pub port: u16,
    pub target_port: u16,
    pub protocol: String,
}

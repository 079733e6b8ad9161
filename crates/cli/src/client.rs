// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client over `orcd`'s admin surface (§6). One method per
//! endpoint in `orc_orchestrator::admin::router`; every response unwraps
//! the `AdminResult<T>` envelope into an `ExitError` on the `Err` arm.

use orc_wire::{
    AddPackVersionRequest, AdminResult, CreatePackRequest, CreateServiceRequest, NodeDetail,
    NodeSummary, PackDetail, PackSummary, PodDetail, PodSummary, ServiceDetail, ServiceSummary,
    UpdateNodeRequest, UpdateServiceRequest,
};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ExitError;

pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl AdminClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url, token }
    }

    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ExitError> {
        let mut req = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        let envelope: AdminResult<T> = resp.json().await?;
        match envelope {
            AdminResult::Ok(value) => Ok(value),
            AdminResult::Err { error } => Err(ExitError::from_api_error(&error)),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ExitError> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ExitError> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ExitError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ExitError> {
        self.request::<(), ()>(Method::DELETE, path, None).await
    }

    pub async fn list_nodes(&self) -> Result<Vec<NodeSummary>, ExitError> {
        self.get("/v1/nodes").await
    }

    pub async fn get_node(&self, id: &str) -> Result<NodeDetail, ExitError> {
        self.get(&format!("/v1/nodes/{id}")).await
    }

    pub async fn cordon_node(&self, id: &str, unschedulable: bool) -> Result<(), ExitError> {
        self.patch(&format!("/v1/nodes/{id}"), &UpdateNodeRequest { unschedulable }).await
    }

    pub async fn delete_node(&self, id: &str) -> Result<(), ExitError> {
        self.delete(&format!("/v1/nodes/{id}")).await
    }

    pub async fn list_services(&self, ns: &str) -> Result<Vec<ServiceSummary>, ExitError> {
        self.get(&format!("/v1/namespaces/{ns}/services")).await
    }

    pub async fn get_service(&self, ns: &str, name: &str) -> Result<ServiceDetail, ExitError> {
        self.get(&format!("/v1/namespaces/{ns}/services/{name}")).await
    }

    pub async fn create_service(&self, ns: &str, req: &CreateServiceRequest) -> Result<ServiceDetail, ExitError> {
        self.post(&format!("/v1/namespaces/{ns}/services"), req).await
    }

    pub async fn update_service(&self, ns: &str, name: &str, req: &UpdateServiceRequest) -> Result<ServiceDetail, ExitError> {
        self.patch(&format!("/v1/namespaces/{ns}/services/{name}"), req).await
    }

    pub async fn delete_service(&self, ns: &str, name: &str) -> Result<(), ExitError> {
        self.delete(&format!("/v1/namespaces/{ns}/services/{name}")).await
    }

    pub async fn list_pods(&self, ns: &str) -> Result<Vec<PodSummary>, ExitError> {
        self.get(&format!("/v1/namespaces/{ns}/pods")).await
    }

    pub async fn get_pod(&self, ns: &str, id: &str) -> Result<PodDetail, ExitError> {
        self.get(&format!("/v1/namespaces/{ns}/pods/{id}")).await
    }

    pub async fn stop_pod(&self, ns: &str, id: &str) -> Result<(), ExitError> {
        self.delete(&format!("/v1/namespaces/{ns}/pods/{id}")).await
    }

    pub async fn list_packs(&self, ns: &str) -> Result<Vec<PackSummary>, ExitError> {
        self.get(&format!("/v1/namespaces/{ns}/packs")).await
    }

    pub async fn get_pack(&self, ns: &str, name: &str) -> Result<PackDetail, ExitError> {
        self.get(&format!("/v1/namespaces/{ns}/packs/{name}")).await
    }

    pub async fn create_pack(&self, ns: &str, req: &CreatePackRequest) -> Result<PackSummary, ExitError> {
        self.post(&format!("/v1/namespaces/{ns}/packs"), req).await
    }

    pub async fn add_pack_version(&self, ns: &str, name: &str, req: &AddPackVersionRequest) -> Result<PackSummary, ExitError> {
        self.post(&format!("/v1/namespaces/{ns}/packs/{name}/versions"), req).await
    }

    pub async fn trigger_reconcile(&self) -> Result<(), ExitError> {
        self.post("/v1/reconcile/trigger", &()).await
    }
}

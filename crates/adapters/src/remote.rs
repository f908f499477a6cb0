// SPDX-License-Identifier: MIT

//! Authenticated HTTP client for the hosted-backend ("cloud") context. In
//! this context the CLI bypasses the local engine entirely and drives
//! spawn/kill/refresh on the server instead.

use layerform_core::{LayerDefinition, LayerInstance, Var};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AdapterError;

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    token: String,
}

#[derive(Debug)]
pub struct RemoteBackendClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RemoteBackendClient {
    /// Authenticate against `POST /v1/auth/signin` and build a client
    /// carrying the returned bearer token.
    #[instrument(skip(base_url, password))]
    pub async fn sign_in(base_url: impl Into<String>, email: &str, password: &str) -> Result<Self, AdapterError> {
        let base_url = base_url.into();
        let client = reqwest::Client::new();
        let url = format!("{}/v1/auth/signin", base_url.trim_end_matches('/'));

        let resp = client
            .post(&url)
            .json(&SignInRequest { email, password })
            .send()
            .await
            .map_err(|source| AdapterError::Http { url: url.clone(), source })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AdapterError::RemoteStatus { status, body });
        }

        let body: SignInResponse =
            resp.json().await.map_err(|source| AdapterError::Http { url, source })?;

        Ok(RemoteBackendClient { client, base_url, token: body.token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AdapterError> {
        let url = self.base_url.clone();
        let resp = builder
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| AdapterError::Http { url, source })?;

        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(AdapterError::RemoteStatus { status, body })
        }
    }

    #[instrument(skip(self))]
    pub async fn list_instances(&self, layer: &str) -> Result<Vec<LayerInstance>, AdapterError> {
        let path = format!("/v1/definitions/{layer}/instances");
        let req = self.client.get(self.url(&path));
        let resp = self.send(req).await?;
        resp.json().await.map_err(|source| AdapterError::Http { url: self.url(&path), source })
    }

    /// All instances across every layer, regardless of depth.
    #[instrument(skip(self))]
    pub async fn list_all_instances(&self) -> Result<Vec<LayerInstance>, AdapterError> {
        let req = self.client.get(self.url("/v1/instances"));
        let resp = self.send(req).await?;
        resp.json().await.map_err(|source| AdapterError::Http { url: self.url("/v1/instances"), source })
    }

    #[instrument(skip(self))]
    pub async fn list_definitions(&self) -> Result<Vec<LayerDefinition>, AdapterError> {
        let req = self.client.get(self.url("/v1/definitions"));
        let resp = self.send(req).await?;
        resp.json().await.map_err(|source| AdapterError::Http { url: self.url("/v1/definitions"), source })
    }

    #[instrument(skip(self, defs), fields(count = defs.len()))]
    pub async fn configure(&self, defs: &[LayerDefinition]) -> Result<(), AdapterError> {
        let req = self.client.post(self.url("/v1/configure")).json(defs);
        self.send(req).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_instance(&self, layer: &str, instance: &str) -> Result<LayerInstance, AdapterError> {
        let path = format!("/v1/definitions/{layer}/instances/{instance}");
        let req = self.client.get(self.url(&path));
        let resp = self.send(req).await?;
        resp.json().await.map_err(|source| AdapterError::Http { url: self.url(&path), source })
    }

    #[instrument(skip(self, vars))]
    pub async fn spawn(&self, layer: &str, instance: &str, vars: &[Var]) -> Result<LayerInstance, AdapterError> {
        let path = format!("/v1/definitions/{layer}/instances/{instance}/spawn");
        let req = self.client.post(self.url(&path)).json(vars);
        let resp = self.send(req).await?;
        resp.json().await.map_err(|source| AdapterError::Http { url: self.url(&path), source })
    }

    #[instrument(skip(self, vars))]
    pub async fn kill(&self, layer: &str, instance: &str, vars: &[Var]) -> Result<(), AdapterError> {
        let path = format!("/v1/definitions/{layer}/instances/{instance}/kill");
        let req = self.client.post(self.url(&path)).json(vars);
        self.send(req).await?;
        Ok(())
    }

    #[instrument(skip(self, vars))]
    pub async fn refresh(&self, layer: &str, instance: &str, vars: &[Var]) -> Result<LayerInstance, AdapterError> {
        let path = format!("/v1/definitions/{layer}/instances/{instance}/refresh");
        let req = self.client.post(self.url(&path)).json(vars);
        let resp = self.send(req).await?;
        resp.json().await.map_err(|source| AdapterError::Http { url: self.url(&path), source })
    }

    #[instrument(skip(self))]
    pub async fn delete_instance(&self, layer: &str, instance: &str) -> Result<(), AdapterError> {
        let path = format!("/v1/definitions/{layer}/instances/{instance}");
        let req = self.client.delete(self.url(&path));
        self.send(req).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_env_vars(&self) -> Result<Vec<Var>, AdapterError> {
        let req = self.client.get(self.url("/v1/env-vars"));
        let resp = self.send(req).await?;
        resp.json().await.map_err(|source| AdapterError::Http { url: self.url("/v1/env-vars"), source })
    }

    #[instrument(skip(self))]
    pub async fn set_env_var(&self, var: &Var) -> Result<(), AdapterError> {
        let req = self.client.post(self.url("/v1/env-vars")).json(var);
        self.send(req).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;

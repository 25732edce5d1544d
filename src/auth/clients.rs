use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail};
use oauth2::{url::Url, CsrfToken, PkceCodeChallenge};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    config::{BackendConfig, Config},
    models::Identity,
    AppResult, GetField,
};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Github,
    Google,
}

impl Provider {
    pub fn id(&self) -> &'static str {
        use Provider::*;
        match self {
            Github => "github",
            Google => "google",
        }
    }

    pub fn label(&self) -> &'static str {
        use Provider::*;
        match self {
            Github => "GitHub",
            Google => "Google",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Provider::Github),
            "google" => Ok(Provider::Google),
            other => bail!("unknown auth provider {other:?}"),
        }
    }
}

#[derive(Clone)]
struct RemoteAuth {
    url: String,
    anon_key: String,
}

/// Talks to the hosted auth service, when there is one.
#[derive(Clone)]
pub struct Clients {
    http: reqwest::Client,
    remote: Option<RemoteAuth>,
    providers: Vec<Provider>,
    site_url: String,
}

impl Clients {
    pub fn new(http: reqwest::Client, config: &Config) -> Clients {
        let remote = match &config.backend {
            BackendConfig::Remote { url, anon_key } => Some(RemoteAuth {
                url: url.trim_end_matches('/').to_owned(),
                anon_key: anon_key.clone(),
            }),
            BackendConfig::Local { .. } => None,
        };

        Clients {
            http,
            remote,
            providers: config.auth_providers.clone(),
            site_url: config.site_url.clone(),
        }
    }

    /// Providers that can actually be used. None without a hosted auth service.
    pub fn providers(&self) -> &[Provider] {
        match self.remote {
            Some(_) => &self.providers,
            None => &[],
        }
    }

    fn remote(&self) -> AppResult<&RemoteAuth> {
        self.remote.as_ref().ok_or("no hosted auth service configured".into())
    }

    pub fn authorize_url(&self, provider: Provider, challenge: &PkceCodeChallenge, csrf_state: &CsrfToken) -> AppResult<Url> {
        let remote = self.remote()?;
        if !self.providers.contains(&provider) {
            return Err(format!("auth provider {provider} is not enabled").into());
        }

        let redirect_to = Url::parse_with_params(
            &format!("{}/auth/callback", self.site_url),
            &[("state", csrf_state.secret())],
        )?;

        Ok(Url::parse_with_params(
            &format!("{}/auth/v1/authorize", remote.url),
            &[
                ("provider", provider.id()),
                ("redirect_to", redirect_to.as_str()),
                ("code_challenge", challenge.as_str()),
                ("code_challenge_method", "s256"),
            ],
        )?)
    }

    /// Trades the authorization code for a session with the auth service.
    pub async fn exchange_code(&self, code: &str, code_verifier: &str) -> AppResult<Identity> {
        let remote = self.remote()?;
        let response = self.http
            .post(format!("{}/auth/v1/token", remote.url))
            .query(&[("grant_type", "pkce")])
            .header("apikey", &remote.anon_key)
            .json(&serde_json::json!({
                "auth_code": code,
                "code_verifier": code_verifier,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("token exchange failed with {status}: {body}").into());
        }

        let body: Value = response.json().await?;
        identity_from_token(&body)
    }

    pub async fn sign_out(&self, identity: &Identity) -> AppResult<()> {
        let (Some(remote), Some(access_token)) = (&self.remote, &identity.access_token) else {
            return Ok(());
        };

        self.http
            .post(format!("{}/auth/v1/logout", remote.url))
            .header("apikey", &remote.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn identity_from_token(body: &Value) -> AppResult<Identity> {
    let access_token = body.get_str_field("access_token")?;
    let user_id = body.get_obj_field("user")?.get_str_field("id")?;
    Ok(Identity {
        user_id: Uuid::parse_str(&user_id)?,
        access_token: Some(access_token),
    })
}

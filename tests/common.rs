// ABOUTME: Shared test utilities for bridge integration tests
// ABOUTME: Scriptable identity provider, counting key store, and test logging setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `discord_oidc_bridge`

use async_trait::async_trait;
use discord_oidc_bridge::exchange::{ExchangeSettings, TokenExchange};
use discord_oidc_bridge::identity::{IdentityProvider, ProviderError};
use discord_oidc_bridge::keys::{
    InMemoryKeyStore, KeyEntry, KeyLifecycleManager, KeyStore, SigningKeyPair,
};
use oidc_bridge_core::errors::{AppError, AppResult};
use oidc_bridge_core::models::{OAuthToken, UserProfile};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock};

pub const CLIENT_ID: &str = "1191642657731121272";
pub const CHECK_GUILD_ID: &str = "683939861539192860";
pub const ISSUER: &str = "https://cloudflare.com";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Token returned by the scripted code exchange
pub fn sample_token() -> OAuthToken {
    OAuthToken {
        access_token: "xxxx".to_owned(),
        token_type: "Bearer".to_owned(),
        expires_in: 604_800,
        refresh_token: "yyyy".to_owned(),
        scope: "identify email".to_owned(),
    }
}

/// Profile used by the scripted provider
pub fn sample_profile(verified: Option<bool>) -> UserProfile {
    UserProfile {
        id: "0123456789".to_owned(),
        username: "TEST".to_owned(),
        discriminator: "0".to_owned(),
        global_name: None,
        verified,
        email: Some("test@example.com".to_owned()),
    }
}

fn mock_error(endpoint: &str, status: u16) -> ProviderError {
    ProviderError::Status {
        provider: "mock",
        endpoint: endpoint.to_owned(),
        status,
        body: "{\"message\": \"rejected\"}".to_owned(),
    }
}

/// Identity provider with scripted answers and call counters
pub struct MockProvider {
    exchange_fails: bool,
    user_fails: bool,
    profile: UserProfile,
    guilds: Vec<String>,
    roles: HashMap<String, Vec<String>>,
    failing_role_guilds: HashSet<String>,
    pub exchange_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    pub guild_calls: AtomicUsize,
    pub role_requests: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(verified: Option<bool>) -> Self {
        Self {
            exchange_fails: false,
            user_fails: false,
            profile: sample_profile(verified),
            guilds: Vec::new(),
            roles: HashMap::new(),
            failing_role_guilds: HashSet::new(),
            exchange_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
            guild_calls: AtomicUsize::new(0),
            role_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn verified() -> Self {
        Self::new(Some(true))
    }

    pub fn failing_exchange(mut self) -> Self {
        self.exchange_fails = true;
        self
    }

    pub fn failing_user(mut self) -> Self {
        self.user_fails = true;
        self
    }

    pub fn with_guilds(mut self, guilds: &[&str]) -> Self {
        self.guilds = guilds.iter().map(|g| (*g).to_owned()).collect();
        self
    }

    pub fn with_roles(mut self, guild_id: &str, roles: &[&str]) -> Self {
        self.roles.insert(
            guild_id.to_owned(),
            roles.iter().map(|r| (*r).to_owned()).collect(),
        );
        self
    }

    pub fn failing_roles(mut self, guild_id: &str) -> Self {
        self.failing_role_guilds.insert(guild_id.to_owned());
        self
    }

    pub fn role_requests(&self) -> Vec<String> {
        let mut requests = self.role_requests.lock().unwrap().clone();
        requests.sort();
        requests
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn exchange_code(&self, _code: &str) -> Result<OAuthToken, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.exchange_fails {
            return Err(mock_error("/oauth2/token", 400));
        }
        Ok(sample_token())
    }

    async fn fetch_user(&self, access_token: &str) -> Result<UserProfile, ProviderError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(access_token, "xxxx");
        if self.user_fails {
            return Err(mock_error("/users/@me", 401));
        }
        Ok(self.profile.clone())
    }

    async fn fetch_guilds(&self, _access_token: &str) -> Result<Vec<String>, ProviderError> {
        self.guild_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.guilds.clone())
    }

    async fn fetch_roles(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        assert_eq!(user_id, "0123456789");
        self.role_requests.lock().unwrap().push(guild_id.to_owned());
        if self.failing_role_guilds.contains(guild_id) {
            return Err(mock_error("/guilds/members", 500));
        }
        Ok(self.roles.get(guild_id).cloned().unwrap_or_default())
    }
}

/// Key store wrapper counting every operation
#[derive(Default)]
pub struct CountingKeyStore {
    inner: InMemoryKeyStore,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
    pub put_if_absents: AtomicUsize,
}

impl CountingKeyStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        Self {
            inner: InMemoryKeyStore::with_entry(shared_entry()),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.puts.load(Ordering::SeqCst) + self.put_if_absents.load(Ordering::SeqCst)
    }

    pub fn touches(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.writes()
    }
}

#[async_trait]
impl KeyStore for CountingKeyStore {
    async fn get(&self) -> AppResult<Option<KeyEntry>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get().await
    }

    async fn put(&self, entry: KeyEntry) -> AppResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(entry).await
    }

    async fn put_if_absent(&self, entry: KeyEntry) -> AppResult<KeyEntry> {
        self.put_if_absents.fetch_add(1, Ordering::SeqCst);
        self.inner.put_if_absent(entry).await
    }
}

/// Key store whose every operation fails
pub struct BrokenKeyStore;

#[async_trait]
impl KeyStore for BrokenKeyStore {
    async fn get(&self) -> AppResult<Option<KeyEntry>> {
        Err(AppError::storage("key store offline"))
    }

    async fn put(&self, _entry: KeyEntry) -> AppResult<()> {
        Err(AppError::storage("key store offline"))
    }

    async fn put_if_absent(&self, _entry: KeyEntry) -> AppResult<KeyEntry> {
        Err(AppError::storage("key store offline"))
    }
}

/// One generated key entry reused across tests in a process
pub fn shared_entry() -> KeyEntry {
    static ENTRY: OnceLock<KeyEntry> = OnceLock::new();
    ENTRY
        .get_or_init(|| {
            SigningKeyPair::generate()
                .and_then(|pair| pair.to_entry())
                .expect("test key generation")
        })
        .clone()
}

pub fn settings(role_guild_ids: &[&str]) -> ExchangeSettings {
    ExchangeSettings {
        issuer: ISSUER.to_owned(),
        audience: CLIENT_ID.to_owned(),
        token_ttl_secs: 3600,
        role_guild_ids: role_guild_ids.iter().map(|g| (*g).to_owned()).collect(),
    }
}

pub fn exchange_with(
    provider: Arc<MockProvider>,
    store: Arc<dyn KeyStore>,
    role_guild_ids: &[&str],
) -> TokenExchange {
    init_test_logging();
    TokenExchange::new(
        provider,
        KeyLifecycleManager::new(store),
        settings(role_guild_ids),
    )
}

//! GitHub contributors for the community page, cached for an hour.

use ev_core::cache::ExpiringCache;
use ev_core::models::Contributor;
use ev_core::traits::HttpTransport;
use futures_util::future::join_all;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;

pub const CONTRIBUTORS_CACHE_KEY: &str = "github_contributors";
const PER_PAGE: u32 = 100;
/// Upper bound on pagination in case the API never returns an empty page.
const MAX_PAGES: u32 = 50;
const DEFAULT_BIO: &str = "Open source contributor";

/// Classifies a contributor from their GitHub activity.
pub fn role_for(contributor: &Contributor, lead: &str) -> &'static str {
    if contributor.login == lead {
        return "Project Lead";
    }
    match (contributor.contributions, contributor.followers) {
        (c, f) if c > 100 && f > 50 => "Core Maintainer",
        (c, _) if c > 20 => "Active Contributor",
        (c, _) if c > 10 => "Regular Contributor",
        _ => "New Contributor",
    }
}

pub struct GithubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    repo: String,
    lead: String,
    token: Option<SecretString>,
    cache: ExpiringCache,
}

impl GithubClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_url: impl Into<String>,
        repo: impl Into<String>,
        lead: impl Into<String>,
        token: Option<SecretString>,
        cache: ExpiringCache,
    ) -> Self {
        Self {
            transport,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            repo: repo.into(),
            lead: lead.into(),
            token,
            cache,
        }
    }

    /// All contributors, most contributions first. Served from cache while
    /// fresh; a failed fetch yields an empty list and is not cached.
    pub async fn contributors(&self) -> Vec<Contributor> {
        if let Some(cached) = self.cache.get::<Vec<Contributor>>(CONTRIBUTORS_CACHE_KEY).await {
            return cached;
        }

        match self.fetch_all().await {
            Ok(list) => {
                if !list.is_empty() {
                    self.cache.set(CONTRIBUTORS_CACHE_KEY, &list).await;
                }
                list
            }
            Err(e) => {
                log::warn!("fetching contributors for {} failed: {e}", self.repo);
                Vec::new()
            }
        }
    }

    async fn fetch_all(&self) -> anyhow::Result<Vec<Contributor>> {
        let mut all: Vec<Contributor> = Vec::new();

        for page in 1..=MAX_PAGES {
            let url = format!(
                "{}/repos/{}/contributors?per_page={PER_PAGE}&page={page}&anon=true",
                self.api_url, self.repo
            );
            let response = self.transport.get(&url, self.auth_headers()).await?;
            let batch = match response.json() {
                Some(Value::Array(items)) if !items.is_empty() => items,
                _ => break,
            };
            all.extend(batch.into_iter().filter_map(|v| serde_json::from_value(v).ok()));
        }

        let profiles = join_all(all.iter().map(|c| self.profile(&c.login))).await;
        for (contributor, profile) in all.iter_mut().zip(profiles) {
            merge_profile(contributor, profile);
            contributor.role = Some(role_for(contributor, &self.lead).to_string());
        }

        all.sort_by(|a, b| b.contributions.cmp(&a.contributions));
        Ok(all)
    }

    /// Profile details for one login; `None` when unavailable.
    async fn profile(&self, login: &str) -> Option<Value> {
        if login.is_empty() {
            return None;
        }
        let url = format!("{}/users/{login}", self.api_url);
        match self.transport.get(&url, self.auth_headers()).await {
            Ok(res) if res.is_success() => res.json(),
            Ok(res) => {
                log::debug!("profile for {login}: HTTP {}", res.status);
                None
            }
            Err(e) => {
                log::debug!("profile for {login}: {e}");
                None
            }
        }
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        self.token
            .as_ref()
            .map(|t| vec![("Authorization".to_string(), format!("token {}", t.expose_secret()))])
            .unwrap_or_default()
    }
}

fn merge_profile(contributor: &mut Contributor, profile: Option<Value>) {
    let profile = profile.unwrap_or(Value::Null);
    let text = |key: &str| profile.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string);
    let count = |key: &str| profile.get(key).and_then(Value::as_u64).unwrap_or(0);

    contributor.followers = count("followers");
    contributor.public_repos = count("public_repos");
    contributor.name = text("name").or_else(|| Some(contributor.login.clone()));
    contributor.bio = text("bio").or_else(|| Some(DEFAULT_BIO.to_string()));
    contributor.company = text("company");
    contributor.location = text("location");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_core::store::MemoryStore;
    use ev_core::traits::{HttpResponse, MockHttpTransport};
    use ev_core::DEFAULT_TTL;

    fn ok(body: &str) -> HttpResponse {
        HttpResponse { status: 200, status_text: "OK".into(), headers: Vec::new(), body: body.into() }
    }

    fn contributor(login: &str, contributions: u64, followers: u64) -> Contributor {
        Contributor { login: login.into(), contributions, followers, ..Default::default() }
    }

    fn client(mock: MockHttpTransport, token: Option<&str>) -> GithubClient {
        let cache = ExpiringCache::new(Arc::new(MemoryStore::new()), DEFAULT_TTL);
        GithubClient::new(
            Arc::new(mock),
            "https://api.github.test/",
            "owner/eventra",
            "lead",
            token.map(|t| SecretString::from(t.to_string())),
            cache,
        )
    }

    #[test]
    fn role_thresholds() {
        assert_eq!(role_for(&contributor("lead", 1, 0), "lead"), "Project Lead");
        assert_eq!(role_for(&contributor("a", 101, 51), "lead"), "Core Maintainer");
        assert_eq!(role_for(&contributor("a", 101, 50), "lead"), "Active Contributor");
        assert_eq!(role_for(&contributor("a", 21, 0), "lead"), "Active Contributor");
        assert_eq!(role_for(&contributor("a", 11, 0), "lead"), "Regular Contributor");
        assert_eq!(role_for(&contributor("a", 10, 0), "lead"), "New Contributor");
    }

    #[tokio::test]
    async fn paginates_enriches_sorts_and_caches() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .withf(|_, headers| headers == &vec![("Authorization".to_string(), "token gh".to_string())])
            .times(4)
            .returning(|url, _| {
                let body = if url.contains("page=1&") {
                    r#"[{"login":"newbie","contributions":3},{"login":"lead","contributions":40}]"#
                } else if url.contains("/contributors") {
                    "[]"
                } else if url.ends_with("/users/lead") {
                    r#"{"name":"The Lead","followers":80,"public_repos":12,"company":null}"#
                } else {
                    return Ok(HttpResponse { status: 404, ..Default::default() });
                };
                Ok(ok(body))
            });

        let gh = client(mock, Some("gh"));
        let list = gh.contributors().await;

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].login, "lead");
        assert_eq!(list[0].role.as_deref(), Some("Project Lead"));
        assert_eq!(list[0].name.as_deref(), Some("The Lead"));
        assert_eq!(list[0].followers, 80);
        assert_eq!(list[1].role.as_deref(), Some("New Contributor"));
        assert_eq!(list[1].name.as_deref(), Some("newbie"));
        assert_eq!(list[1].bio.as_deref(), Some(DEFAULT_BIO));

        // served from cache: the mock allows exactly four calls
        assert_eq!(gh.contributors().await, list);
    }

    #[tokio::test]
    async fn transport_failure_yields_empty_and_is_not_cached() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().times(2).returning(|_, _| Err(anyhow::anyhow!("offline")));

        let gh = client(mock, None);
        assert!(gh.contributors().await.is_empty());
        assert!(gh.contributors().await.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_object_ends_pagination() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .withf(|_, headers| headers.is_empty())
            .times(1)
            .returning(|_, _| Ok(ok(r#"{"message":"API rate limit exceeded"}"#)));

        let gh = client(mock, None);
        assert!(gh.contributors().await.is_empty());
    }
}

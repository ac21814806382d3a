use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{
    auth::RaindropAuth,
    config::ClientConfig,
    error::{RaindropError, Result},
    html,
    http::{self, Endpoint, RequestContext},
    types::{token_preview, *},
};

const ROOT_COLLECTIONS_ENDPOINT: &str = "/rest/v1/collections";
const CHILD_COLLECTIONS_ENDPOINT: &str = "/rest/v1/collections/childrens";
const COLLECTION_ENDPOINT: &str = "/rest/v1/collection";
const RAINDROP_ENDPOINT: &str = "/rest/v1/raindrop";
const RAINDROPS_ENDPOINT: &str = "/rest/v1/raindrops";
const TAGS_ENDPOINT: &str = "/rest/v1/tags";

/// Pseudo-collection id covering every raindrop except trash
pub const ALL_COLLECTIONS: i64 = 0;

/// Title sent when the bookmarked page could not be fetched or has no title
pub const TITLE_PLACEHOLDER: &str = "Failed to get HTML title";

/// Raindrop.io API client.
///
/// Holds the read-only configuration and a pooled `reqwest::Client`, so it can
/// be cloned and shared across tasks. The access token is not stored: every
/// resource call takes it explicitly.
#[derive(Debug, Clone)]
pub struct RaindropClient {
    api_url: Url,
    client: Client,
    auth: RaindropAuth,
}

impl RaindropClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| RaindropError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url: http::parse_base(&config.api_host)?,
            auth: RaindropAuth::new(&config, client.clone())?,
            client,
        })
    }

    pub fn auth(&self) -> &RaindropAuth {
        &self.auth
    }

    // Authentication
    pub fn authorization_url(&self) -> Url {
        self.auth.authorization_url()
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<Credential> {
        self.auth.exchange_code(code, ctx).await
    }

    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<Credential> {
        self.auth.refresh(refresh_token, ctx).await
    }

    // Collection operations
    pub async fn get_root_collections(
        &self,
        access_token: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<ItemsResponse<Collection>> {
        self.call(Method::GET, ROOT_COLLECTIONS_ENDPOINT, &[], None::<&()>, access_token, ctx)
            .await
    }

    pub async fn get_child_collections(
        &self,
        access_token: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<ItemsResponse<Collection>> {
        self.call(Method::GET, CHILD_COLLECTIONS_ENDPOINT, &[], None::<&()>, access_token, ctx)
            .await
    }

    pub async fn get_collection(
        &self,
        access_token: &str,
        id: i64,
        ctx: Option<&RequestContext>,
    ) -> Result<ItemResponse<Collection>> {
        let path = format!("{}/{}", COLLECTION_ENDPOINT, id);
        self.call(Method::GET, &path, &[], None::<&()>, access_token, ctx)
            .await
    }

    pub async fn create_collection(
        &self,
        access_token: &str,
        collection: &NewCollection,
        ctx: Option<&RequestContext>,
    ) -> Result<ItemResponse<Collection>> {
        tracing::debug!(
            "Creating collection '{}' (parent: {:?})",
            collection.title,
            collection.parent_id
        );
        self.call(Method::POST, COLLECTION_ENDPOINT, &[], Some(collection), access_token, ctx)
            .await
    }

    // Raindrop operations

    /// Bookmark `link` in Unsorted.
    ///
    /// The page is fetched first to read its `<title>`. That step is
    /// best-effort: if the page can't be fetched or has no title,
    /// [`TITLE_PLACEHOLDER`] is sent instead. The raindrop carries
    /// `pleaseParse` so the server fills in the rest of the metadata.
    pub async fn create_simple_raindrop(
        &self,
        access_token: &str,
        link: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<ItemResponse<Raindrop>> {
        let page_url = validate_link(link)?;
        if ctx.is_some_and(RequestContext::is_cancelled) {
            return Err(RaindropError::Cancelled);
        }

        let title = match self.fetch_page_title(page_url, ctx).await {
            Some(title) => title,
            None => TITLE_PLACEHOLDER.to_string(),
        };

        let raindrop = Raindrop {
            title,
            please_parse: Some(PleaseParse::default()),
            ..Raindrop::new(link)
        };

        self.call(Method::POST, RAINDROP_ENDPOINT, &[], Some(&raindrop), access_token, ctx)
            .await
    }

    pub async fn get_raindrops(
        &self,
        access_token: &str,
        collection_id: i64,
        per_page: u32,
        ctx: Option<&RequestContext>,
    ) -> Result<ItemsResponse<Raindrop>> {
        let path = format!("{}/{}", RAINDROPS_ENDPOINT, collection_id);
        let query = [("perpage", per_page.to_string())];
        self.call(Method::GET, &path, &query, None::<&()>, access_token, ctx)
            .await
    }

    /// Raindrops in any collection carrying exactly `tag`.
    pub async fn get_tagged_raindrops(
        &self,
        access_token: &str,
        tag: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<ItemsResponse<Raindrop>> {
        let path = format!("{}/{}", RAINDROPS_ENDPOINT, ALL_COLLECTIONS);
        let search = serde_json::to_string(&[SearchFilter::tag(tag)])
            .map_err(RaindropError::Encode)?;
        let query = [("search", search)];
        self.call(Method::GET, &path, &query, None::<&()>, access_token, ctx)
            .await
    }

    // Tag operations
    pub async fn get_tags(
        &self,
        access_token: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<ItemsResponse<Tag>> {
        self.call(Method::GET, TAGS_ENDPOINT, &[], None::<&()>, access_token, ctx)
            .await
    }

    pub async fn delete_tags(
        &self,
        access_token: &str,
        tags: &[String],
        ctx: Option<&RequestContext>,
    ) -> Result<ResultResponse> {
        let body = DeleteTagsRequest { tags };
        self.call(Method::DELETE, TAGS_ENDPOINT, &[], Some(&body), access_token, ctx)
            .await
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        access_token: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = http::build_request(
            &self.client,
            method,
            Endpoint::new(&self.api_url, path).with_query(query),
            body,
            Some(access_token),
            ctx,
        )?;

        tracing::debug!(
            "Making {} request to: {} (token: {})",
            request.method(),
            request.url(),
            token_preview(access_token)
        );

        http::round_trip(&self.client, request, StatusCode::OK, ctx).await
    }

    /// Read `page_url` until its `</title>` shows up or
    /// [`html::TITLE_SCAN_LIMIT`] bytes have arrived, then pull the title out of
    /// what was read. The rest of the body is never downloaded.
    async fn fetch_page_title(&self, page_url: Url, ctx: Option<&RequestContext>) -> Option<String> {
        let mut request = self.client.get(page_url.clone());
        if let Some(timeout) = ctx.and_then(RequestContext::timeout) {
            request = request.timeout(timeout);
        }

        let fetch = http::cancellable(ctx, async {
            let mut response = request.send().await.map_err(RaindropError::Transport)?;
            let mut head: Vec<u8> = Vec::new();
            while let Some(chunk) = response.chunk().await.map_err(RaindropError::Body)? {
                // a closing tag may straddle two chunks
                let scan_from = head.len().saturating_sub(html::TITLE_END_LEN);
                head.extend_from_slice(&chunk);
                if head.len() >= html::TITLE_SCAN_LIMIT
                    || html::contains_title_end(&head[scan_from..])
                {
                    break;
                }
            }
            head.truncate(html::TITLE_SCAN_LIMIT);
            Ok(String::from_utf8_lossy(&head).into_owned())
        })
        .await;

        match fetch {
            Ok(page) => {
                let title = html::extract_title(&page);
                if title.is_none() {
                    tracing::warn!("No <title> found at {}, using placeholder", page_url);
                }
                title
            }
            Err(e) => {
                tracing::warn!("Can't fetch {} for its title, using placeholder: {}", page_url, e);
                None
            }
        }
    }
}

fn validate_link(link: &str) -> Result<Url> {
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(RaindropError::InvalidLink(link.to_string())),
    }
}

//! Google Drive client for the console sample.
//!
//! Provides the OAuth2 authorization-code flow with token persistence,
//! folder resolution by name, resumable (chunked) upload, chunked download,
//! and deletion by file id.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures_util::StreamExt;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::cloud::upload::{
    chunk_spans, format_content_range, run_upload, ChunkOutcome, UploadProgress, UploadTransport,
};
use crate::config::SampleConfig;
use crate::errors::{DriveError, Result};
use crate::http_client::HttpClient;

// ---------------------------------------------------------------------------
// Data models
// ---------------------------------------------------------------------------

/// Metadata for a Google Drive file or folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub size: Option<u64>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(rename = "webViewLink", default)]
    pub web_view_link: Option<String>,
}

/// Response from the Drive files.list API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveFileList {
    pub files: Vec<DriveFile>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

/// Request body for the resumable session initiation: the new file's name,
/// MIME type, and its single parent folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub parents: Vec<String>,
}

/// Persisted OAuth2 token data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Whether the access token is past its recorded expiry.
    /// Tokens without an expiry are treated as still valid.
    pub fn is_expired(&self) -> bool {
        self.expiry.map(|e| e <= Utc::now()).unwrap_or(false)
    }

    /// Read a persisted token from disk, if one exists. Needs no OAuth2
    /// credentials, so callers can inspect token state without a configured
    /// client.
    pub async fn read(path: &Path) -> Result<Option<StoredToken>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&data)?))
    }
}

/// OAuth2 client credentials from a provider-format `client_secrets.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    #[serde(alias = "web")]
    pub installed: OAuthSecrets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub auth_uri: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// Result of a chunked download.
#[derive(Debug)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub total_bytes: u64,
}

/// Drive serializes file sizes as JSON strings; accept both forms.
fn de_opt_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const FILE_FIELDS: &str = "id,name,mimeType,size,parents,webViewLink";

/// Segment size for chunked downloads.
pub const DOWNLOAD_CHUNK_SIZE: u64 = 256 * 1024;

type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

// ---------------------------------------------------------------------------
// Folder selection
// ---------------------------------------------------------------------------

/// Pick the destination folder from a name-match result set.
///
/// Zero matches is a distinct [`DriveError::FolderNotFound`]. Multiple
/// matches are resolved deterministically by taking the lexicographically
/// smallest file id, independent of the order the provider returned them in.
pub fn select_folder(folders: Vec<DriveFile>, name: &str) -> Result<DriveFile> {
    if folders.len() > 1 {
        tracing::debug!(
            name,
            matches = folders.len(),
            "multiple folders match; selecting the smallest id"
        );
    }
    folders
        .into_iter()
        .min_by(|a, b| a.id.cmp(&b.id))
        .ok_or_else(|| DriveError::FolderNotFound {
            name: name.to_string(),
        })
}

/// Escape a string literal for embedding in a files.list `q` expression.
fn escape_query_term(term: &str) -> String {
    term.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Strip path separators so a remote name cannot escape the download directory.
fn safe_filename(name: &str) -> String {
    name.replace(['/', '\\', '\0'], "_")
}

/// Build the metadata for a new upload: the name comes from the local path,
/// and the resolved folder is the file's sole parent.
pub fn build_upload_metadata(path: &Path, mime_type: &str, folder: &DriveFile) -> UploadMetadata {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("untitled")
        .to_string();
    UploadMetadata {
        name,
        mime_type: mime_type.to_string(),
        parents: vec![folder.id.clone()],
    }
}

/// A ranged download that stops short of the advertised size was interrupted.
fn check_download_complete(written: u64, total: u64) -> Result<()> {
    if written == total {
        Ok(())
    } else {
        Err(DriveError::Download(format!(
            "transfer interrupted: received {written} of {total} bytes"
        )))
    }
}

// ---------------------------------------------------------------------------
// DriveClient
// ---------------------------------------------------------------------------

/// Google Drive client with OAuth2 authentication, folder-scoped resumable
/// upload, chunked download, and deletion.
pub struct DriveClient {
    http: HttpClient,
    token: Arc<RwLock<Option<StoredToken>>>,
    token_file: PathBuf,
    secrets: OAuthSecrets,
}

impl DriveClient {
    /// Create a new `DriveClient`.
    ///
    /// * `http` – shared HTTP client
    /// * `secrets` – OAuth2 client credentials
    /// * `token_file` – path where the OAuth2 token is persisted between runs
    pub fn new(http: HttpClient, secrets: OAuthSecrets, token_file: PathBuf) -> Self {
        Self {
            http,
            token: Arc::new(RwLock::new(None)),
            token_file,
            secrets,
        }
    }

    /// Build a client from the ambient [`SampleConfig`], loading the
    /// client-secrets file it points at.
    pub async fn from_config(http: HttpClient, config: &SampleConfig) -> Result<Self> {
        let secrets = Self::load_secrets(&config.secrets_file).await?;
        Ok(Self::new(http, secrets, config.token_file.clone()))
    }

    /// Load OAuth2 credentials from a provider-format `client_secrets.json`.
    pub async fn load_secrets(path: &Path) -> Result<OAuthSecrets> {
        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DriveError::Config(format!(
                    "Client secrets file not found: {}",
                    path.display()
                ))
            } else {
                DriveError::Io(e)
            }
        })?;
        let secrets: ClientSecrets = serde_json::from_str(&data)?;
        Ok(secrets.installed)
    }

    // -----------------------------------------------------------------------
    // OAuth2 helpers
    // -----------------------------------------------------------------------

    /// Build the `oauth2` client for the authorization-code flow.
    fn oauth_client(&self) -> Result<OAuthClient> {
        let auth_uri = self
            .secrets
            .auth_uri
            .clone()
            .unwrap_or_else(|| GOOGLE_AUTH_URL.to_string());
        let token_uri = self
            .secrets
            .token_uri
            .clone()
            .unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string());

        let auth_url = AuthUrl::new(auth_uri)
            .map_err(|e| DriveError::OAuth2(format!("Invalid auth URL: {e}")))?;
        let token_url = TokenUrl::new(token_uri)
            .map_err(|e| DriveError::OAuth2(format!("Invalid token URL: {e}")))?;
        let redirect_url = RedirectUrl::new(OOB_REDIRECT_URI.to_string())
            .map_err(|e| DriveError::OAuth2(format!("Invalid redirect URI: {e}")))?;

        Ok(
            BasicClient::new(ClientId::new(self.secrets.client_id.clone()))
                .set_client_secret(ClientSecret::new(self.secrets.client_secret.clone()))
                .set_auth_uri(auth_url)
                .set_token_uri(token_url)
                .set_redirect_uri(redirect_url),
        )
    }

    /// Dedicated HTTP client for the token endpoint. Redirects are disabled,
    /// as the `oauth2` crate requires for token exchanges.
    fn oauth_http() -> Result<oauth2::reqwest::Client> {
        oauth2::reqwest::ClientBuilder::new()
            .redirect(oauth2::reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| DriveError::OAuth2(format!("Failed to build OAuth2 HTTP client: {e}")))
    }

    /// Generate the authorization URL the user should visit.
    pub fn authorization_url(&self) -> Result<(String, CsrfToken)> {
        let client = self.oauth_client()?;
        let (url, csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
            .url();
        Ok((url.to_string(), csrf))
    }

    /// Exchange an authorization code for tokens and persist them.
    pub async fn exchange_code(&self, code: &str) -> Result<StoredToken> {
        let client = self.oauth_client()?;
        let http = Self::oauth_http()?;

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&http)
            .await
            .map_err(|e| DriveError::OAuth2(format!("Token exchange failed: {e}")))?;

        let token = StoredToken {
            access_token: token_result.access_token().secret().clone(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().clone()),
            token_type: "Bearer".to_string(),
            expiry: token_result
                .expires_in()
                .and_then(|d| ChronoDuration::from_std(d).ok())
                .map(|d| Utc::now() + d),
        };

        self.save_token(&token).await?;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    /// Refresh the access token using the stored refresh token.
    pub async fn refresh_access_token(&self) -> Result<StoredToken> {
        let old_refresh = {
            let guard = self.token.read().await;
            guard.as_ref().and_then(|t| t.refresh_token.clone())
        };
        let refresh = old_refresh
            .clone()
            .ok_or_else(|| DriveError::OAuth2("No refresh token available".into()))?;

        let client = self.oauth_client()?;
        let http = Self::oauth_http()?;

        let token_result = client
            .exchange_refresh_token(&RefreshToken::new(refresh))
            .request_async(&http)
            .await
            .map_err(|e| DriveError::OAuth2(format!("Token refresh failed: {e}")))?;

        let token = StoredToken {
            access_token: token_result.access_token().secret().clone(),
            refresh_token: token_result
                .refresh_token()
                .map(|t| t.secret().clone())
                .or(old_refresh),
            token_type: "Bearer".to_string(),
            expiry: token_result
                .expires_in()
                .and_then(|d| ChronoDuration::from_std(d).ok())
                .map(|d| Utc::now() + d),
        };

        self.save_token(&token).await?;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    /// Load a persisted token from disk into the client.
    pub async fn load_token(&self) -> Result<Option<StoredToken>> {
        let token = StoredToken::read(&self.token_file).await?;
        if let Some(t) = &token {
            *self.token.write().await = Some(t.clone());
        }
        Ok(token)
    }

    /// Persist the token to disk.
    async fn save_token(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.token_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.token_file, data).await?;
        Ok(())
    }

    /// Get a valid access token, loading the persisted one and refreshing if
    /// it is past expiry and a refresh token is available.
    async fn access_token(&self) -> Result<String> {
        if self.token.read().await.is_none() {
            self.load_token().await?;
        }

        let cached = {
            let guard = self.token.read().await;
            guard
                .as_ref()
                .map(|t| (t.access_token.clone(), t.is_expired(), t.refresh_token.is_some()))
        };

        match cached {
            None => Err(DriveError::Auth(
                "Not authenticated. Run `drive-sample auth login` first.".into(),
            )),
            Some((_, true, true)) => Ok(self.refresh_access_token().await?.access_token),
            Some((token, true, false)) => {
                tracing::warn!("Access token is past expiry and no refresh token is stored");
                Ok(token)
            }
            Some((token, false, _)) => Ok(token),
        }
    }

    // -----------------------------------------------------------------------
    // Folder resolution
    // -----------------------------------------------------------------------

    /// List every non-trashed folder whose name exactly equals `name`,
    /// paginating through the full result set.
    pub async fn find_folders(&self, name: &str) -> Result<Vec<DriveFile>> {
        let token = self.access_token().await?;
        let client = self.http.client();

        let q = format!(
            "mimeType = '{FOLDER_MIME_TYPE}' and name = '{}' and trashed = false",
            escape_query_term(name)
        );
        let fields = format!("files({FILE_FIELDS}),nextPageToken");

        let mut folders = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = vec![
                ("q", q.as_str()),
                ("fields", fields.as_str()),
                ("pageSize", "100"),
            ];
            if let Some(pt) = page_token.as_deref() {
                params.push(("pageToken", pt));
            }

            let resp = client
                .get(format!("{DRIVE_API_BASE}/files"))
                .bearer_auth(&token)
                .query(&params)
                .send()
                .await
                .map_err(DriveError::Http)?;

            if !resp.status().is_success() {
                return Err(api_error("folder lookup", resp).await);
            }

            let list: DriveFileList = resp.json().await.map_err(DriveError::Http)?;
            folders.extend(list.files);

            match list.next_page_token {
                Some(pt) => page_token = Some(pt),
                None => break,
            }
        }

        Ok(folders)
    }

    /// Resolve the destination folder by exact name (see [`select_folder`]
    /// for the zero/multiple match policy).
    pub async fn resolve_folder(&self, name: &str) -> Result<DriveFile> {
        let folders = self.find_folders(name).await?;
        select_folder(folders, name)
    }

    // -----------------------------------------------------------------------
    // File operations
    // -----------------------------------------------------------------------

    /// Get metadata for a single file.
    pub async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFile> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .client()
            .get(format!("{DRIVE_API_BASE}/files/{file_id}"))
            .bearer_auth(&token)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await
            .map_err(DriveError::Http)?;

        if !resp.status().is_success() {
            return Err(api_error("file metadata", resp).await);
        }

        resp.json::<DriveFile>().await.map_err(DriveError::Http)
    }

    /// Upload a local file into an already-resolved Drive folder with the
    /// resumable protocol.
    ///
    /// Initiates a session and streams the content in `chunk_size` pieces,
    /// invoking `on_progress` after each acknowledged chunk. Returns the
    /// provider's authoritative file resource.
    pub async fn upload_file<F>(
        &self,
        path: &Path,
        mime_type: &str,
        folder: &DriveFile,
        chunk_size: u64,
        on_progress: F,
    ) -> Result<DriveFile>
    where
        F: FnMut(UploadProgress),
    {
        let metadata = build_upload_metadata(path, mime_type, folder);

        let size = tokio::fs::metadata(path).await?.len();
        let session_url = self.initiate_session(&metadata, size).await?;
        let token = self.access_token().await?;

        tracing::info!(
            file = %path.display(),
            size,
            chunk_size,
            folder_id = %folder.id,
            "starting resumable upload"
        );

        let session = ResumableSession {
            client: self.http.client().clone(),
            token,
            session_url,
        };
        let reader = tokio::fs::File::open(path).await?;

        run_upload(&session, reader, size, chunk_size, on_progress).await
    }

    /// Initiate a resumable session; returns the session URI from the
    /// `Location` header.
    async fn initiate_session(&self, metadata: &UploadMetadata, size: u64) -> Result<String> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .client()
            .post(format!("{DRIVE_UPLOAD_BASE}/files"))
            .query(&[("uploadType", "resumable")])
            .bearer_auth(&token)
            .header("X-Upload-Content-Type", metadata.mime_type.clone())
            .header("X-Upload-Content-Length", size.to_string())
            .json(metadata)
            .send()
            .await
            .map_err(DriveError::Http)?;

        if !resp.status().is_success() {
            return Err(api_error("resumable session initiation", resp).await);
        }

        resp.headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                DriveError::Upload("session initiation response carried no Location URI".into())
            })
    }

    /// Download a file into `dest_dir` in 256 KiB ranged segments, reporting
    /// cumulative bytes to `on_progress`. Falls back to a single streamed
    /// request when the provider reports no size.
    pub async fn download_file<F>(
        &self,
        file_id: &str,
        dest_dir: &Path,
        mut on_progress: F,
    ) -> Result<DownloadResult>
    where
        F: FnMut(u64, Option<u64>),
    {
        let meta = self.get_file_metadata(file_id).await?;
        let token = self.access_token().await?;
        let client = self.http.client();

        tokio::fs::create_dir_all(dest_dir).await?;
        let dest = dest_dir.join(safe_filename(&meta.name));
        let mut file = tokio::fs::File::create(&dest).await?;

        let url = format!("{DRIVE_API_BASE}/files/{file_id}");
        let mut written = 0u64;

        match meta.size {
            Some(total) => {
                tracing::info!(file_id, total, "starting chunked download");
                for (start, len) in chunk_spans(total, DOWNLOAD_CHUNK_SIZE) {
                    if len == 0 {
                        break;
                    }
                    let end = start + len - 1;
                    let resp = client
                        .get(&url)
                        .bearer_auth(&token)
                        .query(&[("alt", "media")])
                        .header("Range", format!("bytes={start}-{end}"))
                        .send()
                        .await
                        .map_err(DriveError::Http)?;

                    if !resp.status().is_success() {
                        return Err(api_error("chunked download", resp).await);
                    }

                    let bytes = resp.bytes().await.map_err(DriveError::Http)?;
                    file.write_all(&bytes).await?;
                    written += bytes.len() as u64;
                    on_progress(written, Some(total));
                }
                check_download_complete(written, total)?;
            }
            None => {
                tracing::info!(file_id, "size unknown; streaming download");
                let resp = client
                    .get(&url)
                    .bearer_auth(&token)
                    .query(&[("alt", "media")])
                    .send()
                    .await
                    .map_err(DriveError::Http)?;

                if !resp.status().is_success() {
                    return Err(api_error("download", resp).await);
                }

                let mut stream = resp.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    let data = chunk.map_err(DriveError::Http)?;
                    file.write_all(&data).await?;
                    written += data.len() as u64;
                    on_progress(written, None);
                }
            }
        }

        file.flush().await?;

        Ok(DownloadResult {
            path: dest,
            total_bytes: written,
        })
    }

    /// Delete a file or folder by id.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .client()
            .delete(format!("{DRIVE_API_BASE}/files/{file_id}"))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(DriveError::Http)?;

        if !resp.status().is_success() {
            return Err(api_error("delete", resp).await);
        }

        Ok(())
    }
}

/// Build a [`DriveError::Api`] from a non-success response, consuming its body.
async fn api_error(operation: &str, resp: reqwest::Response) -> DriveError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    DriveError::Api {
        status,
        message: format!("{operation} failed: {body}"),
    }
}

// ---------------------------------------------------------------------------
// Resumable session transport
// ---------------------------------------------------------------------------

/// [`UploadTransport`] backed by PUTs against a live session URI.
struct ResumableSession {
    client: reqwest::Client,
    token: String,
    session_url: String,
}

#[async_trait]
impl UploadTransport for ResumableSession {
    async fn send_chunk(&self, start: u64, total: u64, data: Vec<u8>) -> Result<ChunkOutcome> {
        let range = format_content_range(start, data.len() as u64, total);

        let resp = self
            .client
            .put(&self.session_url)
            .bearer_auth(&self.token)
            .header("Content-Range", range)
            .body(data)
            .send()
            .await
            .map_err(DriveError::Http)?;

        match resp.status().as_u16() {
            // 308 Resume Incomplete: the session expects more bytes.
            308 => Ok(ChunkOutcome::Incomplete),
            200 | 201 => {
                let file = resp.json::<DriveFile>().await.map_err(DriveError::Http)?;
                Ok(ChunkOutcome::Complete(file))
            }
            _ => Err(api_error("chunk upload", resp).await),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, name: &str) -> DriveFile {
        DriveFile {
            id: id.into(),
            name: name.into(),
            mime_type: FOLDER_MIME_TYPE.into(),
            size: None,
            parents: Vec::new(),
            web_view_link: None,
        }
    }

    fn make_test_client(token_file: PathBuf) -> DriveClient {
        let http = HttpClient::new().unwrap();
        let secrets = OAuthSecrets {
            client_id: "test-client-id".into(),
            client_secret: "test-client-secret".into(),
            auth_uri: None,
            token_uri: None,
            redirect_uris: Vec::new(),
        };
        DriveClient::new(http, secrets, token_file)
    }

    #[test]
    fn test_select_folder_zero_matches_is_named_error() {
        let result = select_folder(Vec::new(), "LIVROS");
        match result {
            Err(DriveError::FolderNotFound { name }) => assert_eq!(name, "LIVROS"),
            other => panic!("expected FolderNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_select_folder_single_match() {
        let chosen = select_folder(vec![folder("abc", "LIVROS")], "LIVROS").unwrap();
        assert_eq!(chosen.id, "abc");
    }

    #[test]
    fn test_select_folder_tie_break_is_order_independent() {
        let a = vec![folder("zzz", "L"), folder("aaa", "L"), folder("mmm", "L")];
        let b = vec![folder("mmm", "L"), folder("zzz", "L"), folder("aaa", "L")];
        assert_eq!(select_folder(a, "L").unwrap().id, "aaa");
        assert_eq!(select_folder(b, "L").unwrap().id, "aaa");
    }

    #[test]
    fn test_build_upload_metadata_sole_parent_is_resolved_folder() {
        let chosen = select_folder(vec![folder("folder-1", "LIVROS")], "LIVROS").unwrap();
        let metadata =
            build_upload_metadata(Path::new("/photos/Desert.jpg"), "image/jpeg", &chosen);

        assert_eq!(metadata.name, "Desert.jpg");
        assert_eq!(metadata.parents, vec!["folder-1".to_string()]);

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"mimeType\":\"image/jpeg\""));
        assert!(json.contains("\"parents\":[\"folder-1\"]"));
    }

    #[test]
    fn test_build_upload_metadata_nameless_path_falls_back() {
        let chosen = folder("folder-1", "LIVROS");
        let metadata = build_upload_metadata(Path::new("/"), "text/plain", &chosen);
        assert_eq!(metadata.name, "untitled");
    }

    #[test]
    fn test_check_download_complete() {
        assert!(check_download_complete(1024, 1024).is_ok());

        match check_download_complete(512, 1024) {
            Err(DriveError::Download(msg)) => {
                assert!(msg.contains("512"));
                assert!(msg.contains("1024"));
            }
            other => panic!("expected Download error, got: {:?}", other),
        }
    }

    #[test]
    fn test_drive_file_size_accepts_string_and_number() {
        let from_string: DriveFile = serde_json::from_str(
            r#"{"id":"a","name":"f","mimeType":"image/jpeg","size":"1024"}"#,
        )
        .unwrap();
        assert_eq!(from_string.size, Some(1024));

        let from_number: DriveFile =
            serde_json::from_str(r#"{"id":"a","name":"f","mimeType":"image/jpeg","size":2048}"#)
                .unwrap();
        assert_eq!(from_number.size, Some(2048));

        let absent: DriveFile =
            serde_json::from_str(r#"{"id":"a","name":"f","mimeType":"image/jpeg"}"#).unwrap();
        assert_eq!(absent.size, None);
    }

    #[test]
    fn test_file_list_deserializes_page_token() {
        let list: DriveFileList = serde_json::from_str(
            r#"{"files":[{"id":"a","name":"f","mimeType":"text/plain"}],"nextPageToken":"tok"}"#,
        )
        .unwrap();
        assert_eq!(list.files.len(), 1);
        assert_eq!(list.next_page_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_escape_query_term() {
        assert_eq!(escape_query_term("LIVROS"), "LIVROS");
        assert_eq!(escape_query_term("it's"), "it\\'s");
        assert_eq!(escape_query_term("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("Desert.jpg"), "Desert.jpg");
        assert_eq!(safe_filename("../etc/passwd"), ".._etc_passwd");
    }

    #[test]
    fn test_stored_token_expiry() {
        let fresh = StoredToken {
            access_token: "ya29.xxx".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expiry: Some(Utc::now() + ChronoDuration::hours(1)),
        };
        assert!(!fresh.is_expired());

        let stale = StoredToken {
            expiry: Some(Utc::now() - ChronoDuration::hours(1)),
            ..fresh.clone()
        };
        assert!(stale.is_expired());

        let no_expiry = StoredToken {
            expiry: None,
            ..fresh
        };
        assert!(!no_expiry.is_expired());
    }

    #[test]
    fn test_client_secrets_parse_installed_and_web() {
        let installed: ClientSecrets = serde_json::from_str(
            r#"{"installed":{"client_id":"id","client_secret":"sec","redirect_uris":["urn:ietf:wg:oauth:2.0:oob"]}}"#,
        )
        .unwrap();
        assert_eq!(installed.installed.client_id, "id");

        let web: ClientSecrets =
            serde_json::from_str(r#"{"web":{"client_id":"wid","client_secret":"wsec"}}"#).unwrap();
        assert_eq!(web.installed.client_id, "wid");
    }

    #[test]
    fn test_authorization_url() {
        let client = make_test_client(PathBuf::from("/tmp/drive-sample-test-token.json"));
        let (url, _csrf) = client.authorization_url().unwrap();
        assert!(url.contains("accounts.google.com"));
        assert!(url.contains("test-client-id"));
        assert!(url.contains("drive"));
    }

    #[tokio::test]
    async fn test_token_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let token_file = dir.path().join("token.json");

        let client = make_test_client(token_file.clone());
        let token = StoredToken {
            access_token: "ya29.xxx".into(),
            refresh_token: Some("1//xxx".into()),
            token_type: "Bearer".into(),
            expiry: None,
        };
        client.save_token(&token).await.unwrap();

        let reloaded = make_test_client(token_file);
        let loaded = reloaded.load_token().await.unwrap().expect("token on disk");
        assert_eq!(loaded.access_token, "ya29.xxx");
        assert_eq!(loaded.refresh_token.as_deref(), Some("1//xxx"));
    }

    #[tokio::test]
    async fn test_load_token_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let client = make_test_client(dir.path().join("absent.json"));
        assert!(client.load_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_access_token_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let client = make_test_client(dir.path().join("absent.json"));
        let result = client.access_token().await;
        match result {
            Err(DriveError::Auth(msg)) => assert!(msg.contains("auth login")),
            other => panic!("expected Auth error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_secrets_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client_secrets.json");
        match DriveClient::load_secrets(&path).await {
            Err(DriveError::Config(msg)) => assert!(msg.contains("client_secrets.json")),
            other => panic!("expected Config error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_secrets_reads_installed_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client_secrets.json");
        tokio::fs::write(
            &path,
            r#"{"installed":{"client_id":"id-1","client_secret":"sec-1"}}"#,
        )
        .await
        .unwrap();

        let secrets = DriveClient::load_secrets(&path).await.unwrap();
        assert_eq!(secrets.client_id, "id-1");
        assert_eq!(secrets.client_secret, "sec-1");
    }
}

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use ::object_store::aws::AmazonS3Builder;
use ::object_store::local::LocalFileSystem;
use ::object_store::path::Path as ObjectPath;
use ::object_store::{
    Attribute, Attributes, ObjectStore as RemoteStore, PutOptions, PutPayload,
};
use thiserror::Error;
use tracing::debug;

use crate::config::ObjectStoreConfig;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found: {key}")]
    NotFound { key: String },
    #[error("object store misconfigured: {0}")]
    Misconfigured(String),
    #[error("object store request failed: {0}")]
    Transport(String),
}

/// Blind key/value text storage for digests and trivia.
pub trait ObjectStore {
    fn get_text(&self, key: &str) -> Result<String, ObjectStoreError>;
    fn put_text(&self, key: &str, body: &str, content_type: &str) -> Result<(), ObjectStoreError>;
}

pub fn object_store_from_config(
    config: &ObjectStoreConfig,
) -> Result<Box<dyn ObjectStore>, ObjectStoreError> {
    if let Some(dir) = &config.local_dir {
        return Ok(Box::new(BucketStore::local(dir.clone())?));
    }
    Ok(Box::new(BucketStore::s3(config)?))
}

fn check_key(key: &str) -> Result<ObjectPath, ObjectStoreError> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
        return Err(ObjectStoreError::NotFound {
            key: key.to_string(),
        });
    }
    ObjectPath::parse(key).map_err(|_| ObjectStoreError::NotFound {
        key: key.to_string(),
    })
}

fn store_error(key: &str, err: ::object_store::Error) -> ObjectStoreError {
    match err {
        ::object_store::Error::NotFound { .. } => ObjectStoreError::NotFound {
            key: key.to_string(),
        },
        other => ObjectStoreError::Transport(format!("{key}: {other}")),
    }
}

/// Sync facade over an `object_store` backend: S3 with signed requests, or a
/// local directory. Each call drives the async client on its own
/// current-thread runtime.
pub struct BucketStore {
    inner: Arc<dyn RemoteStore>,
    // LocalFileSystem rejects put attributes.
    content_types: bool,
}

impl BucketStore {
    pub fn local(root: PathBuf) -> Result<Self, ObjectStoreError> {
        fs::create_dir_all(&root).map_err(|err| {
            ObjectStoreError::Misconfigured(format!("create {}: {err}", root.display()))
        })?;
        let store = LocalFileSystem::new_with_prefix(&root)
            .map_err(|err| ObjectStoreError::Misconfigured(err.to_string()))?;
        Ok(Self {
            inner: Arc::new(store),
            content_types: false,
        })
    }

    pub fn s3(config: &ObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        let bucket = config
            .bucket
            .as_deref()
            .ok_or_else(|| ObjectStoreError::Misconfigured("S3_BUCKET missing".to_string()))?;
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&config.region);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.with_endpoint(endpoint.trim_end_matches('/'));
        }
        match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                builder = builder
                    .with_access_key_id(key_id)
                    .with_secret_access_key(secret);
                if let Some(token) = &config.session_token {
                    builder = builder.with_token(token);
                }
            }
            (None, None) => {
                debug!(bucket, "no static AWS credentials, using instance credentials");
            }
            _ => {
                return Err(ObjectStoreError::Misconfigured(
                    "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
                ));
            }
        }
        let store = builder
            .build()
            .map_err(|err| ObjectStoreError::Misconfigured(err.to_string()))?;
        Ok(Self {
            inner: Arc::new(store),
            content_types: true,
        })
    }

    fn block_on<T>(
        &self,
        fut: impl Future<Output = Result<T, ObjectStoreError>>,
    ) -> Result<T, ObjectStoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ObjectStoreError::Transport(format!("store runtime: {err}")))?;
        runtime.block_on(fut)
    }
}

impl ObjectStore for BucketStore {
    fn get_text(&self, key: &str) -> Result<String, ObjectStoreError> {
        let path = check_key(key)?;
        let bytes = self.block_on(async {
            let found = self
                .inner
                .get(&path)
                .await
                .map_err(|err| store_error(key, err))?;
            found.bytes().await.map_err(|err| store_error(key, err))
        })?;
        String::from_utf8(bytes.to_vec())
            .map_err(|err| ObjectStoreError::Transport(format!("{key}: {err}")))
    }

    fn put_text(&self, key: &str, body: &str, content_type: &str) -> Result<(), ObjectStoreError> {
        let path = check_key(key)?;
        let mut options = PutOptions::default();
        if self.content_types {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            options.attributes = attributes;
        }
        let payload = PutPayload::from(body.as_bytes().to_vec());
        self.block_on(async {
            self.inner
                .put_opts(&path, payload, options)
                .await
                .map_err(|err| store_error(key, err))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BucketStore, ObjectStore, ObjectStoreError, check_key, object_store_from_config};
    use crate::config::ObjectStoreConfig;

    fn temp_root(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("mlb_trending_store_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn local_store_round_trips_nested_keys() {
        let store = BucketStore::local(temp_root("nested")).expect("local store");
        store
            .put_text("trivia/2025-06-01.txt", "Who hit 73?", "text/plain")
            .expect("put should succeed");
        assert_eq!(
            store.get_text("trivia/2025-06-01.txt").expect("get should succeed"),
            "Who hit 73?"
        );
    }

    #[test]
    fn local_store_reports_missing_keys() {
        let store = BucketStore::local(temp_root("missing")).expect("local store");
        assert!(matches!(
            store.get_text("2025-06-01.txt"),
            Err(ObjectStoreError::NotFound { .. })
        ));
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        assert!(check_key("../secrets").is_err());
        assert!(check_key("/etc/passwd").is_err());
        assert!(check_key("").is_err());
        assert!(check_key("2025-06-01.txt").is_ok());
    }

    #[test]
    fn s3_store_builds_with_static_credentials() {
        let config = ObjectStoreConfig {
            bucket: Some("digests".to_string()),
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..ObjectStoreConfig::default()
        };
        assert!(object_store_from_config(&config).is_ok());
    }

    #[test]
    fn s3_store_needs_a_bucket_and_paired_keys() {
        let no_bucket = ObjectStoreConfig::default();
        assert!(matches!(
            object_store_from_config(&no_bucket),
            Err(ObjectStoreError::Misconfigured(_))
        ));

        let half_keys = ObjectStoreConfig {
            bucket: Some("digests".to_string()),
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            ..ObjectStoreConfig::default()
        };
        assert!(matches!(
            object_store_from_config(&half_keys),
            Err(ObjectStoreError::Misconfigured(_))
        ));
    }
}

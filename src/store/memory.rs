use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use crate::error::StoreError;
use crate::store::keys::content_type_for;
use crate::store::{ObjectBody, ObjectStore, RemoteConfig};

/// In-memory bucket, ordered by insertion like the listing of a real store.
///
/// Changes live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    remote: RemoteConfig,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the given objects, in order.
    pub fn with_objects<I, K, V>(objects: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let objects = objects
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            objects: Mutex::new(objects),
            remote: RemoteConfig::default(),
        }
    }

    /// A store seeded with sample files for `--demo`.
    pub fn demo() -> Self {
        let mut store = Self::with_objects(DEMO_FILES.iter().map(|(k, v)| (*k, v.as_bytes())));
        store.remote = RemoteConfig {
            read_only_mode: false,
            demo_mode: true,
            bucket_host: "demo-host.example.com".to_string(),
            bucket_name: "demo-bucket".to_string(),
        };
        info!(count = DEMO_FILES.len(), "demo store initialized");
        store
    }

    /// Override the remote configuration this store reports.
    #[cfg(test)]
    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<(String, Vec<u8>)>>, StoreError> {
        self.objects
            .lock()
            .map_err(|_| StoreError::LocalIo("demo store lock poisoned".to_string()))
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut objects = self.lock()?;
        match objects.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = bytes,
            None => objects.push((key.to_string(), bytes)),
        }
        Ok(())
    }

    /// Current bytes under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .ok()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl ObjectStore for MemoryStore {
    async fn config(&self) -> Result<RemoteConfig, StoreError> {
        Ok(self.remote.clone())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.iter().map(|(k, _)| k.clone()).collect())
    }

    async fn download(&self, key: &str) -> Result<ObjectBody, StoreError> {
        let bytes = self
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(ObjectBody {
            bytes,
            content_type: Some(content_type_for(key).to_string()),
        })
    }

    async fn upload(&self, key: &str, _file_name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let len = bytes.len();
        self.put(key, bytes)?;
        info!(key, bytes = len, "demo: uploaded object");
        Ok(())
    }

    async fn update(&self, key: &str, body: String) -> Result<(), StoreError> {
        self.put(key, body.into_bytes())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut objects = self.lock()?;
        let before = objects.len();
        objects.retain(|(k, _)| k != key);
        if objects.len() == before {
            warn!(key, "demo: object not found for deletion");
        }
        Ok(())
    }
}

const DEMO_FILES: &[(&str, &str)] = &[
    (
        "README.md",
        "# Bucket Browser Demo\n\n\
         This is running in **demo mode** with sample data.\n\
         No real bucket is connected; all files live in memory.\n\n\
         ## Things to try\n\n\
         - Browse folders and files\n\
         - Preview text files (Enter on a file)\n\
         - Edit and save text files (e in the preview)\n\
         - Upload new files (u)\n\
         - Delete files (d, or select with Space and press D)\n\
         - Search / filter (/)\n\n\
         Changes are temporary and reset when the program exits.\n",
    ),
    (
        "config.json",
        "{\n  \"appName\": \"Bucket Browser\",\n  \"version\": \"1.0.0\",\n  \"features\": {\n    \"preview\": true,\n    \"edit\": true,\n    \"upload\": true,\n    \"delete\": true\n  }\n}\n",
    ),
    (
        "notes.txt",
        "Quick Notes\n===========\n\n\
         - You can edit this file! Open it, then press e.\n\
         - Uploaded files appear after the listing refreshes.\n\
         - Deleted files disappear until the next start.\n",
    ),
    (
        "documents/report-2024.txt",
        "Annual Report 2024\n==================\n\n\
         Summary\n-------\n\
         A sample report demonstrating folder navigation and text preview.\n\n\
         Key Highlights:\n  * Storage usage grew 45% year-over-year\n  * 12,000 files processed daily\n",
    ),
    (
        "documents/budget.csv",
        "Category,Q1,Q2,Q3,Q4\nInfrastructure,12000,13500,14200,15000\nStorage,8000,8500,9200,10000\nBandwidth,3000,3200,3800,4100\n",
    ),
    (
        "documents/guidelines.md",
        "# Upload Guidelines\n\n\
         | Category | Extensions |\n|----------|------------|\n\
         | Text     | .txt, .md, .csv, .json |\n| Images   | .jpg, .png, .gif, .svg |\n\n\
         1. Use descriptive file names\n2. Organize files into folders\n",
    ),
    (
        "images/logo.svg",
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"200\" viewBox=\"0 0 200 200\">\n  <rect width=\"200\" height=\"200\" rx=\"32\" fill=\"#4f46e5\"/>\n  <text x=\"100\" y=\"125\" text-anchor=\"middle\" font-size=\"72\" fill=\"white\">B</text>\n</svg>\n",
    ),
    (
        "scripts/deploy.sh",
        "#!/bin/bash\n# Sample deployment script\n\nset -euo pipefail\n\necho \"Starting deployment...\"\nsystemctl restart bucket-browser\necho \"Deployment complete!\"\n",
    ),
    (
        "scripts/setup.py",
        "\"\"\"Sample setup script for bucket configuration.\"\"\"\n\nimport os\n\n\ndef get_config():\n    return {\n        \"bucket_name\": os.getenv(\"BUCKET_NAME\", \"my-bucket\"),\n        \"bucket_host\": os.getenv(\"BUCKET_HOST\", \"localhost:9000\"),\n    }\n",
    ),
    (
        "data/sample.json",
        "{\n  \"users\": [\n    { \"id\": 1, \"name\": \"Alice\", \"role\": \"admin\" },\n    { \"id\": 2, \"name\": \"Bob\", \"role\": \"editor\" }\n  ]\n}\n",
    ),
    (
        "data/exports/users.csv",
        "id,name,email,role\n1,Alice,alice@example.com,admin\n2,Bob,bob@example.com,editor\n3,Charlie,charlie@example.com,viewer\n",
    ),
];

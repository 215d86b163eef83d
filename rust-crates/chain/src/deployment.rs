use chrono::Utc;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    fs,
    io,
    io::Write,
    path::{
        Path,
        PathBuf,
    },
};
use thiserror::Error;

pub const DEPLOYMENTS_ROOT: &str = ".deployments";
const DEPLOYMENTS_FILE: &str = "deployments.json";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeploymentEnv {
    Dev,
    Test,
    Local,
}

impl DeploymentEnv {
    pub fn dir_name(self) -> &'static str {
        match self {
            DeploymentEnv::Dev => "dev",
            DeploymentEnv::Test => "test",
            DeploymentEnv::Local => "local",
        }
    }
}

impl fmt::Display for DeploymentEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentEnv::Dev => "Devnet",
            DeploymentEnv::Test => "Testnet",
            DeploymentEnv::Local => "Local",
        };
        write!(f, "{name}")
    }
}

/// One published deployment of the Tamagosui package on a network: where it
/// lives and the shared object ids the client needs to address calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployed_at: String,
    pub package_id: String,
    pub network_url: String,
    #[serde(default)]
    pub clock_id: Option<String>,
    #[serde(default)]
    pub game_balance_id: Option<String>,
}

impl DeploymentRecord {
    pub fn matches_network(&self, url: &str) -> bool {
        self.network_url.trim_end_matches('/') == url.trim_end_matches('/')
    }
}

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("failed to access deployment records: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse deployment records JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct DeploymentStore {
    path: PathBuf,
}

impl DeploymentStore {
    pub fn new(env: DeploymentEnv) -> Result<Self, DeploymentError> {
        Self::at_root(Path::new(DEPLOYMENTS_ROOT), env)
    }

    /// A store rooted somewhere other than the working directory; used by
    /// tests to avoid touching the checkout.
    pub fn at_root(root: &Path, env: DeploymentEnv) -> Result<Self, DeploymentError> {
        let path = ensure_store(root, env)?;
        Ok(Self { path })
    }

    pub fn load(&self) -> Result<Vec<DeploymentRecord>, DeploymentError> {
        read_records(&self.path)
    }

    /// The most recent record for the given network url, if any.
    pub fn latest_for_network(
        &self,
        url: &str,
    ) -> Result<Option<DeploymentRecord>, DeploymentError> {
        Ok(self
            .load()?
            .into_iter()
            .rev()
            .find(|record| record.matches_network(url)))
    }

    pub fn append(&self, record: DeploymentRecord) -> Result<(), DeploymentError> {
        let mut records = self.load()?;
        records.push(record);
        write_records(&self.path, &records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn record_deployment(
    env: DeploymentEnv,
    package_id: impl AsRef<str>,
    network_url: impl AsRef<str>,
    clock_id: Option<impl AsRef<str>>,
    game_balance_id: Option<impl AsRef<str>>,
) -> Result<(), DeploymentError> {
    let store = DeploymentStore::new(env)?;
    let record = DeploymentRecord {
        deployed_at: Utc::now().to_rfc3339(),
        package_id: package_id.as_ref().to_string(),
        network_url: network_url.as_ref().to_string(),
        clock_id: clock_id.map(|id| id.as_ref().to_string()),
        game_balance_id: game_balance_id.map(|id| id.as_ref().to_string()),
    };
    store.append(record)
}

pub fn ensure_structure() -> Result<(), DeploymentError> {
    for env in [
        DeploymentEnv::Dev,
        DeploymentEnv::Test,
        DeploymentEnv::Local,
    ] {
        let _ = DeploymentStore::new(env)?;
    }
    Ok(())
}

fn ensure_store(root: &Path, env: DeploymentEnv) -> Result<PathBuf, DeploymentError> {
    let env_dir = root.join(env.dir_name());
    if !env_dir.exists() {
        fs::create_dir_all(&env_dir)?;
    }

    let file_path = env_dir.join(DEPLOYMENTS_FILE);
    if !file_path.exists() {
        let mut file = fs::File::create(&file_path)?;
        file.write_all(b"[]")?;
    }

    Ok(file_path)
}

fn read_records(path: impl AsRef<Path>) -> Result<Vec<DeploymentRecord>, DeploymentError> {
    let data = fs::read(path.as_ref())?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice::<Vec<DeploymentRecord>>(&data)?)
}

fn write_records(
    path: impl AsRef<Path>,
    records: &[DeploymentRecord],
) -> Result<(), DeploymentError> {
    let json = serde_json::to_vec_pretty(records)?;
    fs::write(path.as_ref(), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tempdir::TempDir;

    fn record(url: &str, package: &str) -> DeploymentRecord {
        DeploymentRecord {
            deployed_at: "2026-01-01T00:00:00Z".to_string(),
            package_id: package.to_string(),
            network_url: url.to_string(),
            clock_id: None,
            game_balance_id: None,
        }
    }

    #[test]
    fn store__append_then_load_round_trips() {
        // given
        let dir = TempDir::new("tamagosui-deployments").unwrap();
        let store = DeploymentStore::at_root(dir.path(), DeploymentEnv::Local).unwrap();

        // when
        store
            .append(record("http://localhost:9000", "0x01"))
            .unwrap();
        let records = store.load().unwrap();

        // then
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].package_id, "0x01");
    }

    #[test]
    fn latest_for_network__picks_newest_matching_record() {
        // given
        let dir = TempDir::new("tamagosui-deployments").unwrap();
        let store = DeploymentStore::at_root(dir.path(), DeploymentEnv::Dev).unwrap();
        store
            .append(record("https://gateway.dev.tamagosui.io", "0x01"))
            .unwrap();
        store
            .append(record("https://other.example", "0x02"))
            .unwrap();
        store
            .append(record("https://gateway.dev.tamagosui.io/", "0x03"))
            .unwrap();

        // when
        let latest = store
            .latest_for_network("https://gateway.dev.tamagosui.io")
            .unwrap();

        // then
        assert_eq!(latest.unwrap().package_id, "0x03");
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

/// Compiled contract as emitted by hardhat under `artifacts/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read artifact {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parse artifact {}", path.display()))
    }

    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `name` (`Funding` or `contracts/Funding.sol:Funding`) to a
    /// deployable artifact.
    pub fn contract_factory(&self, name: &str) -> Result<Artifact> {
        let (path, contract_name) = match name.rsplit_once(':') {
            Some((source, contract)) => (
                self.root.join(source).join(format!("{contract}.json")),
                contract,
            ),
            None => (self.find(name)?, name),
        };
        if !path.is_file() {
            bail!("artifact for contract {} not found", name);
        }

        let artifact = Artifact::from_file(&path)?;
        if artifact.contract_name != contract_name {
            bail!(
                "artifact {} holds contract {}, expected {}",
                path.display(),
                artifact.contract_name,
                contract_name
            );
        }
        if artifact.bytecode.is_empty() {
            bail!(
                "contract {} has no bytecode, it is abstract or an interface",
                artifact.fully_qualified_name()
            );
        }
        log::debug!("loaded artifact {}", path.display());
        Ok(artifact)
    }

    fn find(&self, name: &str) -> Result<PathBuf> {
        let file_name = format!("{name}.json");
        let mut found = Vec::new();
        Self::walk(&self.root, &file_name, &mut found)?;

        match found.len() {
            0 => Err(anyhow!(
                "artifact for contract {} not found in {}",
                name,
                self.root.display()
            )),
            1 => Ok(found.remove(0)),
            _ => {
                found.sort();
                let candidates = found
                    .iter()
                    .map(|p| self.qualified_name(p, name))
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(anyhow!(
                    "multiple artifacts for contract {}, use one of: {}",
                    name,
                    candidates
                ))
            }
        }
    }

    fn walk(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<()> {
        let entries =
            fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            // file_type does not follow symlinks
            if entry.file_type()?.is_dir() {
                if path.file_name().is_some_and(|n| n == "build-info") {
                    continue;
                }
                Self::walk(&path, file_name, found)?;
            } else if path.file_name().is_some_and(|n| n == file_name) {
                found.push(path);
            }
        }
        Ok(())
    }

    fn qualified_name(&self, path: &Path, name: &str) -> String {
        let source = path
            .parent()
            .and_then(|p| p.strip_prefix(&self.root).ok())
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        format!("{source}:{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ABI: &str = r#"[
        {"inputs":[],"stateMutability":"nonpayable","type":"constructor"},
        {"inputs":[],"name":"fund","outputs":[],"stateMutability":"payable","type":"function"}
    ]"#;

    fn write_artifact(root: &Path, source: &str, name: &str, bytecode: &str) {
        let dir = root.join(source);
        fs::create_dir_all(&dir).unwrap();
        let json = format!(
            r#"{{"_format":"hh-sol-artifact-1","contractName":"{name}","sourceName":"{source}","abi":{ABI},"bytecode":"{bytecode}","deployedBytecode":"0x","linkReferences":{{}},"deployedLinkReferences":{{}}}}"#
        );
        fs::write(dir.join(format!("{name}.json")), json).unwrap();
        fs::write(dir.join(format!("{name}.dbg.json")), "{}").unwrap();
    }

    #[test]
    fn finds_by_bare_name() {
        let root = TempDir::new().unwrap();
        write_artifact(root.path(), "contracts/Funding.sol", "Funding", "0x6080604052");
        fs::create_dir_all(root.path().join("build-info")).unwrap();
        fs::write(root.path().join("build-info/Funding.json"), "{}").unwrap();

        let artifact = ArtifactStore::new(root.path())
            .contract_factory("Funding")
            .unwrap();
        assert_eq!(artifact.contract_name, "Funding");
        assert_eq!(artifact.fully_qualified_name(), "contracts/Funding.sol:Funding");
        assert_eq!(artifact.bytecode.to_vec(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);
        assert!(artifact.abi.function("fund").is_ok());
    }

    #[test]
    fn finds_by_fully_qualified_name() {
        let root = TempDir::new().unwrap();
        write_artifact(root.path(), "contracts/Funding.sol", "Funding", "0x6080");
        write_artifact(root.path(), "contracts/legacy/Funding.sol", "Funding", "0x6081");

        let artifact = ArtifactStore::new(root.path())
            .contract_factory("contracts/legacy/Funding.sol:Funding")
            .unwrap();
        assert_eq!(artifact.bytecode.to_vec(), vec![0x60, 0x81]);
    }

    #[test]
    fn ambiguous_name_lists_candidates() {
        let root = TempDir::new().unwrap();
        write_artifact(root.path(), "contracts/Funding.sol", "Funding", "0x6080");
        write_artifact(root.path(), "contracts/legacy/Funding.sol", "Funding", "0x6081");

        let err = ArtifactStore::new(root.path())
            .contract_factory("Funding")
            .unwrap_err()
            .to_string();
        assert!(err.contains("multiple artifacts"), "{err}");
        assert!(err.contains("contracts/Funding.sol:Funding"), "{err}");
        assert!(err.contains("contracts/legacy/Funding.sol:Funding"), "{err}");
    }

    #[test]
    fn missing_contract() {
        let root = TempDir::new().unwrap();
        write_artifact(root.path(), "contracts/Funding.sol", "Funding", "0x6080");
        let store = ArtifactStore::new(root.path());

        assert!(store.contract_factory("Crowdsale").is_err());
        assert!(store
            .contract_factory("contracts/Funding.sol:Crowdsale")
            .is_err());
        assert!(ArtifactStore::new(root.path().join("nope"))
            .contract_factory("Funding")
            .is_err());
    }

    #[cfg(unix)]
    #[test]
    fn does_not_follow_symlinked_dirs() {
        let root = TempDir::new().unwrap();
        write_artifact(root.path(), "contracts/Funding.sol", "Funding", "0x6080");
        std::os::unix::fs::symlink(root.path(), root.path().join("contracts/loop")).unwrap();

        let artifact = ArtifactStore::new(root.path())
            .contract_factory("Funding")
            .unwrap();
        assert_eq!(artifact.fully_qualified_name(), "contracts/Funding.sol:Funding");
    }

    #[test]
    fn rejects_interface() {
        let root = TempDir::new().unwrap();
        write_artifact(root.path(), "contracts/IFunding.sol", "IFunding", "0x");

        let err = ArtifactStore::new(root.path())
            .contract_factory("IFunding")
            .unwrap_err()
            .to_string();
        assert!(err.contains("no bytecode"), "{err}");
    }
}

//! Hook shim installation.
//!
//! Writes one small executable shim per lifecycle point into the
//! repository's hook directory. A shim's only job is to invoke the matching
//! orchestrator stage and exit 0 regardless of internal outcome; the
//! never-block invariant is enforced twice, once in the stage runner and
//! once in the shim itself.

use std::fs;
use std::path::PathBuf;

use git2::Repository;
use tracing::info;

use crate::error::InstallError;
use crate::hooks::HookStage;

/// Marker embedded in every shim so ours can be told apart from foreign
/// hooks on uninstall and status checks.
const SHIM_MARKER: &str = "epigram hook shim";

const BACKUP_SUFFIX: &str = ".backup";

/// Installation state of one hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Installed,
    NotInstalled,
    /// A hook exists but was not written by us.
    Foreign,
}

fn hooks_dir(repo: &Repository) -> PathBuf {
    repo.path().join("hooks")
}

fn shim_content(stage: HookStage) -> String {
    format!(
        "#!/bin/sh\n# {marker}: {name} - generated, do not edit\nepigram hook run {name} \"$@\" || true\nexit 0\n",
        marker = SHIM_MARKER,
        name = stage.hook_name(),
    )
}

/// Install shims for the given stages (all three when empty).
///
/// Pre-existing foreign hooks are moved aside to `<name>.backup` and
/// restored on uninstall.
pub fn install_hooks(repo: &Repository, stages: &[HookStage]) -> Result<(), InstallError> {
    let stages = if stages.is_empty() { HookStage::all() } else { stages };
    let dir = hooks_dir(repo);

    fs::create_dir_all(&dir).map_err(|source| InstallError::WriteShim {
        path: dir.display().to_string(),
        source,
    })?;

    for stage in stages {
        let path = dir.join(stage.hook_name());

        if path.exists() && !is_our_shim(&path) {
            let backup = dir.join(format!("{}{}", stage.hook_name(), BACKUP_SUFFIX));
            fs::rename(&path, &backup).map_err(|source| InstallError::Backup {
                path: path.display().to_string(),
                source,
            })?;
            info!("Backed up existing {} hook to {}", stage.hook_name(), backup.display());
        }

        fs::write(&path, shim_content(*stage)).map_err(|source| InstallError::WriteShim {
            path: path.display().to_string(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).map_err(|source| {
                InstallError::WriteShim {
                    path: path.display().to_string(),
                    source,
                }
            })?;
        }

        info!("Installed {} hook", stage.hook_name());
    }

    Ok(())
}

/// Remove our shims for the given stages (all three when empty), restoring
/// any backups taken at install time.
pub fn uninstall_hooks(repo: &Repository, stages: &[HookStage]) -> Result<(), InstallError> {
    let stages = if stages.is_empty() { HookStage::all() } else { stages };
    let dir = hooks_dir(repo);

    for stage in stages {
        let path = dir.join(stage.hook_name());

        if path.exists() && is_our_shim(&path) {
            fs::remove_file(&path).map_err(|source| InstallError::RemoveShim {
                path: path.display().to_string(),
                source,
            })?;
            info!("Removed {} hook", stage.hook_name());
        }

        let backup = dir.join(format!("{}{}", stage.hook_name(), BACKUP_SUFFIX));
        if backup.exists() && !path.exists() {
            fs::rename(&backup, &path).map_err(|source| InstallError::Backup {
                path: backup.display().to_string(),
                source,
            })?;
            info!("Restored backed-up {} hook", stage.hook_name());
        }
    }

    Ok(())
}

/// Installation status of every lifecycle hook.
pub fn hook_status(repo: &Repository) -> Vec<(HookStage, HookStatus)> {
    let dir = hooks_dir(repo);

    HookStage::all()
        .iter()
        .map(|stage| {
            let path = dir.join(stage.hook_name());
            let status = if !path.exists() {
                HookStatus::NotInstalled
            } else if is_our_shim(&path) {
                HookStatus::Installed
            } else {
                HookStatus::Foreign
            };
            (*stage, status)
        })
        .collect()
}

fn is_our_shim(path: &std::path::Path) -> bool {
    fs::read_to_string(path)
        .map(|content| content.contains(SHIM_MARKER))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_install_writes_all_three_shims() {
        let (_dir, repo) = test_repo();
        install_hooks(&repo, &[]).unwrap();

        for (stage, status) in hook_status(&repo) {
            assert_eq!(status, HookStatus::Installed, "{} not installed", stage.hook_name());
        }
    }

    #[test]
    fn test_shim_invokes_stage_and_always_exits_zero() {
        let (_dir, repo) = test_repo();
        install_hooks(&repo, &[HookStage::PreStage]).unwrap();

        let content =
            fs::read_to_string(hooks_dir(&repo).join("pre-commit")).unwrap();
        assert!(content.contains("epigram hook run pre-commit"));
        assert!(content.contains("exit 0"));
        assert!(content.contains("|| true"));
    }

    #[cfg(unix)]
    #[test]
    fn test_shim_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, repo) = test_repo();
        install_hooks(&repo, &[HookStage::PreStage]).unwrap();

        let mode = fs::metadata(hooks_dir(&repo).join("pre-commit"))
            .unwrap()
            .permissions()
            .mode();
        assert_ne!(mode & 0o111, 0);
    }

    #[test]
    fn test_foreign_hook_is_backed_up_and_restored() {
        let (_dir, repo) = test_repo();
        let dir = hooks_dir(&repo);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("pre-commit"), "#!/bin/sh\necho mine\n").unwrap();

        install_hooks(&repo, &[HookStage::PreStage]).unwrap();
        assert!(dir.join("pre-commit.backup").exists());
        assert_eq!(
            hook_status(&repo)[0].1,
            HookStatus::Installed
        );

        uninstall_hooks(&repo, &[HookStage::PreStage]).unwrap();
        let restored = fs::read_to_string(dir.join("pre-commit")).unwrap();
        assert!(restored.contains("echo mine"));
        assert!(!dir.join("pre-commit.backup").exists());
    }

    #[test]
    fn test_uninstall_leaves_foreign_hooks_alone() {
        let (_dir, repo) = test_repo();
        let dir = hooks_dir(&repo);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("commit-msg"), "#!/bin/sh\necho foreign\n").unwrap();

        uninstall_hooks(&repo, &[HookStage::MessageValidation]).unwrap();
        assert!(dir.join("commit-msg").exists());
    }

    #[test]
    fn test_reinstall_does_not_back_up_our_own_shim() {
        let (_dir, repo) = test_repo();
        install_hooks(&repo, &[HookStage::PreStage]).unwrap();
        install_hooks(&repo, &[HookStage::PreStage]).unwrap();
        assert!(!hooks_dir(&repo).join("pre-commit.backup").exists());
    }
}

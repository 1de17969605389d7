// src/sync.rs

use crate::error::{DevlogError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// A directory the store file is copied into.
    Local(PathBuf),
    /// A git remote; the store is committed and pushed from a working copy.
    Remote(String),
}

impl SyncTarget {
    pub fn parse(destination: &str) -> Self {
        let d = destination.trim();
        let scp_like =
            d.starts_with("git@") || (d.contains('@') && d.contains(':') && !d.starts_with('/'));
        if d.contains("://") || scp_like {
            SyncTarget::Remote(d.to_string())
        } else {
            SyncTarget::Local(PathBuf::from(d))
        }
    }
}

/// What a successful sync did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Copied(PathBuf),
    Pushed { remote: String, committed: bool },
}

/// 备份数据库文件到本地目录或 git 仓库
pub fn sync_store(db_path: &Path, destination: &str, workdir: &Path) -> Result<SyncOutcome> {
    if !db_path.is_file() {
        return Err(DevlogError::Sync(format!(
            "log store {} does not exist",
            db_path.display()
        )));
    }
    match SyncTarget::parse(destination) {
        SyncTarget::Local(dir) => copy_to_dir(db_path, &dir).map(SyncOutcome::Copied),
        SyncTarget::Remote(url) => push_to_remote(db_path, &url, workdir),
    }
}

fn store_file_name(db_path: &Path) -> Result<&std::ffi::OsStr> {
    db_path
        .file_name()
        .ok_or_else(|| DevlogError::Sync(format!("{} has no file name", db_path.display())))
}

fn copy_to_dir(db_path: &Path, dir: &Path) -> Result<PathBuf> {
    let sync_err = |e: std::io::Error| DevlogError::Sync(format!("{}: {}", dir.display(), e));
    fs::create_dir_all(dir).map_err(sync_err)?;
    let target = dir.join(store_file_name(db_path)?);
    fs::copy(db_path, &target).map_err(sync_err)?;
    info!(dest = %target.display(), "log store copied");
    Ok(target)
}

fn push_to_remote(db_path: &Path, url: &str, workdir: &Path) -> Result<SyncOutcome> {
    if !workdir.join(".git").exists() {
        fs::create_dir_all(workdir)
            .map_err(|e| DevlogError::Sync(format!("{}: {}", workdir.display(), e)))?;
        // 远程仓库可能是空的，clone 失败时改为 init
        if git(workdir, &["clone", url, "."]).is_err() {
            git(workdir, &["init"])?;
            git(workdir, &["remote", "add", "origin", url])?;
        }
    } else {
        set_origin(workdir, url)?;
    }

    let file_name = store_file_name(db_path)?;
    fs::copy(db_path, workdir.join(file_name))
        .map_err(|e| DevlogError::Sync(format!("{}: {}", workdir.display(), e)))?;

    let file_arg = file_name.to_string_lossy();
    git(workdir, &["add", &*file_arg])?;

    let message = format!("DevLog backup {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    let committed = match git(workdir, &["commit", "-m", &message]) {
        Ok(_) => true,
        Err(e) => {
            let clean = git(workdir, &["status", "--porcelain"])
                .map(|out| out.trim().is_empty())
                .unwrap_or(false);
            if !clean {
                return Err(e);
            }
            debug!("nothing to commit");
            false
        }
    };

    git(workdir, &["push", "-u", "origin", "HEAD"])?;
    info!(remote = url, committed, "log store pushed");
    Ok(SyncOutcome::Pushed {
        remote: url.to_string(),
        committed,
    })
}

/// Points `origin` of an existing working copy at `url`.
fn set_origin(workdir: &Path, url: &str) -> Result<()> {
    match git(workdir, &["remote", "get-url", "origin"]) {
        Ok(current) if current.trim() == url => Ok(()),
        Ok(current) => {
            info!(from = current.trim(), to = url, "changing sync remote");
            git(workdir, &["remote", "set-url", "origin", url]).map(|_| ())
        }
        Err(_) => git(workdir, &["remote", "add", "origin", url]).map(|_| ()),
    }
}

fn git(dir: &Path, args: &[&str]) -> Result<String> {
    debug!(?args, dir = %dir.display(), "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| DevlogError::Sync(format!("cannot run git: {}", e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DevlogError::Sync(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or(""),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

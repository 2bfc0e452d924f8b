use anyhow::Result;
use std::path::{Component, Path};
use std::{env, path::PathBuf};

#[derive(Clone)]
pub struct Paths {
    pub config: PathBuf,
}

/// Resolve the pwagh configuration directory.
///
/// Uses `$XDG_CONFIG_HOME/pwagh`, falling back to `$HOME/.config/pwagh`.
pub fn pwagh_home() -> Result<PathBuf> {
    let xdg = env::var_os("XDG_CONFIG_HOME");
    let base = xdg
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env::var_os("HOME").unwrap_or_default()).join(".config"));
    Ok(base.join("pwagh"))
}

pub fn paths() -> Result<Paths> {
    let home = pwagh_home()?;
    Ok(Paths {
        config: home.join("config.toml"),
    })
}

/// Directory under the site's public storage that belongs to `project`.
///
/// Returns `None` unless `project` is exactly one plain path component, so a
/// project name can never address anything outside `<site>/public/files`.
pub fn project_public_dir(site: &Path, project: &str) -> Option<PathBuf> {
    let mut comps = Path::new(project).components();
    match (comps.next(), comps.next()) {
        (Some(Component::Normal(name)), None) => {
            Some(site.join("public").join("files").join(name))
        }
        _ => None,
    }
}

//! Configuration resolution from settings and the shell environment.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gobuild_core::{
    ConfigError, ConfigResolver, ResolveContext, ResolvedConfig, SettingSource, ShellEnvPort,
};
use tracing::debug;

/// Resolves values from the settings file first, then the shell.
///
/// A `PATH` from settings is searched before the shell `PATH` and is
/// prepended to it in the resolved environment.
pub struct EnvConfigResolver {
    overrides: HashMap<String, String>,
    shell: Arc<dyn ShellEnvPort>,
}

impl EnvConfigResolver {
    pub fn new(overrides: HashMap<String, String>, shell: Arc<dyn ShellEnvPort>) -> Self {
        Self { overrides, shell }
    }

    fn merged_env(&self) -> HashMap<String, String> {
        let (_, mut env) = self.shell.shell_env_and_path();
        for (name, value) in &self.overrides {
            if name == "PATH" {
                let combined = match env.get("PATH") {
                    Some(shell_path) if !shell_path.is_empty() => prepend_path(value, shell_path),
                    _ => value.clone(),
                };
                env.insert(name.clone(), combined);
            } else {
                env.insert(name.clone(), value.clone());
            }
        }
        env
    }
}

fn prepend_path(first: &str, rest: &str) -> String {
    let dirs: Vec<PathBuf> = env::split_paths(first)
        .chain(env::split_paths(rest))
        .collect();
    env::join_paths(dirs).map_or_else(
        |_| first.to_string(),
        |joined| joined.to_string_lossy().into_owned(),
    )
}

fn locate(executable: &str, path: Option<&str>, cwd: &Path) -> Option<PathBuf> {
    let candidate = Path::new(executable);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    which::which_in(executable, path, cwd).ok()
}

fn check_goroot(env: &HashMap<String, String>) -> Result<(), ConfigError> {
    match env.get("GOROOT") {
        Some(goroot) if !Path::new(goroot).is_dir() => Err(ConfigError::GoRootNotFound(format!(
            "The GOROOT environment variable value \"{goroot}\" does not exist on the filesystem"
        ))),
        _ => Ok(()),
    }
}

fn check_gopath(env: &HashMap<String, String>) -> Result<(), ConfigError> {
    let Some(gopath) = env.get("GOPATH") else {
        return Ok(());
    };
    if env::split_paths(gopath).any(|dir| dir.is_dir()) {
        Ok(())
    } else {
        Err(ConfigError::GoPathNotFound(format!(
            "None of the directories in the GOPATH environment variable value \"{gopath}\" exist on the filesystem"
        )))
    }
}

impl ConfigResolver for EnvConfigResolver {
    fn resolve(
        &self,
        executable: &str,
        required: &[&str],
        optional: &[&str],
        ctx: &ResolveContext,
    ) -> Result<ResolvedConfig, ConfigError> {
        let env = self.merged_env();

        let missing: Vec<String> = required
            .iter()
            .filter(|name| env.get(**name).is_none_or(String::is_empty))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::EnvVarMissing { missing });
        }

        let cwd = ctx
            .active_file
            .as_deref()
            .and_then(Path::parent)
            .or_else(|| ctx.folders.first().map(PathBuf::as_path))
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let executable_path = locate(executable, env.get("PATH").map(String::as_str), &cwd)
            .ok_or_else(|| ConfigError::ExecutableNotFound {
                name: executable.to_string(),
            })?;

        check_goroot(&env)?;
        check_gopath(&env)?;

        let present: Vec<&str> = optional
            .iter()
            .copied()
            .filter(|name| env.contains_key(*name))
            .collect();
        debug!(executable = %executable_path.display(), optional = ?present, "Resolved configuration");

        Ok(ResolvedConfig {
            executable: executable_path,
            env,
        })
    }

    fn setting_value(&self, name: &str, _ctx: &ResolveContext) -> Option<(String, SettingSource)> {
        if let Some(value) = self.overrides.get(name) {
            return Some((value.clone(), SettingSource::PluginSettings));
        }
        let (_, env) = self.shell.shell_env_and_path();
        env.get(name)
            .map(|value| (value.clone(), SettingSource::ShellEnvironment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedShell(HashMap<String, String>);

    impl ShellEnvPort for FixedShell {
        fn shell_env_and_path(&self) -> (PathBuf, HashMap<String, String>) {
            (PathBuf::from("/bin/sh"), self.0.clone())
        }
    }

    fn resolver(overrides: &[(&str, &str)], shell: &[(&str, &str)]) -> EnvConfigResolver {
        let to_map = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<HashMap<_, _>>()
        };
        EnvConfigResolver::new(to_map(overrides), Arc::new(FixedShell(to_map(shell))))
    }

    #[test]
    fn test_setting_value_prefers_settings() {
        let resolver = resolver(
            &[("GOPATH", "/settings/go")],
            &[("GOPATH", "/shell/go"), ("GOOS", "linux")],
        );
        let ctx = ResolveContext::default();
        assert_eq!(
            resolver.setting_value("GOPATH", &ctx),
            Some(("/settings/go".to_string(), SettingSource::PluginSettings))
        );
        assert_eq!(
            resolver.setting_value("GOOS", &ctx),
            Some(("linux".to_string(), SettingSource::ShellEnvironment))
        );
        assert_eq!(resolver.setting_value("GOARCH", &ctx), None);
    }

    #[test]
    fn test_missing_required_vars() {
        let resolver = resolver(&[], &[("PATH", "/usr/bin")]);
        let err = resolver
            .resolve("go", &["GOPATH"], &[], &ResolveContext::default())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::EnvVarMissing {
                missing: vec!["GOPATH".to_string()]
            }
        );
    }

    #[test]
    fn test_executable_not_found() {
        let empty = TempDir::new().unwrap();
        let path = empty.path().to_string_lossy().into_owned();
        let resolver = resolver(&[], &[("PATH", path.as_str())]);
        let err = resolver
            .resolve("go", &[], &[], &ResolveContext::default())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::ExecutableNotFound {
                name: "go".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_go_from_settings_path() {
        use std::os::unix::fs::PermissionsExt;

        let bin = TempDir::new().unwrap();
        let go = bin.path().join("go");
        std::fs::write(&go, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&go, std::fs::Permissions::from_mode(0o755)).unwrap();
        let gopath = TempDir::new().unwrap();

        let bin_dir = bin.path().to_string_lossy().into_owned();
        let gopath_dir = gopath.path().to_string_lossy().into_owned();
        let resolver = resolver(
            &[("PATH", bin_dir.as_str()), ("GOPATH", gopath_dir.as_str())],
            &[("PATH", "/nonexistent/bin"), ("HOME", "/home/me")],
        );

        let resolved = resolver
            .resolve("go", &["GOPATH"], &["GOROOT"], &ResolveContext::default())
            .unwrap();
        assert_eq!(resolved.executable, go);
        assert_eq!(resolved.env["PATH"], format!("{bin_dir}:/nonexistent/bin"));
        assert_eq!(resolved.env["HOME"], "/home/me");
    }

    #[test]
    fn test_gopath_and_goroot_must_exist() {
        let missing = HashMap::from([("GOPATH".to_string(), "/nonexistent/gopath".to_string())]);
        assert!(matches!(check_gopath(&missing), Err(ConfigError::GoPathNotFound(_))));

        let missing = HashMap::from([("GOROOT".to_string(), "/nonexistent/goroot".to_string())]);
        assert!(matches!(check_goroot(&missing), Err(ConfigError::GoRootNotFound(_))));

        assert!(check_gopath(&HashMap::new()).is_ok());
    }
}

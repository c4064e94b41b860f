//! Go task planning.
//!
//! Turns a task request (`build`, `run`, `cross_compile`, ...) plus configured
//! flags into the argument vector and environment handed to the supervisor.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TaskError;

/// Environment variables read from settings for every Go subprocess and listed
/// in output headers when present.
pub const GO_ENV_VARS: &[&str] = &[
    "GOPATH",
    "GOROOT",
    "GOROOT_FINAL",
    "GOBIN",
    "GOHOSTOS",
    "GOHOSTARCH",
    "GOOS",
    "GOARCH",
    "GOARM",
    "GO386",
    "GORACE",
];

/// Flags used when no `<task>:flags` setting is configured.
pub const DEFAULT_FLAGS: &[&str] = &["-v"];

/// `(GOOS, GOARCH)` pairs offered for cross compilation.
pub const CROSS_COMPILE_TARGETS: &[(&str, &str)] = &[
    ("darwin", "386"),
    ("darwin", "amd64"),
    ("darwin", "arm"),
    ("darwin", "arm64"),
    ("dragonfly", "amd64"),
    ("freebsd", "386"),
    ("freebsd", "amd64"),
    ("freebsd", "arm"),
    ("linux", "386"),
    ("linux", "amd64"),
    ("linux", "arm"),
    ("linux", "arm64"),
    ("linux", "ppc64"),
    ("linux", "ppc64le"),
    ("netbsd", "386"),
    ("netbsd", "amd64"),
    ("netbsd", "arm"),
    ("openbsd", "386"),
    ("openbsd", "amd64"),
    ("openbsd", "arm"),
    ("plan9", "386"),
    ("plan9", "amd64"),
    ("solaris", "amd64"),
    ("windows", "386"),
    ("windows", "amd64"),
];

/// Quick-panel labels for [`CROSS_COMPILE_TARGETS`], index-aligned.
pub fn cross_compile_labels() -> Vec<String> {
    CROSS_COMPILE_TARGETS
        .iter()
        .map(|(os, arch)| format!("OS: {os}, ARCH: {arch}"))
        .collect()
}

/// A task the plugin can run against the `go` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTask {
    Build,
    Test,
    Benchmark,
    Install,
    Clean,
    Run,
    CrossCompile,
    Get,
}

impl BuildTask {
    pub const ALL: [Self; 8] = [
        Self::Build,
        Self::Test,
        Self::Benchmark,
        Self::Install,
        Self::Clean,
        Self::Run,
        Self::CrossCompile,
        Self::Get,
    ];

    /// Task label used in settings keys and completion records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Test => "test",
            Self::Benchmark => "benchmark",
            Self::Install => "install",
            Self::Clean => "clean",
            Self::Run => "run",
            Self::CrossCompile => "cross_compile",
            Self::Get => "get",
        }
    }

    /// The `go` subcommand this task executes.
    pub const fn go_subcommand(self) -> &'static str {
        match self {
            Self::Benchmark => "test",
            Self::CrossCompile => "build",
            other => other.as_str(),
        }
    }

    /// Settings key holding this task's flags, e.g. `build:flags`.
    pub fn flags_key(self) -> String {
        format!("{}:flags", self.as_str())
    }
}

impl fmt::Display for BuildTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildTask {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| TaskError::UnknownTask(s.to_string()))
    }
}

/// Host-provided inputs some tasks need.
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    /// File open in the active view; appended to `run` when no flag names a file.
    pub active_file: Option<PathBuf>,
    /// `(GOOS, GOARCH)` chosen for `cross_compile`.
    pub platform: Option<(String, String)>,
    /// Package URL for `get`.
    pub url: Option<String>,
}

/// A fully resolved invocation ready for the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlan {
    pub task: BuildTask,
    /// `[go_bin, subcommand, flags..., extra...]`
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

/// Build the argument vector and environment for `task`.
///
/// `flags` is the configured flag list; `None` falls back to [`DEFAULT_FLAGS`].
pub fn plan_task(
    task: BuildTask,
    go_bin: &str,
    flags: Option<Vec<String>>,
    mut env: HashMap<String, String>,
    opts: &TaskOptions,
) -> Result<TaskPlan, TaskError> {
    let mut flags =
        flags.unwrap_or_else(|| DEFAULT_FLAGS.iter().map(ToString::to_string).collect());
    let mut extra = Vec::new();

    match task {
        BuildTask::Run => {
            flags = resolve_run_flags(
                flags,
                env.get("GOPATH").map(String::as_str),
                opts.active_file.as_deref(),
            )?;
        }
        BuildTask::Benchmark => ensure_bench_flag(&mut flags),
        BuildTask::CrossCompile => {
            let (os, arch) = opts.platform.clone().ok_or(TaskError::MissingPlatform)?;
            if !CROSS_COMPILE_TARGETS
                .iter()
                .any(|(o, a)| *o == os && *a == arch)
            {
                return Err(TaskError::UnsupportedPlatform { os, arch });
            }
            env.insert("GOOS".to_string(), os);
            env.insert("GOARCH".to_string(), arch);
        }
        BuildTask::Get => {
            let url = opts.url.clone().ok_or(TaskError::MissingUrl)?;
            extra.push(url);
        }
        BuildTask::Build | BuildTask::Test | BuildTask::Install | BuildTask::Clean => {}
    }

    let mut args = Vec::with_capacity(2 + flags.len() + extra.len());
    args.push(go_bin.to_string());
    args.push(task.go_subcommand().to_string());
    args.extend(flags);
    args.extend(extra);

    debug!(task = %task, args = ?args, "Planned go invocation");
    Ok(TaskPlan { task, args, env })
}

/// Default `go test` to running every benchmark.
///
/// Appends `-bench=.` unless a `-bench` or `-bench=<re>` flag is already
/// present. `-benchmem` and `-benchtime` do not count.
pub fn ensure_bench_flag(flags: &mut Vec<String>) {
    let found = flags
        .iter()
        .any(|flag| flag == "-bench" || flag.starts_with("-bench="));
    if !found {
        flags.push("-bench=.".to_string());
    }
}

/// Make sure `go run` receives a file to run.
///
/// A `.go` flag that exists as given is kept. One that only exists relative
/// to `<gopath>/src` for an entry of `GOPATH` is rewritten to that absolute
/// path, since `go run` does not accept such paths. If no flag names a file,
/// `active_file` is appended.
pub fn resolve_run_flags(
    flags: Vec<String>,
    gopath: Option<&str>,
    active_file: Option<&Path>,
) -> Result<Vec<String>, TaskError> {
    let gopaths: Vec<PathBuf> = gopath
        .map(|value| std::env::split_paths(value).collect())
        .unwrap_or_default();

    let mut found_filename = false;
    let mut resolved = Vec::with_capacity(flags.len() + 1);

    for flag in flags {
        if found_filename || !has_go_extension(&flag) {
            resolved.push(flag);
            continue;
        }

        if Path::new(&flag).is_file() {
            found_filename = true;
            resolved.push(flag);
            continue;
        }

        let rewritten = gopaths
            .iter()
            .map(|gopath| gopath.join("src").join(&flag))
            .find(|candidate| candidate.is_file());
        match rewritten {
            Some(path) => {
                found_filename = true;
                resolved.push(path.to_string_lossy().into_owned());
            }
            None => resolved.push(flag),
        }
    }

    if !found_filename {
        let file = active_file.ok_or(TaskError::MissingRunFile)?;
        resolved.push(file.to_string_lossy().into_owned());
    }

    Ok(resolved)
}

fn has_go_extension(flag: &str) -> bool {
    Path::new(flag)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("go"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_task_parse_and_display() {
        for task in BuildTask::ALL {
            assert_eq!(task.as_str().parse::<BuildTask>().unwrap(), task);
        }
        assert_eq!(
            "deploy".parse::<BuildTask>(),
            Err(TaskError::UnknownTask("deploy".to_string()))
        );
        assert_eq!(BuildTask::CrossCompile.to_string(), "cross_compile");
        assert_eq!(BuildTask::Get.flags_key(), "get:flags");
    }

    #[test]
    fn test_go_subcommand_mapping() {
        assert_eq!(BuildTask::Benchmark.go_subcommand(), "test");
        assert_eq!(BuildTask::CrossCompile.go_subcommand(), "build");
        assert_eq!(BuildTask::Clean.go_subcommand(), "clean");
    }

    #[test]
    fn test_plan_build_uses_default_flags() {
        let plan = plan_task(
            BuildTask::Build,
            "/usr/bin/go",
            None,
            HashMap::new(),
            &TaskOptions::default(),
        )
        .unwrap();
        assert_eq!(plan.args, strings(&["/usr/bin/go", "build", "-v"]));
    }

    #[test]
    fn test_ensure_bench_flag() {
        let mut flags = strings(&["-v", "-benchmem"]);
        ensure_bench_flag(&mut flags);
        assert_eq!(flags, strings(&["-v", "-benchmem", "-bench=."]));

        let mut flags = strings(&["-bench", "Foo"]);
        ensure_bench_flag(&mut flags);
        assert_eq!(flags, strings(&["-bench", "Foo"]));

        let mut flags = strings(&["-bench=Bar"]);
        ensure_bench_flag(&mut flags);
        assert_eq!(flags, strings(&["-bench=Bar"]));
    }

    #[test]
    fn test_plan_benchmark_runs_go_test() {
        let plan = plan_task(
            BuildTask::Benchmark,
            "go",
            Some(vec![]),
            HashMap::new(),
            &TaskOptions::default(),
        )
        .unwrap();
        assert_eq!(plan.args, strings(&["go", "test", "-bench=."]));
    }

    #[test]
    fn test_plan_cross_compile_sets_platform_env() {
        let opts = TaskOptions {
            platform: Some(("linux".to_string(), "arm64".to_string())),
            ..TaskOptions::default()
        };
        let plan =
            plan_task(BuildTask::CrossCompile, "go", None, HashMap::new(), &opts).unwrap();
        assert_eq!(plan.args, strings(&["go", "build", "-v"]));
        assert_eq!(plan.env.get("GOOS").map(String::as_str), Some("linux"));
        assert_eq!(plan.env.get("GOARCH").map(String::as_str), Some("arm64"));
    }

    #[test]
    fn test_plan_cross_compile_rejects_unknown_platform() {
        let opts = TaskOptions {
            platform: Some(("haiku".to_string(), "amd64".to_string())),
            ..TaskOptions::default()
        };
        let err =
            plan_task(BuildTask::CrossCompile, "go", None, HashMap::new(), &opts).unwrap_err();
        assert!(matches!(err, TaskError::UnsupportedPlatform { .. }));

        let err = plan_task(
            BuildTask::CrossCompile,
            "go",
            None,
            HashMap::new(),
            &TaskOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, TaskError::MissingPlatform);
    }

    #[test]
    fn test_cross_compile_labels() {
        let labels = cross_compile_labels();
        assert_eq!(labels.len(), 25);
        assert_eq!(labels[0], "OS: darwin, ARCH: 386");
        assert_eq!(labels[24], "OS: windows, ARCH: amd64");
    }

    #[test]
    fn test_plan_get_appends_url_after_flags() {
        let opts = TaskOptions {
            url: Some("github.com/pkg/errors".to_string()),
            ..TaskOptions::default()
        };
        let plan = plan_task(
            BuildTask::Get,
            "go",
            Some(strings(&["-u"])),
            HashMap::new(),
            &opts,
        )
        .unwrap();
        assert_eq!(plan.args, strings(&["go", "get", "-u", "github.com/pkg/errors"]));

        let err = plan_task(
            BuildTask::Get,
            "go",
            None,
            HashMap::new(),
            &TaskOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, TaskError::MissingUrl);
    }

    #[test]
    fn test_run_appends_active_file() {
        let flags = resolve_run_flags(
            strings(&["-v"]),
            None,
            Some(Path::new("/work/main.go")),
        )
        .unwrap();
        assert_eq!(flags, strings(&["-v", "/work/main.go"]));

        let err = resolve_run_flags(strings(&["-v"]), None, None).unwrap_err();
        assert_eq!(err, TaskError::MissingRunFile);
    }

    #[test]
    fn test_run_keeps_existing_file_flag() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("hello.go");
        fs::write(&file, "package main\n").unwrap();
        let file_flag = file.to_string_lossy().into_owned();

        let flags = resolve_run_flags(
            vec!["-v".to_string(), file_flag.clone()],
            None,
            Some(Path::new("/other/main.go")),
        )
        .unwrap();
        assert_eq!(flags, vec!["-v".to_string(), file_flag]);
    }

    #[test]
    fn test_run_rewrites_gopath_relative_file() {
        let gopath = TempDir::new().unwrap();
        let pkg = gopath.path().join("src").join("example.com").join("hello");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("main.go"), "package main\n").unwrap();

        let gopath_value = gopath.path().to_string_lossy().into_owned();
        let flags = resolve_run_flags(
            strings(&["example.com/hello/main.go"]),
            Some(&gopath_value),
            None,
        )
        .unwrap();
        assert_eq!(
            flags,
            vec![pkg.join("main.go").to_string_lossy().into_owned()]
        );
    }
}

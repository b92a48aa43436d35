// Launch command building (pure, no I/O)

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::catalog::CompatLayer;
use crate::launch::types::LaunchRequest;

/// Program, arguments, working directory and full environment of a launch.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// A `Command` with exactly this environment; nothing is inherited.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.current_dir(&self.cwd);
        cmd.env_clear();
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd
    }

    pub fn display_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// `wine <exe>` or `<proton runner> run <exe>`, run from the executable's
/// directory. `executable` should already be absolute.
pub fn command_spec(
    request: &LaunchRequest,
    executable: &Path,
    env: Vec<(String, String)>,
) -> CommandSpec {
    let (program, mut args) = match &request.compat {
        CompatLayer::Wine => (request.wine_binary.clone(), Vec::new()),
        CompatLayer::Proton { runner, .. } => (runner.clone(), vec![OsString::from("run")]),
    };
    args.push(executable.as_os_str().to_owned());

    let cwd = executable
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));

    CommandSpec {
        program,
        args,
        cwd,
        env,
    }
}

/// Whether an environment variable is worth showing in the launch banner.
fn is_relevant_env(key: &str, request: &LaunchRequest) -> bool {
    key.starts_with("WINE")
        || key == "DISPLAY"
        || key.starts_with("STEAM_COMPAT")
        || key.starts_with("DXVK")
        || key.starts_with("PROTON")
        || key == "MANGOHUD"
        || request.launch_options.contains_key(key)
        || request.global_env.contains_key(key)
}

/// Human-readable launch summary, one entry per line.
pub fn launch_banner(request: &LaunchRequest, spec: &CommandSpec) -> Vec<String> {
    let mut lines = vec![
        format!("=== Launching {} ===", request.game_name),
        format!("Executable: {}", request.executable.display()),
        format!("Working Directory: {}", spec.cwd.display()),
        format!("Wine Prefix: {}", request.prefix.display()),
        format!("Compatibility Layer: {}", request.compat.label()),
        String::new(),
        "=== Environment Variables ===".to_string(),
    ];

    for (key, value) in &spec.env {
        if is_relevant_env(key, request) {
            lines.push(format!("  {}={}", key, value));
        }
    }
    if !request.launch_options.is_empty() {
        lines.push(format!(
            "Custom launch options: {} variable(s)",
            request.launch_options.len()
        ));
    }

    lines.push(String::new());
    lines.push(format!("Command: {}", spec.display_line()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn request(compat: CompatLayer) -> LaunchRequest {
        LaunchRequest {
            game_name: "Foo".to_string(),
            executable: "/games/foo/foo.exe".into(),
            prefix: "/prefixes/p1".into(),
            compat,
            verbose: false,
            launch_options: BTreeMap::new(),
            global_env: BTreeMap::new(),
            display: None,
            wine_binary: "wine".into(),
            wine_log_level: None,
            wineserver_cleanup: false,
        }
    }

    fn args(spec: &CommandSpec) -> Vec<String> {
        spec.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    // ── command_spec ──

    #[test]
    fn wine_invocation() {
        let req = request(CompatLayer::Wine);
        let spec = command_spec(&req, Path::new("/games/foo/foo.exe"), vec![]);
        assert_eq!(spec.program, PathBuf::from("wine"));
        assert_eq!(args(&spec), vec!["/games/foo/foo.exe"]);
        assert_eq!(spec.cwd, PathBuf::from("/games/foo"));
    }

    #[test]
    fn proton_invocation() {
        let req = request(CompatLayer::Proton {
            name: None,
            install_dir: "/steam/Proton".into(),
            runner: "/steam/Proton/proton".into(),
        });
        let spec = command_spec(&req, Path::new("/games/foo/foo.exe"), vec![]);
        assert_eq!(spec.program, PathBuf::from("/steam/Proton/proton"));
        assert_eq!(args(&spec), vec!["run", "/games/foo/foo.exe"]);
        assert_eq!(spec.display_line(), "/steam/Proton/proton run /games/foo/foo.exe");
    }

    #[test]
    fn command_uses_exact_environment() {
        let env = vec![("WINEPREFIX".to_string(), "/prefixes/p1".to_string())];
        let spec = command_spec(&request(CompatLayer::Wine), Path::new("/games/foo/foo.exe"), env);
        let cmd = spec.to_command();

        let envs: Vec<_> = cmd
            .get_envs()
            .map(|(k, v)| (k.to_owned(), v.map(|v| v.to_owned())))
            .collect();
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].0, "WINEPREFIX");
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/games/foo")));
    }

    // ── launch_banner ──

    #[test]
    fn banner_lists_relevant_env_only() {
        let mut req = request(CompatLayer::Wine);
        req.launch_options.insert("MY_FLAG".to_string(), "1".to_string());
        let env = vec![
            ("HOME".to_string(), "/home/user".to_string()),
            ("MY_FLAG".to_string(), "1".to_string()),
            ("WINEPREFIX".to_string(), "/prefixes/p1".to_string()),
        ];
        let spec = command_spec(&req, Path::new("/games/foo/foo.exe"), env);
        let banner = launch_banner(&req, &spec);

        assert_eq!(banner[0], "=== Launching Foo ===");
        assert!(banner.contains(&"  WINEPREFIX=/prefixes/p1".to_string()));
        assert!(banner.contains(&"  MY_FLAG=1".to_string()));
        assert!(!banner.iter().any(|l| l.contains("HOME=")));
        assert!(banner.contains(&"Compatibility Layer: Wine (default)".to_string()));
        assert_eq!(banner.last().unwrap(), "Command: wine /games/foo/foo.exe");
    }
}

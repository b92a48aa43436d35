// Prune rules for the prefix walk (pure)

/// Directory names never descended into during a mount walk.
///
/// Virtual filesystems, system trees, caches, VCS metadata, build output and
/// the Windows trees inside prefixes themselves.
pub const DEFAULT_PRUNE: &[&str] = &[
    "proc",
    "sys",
    "dev",
    "run",
    "tmp",
    "snap",
    "var",
    "boot",
    "srv",
    "lost+found",
    "node_modules",
    "__pycache__",
    "venv",
    "virtualenv",
    "site-packages",
    "target",
    "Windows",
    "windows",
    "Program Files",
    "Program Files (x86)",
    "dosdevices",
    "drive_c",
];

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Proton distributions are recognised by name, case-insensitively.
pub fn looks_like_proton(dir_name: &str) -> bool {
    dir_name.to_lowercase().contains("proton")
}

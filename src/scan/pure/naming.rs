// Display names for discovered prefixes

/// `"Proton - <appid dir>"`, the name shown for a compatdata prefix.
pub fn prefix_display_name(compat_dir_name: &str) -> String {
    format!("Proton - {}", compat_dir_name)
}

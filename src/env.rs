//! Compositor detection from the session environment.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositor {
    Hyprland,
    /// Sway and anything advertising itself the same way.
    SwayLike,
    Unknown,
}

impl fmt::Display for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Compositor::Hyprland => "hyprland",
            Compositor::SwayLike => "sway",
            Compositor::Unknown => "unknown",
        })
    }
}

/// Classifies the running compositor from the process environment.
pub fn classify() -> Compositor {
    classify_with(|key| std::env::var(key).ok())
}

/// Classification against an arbitrary variable lookup. First matching rule
/// wins: Hyprland signature, Sway socket, then `XDG_CURRENT_DESKTOP`.
pub fn classify_with<F>(lookup: F) -> Compositor
where
    F: Fn(&str) -> Option<String>,
{
    let is_set = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());

    if is_set("HYPRLAND_INSTANCE_SIGNATURE") {
        return Compositor::Hyprland;
    }
    if is_set("SWAYSOCK") {
        return Compositor::SwayLike;
    }

    let desktop = lookup("XDG_CURRENT_DESKTOP")
        .unwrap_or_default()
        .to_lowercase();
    if desktop.contains("hyprland") {
        Compositor::Hyprland
    } else if desktop.contains("sway") {
        Compositor::SwayLike
    } else {
        Compositor::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn classify_map(vars: &[(&str, &str)]) -> Compositor {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        classify_with(|key| map.get(key).cloned())
    }

    #[test]
    fn hyprland_signature_wins() {
        assert_eq!(
            classify_map(&[
                ("HYPRLAND_INSTANCE_SIGNATURE", "abc_123"),
                ("SWAYSOCK", "/run/user/1000/sway-ipc.sock"),
                ("XDG_CURRENT_DESKTOP", "sway"),
            ]),
            Compositor::Hyprland
        );
    }

    #[test]
    fn sway_socket_before_desktop_name() {
        assert_eq!(
            classify_map(&[
                ("SWAYSOCK", "/run/user/1000/sway-ipc.sock"),
                ("XDG_CURRENT_DESKTOP", "Hyprland"),
            ]),
            Compositor::SwayLike
        );
    }

    #[test]
    fn desktop_name_is_case_insensitive() {
        assert_eq!(classify_map(&[("XDG_CURRENT_DESKTOP", "HYPRLAND")]), Compositor::Hyprland);
        assert_eq!(classify_map(&[("XDG_CURRENT_DESKTOP", "Sway:wlroots")]), Compositor::SwayLike);
    }

    #[test]
    fn empty_values_do_not_count() {
        assert_eq!(
            classify_map(&[("HYPRLAND_INSTANCE_SIGNATURE", ""), ("SWAYSOCK", "")]),
            Compositor::Unknown
        );
    }

    #[test]
    fn unknown_desktops() {
        assert_eq!(classify_map(&[]), Compositor::Unknown);
        assert_eq!(classify_map(&[("XDG_CURRENT_DESKTOP", "GNOME")]), Compositor::Unknown);
    }
}

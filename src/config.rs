use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Log each step to stderr.
    pub trace: bool,
    /// Where to write the JSON result, if anywhere.
    pub meta_path: Option<String>,
}

impl Config {
    /// Load config from a `key: value` file, then apply env overrides.
    pub fn load_from(path: &Path) -> Self {
        let mut cfg = Self::default();
        if let Ok(content) = std::fs::read_to_string(path) {
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once(':') {
                    let value = value.trim();
                    match key.trim() {
                        "trace" => cfg.trace = parse_flag(value),
                        "meta_path" if !value.is_empty() => {
                            cfg.meta_path = Some(expand_tilde(value));
                        }
                        _ => {} // Unknown keys are ignored
                    }
                }
            }
        }
        cfg.apply_env_overrides();
        cfg
    }

    /// Load config from env overrides only (no file).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    /// Load from the file named by `MICROSHELL_CONFIG` if it exists, plus env.
    pub fn load() -> Self {
        match std::env::var("MICROSHELL_CONFIG") {
            Ok(p) if Path::new(&expand_tilde(&p)).exists() => {
                Self::load_from(Path::new(&expand_tilde(&p)))
            }
            _ => Self::from_env(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MICROSHELL_TRACE") {
            self.trace = parse_flag(&v);
        }
        if let Ok(v) = std::env::var("MICROSHELL_META") {
            if !v.is_empty() {
                self.meta_path = Some(expand_tilde(&v));
            }
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !["0", "false", "no", "off"].contains(&value.to_lowercase().as_str())
}

/// Expand ~ to home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") || path == "~" {
        if let Ok(home) = std::env::var("HOME") {
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "contactr.log";
const APP_NAME: &str = "contactr";

pub const BASE_URL_ENV: &str = "CONTACTR_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// File the settings were read from, if one existed.
    pub config_path: Option<PathBuf>,
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub log_file: PathBuf,
    pub keys: Keys,
    pub ui: UiConfig,
    /// Non-fatal problems found while loading, reported once logging is up.
    pub warnings: Vec<String>,
}

/// Where settings come from besides the file itself.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub env_base_url: Option<String>,
}

impl Overrides {
    pub fn from_env(config_path: Option<PathBuf>, base_url: Option<String>) -> Self {
        Self {
            config_path,
            base_url,
            env_base_url: std::env::var(BASE_URL_ENV).ok(),
        }
    }
}

/// Expand ~ to home directory in paths
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub colors: UiColors,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub header: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub error_fg: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone, Default)]
pub struct Keys {
    /// Keys active whenever no overlay or text input has focus
    pub global: GlobalKeys,
    /// Keys for the search input
    pub search: SearchKeys,
    /// Keys for the contact table
    pub list: ListKeys,
    /// Keys inside the contact form
    pub form: FormKeys,
    /// Keys for confirmation and read-only dialogs
    pub modal: ModalKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub quit: Vec<String>,
    pub search: Vec<String>,
    pub help: Vec<String>,
    pub new: Vec<String>,
    pub reload: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SearchKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ListKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub view: Vec<String>,
    pub edit: Vec<String>,
    pub delete: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FormKeys {
    pub next_field: Vec<String>,
    pub prev_field: Vec<String>,
    pub submit: Vec<String>,
    pub cancel: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModalKeys {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: vec!["q".into()],
            search: vec!["/".into()],
            help: vec!["F1".into(), "?".into()],
            new: vec!["n".into()],
            reload: vec!["F5".into(), "r".into()],
        }
    }
}

impl Default for SearchKeys {
    fn default() -> Self {
        Self {
            cancel: vec!["Escape".into()],
            confirm: vec!["Enter".into(), "Tab".into(), "Down".into()],
        }
    }
}

impl Default for ListKeys {
    fn default() -> Self {
        Self {
            next: vec!["j".into(), "Down".into()],
            prev: vec!["k".into(), "Up".into()],
            view: vec!["Enter".into(), "v".into()],
            edit: vec!["e".into()],
            delete: vec!["d".into(), "x".into()],
            next_page: vec!["l".into(), "Right".into(), "PageDown".into()],
            prev_page: vec!["h".into(), "Left".into(), "PageUp".into()],
        }
    }
}

impl Default for FormKeys {
    fn default() -> Self {
        Self {
            next_field: vec!["Tab".into(), "Down".into()],
            prev_field: vec!["Backtab".into(), "Up".into()],
            submit: vec!["Enter".into()],
            cancel: vec!["Escape".into()],
        }
    }
}

impl Default for ModalKeys {
    fn default() -> Self {
        Self {
            confirm: vec!["Enter".into(), "y".into()],
            cancel: vec!["Escape".into(), "n".into(), "q".into()],
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    global: GlobalKeysFile,
    search: SearchKeysFile,
    list: ListKeysFile,
    form: FormKeysFile,
    modal: ModalKeysFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GlobalKeysFile {
    quit: KeyBinding,
    search: KeyBinding,
    help: KeyBinding,
    new: KeyBinding,
    reload: KeyBinding,
}

impl Default for GlobalKeysFile {
    fn default() -> Self {
        let defaults = GlobalKeys::default();
        Self {
            quit: KeyBinding::Multiple(defaults.quit),
            search: KeyBinding::Multiple(defaults.search),
            help: KeyBinding::Multiple(defaults.help),
            new: KeyBinding::Multiple(defaults.new),
            reload: KeyBinding::Multiple(defaults.reload),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchKeysFile {
    cancel: KeyBinding,
    confirm: KeyBinding,
}

impl Default for SearchKeysFile {
    fn default() -> Self {
        let defaults = SearchKeys::default();
        Self {
            cancel: KeyBinding::Multiple(defaults.cancel),
            confirm: KeyBinding::Multiple(defaults.confirm),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListKeysFile {
    next: KeyBinding,
    prev: KeyBinding,
    view: KeyBinding,
    edit: KeyBinding,
    delete: KeyBinding,
    next_page: KeyBinding,
    prev_page: KeyBinding,
}

impl Default for ListKeysFile {
    fn default() -> Self {
        let defaults = ListKeys::default();
        Self {
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            view: KeyBinding::Multiple(defaults.view),
            edit: KeyBinding::Multiple(defaults.edit),
            delete: KeyBinding::Multiple(defaults.delete),
            next_page: KeyBinding::Multiple(defaults.next_page),
            prev_page: KeyBinding::Multiple(defaults.prev_page),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FormKeysFile {
    next_field: KeyBinding,
    prev_field: KeyBinding,
    submit: KeyBinding,
    cancel: KeyBinding,
}

impl Default for FormKeysFile {
    fn default() -> Self {
        let defaults = FormKeys::default();
        Self {
            next_field: KeyBinding::Multiple(defaults.next_field),
            prev_field: KeyBinding::Multiple(defaults.prev_field),
            submit: KeyBinding::Multiple(defaults.submit),
            cancel: KeyBinding::Multiple(defaults.cancel),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ModalKeysFile {
    confirm: KeyBinding,
    cancel: KeyBinding,
}

impl Default for ModalKeysFile {
    fn default() -> Self {
        let defaults = ModalKeys::default();
        Self {
            confirm: KeyBinding::Multiple(defaults.confirm),
            cancel: KeyBinding::Multiple(defaults.cancel),
        }
    }
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        Self {
            global: GlobalKeys {
                quit: file.global.quit.into_vec(),
                search: file.global.search.into_vec(),
                help: file.global.help.into_vec(),
                new: file.global.new.into_vec(),
                reload: file.global.reload.into_vec(),
            },
            search: SearchKeys {
                cancel: file.search.cancel.into_vec(),
                confirm: file.search.confirm.into_vec(),
            },
            list: ListKeys {
                next: file.list.next.into_vec(),
                prev: file.list.prev.into_vec(),
                view: file.list.view.into_vec(),
                edit: file.list.edit.into_vec(),
                delete: file.list.delete.into_vec(),
                next_page: file.list.next_page.into_vec(),
                prev_page: file.list.prev_page.into_vec(),
            },
            form: FormKeys {
                next_field: file.form.next_field.into_vec(),
                prev_field: file.form.prev_field.into_vec(),
                submit: file.form.submit.into_vec(),
                cancel: file.form.cancel.into_vec(),
            },
            modal: ModalKeys {
                confirm: file.modal.confirm.into_vec(),
                cancel: file.modal.cancel.into_vec(),
            },
        }
    }
}

// =============================================================================
// Key binding validation
// =============================================================================

/// Normalize a key binding string to a canonical form for collision detection.
/// Single characters preserve case (since 'M' means Shift+m, different from 'm').
/// Multi-character key names are case-insensitive (Enter, ENTER, enter are the same).
fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.chars().count() == 1 {
        trimmed.to_string()
    } else {
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "esc" => "escape".to_string(),
            "shift+tab" => "backtab".to_string(),
            "page_up" => "pageup".to_string(),
            "page_down" => "pagedown".to_string(),
            _ => lower,
        }
    }
}

/// Check for collisions within a single context
fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

/// Validate all key bindings for collisions within each context
fn validate_key_bindings(keys: &Keys) -> Result<()> {
    // Global keys are live while the table has focus, so they share a context.
    check_context_collisions(
        &[
            ("global.quit", &keys.global.quit),
            ("global.search", &keys.global.search),
            ("global.help", &keys.global.help),
            ("global.new", &keys.global.new),
            ("global.reload", &keys.global.reload),
            ("next", &keys.list.next),
            ("prev", &keys.list.prev),
            ("view", &keys.list.view),
            ("edit", &keys.list.edit),
            ("delete", &keys.list.delete),
            ("next_page", &keys.list.next_page),
            ("prev_page", &keys.list.prev_page),
        ],
        "list",
    )?;

    check_context_collisions(
        &[
            ("cancel", &keys.search.cancel),
            ("confirm", &keys.search.confirm),
        ],
        "search",
    )?;

    check_context_collisions(
        &[
            ("next_field", &keys.form.next_field),
            ("prev_field", &keys.form.prev_field),
            ("submit", &keys.form.submit),
            ("cancel", &keys.form.cancel),
        ],
        "form",
    )?;

    check_context_collisions(
        &[
            ("confirm", &keys.modal.confirm),
            ("cancel", &keys.modal.cancel),
        ],
        "modal",
    )?;

    Ok(())
}

// =============================================================================
// Config file structure
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_base_url: Option<String>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
    log_file: Option<PathBuf>,
    keys: KeysFile,
    ui: UiFile,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    header: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    error_fg: RgbColor,
    status_fg: RgbColor,
    status_bg: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        Self {
            border: RgbColor::new(255, 165, 0),
            header: RgbColor::new(255, 165, 0),
            selection_bg: RgbColor::new(255, 165, 0),
            selection_fg: RgbColor::new(0, 0, 0),
            error_fg: RgbColor::new(255, 85, 85),
            status_fg: RgbColor::new(255, 165, 0),
            status_bg: RgbColor::new(0, 0, 0),
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        Self {
            colors: UiColors {
                border: file.colors.border,
                header: file.colors.header,
                selection_bg: file.colors.selection_bg,
                selection_fg: file.colors.selection_fg,
                error_fg: file.colors.error_fg,
                status_fg: file.colors.status_fg,
                status_bg: file.colors.status_bg,
            },
        }
    }
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

fn default_log_file() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.data_local_dir().join(APP_NAME).join(LOG_FILE_NAME))
}

/// Load configuration. A missing default config file is not an error; a
/// missing explicitly requested one is.
pub fn load(overrides: &Overrides) -> Result<Config> {
    let (path, explicit) = match &overrides.config_path {
        Some(path) => (expand_tilde(path), true),
        None => (config_path()?, false),
    };

    if !path.exists() {
        if explicit {
            bail!("configuration file not found at {}", path.display());
        }
        return build(ConfigFile::default(), None, Vec::new(), overrides);
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;
    parse(&raw, Some(path), overrides)
}

pub(crate) fn parse(raw: &str, path: Option<PathBuf>, overrides: &Overrides) -> Result<Config> {
    let source = path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<inline>".to_string());

    let value: toml::Value =
        toml::from_str(raw).with_context(|| format!("failed to parse {} as TOML", source))?;

    let warnings = unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", source))?;

    build(cfg_file, path, warnings, overrides)
}

fn build(
    cfg_file: ConfigFile,
    config_path: Option<PathBuf>,
    warnings: Vec<String>,
    overrides: &Overrides,
) -> Result<Config> {
    let api_base_url = overrides
        .base_url
        .clone()
        .or_else(|| overrides.env_base_url.clone())
        .or(cfg_file.api_base_url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    validate_base_url(&api_base_url)?;

    let page_size = cfg_file.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        bail!("`page_size` must be at least 1");
    }

    let timeout_secs = cfg_file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        bail!("`request_timeout_secs` must be at least 1");
    }

    let log_file = match cfg_file.log_file {
        Some(path) => expand_tilde(&path),
        None => default_log_file()?,
    };

    let keys: Keys = cfg_file.keys.into();
    validate_key_bindings(&keys)?;

    Ok(Config {
        config_path,
        api_base_url,
        page_size,
        request_timeout: Duration::from_secs(timeout_secs),
        log_file,
        keys,
        ui: cfg_file.ui.into(),
        warnings,
    })
}

fn validate_base_url(raw: &str) -> Result<()> {
    let url = reqwest::Url::parse(raw).map_err(|err| anyhow!("invalid API base URL `{}`: {}", raw, err))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("API base URL must use http or https: {}", raw);
    }
    Ok(())
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(table) = value.as_table() else {
        return warnings;
    };

    let known = HashSet::from([
        "api_base_url",
        "page_size",
        "request_timeout_secs",
        "log_file",
        "keys",
        "ui",
    ]);
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            warnings.push(format!("unknown configuration key `{}`", key));
        }
    }

    if let Some(keys) = table.get("keys").and_then(|v| v.as_table()) {
        let contexts: [(&str, &[&str]); 5] = [
            ("global", &["quit", "search", "help", "new", "reload"]),
            ("search", &["cancel", "confirm"]),
            (
                "list",
                &["next", "prev", "view", "edit", "delete", "next_page", "prev_page"],
            ),
            ("form", &["next_field", "prev_field", "submit", "cancel"]),
            ("modal", &["confirm", "cancel"]),
        ];
        for (context, value) in keys {
            match contexts.iter().find(|(name, _)| name == context) {
                Some((_, actions)) => {
                    unknown_in_table(value, &format!("keys.{}", context), actions, &mut warnings)
                }
                None => warnings.push(format!("unknown keys.* context `{}`", context)),
            }
        }
    }

    if let Some(ui) = table.get("ui") {
        unknown_in_table(ui, "ui", &["colors"], &mut warnings);
        if let Some(colors) = ui.get("colors") {
            unknown_in_table(
                colors,
                "ui.colors",
                &[
                    "border",
                    "header",
                    "selection_bg",
                    "selection_fg",
                    "error_fg",
                    "status_fg",
                    "status_bg",
                ],
                &mut warnings,
            );
        }
    }

    warnings
}

fn unknown_in_table(value: &toml::Value, context: &str, known: &[&str], warnings: &mut Vec<String>) {
    let Some(table) = value.as_table() else {
        return;
    };
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            warnings.push(format!("unknown key `{}` in [{}]", key, context));
        }
    }
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_inline(raw: &str, overrides: &Overrides) -> Result<Config> {
        parse(raw, None, overrides)
    }

    #[test]
    fn test_defaults_when_file_is_empty() {
        let config = parse_inline("", &Overrides::default()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.keys.global.quit, vec!["q".to_string()]);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_base_url_precedence() {
        let raw = r#"api_base_url = "http://file.example/api""#;
        let file_only = parse_inline(raw, &Overrides::default()).unwrap();
        assert_eq!(file_only.api_base_url, "http://file.example/api");

        let env = Overrides {
            env_base_url: Some("http://env.example/api".into()),
            ..Default::default()
        };
        assert_eq!(
            parse_inline(raw, &env).unwrap().api_base_url,
            "http://env.example/api"
        );

        let cli = Overrides {
            base_url: Some("https://cli.example/api".into()),
            env_base_url: Some("http://env.example/api".into()),
            ..Default::default()
        };
        assert_eq!(
            parse_inline(raw, &cli).unwrap().api_base_url,
            "https://cli.example/api"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let overrides = Overrides {
            base_url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(parse_inline("", &overrides).is_err());

        let overrides = Overrides {
            base_url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(parse_inline("", &overrides).is_err());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        assert!(parse_inline("page_size = 0", &Overrides::default()).is_err());
        let config = parse_inline("page_size = 25", &Overrides::default()).unwrap();
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_key_binding_single_or_list() {
        let raw = r#"
            [keys.global]
            quit = "Q"
            new = ["n", "c"]
        "#;
        let config = parse_inline(raw, &Overrides::default()).unwrap();
        assert_eq!(config.keys.global.quit, vec!["Q".to_string()]);
        assert_eq!(config.keys.global.new, vec!["n".to_string(), "c".to_string()]);
        assert_eq!(config.keys.global.help, GlobalKeys::default().help);
    }

    #[test]
    fn test_key_binding_collision_between_global_and_list() {
        let raw = r#"
            [keys.list]
            edit = "q"
        "#;
        let err = parse_inline(raw, &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("collision"));
    }

    #[test]
    fn test_key_binding_collision_is_case_insensitive_for_names() {
        let raw = r#"
            [keys.form]
            submit = ["ENTER"]
            next_field = ["enter"]
        "#;
        assert!(parse_inline(raw, &Overrides::default()).is_err());
    }

    #[test]
    fn test_normalize_binding() {
        assert_eq!(normalize_binding("m"), "m");
        assert_eq!(normalize_binding("M"), "M");
        assert_eq!(normalize_binding("Esc"), "escape");
        assert_eq!(normalize_binding("Shift+Tab"), "backtab");
        assert_eq!(normalize_binding(" PageDown "), "pagedown");
    }

    #[test]
    fn test_unknown_keys_become_warnings() {
        let raw = r#"
            colour = "red"
            [keys.global]
            explode = "x"
            [keys.sidebar]
            next = "j"
            [ui.colors]
            glow = [1, 2, 3]
        "#;
        let config = parse_inline(raw, &Overrides::default()).unwrap();
        assert_eq!(config.warnings.len(), 4, "{:?}", config.warnings);
        assert!(config.warnings.iter().any(|w| w.contains("`colour`")));
        assert!(config.warnings.iter().any(|w| w.contains("keys.sidebar") || w.contains("`sidebar`")));
    }

    #[test]
    fn test_colors_accept_array_or_table() {
        let raw = r#"
            [ui.colors]
            border = [1, 2, 3]
            header = { r = 4, g = 5, b = 6 }
        "#;
        let config = parse_inline(raw, &Overrides::default()).unwrap();
        assert_eq!(config.ui.colors.border, RgbColor::new(1, 2, 3));
        assert_eq!(config.ui.colors.header, RgbColor::new(4, 5, 6));
        assert_eq!(config.ui.colors.selection_fg, RgbColor::new(0, 0, 0));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            config_path: Some(dir.path().join("nope.toml")),
            ..Default::default()
        };
        assert!(load(&overrides).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "page_size = 5\nlog_file = \"/tmp/contactr-test.log\"\n").unwrap();
        let config = load(&Overrides {
            config_path: Some(path.clone()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.page_size, 5);
        assert_eq!(config.log_file, PathBuf::from("/tmp/contactr-test.log"));
    }
}

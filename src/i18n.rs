use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;
use tracing::debug;

use crate::gas::{CalculationError, InputField};

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_CALCULATE: &str = "main_menu.calculate";
    pub const MAIN_MENU_EDIT: &str = "main_menu.edit";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const EDIT_HEADING: &str = "edit.heading";
    pub const EDIT_KEEP_HINT: &str = "edit.keep_hint";
    pub const PROMPT_PRESSURE: &str = "prompt.pressure";
    pub const PROMPT_TEMPERATURE: &str = "prompt.temperature";
    pub const PROMPT_PERCENTAGE: &str = "prompt.percentage";

    pub const RESULT_HEADING: &str = "result.heading";
    pub const RESULT_INPUTS: &str = "result.inputs";
    pub const RESULT_MIXTURE_DENSITY: &str = "result.mixture_density";
    pub const RESULT_COMPONENTS_HEADING: &str = "result.components_heading";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_CURRENT_LANGUAGE: &str = "settings.current_language";
    pub const SETTINGS_OPTIONS: &str = "settings.options";
    pub const SETTINGS_PROMPT_CHANGE: &str = "settings.prompt_change";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
    pub const SETTINGS_SAVED: &str = "settings.saved";

    pub const FIELD_PRESSURE: &str = "field.pressure";
    pub const FIELD_TEMPERATURE: &str = "field.temperature";
    pub const FIELD_PERCENTAGE: &str = "field.percentage";

    pub const ERROR_NON_NUMERIC: &str = "error.non_numeric";
    pub const ERROR_INVALID_TEMPERATURE: &str = "error.invalid_temperature";
    pub const ERROR_INVALID_PRESSURE: &str = "error.invalid_pressure";
    pub const ERROR_INVALID_PERCENTAGE: &str = "error.invalid_percentage";
    pub const ERROR_MISSING_PERCENTAGE: &str = "error.missing_percentage";
    pub const ERROR_UNKNOWN_GAS: &str = "error.unknown_gas";
    pub const ERROR_SUM_MISMATCH: &str = "error.sum_mismatch";
    pub const ERROR_DENSITY_OUT_OF_RANGE: &str = "error.density_out_of_range";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        if code.trim().to_lowercase().starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }
}

/// 런타임 언어 번들을 제공한다.
///
/// 조회 순서: 외부 언어팩(locales/*.toml) → 내장 언어팩 → 내장 영어 → 키 자체.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
    built_in: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Translator {
    /// 언어 코드(ko/en)에 따라 내장 문자열만 사용하는 번역기를 생성한다.
    pub fn new(lang_code: &str) -> Self {
        let lang = Language::from_code(lang_code);
        Self {
            lang,
            overrides: None,
            built_in: built_in_pack(lang).unwrap_or_default(),
            fallback: built_in_pack(Language::En).unwrap_or_default(),
        }
    }

    /// 언어 코드 + 언어팩 디렉터리를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 locales/ 를 찾고, 그것도 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&Path>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides(Path::new("locales"), lang_code));
        Self {
            overrides,
            ..Self::new(lang_code)
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn language_code(&self) -> &'static str {
        self.lang.as_code()
    }

    /// 번역을 가져온다. 어디에도 없으면 키를 그대로 돌려준다.
    pub fn t(&self, key: &str) -> String {
        self.overrides
            .as_ref()
            .and_then(|m| m.get(key))
            .or_else(|| self.built_in.get(key))
            .or_else(|| self.fallback.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// `{name}` 형태의 자리표시자를 채운 번역을 가져온다.
    pub fn tf(&self, key: &str, vars: &[(&str, String)]) -> String {
        fill_template(&self.t(key), vars)
    }
}

fn fill_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// 입력 필드 이름을 현재 언어로 표시한다.
pub fn field_name(tr: &Translator, field: &InputField) -> String {
    match field {
        InputField::Pressure => tr.t(keys::FIELD_PRESSURE),
        InputField::Temperature => tr.t(keys::FIELD_TEMPERATURE),
        InputField::Percentage(gas) => tr.tf(keys::FIELD_PERCENTAGE, &[("gas", gas.clone())]),
    }
}

/// 계산 오류를 위반한 조건이 드러나도록 현재 언어의 메시지로 만든다.
pub fn describe_error(tr: &Translator, err: &CalculationError) -> String {
    match err {
        CalculationError::NonNumericInput { field, text } => tr.tf(
            keys::ERROR_NON_NUMERIC,
            &[("field", field_name(tr, field)), ("text", text.clone())],
        ),
        CalculationError::InvalidTemperature { kelvin } => tr.tf(
            keys::ERROR_INVALID_TEMPERATURE,
            &[("kelvin", format!("{kelvin:.2}"))],
        ),
        CalculationError::InvalidPressure { pressure } => {
            tr.tf(keys::ERROR_INVALID_PRESSURE, &[("pressure", pressure.to_string())])
        }
        CalculationError::InvalidPercentage { gas, value } => tr.tf(
            keys::ERROR_INVALID_PERCENTAGE,
            &[("gas", gas.clone()), ("value", value.to_string())],
        ),
        CalculationError::MissingPercentage { gas } => {
            tr.tf(keys::ERROR_MISSING_PERCENTAGE, &[("gas", gas.clone())])
        }
        CalculationError::UnknownGas { gas } => {
            tr.tf(keys::ERROR_UNKNOWN_GAS, &[("gas", gas.clone())])
        }
        CalculationError::PercentageSumMismatch { actual_sum } => tr.tf(
            keys::ERROR_SUM_MISMATCH,
            &[("sum", format!("{actual_sum:.1}"))],
        ),
        CalculationError::DensityOutOfRange { .. } => tr.t(keys::ERROR_DENSITY_OUT_OF_RANGE),
    }
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "ko" | "ko-kr" => Some("ko-kr".into()),
        "en" | "en-us" | "en-uk" => Some("en-us".into()),
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko-kr".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    normalize_lang(&lang)
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LC_ALL", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| normalize_locale_string(&value))
}

/// TOML 기반 언어팩을 로드한다. 중첩 테이블은 "a.b" 형태의 키로 펼친다.
fn load_overrides(dir: &Path, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = dir.join(format!("{code}.toml"));
        let content = fs::read_to_string(&path).ok()?;
        debug!(path = %path.display(), "loading language pack");
        parse_toml_to_map(&content)
    };

    // 1) full code (e.g., en-us)
    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    // 2) base code (e.g., en)
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// 내장 언어팩(파일이 없어도 동작하도록 빌드 시 포함).
fn built_in_pack(lang: Language) -> Option<HashMap<String, String>> {
    match lang {
        Language::En => parse_toml_to_map(include_str!("../locales/en-us.toml")),
        Language::Ko => parse_toml_to_map(include_str!("../locales/ko-kr.toml")),
    }
}

use std::io::{self, BufRead, Write};

use crate::app::AppError;
use crate::config::Config;
use crate::form::{DensityForm, FormOutput};
use crate::gas::GasTable;
use crate::i18n::{keys, Translator};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Calculate,
    EditInputs,
    Settings,
    Exit,
}

/// 입력/출력 스트림 묶음. 테스트에서는 메모리 버퍼를 넣는다.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl Terminal<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub(crate) fn say(&mut self, line: &str) -> Result<(), AppError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// 프롬프트를 출력하고 한 줄을 읽는다. 입력이 닫히면 `AppError::InputClosed`.
    fn read_line(&mut self, prompt: &str) -> Result<String, AppError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(AppError::InputClosed);
        }
        Ok(buf.trim().to_string())
    }
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    tr: &Translator,
) -> Result<MenuChoice, AppError> {
    for key in [
        keys::MAIN_MENU_TITLE,
        keys::MAIN_MENU_CALCULATE,
        keys::MAIN_MENU_EDIT,
        keys::MAIN_MENU_SETTINGS,
        keys::MAIN_MENU_EXIT,
    ] {
        term.say(&tr.t(key))?;
    }
    loop {
        let sel = term.read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
        match sel.as_str() {
            "1" => return Ok(MenuChoice::Calculate),
            "2" => return Ok(MenuChoice::EditInputs),
            "3" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => term.say(&tr.t(keys::INVALID_SELECTION_RETRY))?,
        }
    }
}

/// 입력 필드를 하나씩 묻는다. 빈 입력은 기존 값을 유지한다.
///
/// 숫자 검증은 여기서 하지 않는다. 계산 시점에 폼이 한꺼번에 검증한다.
pub fn handle_edit_inputs<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    tr: &Translator,
    table: &GasTable,
    form: &mut DensityForm,
) -> Result<(), AppError> {
    term.say(&tr.t(keys::EDIT_HEADING))?;
    term.say(&tr.t(keys::EDIT_KEEP_HINT))?;

    let prompt = tr.tf(keys::PROMPT_PRESSURE, &[("current", form.pressure.clone())]);
    if let Some(text) = non_empty(term.read_line(&prompt)?) {
        form.pressure = text;
    }
    let prompt = tr.tf(keys::PROMPT_TEMPERATURE, &[("current", form.temperature.clone())]);
    if let Some(text) = non_empty(term.read_line(&prompt)?) {
        form.temperature = text;
    }
    for gas in table.gases() {
        let current = form.percentage_text(&gas.id).unwrap_or_default().to_string();
        let prompt = tr.tf(
            keys::PROMPT_PERCENTAGE,
            &[("gas", gas.label.clone()), ("current", current)],
        );
        if let Some(text) = non_empty(term.read_line(&prompt)?) {
            form.set_percentage(&gas.id, &text);
        }
    }
    Ok(())
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// 계산 결과(또는 오류 표시)를 출력한다.
pub fn print_output<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    tr: &Translator,
    table: &GasTable,
    form: &DensityForm,
    output: &FormOutput,
) -> Result<(), AppError> {
    term.say(&tr.t(keys::RESULT_HEADING))?;
    term.say(&tr.tf(
        keys::RESULT_INPUTS,
        &[
            ("pressure", form.pressure.clone()),
            ("temperature", form.temperature.clone()),
        ],
    ))?;
    if let Some(message) = &output.message {
        term.say(&format!("{}: {message}", tr.t(keys::ERROR_PREFIX)))?;
    }
    let unit = if output.is_error() { "" } else { " g/L" };
    term.say(&format!(
        "{} {}{unit}",
        tr.t(keys::RESULT_MIXTURE_DENSITY),
        output.mixture_density
    ))?;
    term.say(&tr.t(keys::RESULT_COMPONENTS_HEADING))?;
    for (id, density) in &output.components {
        let label = table.get(id).map(|g| g.label.as_str()).unwrap_or(id.as_str());
        term.say(&format!("  {label:<4} {density:>12}"))?;
    }
    Ok(())
}

/// 설정 메뉴를 처리한다. 언어가 바뀌면 true.
pub fn handle_settings<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    tr: &Translator,
    cfg: &mut Config,
) -> Result<bool, AppError> {
    term.say(&tr.t(keys::SETTINGS_HEADING))?;
    term.say(&tr.tf(
        keys::SETTINGS_CURRENT_LANGUAGE,
        &[("lang", tr.language_code().to_string())],
    ))?;
    term.say(&tr.t(keys::SETTINGS_OPTIONS))?;
    let sel = term.read_line(&tr.t(keys::SETTINGS_PROMPT_CHANGE))?;
    if sel.is_empty() {
        return Ok(false);
    }
    let lang = match sel.as_str() {
        "1" => "en",
        "2" => "ko",
        _ => {
            term.say(&tr.t(keys::SETTINGS_INVALID))?;
            return Ok(false);
        }
    };
    cfg.language = lang.to_string();
    term.say(&tr.tf(keys::SETTINGS_SAVED, &[("lang", lang.to_string())]))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn term(input: &str) -> Terminal<Cursor<Vec<u8>>, Vec<u8>> {
        Terminal::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn menu_retries_until_valid_choice() {
        let tr = Translator::new("en");
        let mut t = term("9\n2\n");
        assert_eq!(main_menu(&mut t, &tr).unwrap(), MenuChoice::EditInputs);
        let out = String::from_utf8(t.into_output()).unwrap();
        assert!(out.contains("Invalid input. Please choose again."));
    }

    #[test]
    fn menu_reports_closed_input() {
        let tr = Translator::new("en");
        let mut t = term("");
        assert!(matches!(main_menu(&mut t, &tr), Err(AppError::InputClosed)));
    }

    #[test]
    fn edit_keeps_blank_fields() {
        let tr = Translator::new("en");
        let table = GasTable::standard();
        let mut form = DensityForm::new(&table);
        let mut t = term("2.0\n\n20\n80\n\n\n");
        handle_edit_inputs(&mut t, &tr, &table, &mut form).unwrap();
        assert_eq!(form.pressure, "2.0");
        assert_eq!(form.temperature, "25.0");
        assert_eq!(form.percentage_text("O2"), Some("20"));
        assert_eq!(form.percentage_text("N2"), Some("80"));
        assert_eq!(form.percentage_text("He"), Some("0.0"));
    }

    #[test]
    fn settings_switches_language() {
        let tr = Translator::new("en");
        let mut cfg = Config::default();
        let mut t = term("2\n");
        assert!(handle_settings(&mut t, &tr, &mut cfg).unwrap());
        assert_eq!(cfg.language, "ko");

        let mut t = term("7\n");
        assert!(!handle_settings(&mut t, &tr, &mut cfg).unwrap());
        assert_eq!(cfg.language, "ko");
    }
}

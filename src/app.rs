use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::{Config, ConfigError};
use crate::form::{DensityForm, FormOutput};
use crate::gas::{CalculationError, GasTable, MixtureDensityCalculator};
use crate::i18n::{self, Translator};
use crate::ui_cli::{self, MenuChoice, Terminal};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// 대화형 입력 스트림이 닫힘
    #[error("input stream closed")]
    InputClosed,
}

/// 계산기, 입력 폼, 설정, 번역기를 묶은 CLI 세션.
pub struct App {
    config: Config,
    config_path: PathBuf,
    /// 시작 시 지정한 언어팩 디렉터리. 언어를 바꿀 때도 계속 사용한다.
    pack_dir: Option<PathBuf>,
    tr: Translator,
    calculator: MixtureDensityCalculator,
    form: DensityForm,
}

impl App {
    /// 설정의 기본값으로 폼을 채운 세션을 만든다.
    pub fn new(config: Config, config_path: PathBuf, pack_dir: Option<PathBuf>) -> Self {
        let lang = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = Translator::new_with_pack(&lang, pack_dir.as_deref());
        Self::with_translator(config, config_path, pack_dir, tr)
    }

    /// 이미 만든 번역기로 세션을 만든다. 명령행 언어 옵션이 설정보다 우선할 때 쓴다.
    pub fn with_translator(
        config: Config,
        config_path: PathBuf,
        pack_dir: Option<PathBuf>,
        tr: Translator,
    ) -> Self {
        let calculator = MixtureDensityCalculator::new(GasTable::standard());
        let form = DensityForm::from_defaults(calculator.table(), &config.defaults);
        Self {
            config,
            config_path,
            pack_dir,
            tr,
            calculator,
            form,
        }
    }

    pub fn table(&self) -> &GasTable {
        self.calculator.table()
    }

    pub fn form(&self) -> &DensityForm {
        &self.form
    }

    pub fn translator(&self) -> &Translator {
        &self.tr
    }

    pub fn pack_dir(&self) -> Option<&Path> {
        self.pack_dir.as_deref()
    }

    /// 명령행 인자로 받은 값을 폼에 덮어쓴다. 테이블에 없는 가스면 오류.
    pub fn apply_overrides(
        &mut self,
        pressure: Option<String>,
        temperature: Option<String>,
        gases: &[(String, String)],
    ) -> Result<(), CalculationError> {
        if let Some(p) = pressure {
            self.form.pressure = p;
        }
        if let Some(t) = temperature {
            self.form.temperature = t;
        }
        for (gas, text) in gases {
            if !self.form.set_percentage(gas, text) {
                return Err(CalculationError::UnknownGas { gas: gas.clone() });
            }
        }
        Ok(())
    }

    /// 현재 폼으로 계산하고 화면에 표시할 문자열을 만든다.
    pub fn calculate(&self) -> FormOutput {
        let outcome = self.form.evaluate(&self.calculator);
        FormOutput::from_outcome_with(self.table(), &outcome, |err| {
            i18n::describe_error(&self.tr, err)
        })
    }

    /// 오류 하나를 현재 언어 메시지와 함께 오류 표시 출력으로 바꾼다.
    pub fn error_output(&self, err: &CalculationError) -> FormOutput {
        FormOutput::error(self.table(), i18n::describe_error(&self.tr, err))
    }

    /// 결과를 한 번 출력한다.
    pub fn print<R: BufRead, W: Write>(
        &self,
        term: &mut Terminal<R, W>,
        output: &FormOutput,
    ) -> Result<(), AppError> {
        ui_cli::print_output(term, &self.tr, self.table(), &self.form, output)
    }

    /// 대화형 메인 루프를 실행한다. 입력이 닫히면 종료로 취급한다.
    pub fn run<R: BufRead, W: Write>(&mut self, term: &mut Terminal<R, W>) -> Result<(), AppError> {
        match self.run_loop(term) {
            Err(AppError::InputClosed) => {
                debug!("input closed, leaving interactive mode");
                self.config.save_to(&self.config_path)?;
                Ok(())
            }
            other => other,
        }
    }

    fn run_loop<R: BufRead, W: Write>(&mut self, term: &mut Terminal<R, W>) -> Result<(), AppError> {
        loop {
            match ui_cli::main_menu(term, &self.tr)? {
                MenuChoice::Calculate => {
                    let output = self.calculate();
                    self.print(term, &output)?;
                }
                MenuChoice::EditInputs => {
                    let table = self.calculator.table();
                    ui_cli::handle_edit_inputs(term, &self.tr, table, &mut self.form)?;
                }
                MenuChoice::Settings => {
                    if ui_cli::handle_settings(term, &self.tr, &mut self.config)? {
                        let lang = i18n::resolve_language(&self.config.language, None);
                        self.tr = Translator::new_with_pack(&lang, self.pack_dir());
                    }
                    self.config.save_to(&self.config_path)?;
                }
                MenuChoice::Exit => {
                    self.config.save_to(&self.config_path)?;
                    term.say(&self.tr.t(i18n::keys::APP_EXIT))?;
                    break;
                }
            }
        }
        Ok(())
    }
}

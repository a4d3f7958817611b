//! 문자열 입력 필드와 계산기 사이의 경계.
//!
//! 화면(CLI 등)은 필드 문자열만 채우고 `evaluate` 를 호출한 뒤
//! `FormOutput` 을 그대로 출력한다.

use tracing::warn;

use crate::config::FormDefaults;
use crate::gas::{
    format_density, CalculationError, CalculationResult, GasTable, InputField,
    MixtureDensityCalculator, Percentages,
};

/// 계산 실패 시 모든 출력 칸에 표시하는 값.
pub const ERROR_MARKER: &str = "Error";

/// 사용자가 입력한 원본 문자열 묶음.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityForm {
    /// 압력 [atm]
    pub pressure: String,
    /// 온도 [°C]
    pub temperature: String,
    /// (가스 식별자, 조성 [%]) 목록
    pub percentages: Vec<(String, String)>,
}

impl DensityForm {
    /// 1 atm, 25 °C, 공기(O₂ 21 / N₂ 79) 조성으로 초기화한다.
    pub fn new(table: &GasTable) -> Self {
        Self::from_defaults(table, &FormDefaults::default())
    }

    /// 설정 파일의 기본값으로 초기화한다. 설정에 없는 가스는 "0.0" 이다.
    pub fn from_defaults(table: &GasTable, defaults: &FormDefaults) -> Self {
        let percentages = table
            .gases()
            .map(|gas| {
                let text = defaults
                    .percentages
                    .get(&gas.id)
                    .cloned()
                    .unwrap_or_else(|| "0.0".to_string());
                (gas.id.clone(), text)
            })
            .collect();
        Self {
            pressure: defaults.pressure.clone(),
            temperature: defaults.temperature.clone(),
            percentages,
        }
    }

    pub fn percentage_text(&self, gas: &str) -> Option<&str> {
        self.percentages
            .iter()
            .find(|(id, _)| id == gas)
            .map(|(_, text)| text.as_str())
    }

    /// 가스 조성 문자열을 바꾼다. 폼에 없는 가스면 false.
    pub fn set_percentage(&mut self, gas: &str, text: &str) -> bool {
        match self.percentages.iter_mut().find(|(id, _)| id == gas) {
            Some((_, slot)) => {
                *slot = text.to_string();
                true
            }
            None => false,
        }
    }

    /// 필드를 해석하고 계산한다.
    ///
    /// 해석과 검증을 필드 순서대로 섞어서 수행하므로, 여러 필드가 잘못된 경우
    /// 가장 앞선 필드의 오류 하나만 보고된다. 거부는 한 번만 로그에 남는다.
    pub fn evaluate(
        &self,
        calculator: &MixtureDensityCalculator,
    ) -> Result<CalculationResult, CalculationError> {
        let (pressure, temperature, percentages) = match self.prepare(calculator) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(category = ?err.category(), "density calculation rejected: {err}");
                return Err(err);
            }
        };
        // 이후의 거부는 계산기가 직접 로그에 남긴다
        calculator.calculate(pressure, temperature, &percentages)
    }

    /// 계산 전 단계의 해석과 검증. 압력, 온도, 조성을 돌려준다.
    fn prepare(
        &self,
        calculator: &MixtureDensityCalculator,
    ) -> Result<(f64, f64, Percentages), CalculationError> {
        let pressure = parse_field(InputField::Pressure, &self.pressure)?;
        let temperature = parse_field(InputField::Temperature, &self.temperature)?;
        calculator.check_conditions(pressure, temperature)?;

        let mut percentages = Percentages::new();
        for gas in calculator.table().gases() {
            let text = self
                .percentage_text(&gas.id)
                .ok_or_else(|| CalculationError::MissingPercentage {
                    gas: gas.id.clone(),
                })?;
            let value = parse_field(InputField::Percentage(gas.id.clone()), text)?;
            calculator.check_percentage(&gas.id, value)?;
            percentages.insert(gas.id.clone(), value);
        }
        if let Some((gas, _)) = self
            .percentages
            .iter()
            .find(|(id, _)| !calculator.table().contains(id))
        {
            return Err(CalculationError::UnknownGas { gas: gas.clone() });
        }
        Ok((pressure, temperature, percentages))
    }
}

/// 문자열을 유한한 실수로 해석한다. 앞뒤 공백은 무시한다.
pub fn parse_field(field: InputField, text: &str) -> Result<f64, CalculationError> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CalculationError::NonNumericInput {
            field,
            text: text.to_string(),
        }),
    }
}

/// 화면에 표시할 결과 문자열.
#[derive(Debug, Clone, PartialEq)]
pub struct FormOutput {
    /// 혼합물 밀도 (소수점 4자리) 또는 `ERROR_MARKER`
    pub mixture_density: String,
    /// (가스 식별자, 밀도 문자열)
    pub components: Vec<(String, String)>,
    /// 실패 시 사용자에게 보여줄 메시지. 성공 시 None.
    pub message: Option<String>,
}

impl FormOutput {
    /// 계산 결과를 출력 문자열로 바꾼다. 오류 메시지는 `Display` 구현을 쓴다.
    pub fn from_outcome(
        table: &GasTable,
        outcome: &Result<CalculationResult, CalculationError>,
    ) -> Self {
        Self::from_outcome_with(table, outcome, |err| err.to_string())
    }

    /// 오류 메시지 생성 방식을 지정해 결과 문자열을 만든다.
    pub fn from_outcome_with<F>(
        table: &GasTable,
        outcome: &Result<CalculationResult, CalculationError>,
        describe: F,
    ) -> Self
    where
        F: FnOnce(&CalculationError) -> String,
    {
        match outcome {
            Ok(result) => Self {
                mixture_density: format_density(result.mixture_density_g_per_l),
                components: table
                    .gases()
                    .map(|gas| {
                        let text = result
                            .component_density(&gas.id)
                            .map(format_density)
                            .unwrap_or_else(|| ERROR_MARKER.to_string());
                        (gas.id.clone(), text)
                    })
                    .collect(),
                message: None,
            },
            Err(err) => Self::error(table, describe(err)),
        }
    }

    /// 모든 출력 칸을 오류 표시로 채운다.
    pub fn error(table: &GasTable, message: String) -> Self {
        Self {
            mixture_density: ERROR_MARKER.to_string(),
            components: table
                .gases()
                .map(|gas| (gas.id.clone(), ERROR_MARKER.to_string()))
                .collect(),
            message: Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.message.is_some()
    }

    pub fn component(&self, gas: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|(id, _)| id == gas)
            .map(|(_, text)| text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn calc() -> MixtureDensityCalculator {
        MixtureDensityCalculator::default()
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// `evaluate` 를 돌리는 동안 WARN 이상 로그를 모아 돌려준다.
    fn warn_log_of(form: &DensityForm) -> String {
        let buf = SharedBuf::default();
        let sink = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let _ = form.evaluate(&calc());
        });
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn defaults_match_initial_air_mixture() {
        let form = DensityForm::new(&GasTable::standard());
        assert_eq!(form.pressure, "1.0");
        assert_eq!(form.temperature, "25.0");
        assert_eq!(form.percentage_text("O2"), Some("21.0"));
        assert_eq!(form.percentage_text("N2"), Some("79.0"));
        assert_eq!(form.percentage_text("He"), Some("0.0"));
        assert_eq!(form.percentage_text("CO2"), Some("0.0"));
    }

    #[test]
    fn parse_field_trims_and_rejects_non_finite() {
        assert_eq!(parse_field(InputField::Pressure, " 2.5 "), Ok(2.5));
        for bad in ["", "abc", "1,5", "NaN", "inf"] {
            assert_eq!(
                parse_field(InputField::Temperature, bad),
                Err(CalculationError::NonNumericInput {
                    field: InputField::Temperature,
                    text: bad.to_string(),
                }),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn bad_pressure_text_reported_first() {
        let mut form = DensityForm::new(&GasTable::standard());
        form.pressure = "x".into();
        form.temperature = "y".into();
        let err = form.evaluate(&calc()).unwrap_err();
        assert_eq!(
            err,
            CalculationError::NonNumericInput {
                field: InputField::Pressure,
                text: "x".into()
            }
        );
    }

    #[test]
    fn condition_checks_precede_percentage_parsing() {
        let mut form = DensityForm::new(&GasTable::standard());
        form.pressure = "0".into();
        form.set_percentage("O2", "abc");
        let err = form.evaluate(&calc()).unwrap_err();
        assert!(matches!(err, CalculationError::InvalidPressure { .. }));
    }

    #[test]
    fn range_check_interleaves_with_parsing() {
        let mut form = DensityForm::new(&GasTable::standard());
        form.set_percentage("O2", "150");
        form.set_percentage("N2", "abc");
        let err = form.evaluate(&calc()).unwrap_err();
        assert_eq!(
            err,
            CalculationError::InvalidPercentage {
                gas: "O2".into(),
                value: 150.0
            }
        );

        form.set_percentage("O2", "21");
        let err = form.evaluate(&calc()).unwrap_err();
        assert_eq!(
            err,
            CalculationError::NonNumericInput {
                field: InputField::Percentage("N2".into()),
                text: "abc".into()
            }
        );
    }

    #[test]
    fn every_rejection_is_logged_once() {
        let table = GasTable::standard();

        let mut non_numeric = DensityForm::new(&table);
        non_numeric.pressure = "abc".into();
        let mut bad_range = DensityForm::new(&table);
        bad_range.set_percentage("He", "150");
        let mut cold = DensityForm::new(&table);
        cold.temperature = "-300".into();
        let mut short_sum = DensityForm::new(&table);
        short_sum.set_percentage("O2", "20");

        for (form, expected) in [
            (&non_numeric, "Pressure must be a number"),
            (&bad_range, "He percentage must be between 0 and 100"),
            (&cold, "below absolute zero"),
            (&short_sum, "current sum: 99.0%"),
        ] {
            let log = warn_log_of(form);
            assert_eq!(log.matches("density calculation rejected").count(), 1, "{log}");
            assert!(log.contains(expected), "{log}");
        }

        assert!(!warn_log_of(&DensityForm::new(&table)).contains("rejected"));
    }

    #[test]
    fn set_percentage_ignores_unknown_gas() {
        let mut form = DensityForm::new(&GasTable::standard());
        assert!(!form.set_percentage("Ar", "1.0"));
        assert!(form.set_percentage("He", "1.0"));
        assert_eq!(form.percentage_text("He"), Some("1.0"));
    }

    #[test]
    fn output_success_and_error_marker() {
        let table = GasTable::standard();
        let form = DensityForm::new(&table);
        let ok = FormOutput::from_outcome(&table, &form.evaluate(&calc()));
        assert!(!ok.is_error());
        assert_eq!(ok.mixture_density, "1.1791");
        assert_eq!(ok.component("CO2"), Some("0.0000"));

        let err = FormOutput::from_outcome(
            &table,
            &Err(CalculationError::InvalidPressure { pressure: 0.0 }),
        );
        assert!(err.is_error());
        assert_eq!(err.mixture_density, ERROR_MARKER);
        assert!(err.components.iter().all(|(_, v)| v == ERROR_MARKER));
        assert_eq!(err.components.len(), 4);
        assert_eq!(err.message.as_deref(), Some("Pressure must be positive"));
    }
}

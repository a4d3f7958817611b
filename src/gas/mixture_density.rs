//! 이상기체 법칙 기반 혼합 가스 밀도 계산.
//!
//! 밀도 [g/L] = (P × M) / (R × T), P=atm, M=g/mol, T=K, R=0.08206 L·atm/(mol·K).

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::gas_table::GasTable;
use crate::units::convert_temperature;

/// 이상기체 상수 [L·atm/(mol·K)]
pub const GAS_CONSTANT_L_ATM: f64 = 0.08206;
/// 조성 합계가 100%에서 벗어나도 되는 허용치 [%] (경계 포함)
pub const PERCENT_SUM_TOLERANCE: f64 = 0.01;

/// 가스 식별자 → 조성 [%]
pub type Percentages = HashMap<String, f64>;

/// 숫자로 입력받는 필드를 식별한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputField {
    Pressure,
    Temperature,
    Percentage(String),
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputField::Pressure => write!(f, "Pressure"),
            InputField::Temperature => write!(f, "Temperature"),
            InputField::Percentage(gas) => write!(f, "{gas} percentage"),
        }
    }
}

/// 오류의 성격. 사용자에게는 모두 같은 방식(메시지 + 오류 표시)으로 노출된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 숫자로 해석할 수 없는 입력
    Format,
    /// 물리적으로 불가능한 값
    Validation,
    /// 조성 합계 같은 업무 규칙 위반
    BusinessRule,
}

/// 밀도 계산 중 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("{field} must be a number (got '{text}')")]
    NonNumericInput { field: InputField, text: String },
    #[error("Temperature cannot be below absolute zero")]
    InvalidTemperature { kelvin: f64 },
    #[error("Pressure must be positive")]
    InvalidPressure { pressure: f64 },
    #[error("{gas} percentage must be between 0 and 100")]
    InvalidPercentage { gas: String, value: f64 },
    #[error("{gas} percentage is missing")]
    MissingPercentage { gas: String },
    #[error("Unknown gas: {gas}")]
    UnknownGas { gas: String },
    #[error("Gas percentages must sum to 100% (current sum: {actual_sum:.1}%)")]
    PercentageSumMismatch { actual_sum: f64 },
    /// 입력은 유효하지만 결과가 f64 범위를 벗어남
    #[error("Calculated density is out of range")]
    DensityOutOfRange { density: f64 },
}

impl CalculationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CalculationError::NonNumericInput { .. } => ErrorCategory::Format,
            CalculationError::PercentageSumMismatch { .. } => ErrorCategory::BusinessRule,
            _ => ErrorCategory::Validation,
        }
    }
}

/// 개별 가스 밀도.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDensity {
    pub gas: String,
    /// 조성 [%]
    pub percentage: f64,
    /// 혼합물 내 해당 가스의 밀도 [g/L]
    pub density_g_per_l: f64,
}

/// 계산 결과. 모든 필드가 채워진 상태로만 생성된다.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    /// 절대 온도 [K]
    pub temperature_k: f64,
    /// 조성 가중 평균 몰질량 [g/mol]
    pub avg_molar_mass_g_per_mol: f64,
    /// 혼합물 밀도 [g/L]
    pub mixture_density_g_per_l: f64,
    /// 가스 테이블 순서의 개별 밀도
    pub components: Vec<ComponentDensity>,
}

impl CalculationResult {
    pub fn component_density(&self, gas: &str) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.gas == gas)
            .map(|c| c.density_g_per_l)
    }
}

/// 가스 테이블을 소유하는 상태 없는 계산기.
#[derive(Debug, Clone, Default)]
pub struct MixtureDensityCalculator {
    table: GasTable,
}

impl MixtureDensityCalculator {
    pub fn new(table: GasTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &GasTable {
        &self.table
    }

    /// 온도 → 압력 순으로 운전 조건을 검증하고 절대 온도를 반환한다.
    pub fn check_conditions(
        &self,
        pressure_atm: f64,
        temperature_c: f64,
    ) -> Result<f64, CalculationError> {
        let kelvin = convert_temperature(temperature_c);
        if !(kelvin.is_finite() && kelvin > 0.0) {
            return Err(CalculationError::InvalidTemperature { kelvin });
        }
        if !(pressure_atm.is_finite() && pressure_atm > 0.0) {
            return Err(CalculationError::InvalidPressure {
                pressure: pressure_atm,
            });
        }
        Ok(kelvin)
    }

    /// 단일 가스 조성이 [0, 100] 범위인지 확인한다.
    pub fn check_percentage(&self, gas: &str, value: f64) -> Result<(), CalculationError> {
        if !self.table.contains(gas) {
            return Err(CalculationError::UnknownGas {
                gas: gas.to_string(),
            });
        }
        if !(0.0..=100.0).contains(&value) {
            return Err(CalculationError::InvalidPercentage {
                gas: gas.to_string(),
                value,
            });
        }
        Ok(())
    }

    /// 혼합 가스 밀도와 가스별 밀도를 계산한다.
    ///
    /// 검증 순서: 온도, 압력, 테이블 순서의 가스별 조성, 미등록 가스, 조성 합계.
    /// 먼저 걸린 하나의 오류만 반환한다.
    pub fn calculate(
        &self,
        pressure_atm: f64,
        temperature_c: f64,
        percentages: &Percentages,
    ) -> Result<CalculationResult, CalculationError> {
        debug!(pressure_atm, temperature_c, ?percentages, "density calculation requested");
        let outcome = self.calculate_inner(pressure_atm, temperature_c, percentages);
        match &outcome {
            Ok(result) => info!(
                mixture_density = result.mixture_density_g_per_l,
                "density calculation finished"
            ),
            Err(err) => warn!(category = ?err.category(), "density calculation rejected: {err}"),
        }
        outcome
    }

    fn calculate_inner(
        &self,
        pressure_atm: f64,
        temperature_c: f64,
        percentages: &Percentages,
    ) -> Result<CalculationResult, CalculationError> {
        let kelvin = self.check_conditions(pressure_atm, temperature_c)?;

        let mut ordered = Vec::with_capacity(self.table.len());
        for gas in self.table.gases() {
            let value = *percentages
                .get(&gas.id)
                .ok_or_else(|| CalculationError::MissingPercentage {
                    gas: gas.id.clone(),
                })?;
            self.check_percentage(&gas.id, value)?;
            ordered.push((gas, value));
        }
        // 정렬해서 어떤 키가 먼저 보고될지 고정한다
        let mut unknown: Vec<&String> = percentages
            .keys()
            .filter(|id| !self.table.contains(id))
            .collect();
        unknown.sort();
        if let Some(gas) = unknown.first() {
            return Err(CalculationError::UnknownGas {
                gas: (*gas).clone(),
            });
        }

        let total: f64 = ordered.iter().map(|(_, pct)| pct).sum();
        if (total - 100.0).abs() > PERCENT_SUM_TOLERANCE {
            return Err(CalculationError::PercentageSumMismatch { actual_sum: total });
        }

        let avg_molar_mass: f64 = ordered
            .iter()
            .map(|(gas, pct)| gas.molar_mass_g_per_mol * (pct / 100.0))
            .sum();
        debug!(avg_molar_mass, kelvin, "average molar mass");

        let mixture_density = (pressure_atm * avg_molar_mass) / (GAS_CONSTANT_L_ATM * kelvin);
        if !mixture_density.is_finite() {
            return Err(CalculationError::DensityOutOfRange {
                density: mixture_density,
            });
        }
        let components = ordered
            .into_iter()
            .map(|(gas, pct)| ComponentDensity {
                gas: gas.id.clone(),
                percentage: pct,
                density_g_per_l: mixture_density * (pct / 100.0),
            })
            .collect();

        Ok(CalculationResult {
            temperature_k: kelvin,
            avg_molar_mass_g_per_mol: avg_molar_mass,
            mixture_density_g_per_l: mixture_density,
            components,
        })
    }
}

/// 기본 가스 테이블로 밀도를 계산한다.
pub fn calculate(
    pressure_atm: f64,
    temperature_c: f64,
    percentages: &Percentages,
) -> Result<CalculationResult, CalculationError> {
    MixtureDensityCalculator::default().calculate(pressure_atm, temperature_c, percentages)
}

/// 밀도 값을 소수점 4자리 문자열로 만든다.
pub fn format_density(value_g_per_l: f64) -> String {
    format!("{value_g_per_l:.4}")
}

use thiserror::Error;

/// 혼합 가스 계산에 쓰이는 개별 가스 정보.
#[derive(Debug, Clone, PartialEq)]
pub struct GasEntry {
    /// 입력/출력에서 사용하는 식별자 (예: "O2")
    pub id: String,
    /// 화면 표시용 이름 (예: "O₂")
    pub label: String,
    /// 몰질량 [g/mol]
    pub molar_mass_g_per_mol: f64,
}

impl GasEntry {
    pub fn new(id: &str, label: &str, molar_mass_g_per_mol: f64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            molar_mass_g_per_mol,
        }
    }
}

/// 가스 테이블 구성 시 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GasTableError {
    #[error("gas table must contain at least one gas")]
    Empty,
    #[error("duplicate gas identifier: {0}")]
    DuplicateGas(String),
    #[error("molar mass of {gas} must be a positive number (got {value})")]
    InvalidMolarMass { gas: String, value: f64 },
}

/// 가스 식별자 → 몰질량 매핑. 생성 후에는 변경할 수 없다.
///
/// 항목 순서가 곧 검증 순서이며 결과 출력 순서다.
#[derive(Debug, Clone, PartialEq)]
pub struct GasTable {
    entries: Vec<GasEntry>,
}

impl GasTable {
    /// 임의의 가스 목록으로 테이블을 만든다. 모든 몰질량은 0보다 커야 한다.
    pub fn new(entries: Vec<GasEntry>) -> Result<Self, GasTableError> {
        if entries.is_empty() {
            return Err(GasTableError::Empty);
        }
        for (i, entry) in entries.iter().enumerate() {
            if !(entry.molar_mass_g_per_mol.is_finite() && entry.molar_mass_g_per_mol > 0.0) {
                return Err(GasTableError::InvalidMolarMass {
                    gas: entry.id.clone(),
                    value: entry.molar_mass_g_per_mol,
                });
            }
            if entries[..i].iter().any(|e| e.id == entry.id) {
                return Err(GasTableError::DuplicateGas(entry.id.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// O₂, N₂, He, CO₂ 네 가지 가스로 구성된 기본 테이블.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                GasEntry::new("O2", "O₂", 32.0),
                GasEntry::new("N2", "N₂", 28.01),
                GasEntry::new("He", "He", 4.002),
                GasEntry::new("CO2", "CO₂", 44.01),
            ],
        }
    }

    pub fn gases(&self) -> impl Iterator<Item = &GasEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&GasEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn molar_mass(&self, id: &str) -> Option<f64> {
        self.get(id).map(|e| e.molar_mass_g_per_mol)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GasTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_order_and_values() {
        let table = GasTable::standard();
        let ids: Vec<&str> = table.gases().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["O2", "N2", "He", "CO2"]);
        assert_eq!(table.molar_mass("O2"), Some(32.0));
        assert_eq!(table.molar_mass("N2"), Some(28.01));
        assert_eq!(table.molar_mass("He"), Some(4.002));
        assert_eq!(table.molar_mass("CO2"), Some(44.01));
        assert_eq!(table.molar_mass("Ar"), None);
    }

    #[test]
    fn rejects_non_positive_molar_mass() {
        let err = GasTable::new(vec![GasEntry::new("X", "X", 0.0)]).unwrap_err();
        assert_eq!(
            err,
            GasTableError::InvalidMolarMass {
                gas: "X".into(),
                value: 0.0
            }
        );
        assert!(GasTable::new(vec![GasEntry::new("X", "X", f64::NAN)]).is_err());
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert_eq!(GasTable::new(Vec::new()).unwrap_err(), GasTableError::Empty);
        let err = GasTable::new(vec![
            GasEntry::new("Ar", "Ar", 39.95),
            GasEntry::new("Ar", "Ar", 39.95),
        ])
        .unwrap_err();
        assert_eq!(err, GasTableError::DuplicateGas("Ar".into()));
    }
}

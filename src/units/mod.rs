//! 단위 변환 모듈. 압력은 atm, 몰질량은 g/mol 을 그대로 사용하므로 온도만 변환한다.

pub mod temperature;

pub use temperature::{convert_temperature, CELSIUS_OFFSET_K};

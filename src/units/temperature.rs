/// 섭씨 0도에 해당하는 켈빈 값.
pub const CELSIUS_OFFSET_K: f64 = 273.15;

/// 섭씨 온도를 켈빈으로 변환한다.
///
/// 변환만 수행하며 절대영도 이하 여부는 호출 측(계산기)에서 판단한다.
pub fn convert_temperature(celsius: f64) -> f64 {
    celsius + CELSIUS_OFFSET_K
}

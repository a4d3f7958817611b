//! 가스 테이블과 혼합 가스 밀도 계산 모듈 모음.

pub mod gas_table;
pub mod mixture_density;

pub use gas_table::*;
pub use mixture_density::*;

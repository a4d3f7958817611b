//! 조성 합계/멱등성 성질 테스트.
use approx::assert_relative_eq;
use gas_density_calculator::gas::{calculate, Percentages};
use proptest::prelude::*;

fn split(a: f64, b: f64, c: f64) -> Percentages {
    // 세 개의 절단점으로 100% 를 네 조각으로 나눈다
    let mut cuts = [a, b, c];
    cuts.sort_by(|x, y| x.total_cmp(y));
    let [c1, c2, c3] = cuts;
    let parts = [c1, c2 - c1, c3 - c2, 100.0 - c3];
    ["O2", "N2", "He", "CO2"]
        .into_iter()
        .zip(parts)
        .map(|(g, p)| (g.to_string(), p))
        .collect()
}

proptest! {
    #[test]
    fn component_densities_sum_to_mixture(
        pressure in 0.01_f64..50.0,
        temperature in -200.0_f64..1000.0,
        a in 0.0_f64..100.0,
        b in 0.0_f64..100.0,
        c in 0.0_f64..100.0,
    ) {
        let res = calculate(pressure, temperature, &split(a, b, c)).unwrap();
        let sum: f64 = res.components.iter().map(|c| c.density_g_per_l).sum();
        assert_relative_eq!(sum, res.mixture_density_g_per_l, max_relative = 1e-9);
        prop_assert!(res.mixture_density_g_per_l > 0.0);
    }

    #[test]
    fn calculation_is_idempotent(
        pressure in 0.01_f64..50.0,
        temperature in -200.0_f64..1000.0,
        a in 0.0_f64..100.0,
        b in 0.0_f64..100.0,
        c in 0.0_f64..100.0,
    ) {
        let pcts = split(a, b, c);
        let first = calculate(pressure, temperature, &pcts);
        let second = calculate(pressure, temperature, &pcts);
        prop_assert_eq!(first, second);
    }
}

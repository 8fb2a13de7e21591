//! Property tests for the valuation engines.
//!
//! Checks the identities and monotonicity guarantees that the dashboards
//! rely on when recomputing on every slider movement.

use proptest::prelude::*;
use valuation_core::dcf::{self, ValuationInputs};
use valuation_core::elasticity::simulate;
use valuation_core::presets::Scenario;
use valuation_core::vc::{self, VcInputs};
use valuation_core::ValuationError;

fn dcf_inputs(wacc: f64, g1: f64, g2: f64) -> ValuationInputs {
    ValuationInputs {
        ebit: 1000.0,
        tax_rate: 0.21,
        d_and_a: 100.0,
        capex: 150.0,
        change_nwc: 20.0,
        total_cash: 400.0,
        total_debt: 900.0,
        shares: 50.0,
        g1,
        wacc,
        g2,
    }
}

fn enterprise_value(wacc: f64, g1: f64, g2: f64) -> f64 {
    dcf::compute(&dcf_inputs(wacc, g1, g2), None)
        .unwrap()
        .valuation_flow
        .enterprise_value
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_zero_price_change_is_identity(
        price in 0.01_f64..1000.0,
        volume in 0.0_f64..1e6,
        elasticity in -5.0_f64..5.0,
    ) {
        let r = simulate(price, volume, elasticity, 0.0).unwrap();
        prop_assert_eq!(r.new_p, price);
        prop_assert_eq!(r.new_q, volume);
        prop_assert_eq!(r.rev_diff_pct, 0.0);
    }

    #[test]
    fn test_normal_goods_direction(
        price in 0.01_f64..1000.0,
        volume in 1.0_f64..1e6,
        elasticity in -0.99_f64..-0.01,
        pct in 0.5_f64..20.0,
    ) {
        let up = simulate(price, volume, elasticity, pct).unwrap();
        prop_assert!(up.new_q < volume);

        let down = simulate(price, volume, elasticity, -pct).unwrap();
        prop_assert!(down.new_q > volume);
    }

    #[test]
    fn test_volume_floor(
        price in 0.01_f64..1000.0,
        volume in 0.0_f64..1e6,
        elasticity in -50.0_f64..-1.0,
        pct in 0.0_f64..100.0,
    ) {
        let r = simulate(price, volume, elasticity, pct).unwrap();
        prop_assert!(r.new_q >= 0.0);
        if elasticity * (pct / 100.0) <= -1.0 {
            prop_assert_eq!(r.new_q, 0.0);
        }
    }

    #[test]
    fn test_enterprise_value_decreasing_in_wacc(
        wacc in 0.05_f64..0.20,
        bump in 0.001_f64..0.05,
        g2 in 0.0_f64..0.04,
    ) {
        prop_assert!(enterprise_value(wacc + bump, 0.05, g2) < enterprise_value(wacc, 0.05, g2));
    }

    #[test]
    fn test_enterprise_value_increasing_in_growth(
        g1 in -0.10_f64..0.20,
        g2 in 0.0_f64..0.03,
        bump in 0.001_f64..0.01,
    ) {
        let wacc = 0.10;
        prop_assert!(enterprise_value(wacc, g1 + bump, g2) > enterprise_value(wacc, g1, g2));
        prop_assert!(enterprise_value(wacc, g1, g2 + bump) > enterprise_value(wacc, g1, g2));
    }

    #[test]
    fn test_equity_identity_holds(
        wacc in 0.05_f64..0.20,
        g1 in -0.2_f64..0.3,
        g2 in -0.02_f64..0.04,
        cash in 0.0_f64..1e6,
        debt in 0.0_f64..1e6,
        shares in 1.0_f64..1e9,
    ) {
        let mut inputs = dcf_inputs(wacc, g1, g2);
        inputs.total_cash = cash;
        inputs.total_debt = debt;
        inputs.shares = shares;

        let r = dcf::compute(&inputs, None).unwrap();
        let flow = r.valuation_flow;
        prop_assert_eq!(flow.equity_value, flow.enterprise_value + cash - debt);
        prop_assert_eq!(r.intrinsic_value, flow.equity_value / shares);
    }

    #[test]
    fn test_margin_is_finite_or_rejected(price in prop_oneof![1e-310_f64..1e-300, 1e-3_f64..1e6]) {
        match dcf::compute(&dcf_inputs(0.10, 0.05, 0.02), Some(price)) {
            Ok(r) => prop_assert!(r.margin.is_some_and(f64::is_finite)),
            Err(err) => prop_assert!(matches!(err, ValuationError::NonFinite { quantity: "margin" }), "unexpected error: {:?}", err),
        }
    }

    #[test]
    fn test_simulation_outputs_finite_or_rejected(
        price in 1e-6_f64..1e6,
        volume in 0.0_f64..1e12,
        elasticity in prop_oneof![-10.0_f64..10.0, -1e308_f64..1e308],
        pct in -99.0_f64..500.0,
    ) {
        if let Ok(r) = simulate(price, volume, elasticity, pct) {
            for value in [r.new_p, r.new_q, r.new_rev, r.base_rev, r.rev_diff, r.rev_diff_pct, r.delta_q_pct] {
                prop_assert!(value.is_finite());
            }
        }
    }

    #[test]
    fn test_vc_horizon_never_panics(
        target_year in any::<i32>(),
        current_year in any::<i32>(),
    ) {
        let inputs = VcInputs::from_scenario(Scenario::Base, target_year, 1e7, 1e6, 1e6);
        match vc::compute(&inputs, current_year) {
            Ok(r) => {
                prop_assert!(r.metrics.years_to_exit > 0);
                prop_assert!(r.metrics.target_price.is_finite());
            }
            Err(err) => prop_assert!(matches!(err, ValuationError::InvalidRange { field: "target_year", .. }), "unexpected error: {:?}", err),
        }
    }

    #[test]
    fn test_divergence_at_or_below_growth(
        g2 in -0.5_f64..0.5,
        gap in 0.0_f64..0.5,
    ) {
        let result = dcf::compute(&dcf_inputs(g2 - gap, 0.05, g2), None);
        let is_divergence = matches!(result, Err(ValuationError::ModelDivergence { .. }));
        prop_assert!(is_divergence);
    }

    #[test]
    fn test_vc_target_never_exceeds_undiluted(
        diluicao in 0.0_f64..99.0,
        years in 1_i32..30,
    ) {
        let mut inputs = VcInputs::from_scenario(Scenario::Base, 2026 + years, 1e7, 1e6, 1e6);
        inputs.diluicao = diluicao;
        let m = vc::compute(&inputs, 2026).unwrap().metrics;
        prop_assert!(m.target_price <= m.price_no_dilution);
        if diluicao == 0.0 {
            prop_assert_eq!(m.target_price, m.price_no_dilution);
        }
    }

    #[test]
    fn test_engines_are_deterministic(
        wacc in 0.05_f64..0.20,
        pct in -20.0_f64..20.0,
    ) {
        let a = dcf::compute(&dcf_inputs(wacc, 0.05, 0.02), Some(10.0)).unwrap();
        let b = dcf::compute(&dcf_inputs(wacc, 0.05, 0.02), Some(10.0)).unwrap();
        prop_assert_eq!(a, b);

        let a = simulate(10.0, 1000.0, -1.3, pct).unwrap();
        let b = simulate(10.0, 1000.0, -1.3, pct).unwrap();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn test_concrete_vc_scenario() {
    let inputs = VcInputs {
        tam: 1e11,
        quota: 10.0,
        margem: 20.0,
        multiplo: 15.0,
        desconto: 30.0,
        diluicao: 7.0,
        target_year: 2031,
        acoes_atuais: 1e7,
        caixa_atual: 500_000.0,
        burn_anual: 600_000.0,
    };
    let r = vc::compute(&inputs, 2026).unwrap();

    approx::assert_relative_eq!(r.metrics.receita_alvo, 1e10, max_relative = 1e-12);
    approx::assert_relative_eq!(r.metrics.nopat_alvo, 2e9, max_relative = 1e-12);
    approx::assert_relative_eq!(r.metrics.exit_value, 3e10, max_relative = 1e-12);
    assert_eq!(r.survival.status, vc::RunwayStatus::Danger);
}

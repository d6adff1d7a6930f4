// tests/arbitrage_optimizer_integration.rs
// =========================================
// Properties of the cross-chain optimizer, exercised through the public API.

use std::str::FromStr;

use rust_decimal::Decimal;
use zerc_bridge_arbitrage::engine::optimizer::{
    optimal_arbitrage, optimize, ArbDirection, ArbitrageResult, FeeSchedule, OptimizerSettings,
    SolveMethod,
};
use zerc_bridge_arbitrage::engine::pricing::direction_pools;
use zerc_bridge_arbitrage::errors::ArbError;
use zerc_bridge_arbitrage::models::{Chain, RawPairReserves, ReserveSnapshot};

// ====== Test Helpers ======

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid decimal literal")
}

fn snapshot(usdc_eth: &str, zerc_eth: &str, usdc_pol: &str, zerc_pol: &str) -> ReserveSnapshot {
    ReserveSnapshot::new(d(usdc_eth), d(zerc_eth), d(usdc_pol), d(zerc_pol))
}

/// ZERC at 2 USDC on Ethereum, about 1.667 on Polygon.
fn reference() -> ReserveSnapshot {
    snapshot("1000000", "500000", "1000000", "600000")
}

fn profit_in(direction: ArbDirection, snapshot: &ReserveSnapshot) -> Decimal {
    let result = optimize(snapshot, &OptimizerSettings::default()).expect("valid snapshot");
    if result.direction == Some(direction) {
        result.profit_usdc
    } else {
        Decimal::ZERO
    }
}

fn assert_close(actual: Decimal, expected: &str, tolerance: &str) {
    let expected = d(expected);
    assert!(
        (actual - expected).abs() <= d(tolerance),
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

// ====== Concrete scenario ======

#[test]
fn reference_scenario_buys_on_polygon_and_sells_on_ethereum() {
    let result = optimize(&reference(), &OptimizerSettings::default()).unwrap();

    assert_eq!(result.direction, Some(ArbDirection::PolyToEth));
    assert_eq!(result.origin_chain(), Some(Chain::Polygon));
    assert_eq!(result.destination_chain(), Some(Chain::Ethereum));
    assert_close(result.amount_in_usdc, "42085.2704", "0.0001");
    assert_close(result.amount_bridged_zerc, "24161.6114", "0.0001");
    assert_close(result.amount_out_usdc, "45963.7976", "0.0001");
    assert_close(result.profit_usdc, "3878.5272", "0.0001");
}

#[test]
fn swapping_the_pools_flips_the_direction_with_the_same_profit() {
    let forward = optimize(&reference(), &OptimizerSettings::default()).unwrap();
    let mirrored = optimize(&reference().swapped(), &OptimizerSettings::default()).unwrap();

    assert_eq!(mirrored.direction, Some(ArbDirection::EthToPoly));
    assert_eq!(mirrored.amount_in_usdc, forward.amount_in_usdc);
    assert_eq!(mirrored.amount_bridged_zerc, forward.amount_bridged_zerc);
    assert_eq!(mirrored.profit_usdc, forward.profit_usdc);
}

#[test]
fn four_scalar_entry_point_uses_standard_fees() {
    let result = optimal_arbitrage(d("1000000"), d("500000"), d("1000000"), d("600000")).unwrap();
    let explicit = optimize(&reference(), &OptimizerSettings::default()).unwrap();
    assert_eq!(result, explicit);
}

// ====== No-arbitrage and degenerate inputs ======

#[test]
fn equal_price_ratios_mean_no_trade() {
    let cases = [
        snapshot("1000", "500", "2000", "1000"),
        snapshot("1000000", "1000000", "250", "250"),
        snapshot("0.5", "7", "5000", "70000"),
    ];
    for case in cases {
        let result = optimize(&case, &OptimizerSettings::default()).unwrap();
        assert_eq!(result, ArbitrageResult::no_trade(), "snapshot {case:?}");
    }
}

#[test]
fn identical_pools_are_exactly_zero() {
    let result = optimize(&snapshot("1000000", "1000000", "1000000", "1000000"), &OptimizerSettings::default())
        .unwrap();
    assert!(!result.is_profitable());
    assert_eq!(result.direction, None);
    assert_eq!(result.amount_in_usdc, Decimal::ZERO);
    assert_eq!(result.amount_bridged_zerc, Decimal::ZERO);
    assert_eq!(result.amount_out_usdc, Decimal::ZERO);
    assert_eq!(result.profit_usdc, Decimal::ZERO);
}

#[test]
fn small_gap_inside_the_fee_band_is_not_traded() {
    // 0.2 % apart with 0.3 % charged on each leg.
    let result = optimize(&snapshot("1000000", "500000", "1002000", "500000"), &OptimizerSettings::default())
        .unwrap();
    assert_eq!(result, ArbitrageResult::no_trade());
}

// ====== Sensitivity ======

#[test]
fn dearer_zerc_on_the_sell_chain_raises_profit() {
    // More USDC behind the same ZERC on Ethereum: PolyToEth sells ZERC there.
    let base = profit_in(ArbDirection::PolyToEth, &reference());
    let richer = profit_in(ArbDirection::PolyToEth, &snapshot("1100000", "500000", "1000000", "600000"));
    assert!(richer > base, "{richer} <= {base}");
    assert_close(richer, "9663.07", "0.01");
}

#[test]
fn cheaper_zerc_on_the_buy_chain_raises_profit() {
    let base = profit_in(ArbDirection::PolyToEth, &reference());
    let cheaper = profit_in(ArbDirection::PolyToEth, &snapshot("1000000", "500000", "1000000", "650000"));
    assert!(cheaper > base, "{cheaper} <= {base}");
}

#[test]
fn narrowing_the_gap_lowers_profit() {
    // More ZERC on Ethereum makes it cheaper where PolyToEth sells.
    let base = profit_in(ArbDirection::PolyToEth, &reference());
    let narrower = profit_in(ArbDirection::PolyToEth, &snapshot("1000000", "550000", "1000000", "600000"));
    assert!(narrower < base);
    assert_close(narrower, "820.79", "0.01");
}

#[test]
fn profit_grows_along_a_widening_gap() {
    let mut last = Decimal::ZERO;
    for usdc_eth in ["1000000", "1050000", "1100000", "1200000", "1500000"] {
        let profit = profit_in(ArbDirection::PolyToEth, &snapshot(usdc_eth, "500000", "1000000", "600000"));
        assert!(profit > last, "{usdc_eth}: {profit} <= {last}");
        last = profit;
    }
}

// ====== Fees ======

#[test]
fn fees_reduce_profit() {
    let free = OptimizerSettings { fees: FeeSchedule::uniform(Decimal::ZERO), ..OptimizerSettings::default() };
    let fee_free = optimize(&reference(), &free).unwrap();
    let with_fees = optimize(&reference(), &OptimizerSettings::default()).unwrap();

    assert_close(fee_free.profit_usdc, "4140.80", "0.01");
    assert!(with_fees.profit_usdc < fee_free.profit_usdc);

    let steeper = OptimizerSettings { fees: FeeSchedule::uniform(d("0.01")), ..OptimizerSettings::default() };
    assert!(optimize(&reference(), &steeper).unwrap().profit_usdc < with_fees.profit_usdc);
}

#[test]
fn fees_can_differ_per_chain() {
    let cheap_polygon = OptimizerSettings {
        fees: FeeSchedule { ethereum: d("0.003"), polygon: d("0.0005") },
        ..OptimizerSettings::default()
    };
    let standard = optimize(&reference(), &OptimizerSettings::default()).unwrap();
    let cheaper = optimize(&reference(), &cheap_polygon).unwrap();
    assert!(cheaper.profit_usdc > standard.profit_usdc);
}

// ====== Conservation and non-negativity ======

#[test]
fn reported_amounts_follow_the_swap_formula() {
    let settings = OptimizerSettings::default();
    let result = optimize(&reference(), &settings).unwrap();
    let direction = result.direction.expect("profitable");
    let (source, destination) = direction_pools(&reference(), direction, &settings.fees).unwrap();

    let bridged = source.quote_out(result.amount_in_usdc).unwrap();
    assert_eq!(result.amount_bridged_zerc, bridged);
    let out = destination.quote_out(bridged).unwrap();
    assert_eq!(result.amount_out_usdc, out);
    assert_eq!(result.profit_usdc, out - result.amount_in_usdc);
}

#[test]
fn profit_is_never_negative() {
    let cases = [
        reference(),
        reference().swapped(),
        snapshot("1", "1", "1", "1.0001"),
        snapshot("1000", "1", "1", "1000"),
        snapshot("0.000001", "0.000002", "0.000003", "0.000001"),
        snapshot("123456789", "98765432", "123456", "98765"),
        snapshot("50000000000", "25000000000", "40000000000", "30000000000"),
    ];
    for settings in [
        OptimizerSettings::default(),
        OptimizerSettings { method: SolveMethod::GoldenSection, ..OptimizerSettings::default() },
    ] {
        for case in &cases {
            let result = optimize(case, &settings).unwrap();
            assert!(result.profit_usdc >= Decimal::ZERO, "{case:?}: {result:?}");
            if result.direction.is_none() {
                assert_eq!(result, ArbitrageResult::no_trade());
            }
        }
    }
}

#[test]
fn golden_section_lands_on_the_closed_form_optimum() {
    let golden = OptimizerSettings { method: SolveMethod::GoldenSection, ..OptimizerSettings::default() };
    for case in [
        reference(),
        snapshot("2000000", "1000000", "1000000", "1000000"),
        snapshot("5000", "100", "9000", "100"),
    ] {
        let exact = optimize(&case, &OptimizerSettings::default()).unwrap();
        let searched = optimize(&case, &golden).unwrap();
        assert_eq!(searched.direction, exact.direction);
        assert!(searched.profit_usdc <= exact.profit_usdc + d("0.000001"));
        assert!(
            (exact.profit_usdc - searched.profit_usdc) <= exact.profit_usdc * d("0.000001"),
            "{case:?}: {} vs {}",
            searched.profit_usdc,
            exact.profit_usdc
        );
    }
}

// ====== Errors ======

#[test]
fn non_positive_reserves_are_rejected_by_name() {
    let err = optimize(&snapshot("1000", "0", "1000", "500"), &OptimizerSettings::default()).unwrap_err();
    assert_eq!(err, ArbError::invalid_reserve("zerc_ethereum", Decimal::ZERO));

    let err = optimal_arbitrage(d("1000"), d("500"), d("-1"), d("500")).unwrap_err();
    assert!(matches!(err, ArbError::InvalidReserve { ref name, .. } if name == "usdc_polygon"));
}

// ====== Raw on-chain reserves ======

#[test]
fn raw_pair_reserves_give_the_same_answer() {
    let ethereum = RawPairReserves::usdc_zerc(1_000_000_000_000, 500_000_000_000_000_000_000_000, true);
    let polygon = RawPairReserves::usdc_zerc(600_000_000_000_000_000_000_000, 1_000_000_000_000, false);
    let from_raw = ReserveSnapshot::from_raw_pairs(&ethereum, &polygon).unwrap();

    let result = optimize(&from_raw, &OptimizerSettings::default()).unwrap();
    let expected = optimize(&reference(), &OptimizerSettings::default()).unwrap();
    assert_eq!(result, expected);
}

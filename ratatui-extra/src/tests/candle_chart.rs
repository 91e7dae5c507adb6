use dexchart_utils::{Numeric, RawCandle};
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use crate::testutils::*;
use crate::widgets::candle_chart::{Candle, CandleChart, FinanceTimeScale, LinearScale};

fn raw(timestamp: i64, open: &str, high: &str, low: &str, close: &str, volume: &str) -> RawCandle {
    RawCandle {
        timestamp: Numeric::Number(timestamp as f64),
        open: open.into(),
        high: high.into(),
        low: low.into(),
        close: close.into(),
        volume: volume.into(),
    }
}

fn to_raw(candle: &Candle) -> RawCandle {
    RawCandle {
        timestamp: Numeric::Number(candle.date),
        open: Numeric::Number(candle.open),
        high: Numeric::Number(candle.high),
        low: Numeric::Number(candle.low),
        close: Numeric::Number(candle.close),
        volume: Numeric::Number(candle.volume),
    }
}

fn sample_candles() -> Vec<Candle> {
    vec![
        Candle::new(1_700_000_000_000.0, 100.0, 110.0, 95.0, 105.0, 1.0),
        Candle::new(1_700_001_800_000.0, 105.0, 115.0, 100.0, 110.0, 2.0),
        Candle::new(1_700_003_600_000.0, 110.0, 112.0, 98.0, 99.0, 3.0),
        Candle::new(1_700_005_400_000.0, 99.0, 130.0, 90.0, 120.0, 4.0),
    ]
}

// ============================================================================
// prepare_data tests
// ============================================================================

#[test]
fn prepare_data_coerces_string_fields() {
    let candles = CandleChart::prepare_data(&[raw(1000, "1.5", "2", "1", "1.8", "10")]);

    assert_eq!(candles, vec![Candle::new(1000.0, 1.5, 2.0, 1.0, 1.8, 10.0)]);
}

#[test]
fn prepare_data_sorts_by_date() {
    let candles = CandleChart::prepare_data(&[
        raw(2000, "2", "2", "2", "2", "2"),
        raw(1000, "1", "1", "1", "1", "1"),
    ]);

    assert_eq!(candles[0].date, 1000.0);
    assert_eq!(candles[0].open, 1.0);
    assert_eq!(candles[1].date, 2000.0);
    assert_eq!(candles[1].open, 2.0);
}

#[test]
fn prepare_data_output_is_non_decreasing() {
    let inputs: [&[i64]; 4] = [
        &[5, 3, 9, 1, 7],
        &[1, 2, 3],
        &[3, 3, 1, 3, 2],
        &[],
    ];

    for dates in inputs {
        let raws = dates
            .iter()
            .map(|d| raw(*d, "1", "1", "1", "1", "1"))
            .collect::<Vec<_>>();
        let candles = CandleChart::prepare_data(&raws);

        assert_eq!(candles.len(), dates.len());
        assert!(
            candles.windows(2).all(|w| w[0].date <= w[1].date),
            "{dates:?}"
        );
    }
}

#[test]
fn prepare_data_is_idempotent() {
    let once = CandleChart::prepare_data(&[
        raw(3000, "3", "4", "2", "3.5", "30"),
        raw(1000, "1", "2", "0.5", "1.5", "10"),
        raw(2000, "2", "3", "1", "2.5", "20"),
    ]);
    let twice = CandleChart::prepare_data(&once.iter().map(to_raw).collect::<Vec<_>>());

    assert_eq!(once, twice);
}

#[test]
fn prepare_data_keeps_input_order_for_equal_dates() {
    let candles = CandleChart::prepare_data(&[
        raw(1000, "1", "1", "1", "1", "1"),
        raw(1000, "2", "2", "2", "2", "2"),
    ]);

    assert_eq!(candles[0].open, 1.0);
    assert_eq!(candles[1].open, 2.0);
}

#[test]
fn prepare_data_passes_nan_through() {
    let candles = CandleChart::prepare_data(&[raw(1000, "oops", "2", "1", "1.8", "")]);

    assert!(candles[0].open.is_nan());
    assert_eq!(candles[0].volume, 0.0);
}

#[test]
fn prepare_data_keeps_records_with_unusable_dates() {
    let raws: Vec<RawCandle> = serde_json::from_str(
        r#"[
            {"timestamp": 2000, "open": "2", "high": "3", "low": "1", "close": "2.5"},
            {"timestamp": "soon", "open": "9", "high": "9", "low": "9", "close": "9"},
            {"timestamp": 1000, "open": "1", "high": "2"}
        ]"#,
    )
    .unwrap();

    let candles = CandleChart::prepare_data(&raws);

    assert_eq!(candles.len(), 3);
    assert_eq!(candles[0].date, 1000.0);
    assert!(candles[0].low.is_nan());
    assert!(candles[0].close.is_nan());
    assert_eq!(candles[1].date, 2000.0);
    assert!(candles[2].date.is_nan());
    assert_eq!(candles[2].open, 9.0);
}

#[test]
fn renders_candle_with_unusable_date_without_label() {
    let mut term = TestTerminal::new(80, 25);
    let mut chart = CandleChart::new(term.area);
    chart.draw(vec![Candle::new(f64::NAN, 100.0, 130.0, 90.0, 120.0, 1.0)]);

    (&chart).render(term.area, &mut term.buffer);

    assert_eq!(term.symbol_at(45, 12), Some("┃"));
    assert_eq!(term.symbol_at(45, 23), Some("─"));
}

// ============================================================================
// Geometry tests
// ============================================================================

#[test]
fn new_subtracts_margins() {
    let chart = CandleChart::new(Rect::new(0, 0, 80, 25));

    assert_eq!(chart.width(), 67);
    assert_eq!(chart.height(), 22);
    assert_eq!(chart.plot_area(), Rect::new(12, 1, 67, 22));
}

#[test]
fn new_saturates_on_tiny_container() {
    let chart = CandleChart::new(Rect::new(0, 0, 5, 2));

    assert_eq!(chart.width(), 0);
    assert_eq!(chart.height(), 0);
}

#[test]
fn resize_keeps_data() {
    let mut chart = CandleChart::new(Rect::new(0, 0, 80, 25));
    chart.draw(sample_candles());

    chart.resize(Rect::new(2, 3, 60, 20));

    assert_eq!(chart.width(), 47);
    assert_eq!(chart.height(), 17);
    assert_eq!(chart.plot_area(), Rect::new(14, 4, 47, 17));
    assert_eq!(chart.candles().len(), 4);
}

// ============================================================================
// Domain tests
// ============================================================================

#[test]
fn draw_sets_domains_from_data() {
    let mut chart = CandleChart::new(Rect::new(0, 0, 80, 25));
    let candles = sample_candles();

    chart.draw(candles.clone());

    assert_eq!(
        chart.x().domain(),
        candles.iter().map(|c| c.date).collect::<Vec<_>>()
    );
    assert_eq!(chart.y().domain(), (90.0, 130.0));
    assert_eq!(chart.candles(), candles.as_slice());
}

#[test]
fn draw_ignores_nan_in_y_domain() {
    let mut chart = CandleChart::new(Rect::new(0, 0, 80, 25));
    chart.draw(vec![
        Candle::new(1.0, f64::NAN, 10.0, 5.0, 7.0, 0.0),
        Candle::new(2.0, 6.0, 12.0, f64::NAN, 8.0, 0.0),
    ]);

    assert_eq!(chart.y().domain(), (5.0, 12.0));
}

#[test]
fn draw_empty_data() {
    let mut chart = CandleChart::new(Rect::new(0, 0, 80, 25));
    chart.draw(sample_candles());
    chart.draw(vec![]);

    assert!(chart.x().domain().is_empty());
    assert_eq!(chart.y().domain(), (0.0, 0.0));
}

#[test]
fn charts_do_not_share_state() {
    let mut a = CandleChart::new(Rect::new(0, 0, 80, 25));
    let b = CandleChart::new(Rect::new(0, 0, 40, 10));

    a.draw(sample_candles());

    assert!(b.candles().is_empty());
    assert!(b.x().domain().is_empty());
    assert_eq!(b.width(), 27);
}

// ============================================================================
// Scale tests
// ============================================================================

#[test]
fn finance_time_scale_slots() {
    let mut x = FinanceTimeScale::default();
    x.set_range(67);
    x.set_domain(vec![10.0, 20.0, 500.0, 510.0]);

    assert_eq!(x.band_width(), 16.75);
    assert_eq!(x.scale_index(0), Some(8));
    assert_eq!(x.scale_index(2), Some(41));
    assert_eq!(x.scale_index(3), Some(58));
    assert_eq!(x.scale_index(4), None);
}

#[test]
fn finance_time_scale_more_dates_than_columns() {
    let mut x = FinanceTimeScale::default();
    x.set_range(10);
    x.set_domain((0..200).map(f64::from).collect());

    for idx in 0..200 {
        let column = x.scale_index(idx).unwrap();
        assert!(column < 10);
    }
}

#[test]
fn finance_time_scale_zero_range() {
    let mut x = FinanceTimeScale::default();
    x.set_domain(vec![1.0, 2.0, 3.0]);

    assert_eq!(x.scale_index(0), None);
}

#[test]
fn linear_scale_maps_domain_to_rows() {
    let mut y = LinearScale::default();
    y.set_range(22);
    y.set_domain(90.0, 130.0);

    assert_eq!(y.scale(90.0), 0.0);
    assert_eq!(y.scale(130.0), 22.0);
    assert_eq!(y.scale(110.0), 11.0);
    assert_eq!(y.invert(22.0), 130.0);
    assert_eq!(y.invert(0.0), 90.0);
}

#[test]
fn linear_scale_flat_domain_uses_middle_row() {
    let mut y = LinearScale::default();
    y.set_range(10);
    y.set_domain(5.0, 5.0);

    assert_eq!(y.scale(5.0), 5.0);
    assert_eq!(y.scale(100.0), 5.0);
    assert!(y.scale(f64::NAN).is_nan());
}

// ============================================================================
// Candle tests
// ============================================================================

#[test]
fn candle_from_raw() {
    let candle = Candle::from(&raw(42, "1", "3", "0.5", "2", "7"));

    assert_eq!(candle, Candle::new(42.0, 1.0, 3.0, 0.5, 2.0, 7.0));
}

#[test]
fn candle_bull_and_bear() {
    assert_eq!(
        Candle::new(0.0, 100.0, 110.0, 95.0, 105.0, 0.0).bear_bull(),
        Color::LightGreen
    );
    assert_eq!(
        Candle::new(0.0, 105.0, 110.0, 95.0, 100.0, 0.0).bear_bull(),
        Color::Red
    );
    // equal open and close counts as bullish
    assert_eq!(
        Candle::new(0.0, 100.0, 110.0, 95.0, 100.0, 0.0).bear_bull(),
        Color::LightGreen
    );
}

// ============================================================================
// Rendering tests
// ============================================================================

#[test]
fn renders_axes_and_candles() {
    let mut term = TestTerminal::new(80, 25);
    let mut chart = CandleChart::new(term.area);
    chart.draw(sample_candles());

    (&chart).render(term.area, &mut term.buffer);

    let output = term.render_to_string();
    assert!(output.contains("┤"));
    assert!(output.contains("└"));
    assert!(output.contains("─"));
    assert!(output.contains("┴"));
    assert!(!term.cells_with_fg(Color::LightGreen).is_empty());
    assert!(!term.cells_with_fg(Color::Red).is_empty());
}

#[test]
fn renders_top_label_at_domain_max() {
    let mut term = TestTerminal::new(80, 25);
    let mut chart = CandleChart::new(term.area);
    chart.draw(sample_candles());

    (&chart).render(term.area, &mut term.buffer);

    let output = term.render_to_string();
    let first_plot_row = output.lines().nth(1).unwrap();
    assert!(first_plot_row.contains("130.000 ┤"), "{first_plot_row}");
}

#[test]
fn renders_single_candle_body_and_tick() {
    let mut term = TestTerminal::new(80, 25);
    let mut chart = CandleChart::new(term.area);
    chart.draw(vec![Candle::new(
        1_700_000_000_000.0,
        100.0,
        130.0,
        90.0,
        120.0,
        1.0,
    )]);

    (&chart).render(term.area, &mut term.buffer);

    // one slot of 67 columns, centred at column 33 of the plot
    assert_eq!(term.symbol_at(45, 12), Some("┃"));
    assert!(term.cells_with_fg(Color::LightGreen).contains(&(45, 12)));
    assert_eq!(term.symbol_at(45, 23), Some("┴"));
}

#[test]
fn renders_axes_only_without_data() {
    let mut term = TestTerminal::new(80, 25);
    let chart = CandleChart::new(term.area);

    (&chart).render(term.area, &mut term.buffer);

    let output = term.render_to_string();
    assert!(output.contains("│"));
    assert!(output.contains("─"));
    assert!(!output.contains("┤"));
    assert!(term.cells_with_fg(Color::LightGreen).is_empty());
}

#[test]
fn renders_nan_candles_without_painting() {
    let mut term = TestTerminal::new(80, 25);
    let mut chart = CandleChart::new(term.area);
    chart.draw(vec![Candle::new(
        1_700_000_000_000.0,
        f64::NAN,
        f64::NAN,
        f64::NAN,
        f64::NAN,
        0.0,
    )]);

    (&chart).render(term.area, &mut term.buffer);

    assert!(term.cells_with_fg(Color::LightGreen).is_empty());
    assert!(term.cells_with_fg(Color::Red).is_empty());
}

#[test]
fn renders_flat_series() {
    let mut term = TestTerminal::new(80, 25);
    let mut chart = CandleChart::new(term.area);
    chart.draw(vec![
        Candle::new(1_700_000_000_000.0, 5.0, 5.0, 5.0, 5.0, 0.0),
        Candle::new(1_700_001_800_000.0, 5.0, 5.0, 5.0, 5.0, 0.0),
    ]);

    (&chart).render(term.area, &mut term.buffer);

    assert!(!term.cells_with_fg(Color::LightGreen).is_empty());
}

#[test]
fn renders_into_tiny_area() {
    let mut term = TestTerminal::new(6, 3);
    let mut chart = CandleChart::new(term.area);
    chart.draw(sample_candles());

    (&chart).render(term.area, &mut term.buffer);
}

#[test]
fn renders_container_larger_than_buffer() {
    let mut term = TestTerminal::new(40, 10);
    let mut chart = CandleChart::new(Rect::new(0, 0, 120, 40));
    chart.draw(sample_candles());

    // stale geometry after a shrink must not write outside the buffer
    (&chart).render(term.area, &mut term.buffer);
}

#[test]
fn renders_more_candles_than_columns() {
    let mut term = TestTerminal::new(40, 15);
    let mut chart = CandleChart::new(term.area);
    let candles = (0..200)
        .map(|i| {
            let base = 100.0 + (i % 7) as f64;
            let date = 1_700_000_000_000.0 + f64::from(i) * 1_800_000.0;
            Candle::new(date, base, base + 2.0, base - 2.0, base + 1.0, 1.0)
        })
        .collect();
    chart.draw(candles);

    (&chart).render(term.area, &mut term.buffer);

    assert!(!term.cells_with_fg(Color::LightGreen).is_empty());
}

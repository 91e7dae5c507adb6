use chrono::{DateTime, Local, TimeZone};
use dexchart_utils::RawCandle;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Style},
    widgets::Widget,
};

/// Space reserved around the plot: the y-axis lives in the left margin, the
/// x-axis line and its labels in the bottom margin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

pub const MARGINS: Margins = Margins {
    left: 12,
    top: 1,
    right: 1,
    bottom: 2,
};

/// Candlestick renderer. Owns its geometry, both scales and the series it
/// paints; nothing is shared between instances.
#[derive(Debug, Default)]
pub struct CandleChart {
    container: Rect,
    margins: Margins,
    width: u16,
    height: u16,
    x: FinanceTimeScale,
    y: LinearScale,
    candles: Vec<Candle>,
}

impl CandleChart {
    pub fn new(container: Rect) -> Self {
        let mut chart = Self {
            margins: MARGINS,
            ..Default::default()
        };
        chart.resize(container);
        chart
    }

    /// Recomputes the drawable size for a new container. Data is kept.
    pub fn resize(&mut self, container: Rect) {
        self.container = container;
        self.width = container
            .width
            .saturating_sub(self.margins.left + self.margins.right);
        self.height = container
            .height
            .saturating_sub(self.margins.top + self.margins.bottom);
        self.x.set_range(self.width);
        self.y.set_range(self.height);
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn x(&self) -> &FinanceTimeScale {
        &self.x
    }

    pub fn y(&self) -> &LinearScale {
        &self.y
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Area the candles are painted in, inside the margins.
    pub fn plot_area(&self) -> Rect {
        Rect::new(
            self.container.x.saturating_add(self.margins.left),
            self.container.y.saturating_add(self.margins.top),
            self.width,
            self.height,
        )
    }

    /// Converts datafeed records into candles ordered by date. Records sharing
    /// a date keep their input order; records whose date is `NaN` go last.
    pub fn prepare_data(raw_data: &[RawCandle]) -> Vec<Candle> {
        let mut candles = raw_data.iter().map(Candle::from).collect::<Vec<_>>();
        candles.sort_by(|a, b| a.date.total_cmp(&b.date));
        candles
    }

    /// Replaces the series and recomputes both domains from it. Takes effect
    /// on the next render.
    pub fn draw(&mut self, data: Vec<Candle>) {
        self.x.set_domain(data.iter().map(|c| c.date).collect());
        let (min, max) = ohlc_extent(&data);
        self.y.set_domain(min, max);
        self.candles = data;
    }

    fn render_y_axis(&self, plot: Rect, buf: &mut Buffer) {
        let Some(axis_x) = plot.x.checked_sub(1) else {
            return;
        };

        for i in 0..plot.height {
            let y = plot.y + i;
            if i % 4 == 0 && !self.candles.is_empty() {
                let value = self.y.invert((plot.height - i) as f64);
                let label = format!("{} ┤", numeric_format(value));
                let len = label.chars().count() as u16;
                put(buf, plot.x.saturating_sub(len), y, &label, Style::default());
            } else {
                put(buf, axis_x, y, "│", Style::default());
            }
        }
        put(buf, axis_x, plot.y + plot.height, "└", Style::default());
    }

    fn render_x_axis(&self, plot: Rect, buf: &mut Buffer) {
        let width = plot.width as usize;
        let mut axis_line = vec!['─'; width];
        let mut labels = vec![' '; width];

        let mut prev: Option<DateTime<Local>> = None;
        for (idx, candle) in self.candles.iter().enumerate() {
            let (Some(column), Some(now)) = (self.x.scale_index(idx), local_time(candle.date))
            else {
                continue;
            };

            let rendered = match prev {
                Some(prev) => diff_datetime_string(prev, now),
                None => now.format("%m/%d %H:%M").to_string(),
            };
            prev = Some(now);
            if rendered.is_empty() {
                continue;
            }

            let rendered = format!(" {rendered} ");
            let start = column as isize - (rendered.chars().count() / 2) as isize;
            if overwrite_chars(&mut labels, start, &rendered, false) {
                axis_line[column as usize] = '┴';
            }
        }

        let axis_y = plot.y + plot.height;
        put(
            buf,
            plot.x,
            axis_y,
            &String::from_iter(axis_line),
            Style::default(),
        );
        put(
            buf,
            plot.x,
            axis_y.saturating_add(1),
            String::from_iter(labels).trim_end(),
            Style::default(),
        );
    }

    fn render_candles(&self, plot: Rect, buf: &mut Buffer) {
        for (idx, candle) in self.candles.iter().enumerate() {
            let Some(column) = self.x.scale_index(idx) else {
                continue;
            };
            let rows = candle.rows(&self.y);
            let mut is_body = false;

            for y_chart in (0..plot.height).rev() {
                let glyph = glyph(&rows, y_chart as f64, &mut is_body);
                if glyph == UNICODE_VOID {
                    continue;
                }
                put(
                    buf,
                    plot.x + column,
                    plot.y + plot.height - y_chart - 1,
                    glyph,
                    Style::default().fg(candle.bear_bull()),
                );
            }
        }
    }
}

impl Widget for &CandleChart {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        if self.container.intersection(area).is_empty() {
            return;
        }

        let plot = self.plot_area();
        self.render_y_axis(plot, buf);
        self.render_x_axis(plot, buf);
        self.render_candles(plot, buf);
    }
}

/// Discrete time scale: every date in the domain gets an equally wide slot,
/// so weekends or feed outages take no room on the x-axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinanceTimeScale {
    domain: Vec<f64>,
    range: u16,
}

impl FinanceTimeScale {
    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn set_domain(&mut self, dates: Vec<f64>) {
        self.domain = dates;
    }

    pub fn set_range(&mut self, width: u16) {
        self.range = width;
    }

    pub fn band_width(&self) -> f64 {
        if self.domain.is_empty() {
            0.0
        } else {
            self.range as f64 / self.domain.len() as f64
        }
    }

    /// Column of the centre of the slot at `idx`.
    pub fn scale_index(&self, idx: usize) -> Option<u16> {
        if idx >= self.domain.len() || self.range == 0 {
            return None;
        }
        let column = ((idx as f64 + 0.5) * self.band_width()).floor() as u16;
        Some(column.min(self.range - 1))
    }
}

/// Linear price scale measured in rows from the bottom of the plot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: u16,
}

impl LinearScale {
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn set_domain(&mut self, min: f64, max: f64) {
        self.domain = (min, max);
    }

    pub fn set_range(&mut self, height: u16) {
        self.range = height;
    }

    fn span(&self) -> Option<f64> {
        let span = self.domain.1 - self.domain.0;
        (span.is_finite() && span > 0.0).then_some(span)
    }

    /// A flat domain maps every finite value to the middle row.
    pub fn scale(&self, value: f64) -> f64 {
        match self.span() {
            Some(span) => (value - self.domain.0) / span * self.range as f64,
            None if value.is_finite() => self.range as f64 / 2.0,
            None => f64::NAN,
        }
    }

    pub fn invert(&self, row: f64) -> f64 {
        match self.span() {
            Some(span) if self.range > 0 => self.domain.0 + row / self.range as f64 * span,
            _ => self.domain.0,
        }
    }
}

fn ohlc_extent(data: &[Candle]) -> (f64, f64) {
    let (min, max) = data
        .iter()
        .flat_map(|c| [c.open, c.high, c.low, c.close])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        });
    if min <= max {
        (min, max)
    } else {
        (0.0, 0.0)
    }
}

/// Candle prices converted to plot rows.
struct CandleRows {
    high: f64,
    low: f64,
    body_top: f64,
    body_bottom: f64,
}

fn glyph(rows: &CandleRows, y: f64, is_body: &mut bool) -> &'static str {
    let high_top_diff = rows.high - rows.body_top;
    let bottom_low_diff = rows.body_bottom - rows.low;

    if rows.high.ceil() >= y && y >= rows.body_top.floor() {
        if rows.high - y > 0.5 {
            if high_top_diff < 0.25 {
                *is_body = true;
                UNICODE_BODY
            } else if high_top_diff < 0.75 {
                let was_body = *is_body;
                *is_body = true;
                if was_body {
                    UNICODE_BODY
                } else {
                    UNICODE_UP
                }
            } else {
                UNICODE_WICK
            }
        } else if rows.high - y >= 0. {
            if high_top_diff < 0.25 {
                UNICODE_HALF_BODY_BOTTOM
            } else {
                UNICODE_HALF_WICK_BOTTOM
            }
        } else {
            UNICODE_VOID
        }
    } else if rows.body_top.floor() >= y && y >= rows.body_bottom.ceil() {
        *is_body = true;
        UNICODE_BODY
    } else if rows.body_bottom.ceil() >= y && y >= rows.low.floor() {
        if rows.low - y < 0.5 {
            if bottom_low_diff < 0.25 {
                *is_body = true;
                UNICODE_BODY
            } else if bottom_low_diff < 0.75 {
                if *is_body {
                    *is_body = false;
                    UNICODE_DOWN
                } else {
                    UNICODE_WICK
                }
            } else {
                UNICODE_WICK
            }
        } else if rows.low - y <= 1.0 {
            if bottom_low_diff < 0.25 {
                UNICODE_HALF_BODY_TOP
            } else {
                UNICODE_HALF_WICK_TOP
            }
        } else {
            UNICODE_VOID
        }
    } else {
        UNICODE_VOID
    }
}

/// Writes `value` only when it starts inside the buffer.
fn put(buf: &mut Buffer, x: u16, y: u16, value: &str, style: Style) {
    if buf.area.contains(Position::new(x, y)) {
        buf.set_string(x, y, value, style);
    }
}

/// `None` for dates that are not finite or out of chrono's range.
fn local_time(millis: f64) -> Option<DateTime<Local>> {
    if !millis.is_finite() {
        return None;
    }
    Local.timestamp_millis_opt(millis.trunc() as i64).single()
}

/// Shortest label that tells `now` apart from the previous tick.
fn diff_datetime_string(prev: DateTime<Local>, now: DateTime<Local>) -> String {
    let prev_year = prev.format("%Y").to_string();
    let now_year = now.format("%Y").to_string();
    if prev_year != now_year {
        return now_year;
    }

    let prev_date = prev.format("%m/%d").to_string();
    let now_date = now.format("%m/%d").to_string();
    if prev_date != now_date {
        return now_date;
    }

    let prev_time = prev.format("%H:%M").to_string();
    let now_time = now.format("%H:%M").to_string();
    if prev_time != now_time {
        return now_time;
    }

    String::default()
}

fn overwrite_chars(chars: &mut [char], idx: isize, value: &str, overlap: bool) -> bool {
    let value = value.chars().collect::<Vec<char>>();
    if chars.len() < value.len() {
        return false;
    }

    let idx = if idx < 0 {
        0
    } else if chars.len() < idx as usize + value.len() {
        chars.len() - value.len()
    } else {
        idx as usize
    };

    let target = &mut chars[idx..(idx + value.len())];
    // labels never overwrite each other unless asked to
    if !overlap && target.iter().any(|c| *c != ' ') {
        return false;
    }

    target.copy_from_slice(&value);
    true
}

fn numeric_format(value: f64) -> String {
    let precision = 9;
    let scale = 3;
    format!("{value:>precision$.scale$}")
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Candle {
    /// Epoch milliseconds, `NaN` when the feed sent no usable date.
    pub date: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(date: f64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
        Candle {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn rows(&self, y: &LinearScale) -> CandleRows {
        let [open, high, low, close] =
            [self.open, self.high, self.low, self.close].map(|v| y.scale(v));
        CandleRows {
            high,
            low,
            body_top: open.max(close),
            body_bottom: open.min(close),
        }
    }

    pub fn bear_bull(&self) -> Color {
        if self.open <= self.close {
            Color::LightGreen
        } else {
            Color::Red
        }
    }
}

impl From<&RawCandle> for Candle {
    fn from(raw: &RawCandle) -> Self {
        Candle {
            date: raw.timestamp.to_f64(),
            open: raw.open.to_f64(),
            high: raw.high.to_f64(),
            low: raw.low.to_f64(),
            close: raw.close.to_f64(),
            volume: raw.volume.to_f64(),
        }
    }
}

const UNICODE_VOID: &str = " ";
const UNICODE_BODY: &str = "┃";
const UNICODE_WICK: &str = "│";
const UNICODE_UP: &str = "╽";
const UNICODE_DOWN: &str = "╿";
const UNICODE_HALF_BODY_BOTTOM: &str = "╻";
const UNICODE_HALF_WICK_BOTTOM: &str = "╷";
const UNICODE_HALF_BODY_TOP: &str = "╹";
const UNICODE_HALF_WICK_TOP: &str = "╵";

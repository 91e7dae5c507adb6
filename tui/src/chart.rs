//! Binds a candlestick chart to a trading pair and keeps it fresh.
//!
//! The controller never blocks the event loop. A poller task emits
//! [`AppEvent::ChartAttached`] once the container has settled and then
//! [`AppEvent::ChartTick`] on every refresh interval. Each refresh spawns one
//! fetch task that reports back with [`AppEvent::ChartCandles`]. All state is
//! mutated from [`ChartController::handle_event`] on the event-loop thread.

use std::{
    sync::{mpsc, Arc},
    time::Duration,
};

use chrono::{DateTime, Local};
use dexchart_ratatui_extra::candle_chart::CandleChart;
use dexchart_utils::{dexchart_log, DatafeedApi, NetworkMode, Pair, RawCandle};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::AppEvent;

pub const ATTACH_DELAY: Duration = Duration::from_millis(100);
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(5000);
pub const CANDLE_COUNT: u32 = 120;
pub const CANDLE_FRAME_MINUTES: u32 = 30;

/// `tokio::time::interval` panics on a zero period.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartSettings {
    pub attach_delay: Duration,
    pub refresh_interval: Duration,
    pub candle_count: u32,
    pub frame_minutes: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            attach_delay: ATTACH_DELAY,
            refresh_interval: REFRESH_INTERVAL,
            candle_count: CANDLE_COUNT,
            frame_minutes: CANDLE_FRAME_MINUTES,
        }
    }
}

type ErrorHandler = Box<dyn Fn(&dexchart_utils::Error) + Send>;

pub struct ChartController<D, N> {
    datafeed: Arc<D>,
    network: Arc<N>,
    settings: ChartSettings,

    pair: Option<Pair>,
    container: Rect,
    chart: Option<CandleChart>,

    poller: Option<JoinHandle<()>>,
    shutdown_signal: CancellationToken,

    last_request_id: u64,
    /// Responses with a lower id were requested for a previously bound pair.
    min_request_id: u64,
    applied_request_id: Option<u64>,

    displayed_pair: Option<Pair>,
    updated_at: Option<DateTime<Local>>,
    on_error: ErrorHandler,
}

impl<D, N> ChartController<D, N>
where
    D: DatafeedApi,
    N: NetworkMode,
{
    pub fn new(datafeed: Arc<D>, network: Arc<N>, settings: ChartSettings) -> Self {
        Self {
            datafeed,
            network,
            settings,
            pair: None,
            container: Rect::default(),
            chart: None,
            poller: None,
            shutdown_signal: CancellationToken::new(),
            last_request_id: 0,
            min_request_id: 0,
            applied_request_id: None,
            displayed_pair: None,
            updated_at: None,
            on_error: Box::new(|_| {}),
        }
    }

    /// Called with every failed fetch, after it has been logged.
    pub fn set_error_handler<F>(&mut self, on_error: F)
    where
        F: Fn(&dexchart_utils::Error) + Send + 'static,
    {
        self.on_error = Box::new(on_error);
    }

    /// Starts the poller. Attaching again restarts the schedule and abandons
    /// fetches started under the previous one.
    pub fn attach(&mut self, container: Rect, transmitter: &mpsc::Sender<AppEvent>) {
        self.teardown();

        self.container = container;
        self.shutdown_signal = CancellationToken::new();

        let tr = transmitter.clone();
        let sd = self.shutdown_signal.clone();
        let attach_delay = self.settings.attach_delay;
        let refresh_interval = self.settings.refresh_interval.max(MIN_REFRESH_INTERVAL);
        self.poller = Some(tokio::spawn(async move {
            poll_chart(tr, sd, attach_delay, refresh_interval).await
        }));
    }

    /// Binds a new pair. Once the chart is attached a change fetches right
    /// away instead of waiting for the next tick.
    pub fn set_pair(&mut self, pair: Option<Pair>, transmitter: &mpsc::Sender<AppEvent>) {
        if self.pair == pair {
            return;
        }

        self.pair = pair;
        self.min_request_id = self.last_request_id + 1;

        if self.chart.is_some() {
            self.refresh(transmitter);
        }
    }

    /// Spawns a fetch for the bound pair. Returns `false` without touching the
    /// datafeed when no pair is bound.
    pub fn refresh(&mut self, transmitter: &mpsc::Sender<AppEvent>) -> bool {
        let Some(pair) = self.pair.as_ref() else {
            return false;
        };

        let pair = if self.network.is_testnet() {
            self.network.testnet_substitute_pair(pair)
        } else {
            pair.clone()
        };

        self.last_request_id += 1;
        let request_id = self.last_request_id;

        let datafeed = Arc::clone(&self.datafeed);
        let tr = transmitter.clone();
        let sd = self.shutdown_signal.clone();
        let count = self.settings.candle_count;
        let frame_minutes = self.settings.frame_minutes;
        tokio::spawn(async move {
            let fetch = async move {
                let result = datafeed
                    .get_last_candles(&pair, count, frame_minutes)
                    .await;
                (pair, result)
            };

            tokio::select! {
                (pair, result) = fetch => {
                    let _ = tr.send(AppEvent::ChartCandles {
                        request_id,
                        pair,
                        result,
                    });
                }
                _ = sd.cancelled() => {}
            }
        });

        true
    }

    pub fn handle_event(&mut self, event: AppEvent, transmitter: &mpsc::Sender<AppEvent>) {
        match event {
            AppEvent::ChartAttached => {
                if self.poller.is_none() {
                    return;
                }
                self.chart = Some(CandleChart::new(self.container));
                self.refresh(transmitter);
            }
            AppEvent::ChartTick => {
                if self.poller.is_some() && self.chart.is_some() {
                    self.refresh(transmitter);
                }
            }
            AppEvent::ChartCandles {
                request_id,
                pair,
                result,
            } => self.apply_candles(request_id, pair, result),
            _ => {}
        }
    }

    fn apply_candles(
        &mut self,
        request_id: u64,
        pair: Pair,
        result: dexchart_utils::Result<Vec<RawCandle>>,
    ) {
        let superseded = self
            .applied_request_id
            .is_some_and(|applied| request_id < applied);
        if request_id < self.min_request_id || superseded {
            dexchart_log!("dropping stale candles for {pair} (request {request_id})");
            return;
        }
        self.applied_request_id = Some(request_id);

        match result {
            Ok(raw_data) => {
                let Some(chart) = self.chart.as_mut() else {
                    return;
                };
                chart.draw(CandleChart::prepare_data(&raw_data));
                self.displayed_pair = Some(pair);
                self.updated_at = Some(Local::now());
            }
            Err(error) => {
                dexchart_log!("fetching candles for {pair} failed: {error}");
                (self.on_error)(&error);
            }
        }
    }
}

impl<D, N> ChartController<D, N> {
    pub fn pair(&self) -> Option<&Pair> {
        self.pair.as_ref()
    }

    pub fn chart(&self) -> Option<&CandleChart> {
        self.chart.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.chart.is_some()
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .as_ref()
            .is_some_and(|poller| !poller.is_finished())
    }

    /// Pair of the candles on screen, after testnet substitution.
    pub fn displayed_pair(&self) -> Option<&Pair> {
        self.displayed_pair.as_ref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    pub fn resize(&mut self, container: Rect) {
        self.container = container;
        if let Some(chart) = self.chart.as_mut() {
            chart.resize(container);
        }
    }

    /// Stops the poller and abandons every in-flight fetch.
    pub fn teardown(&mut self) {
        self.shutdown_signal.cancel();
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
        self.chart = None;
    }
}

impl<D, N> Drop for ChartController<D, N> {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn poll_chart(
    transmitter: mpsc::Sender<AppEvent>,
    shutdown_signal: CancellationToken,
    attach_delay: Duration,
    refresh_interval: Duration,
) {
    tokio::select! {
        _ = tokio::time::sleep(attach_delay) => {}
        _ = shutdown_signal.cancelled() => return,
    }

    if transmitter.send(AppEvent::ChartAttached).is_err() {
        return;
    }

    let mut interval =
        tokio::time::interval_at(Instant::now() + refresh_interval, refresh_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if transmitter.send(AppEvent::ChartTick).is_err() {
                    break;
                }
            }
            _ = shutdown_signal.cancelled() => break
        }
    }
}

impl<D, N> Widget for &ChartController<D, N> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        match self.chart.as_ref() {
            Some(chart) => chart.render(area, buf),
            None => "Loading chart...".render(area, buf),
        }
    }
}

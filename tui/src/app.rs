use std::{io, sync::mpsc, time::Duration};

use dexchart_utils::{config::Config, dexchart_log, DatafeedClient, Network, NetworkMode, Pair};
use ratatui::{
    buffer::Buffer,
    crossterm::event::KeyCode,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Widget},
    DefaultTerminal,
};
use tokio_util::sync::CancellationToken;

use crate::{
    chart::{ChartController, ChartSettings},
    error::FmtError,
    events::{self, AppEvent},
};

pub struct App {
    exit: bool,
    pairs: Vec<Pair>,
    cursor: usize,
    testnet: bool,
    last_error: Option<String>,

    controller: ChartController<DatafeedClient, Network>,

    input_thread: Option<std::thread::JoinHandle<crate::Result<()>>>,
}

impl App {
    pub fn new(config: &Config, pairs: Vec<Pair>) -> crate::Result<Self> {
        if pairs.is_empty() {
            return Err(crate::Error::NoPairs);
        }

        let datafeed = DatafeedClient::new(&config.datafeed_url)?;
        let network = Network::from_config(config);
        let testnet = network.is_testnet();
        let settings = ChartSettings {
            refresh_interval: Duration::from_millis(config.refresh_interval_ms),
            ..Default::default()
        };

        Ok(Self {
            exit: false,
            pairs,
            cursor: 0,
            testnet,
            last_error: None,
            controller: ChartController::new(datafeed.into(), network.into(), settings),
            input_thread: None,
        })
    }

    pub async fn run(&mut self) -> crate::Result<()> {
        let (event_tr, event_rc) = mpsc::channel::<AppEvent>();
        let shutdown = CancellationToken::new();
        let mut terminal = ratatui::init();

        self.init_threads(&event_tr, &shutdown);

        let result = self.event_loop(&mut terminal, &event_tr, &event_rc);

        // signal all the threads to exit
        shutdown.cancel();
        self.controller.teardown();
        let exit_result = self.exit_threads();

        ratatui::restore();

        result.and(exit_result)
    }

    fn event_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        tr: &mpsc::Sender<AppEvent>,
        rc: &mpsc::Receiver<AppEvent>,
    ) -> crate::Result<()> {
        let area = self.draw(terminal).map_err(crate::Error::Draw)?;
        self.controller.attach(Self::chart_container(area), tr);
        self.select_pair(tr);

        while !self.exit {
            self.handle_event(rc.recv()?, tr);
            self.draw(terminal).map_err(crate::Error::Draw)?;
        }

        Ok(())
    }

    fn draw(&self, terminal: &mut DefaultTerminal) -> io::Result<Rect> {
        let completed_frame = terminal.draw(|frame| {
            frame.render_widget(self, frame.area());
        })?;
        Ok(completed_frame.area)
    }

    fn init_threads(&mut self, tr: &mpsc::Sender<AppEvent>, sd: &CancellationToken) {
        let tr_input = tr.clone();
        let shutdown_signal = sd.clone();
        self.input_thread = Some(std::thread::spawn(move || {
            events::input::watch_input_events(tr_input, shutdown_signal)
        }));

        let tr_error = tr.clone();
        self.controller.set_error_handler(move |error| {
            let _ = tr_error.send(AppEvent::ChartError(error.fmt_err("DatafeedError")));
        });
    }

    fn exit_threads(&mut self) -> crate::Result<()> {
        if let Some(thread) = self.input_thread.take() {
            thread
                .join()
                .map_err(|_| crate::Error::InputThreadPanicked)??;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent, tr: &mpsc::Sender<AppEvent>) {
        match event {
            AppEvent::Input(_) => self.handle_key(&event, tr),
            AppEvent::Resize(width, height) => {
                let area = Rect::new(0, 0, width, height);
                self.controller.resize(Self::chart_container(area));
            }
            AppEvent::ChartError(error) => {
                self.last_error = Some(error);
            }
            AppEvent::ChartCandles { .. } => {
                let is_ok = matches!(&event, AppEvent::ChartCandles { result: Ok(_), .. });
                let before = self.controller.updated_at();
                self.controller.handle_event(event, tr);
                // Only a response that actually reached the screen clears the error.
                if is_ok && self.controller.updated_at() != before {
                    self.last_error = None;
                }
            }
            event => self.controller.handle_event(event, tr),
        }
    }

    fn handle_key(&mut self, event: &AppEvent, tr: &mpsc::Sender<AppEvent>) {
        if event.is_char_pressed('q')
            || event.is_ctrl_char_pressed('c')
            || event.is_key_pressed(KeyCode::Esc)
        {
            self.exit = true;
        } else if event.is_key_pressed(KeyCode::Tab) || event.is_key_pressed(KeyCode::Right) {
            self.cursor = (self.cursor + 1) % self.pairs.len();
            self.select_pair(tr);
        } else if event.is_key_pressed(KeyCode::BackTab) || event.is_key_pressed(KeyCode::Left) {
            self.cursor = (self.cursor + self.pairs.len() - 1) % self.pairs.len();
            self.select_pair(tr);
        } else if event.is_char_pressed('r') && !self.controller.refresh(tr) {
            dexchart_log!("manual refresh ignored, no pair bound");
        }
    }

    fn select_pair(&mut self, tr: &mpsc::Sender<AppEvent>) {
        let pair = self.pairs.get(self.cursor).cloned();
        self.controller.set_pair(pair, tr);
    }

    fn get_areas(area: Rect) -> [Rect; 2] {
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area)
    }

    fn chart_block(&self) -> Block<'_> {
        let title = match self.controller.pair() {
            Some(pair) => format!(" {pair} "),
            None => " no pair ".to_string(),
        };
        Block::bordered().title(title)
    }

    /// Area the chart renderer draws into for a given terminal size.
    fn chart_container(area: Rect) -> Rect {
        let [body_area, _] = Self::get_areas(area);
        Block::bordered().inner(body_area)
    }

    fn footer(&self) -> Line<'_> {
        let mut spans = Vec::new();
        if let Some(pair) = self.controller.pair() {
            spans.push(Span::raw(format!(" {pair}")).bold());
        }
        if self.testnet {
            spans.push(Span::styled(" [testnet]", Style::default().fg(Color::Yellow)));
        }
        if let Some(updated_at) = self.controller.updated_at() {
            spans.push(Span::raw(format!(
                " | updated {}",
                updated_at.format("%H:%M:%S")
            )));
        }
        if let Some(error) = self.last_error.as_ref() {
            spans.push(Span::styled(
                format!(" | {error}"),
                Style::default().fg(Color::Red),
            ));
        }
        spans.push(Span::raw(" | Tab/←/→ pair  r refresh  q quit").dim());
        Line::from(spans)
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let [body_area, footer_area] = App::get_areas(area);

        let block = self.chart_block();
        let chart_area = block.inner(body_area);
        block.render(body_area, buf);
        self.controller.render(chart_area, buf);

        self.footer().render(footer_area, buf);
    }
}

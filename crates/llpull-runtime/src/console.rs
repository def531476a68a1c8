//! Terminal reporter for pull progress.
//!
//! Selects between an indicatif bar (interactive terminal) and plain
//! carriage-return redraws built with [`render_bar`] (pipes, log files).

use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use llpull_core::PullReporter;
use tracing::debug;

use crate::render::render_bar;
use crate::stream::INFO_PREFIX;

/// Console output for a pull, auto-detecting terminal capability.
pub struct ConsoleReporter {
    inner: Mutex<ConsoleRender>,
}

enum ConsoleRender {
    Fancy(FancyConsole),
    Plain(PlainConsole),
}

impl ConsoleReporter {
    /// Create a reporter drawing to stdout.
    pub fn new(bar_width: usize) -> Self {
        if io::stdout().is_terminal() {
            Self::from_render(ConsoleRender::Fancy(FancyConsole::new(bar_width)))
        } else {
            Self::plain(bar_width)
        }
    }

    /// Create a reporter that always uses plain redraws on stdout.
    pub fn plain(bar_width: usize) -> Self {
        Self::with_writer(bar_width, io::stdout())
    }

    /// Create a plain reporter writing to `writer`.
    pub fn with_writer(bar_width: usize, writer: impl Write + Send + 'static) -> Self {
        Self::from_render(ConsoleRender::Plain(PlainConsole::new(
            bar_width,
            Box::new(writer),
        )))
    }

    const fn from_render(render: ConsoleRender) -> Self {
        Self {
            inner: Mutex::new(render),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConsoleRender> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PullReporter for ConsoleReporter {
    fn notice(&self, message: &str) {
        match &mut *self.lock() {
            ConsoleRender::Fancy(inner) => inner.println(message),
            ConsoleRender::Plain(inner) => inner.println(message),
        }
    }

    fn progress(&self, percent: u8) {
        match &mut *self.lock() {
            ConsoleRender::Fancy(inner) => inner.progress(percent),
            ConsoleRender::Plain(inner) => inner.progress(percent),
        }
    }

    fn raw_progress(&self, text: &str) {
        match &mut *self.lock() {
            ConsoleRender::Fancy(inner) => inner.raw_progress(text),
            ConsoleRender::Plain(inner) => inner.raw_progress(text),
        }
    }

    fn line(&self, text: &str) {
        let line = format!("{INFO_PREFIX}{text}");
        match &mut *self.lock() {
            ConsoleRender::Fancy(inner) => inner.println(&line),
            ConsoleRender::Plain(inner) => inner.println(&line),
        }
    }

    fn finish(&self) {
        match &mut *self.lock() {
            ConsoleRender::Fancy(inner) => inner.finish(),
            ConsoleRender::Plain(inner) => inner.finish(),
        }
    }
}

// ============================================================================
// Fancy Terminal Progress (indicatif)
// ============================================================================

struct FancyConsole {
    bar_width: usize,
    bar: Option<ProgressBar>,
}

impl FancyConsole {
    const fn new(bar_width: usize) -> Self {
        Self {
            bar_width,
            bar: None,
        }
    }

    fn bar(&mut self) -> &ProgressBar {
        let width = self.bar_width;
        self.bar.get_or_insert_with(|| Self::create_bar(width))
    }

    fn create_bar(width: usize) -> ProgressBar {
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stdout());
        let template =
            format!("Processing: [{{bar:{width}}}] {{percent:>3}}% Complete ({{pos}}/{{len}}) {{msg}}");
        match ProgressStyle::with_template(&template) {
            Ok(style) => bar.set_style(style.progress_chars("#-")),
            Err(e) => debug!(error = %e, "invalid progress template, using default style"),
        }
        bar
    }

    fn progress(&mut self, percent: u8) {
        let bar = self.bar();
        bar.set_message("");
        bar.set_position(u64::from(percent));
    }

    fn raw_progress(&mut self, text: &str) {
        self.bar().set_message(format!("{text}%"));
    }

    fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

// ============================================================================
// Plain Progress (non-terminal)
// ============================================================================

struct PlainConsole {
    bar_width: usize,
    out: Box<dyn Write + Send>,
    /// A redraw line is open and needs a newline before regular output.
    bar_open: bool,
}

impl PlainConsole {
    fn new(bar_width: usize, out: Box<dyn Write + Send>) -> Self {
        Self {
            bar_width,
            out,
            bar_open: false,
        }
    }

    fn progress(&mut self, percent: u8) {
        let bar = render_bar(i64::from(percent), 100, self.bar_width);
        write!(self.out, "{bar}").ok();
        self.out.flush().ok();
        self.bar_open = true;
    }

    fn raw_progress(&mut self, text: &str) {
        write!(self.out, "\r{text}%").ok();
        self.out.flush().ok();
        self.bar_open = true;
    }

    fn println(&mut self, line: &str) {
        self.close_bar();
        writeln!(self.out, "{line}").ok();
        self.out.flush().ok();
    }

    fn finish(&mut self) {
        self.close_bar();
        self.out.flush().ok();
    }

    fn close_bar(&mut self) {
        if self.bar_open {
            writeln!(self.out).ok();
            self.bar_open = false;
        }
    }
}

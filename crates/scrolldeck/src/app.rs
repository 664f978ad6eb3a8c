use eframe::egui;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{Config, Mode};
use crate::deck::{self, DeckTiming, SlideDeck};
use crate::effects::{AmbientGlow, ParticleField, ambient};
use crate::input::{CommandPump, InputEvent, InputMultiplexer, InputSettings, Key};
use crate::parser::{self, DeckMeta};
use crate::reveal::Bounds;
use crate::render::{self, DeckReveal, PageReveal, backdrop, chrome};
use crate::scroll::ScrollPage;
use crate::theme::Theme;

const RELOAD_DEBOUNCE: Duration = Duration::from_millis(250);
const PARTICLE_SEED: u32 = 0x5EED_D3C4;
/// Parallax speed of slide decorations on the scrolling page.
const DECORATION_PARALLAX: f32 = 0.2;

/// What the window is presenting.
enum View {
    Deck {
        deck: SlideDeck,
        input: InputMultiplexer,
        pump: CommandPump,
    },
    Scroll {
        page: ScrollPage,
    },
}

impl View {
    #[allow(clippy::too_many_arguments)]
    fn build(
        slides: Vec<deck::Slide>,
        mode: Mode,
        start: usize,
        timing: DeckTiming,
        input: InputSettings,
        reduced_motion: bool,
        viewport_height: f32,
        now: Duration,
    ) -> Self {
        match mode {
            Mode::Deck => {
                let chapters = deck::chapters(&slides);
                let (mut mux, rx) = InputMultiplexer::new(input, slides.len());
                mux.set_chapters(chapters);
                Self::Deck {
                    deck: SlideDeck::new(slides, timing, reduced_motion, start, now),
                    input: mux,
                    pump: CommandPump::new(rx),
                }
            }
            Mode::Scroll => {
                let mut page = ScrollPage::new(slides, viewport_height, reduced_motion, now);
                page.scroll_to_slide(start, now);
                Self::Scroll { page }
            }
        }
    }

    fn current_index(&self) -> usize {
        match self {
            Self::Deck { deck, .. } => deck.current_index(),
            Self::Scroll { page } => page.current_slide(),
        }
    }

    fn teardown(&mut self) -> usize {
        match self {
            Self::Deck { deck, .. } => deck.teardown(),
            Self::Scroll { page } => page.teardown(),
        }
    }
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    const DURATION: f32 = 2.0;
    const FADE_START: f32 = 1.4;

    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        if elapsed < Self::FADE_START {
            1.0
        } else {
            (1.0 - (elapsed - Self::FADE_START) / (Self::DURATION - Self::FADE_START)).max(0.0)
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= Self::DURATION
    }
}

struct ScrolldeckApp {
    file: PathBuf,
    meta: DeckMeta,
    view: View,
    theme: Theme,
    timing: DeckTiming,
    reduced_motion: bool,
    glow: AmbientGlow,
    particles: ParticleField,
    started: Instant,
    toast: Option<Toast>,
    last_esc: Option<Instant>,
    show_hud: bool,
    viewport_height: f32,
    reload_rx: Option<Receiver<()>>,
    _watcher: Option<Debouncer<RecommendedWatcher>>,
}

fn watch_file(
    path: &std::path::Path,
    ctx: egui::Context,
) -> anyhow::Result<(Debouncer<RecommendedWatcher>, Receiver<()>)> {
    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(RELOAD_DEBOUNCE, move |res: DebounceEventResult| match res {
        Ok(events) if !events.is_empty() => {
            if tx.send(()).is_ok() {
                ctx.request_repaint();
            }
        }
        Ok(_) => {}
        Err(e) => warn!("file watch error: {e}"),
    })?;
    debouncer
        .watcher()
        .watch(path, RecursiveMode::NonRecursive)?;
    Ok((debouncer, rx))
}

/// Drain queued change notifications; true if there was at least one.
fn reload_requested(rx: &Receiver<()>) -> bool {
    rx.try_iter().last().is_some()
}

fn map_key(i: &egui::InputState) -> Vec<Key> {
    [
        (egui::Key::ArrowRight, Key::Right),
        (egui::Key::ArrowDown, Key::Down),
        (egui::Key::Space, Key::Space),
        (egui::Key::ArrowLeft, Key::Left),
        (egui::Key::ArrowUp, Key::Up),
        (egui::Key::Home, Key::Home),
        (egui::Key::End, Key::End),
    ]
    .into_iter()
    .filter(|(k, _)| i.key_pressed(*k))
    .map(|(_, key)| key)
    .collect()
}

impl ScrolldeckApp {
    #[allow(clippy::too_many_arguments)]
    fn new(
        cc: &eframe::CreationContext<'_>,
        file: PathBuf,
        presentation: parser::Presentation,
        mode: Mode,
        theme: Theme,
        start: usize,
        timing: DeckTiming,
        input_settings: InputSettings,
        reduced_motion: bool,
    ) -> Self {
        let slides = presentation.prepare(timing.stagger_step);
        let viewport_height = 1080.0;
        let view = View::build(
            slides,
            mode,
            start,
            timing,
            input_settings,
            reduced_motion,
            viewport_height,
            Duration::ZERO,
        );

        let mut particles = ParticleField::new(1920.0, 1080.0, PARTICLE_SEED);
        if reduced_motion {
            particles.cancel();
        }

        let (watcher, reload_rx) = match watch_file(&file, cc.egui_ctx.clone()) {
            Ok((w, rx)) => (Some(w), Some(rx)),
            Err(e) => {
                warn!("live reload disabled: {e}");
                (None, None)
            }
        };

        let mut app = Self {
            file,
            meta: presentation.meta,
            view,
            theme,
            timing,
            reduced_motion,
            glow: AmbientGlow::default(),
            particles,
            started: Instant::now(),
            toast: None,
            last_esc: None,
            show_hud: false,
            viewport_height,
            reload_rx,
            _watcher: watcher,
        };
        app.forward_deck_events();
        app
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn forward_deck_events(&mut self) {
        let now = self.now();
        if let View::Deck { deck, .. } = &mut self.view {
            let events = deck.take_events();
            self.glow.apply(&events, now);
        }
    }

    fn reload(&mut self) {
        let presentation = match parser::load(&self.file) {
            Ok(p) if !p.slides.is_empty() => p,
            Ok(_) => {
                self.toast = Some(Toast::new("Reload skipped: no slides"));
                return;
            }
            Err(e) => {
                warn!("reload failed: {e:#}");
                self.toast = Some(Toast::new(format!("Reload failed: {e}")));
                return;
            }
        };
        let now = self.now();
        let index = self.view.current_index();
        let cancelled = self.view.teardown();
        debug!(cancelled, "old view torn down");

        let slides = presentation.prepare(self.timing.stagger_step);
        let start = index.min(slides.len().saturating_sub(1));
        // Rate limiters and the wheel cooldown survive the reload.
        match &mut self.view {
            View::Deck { deck, input, .. } => {
                input.set_slide_count(slides.len());
                input.set_chapters(deck::chapters(&slides));
                *deck = SlideDeck::new(slides, self.timing, self.reduced_motion, start, now);
            }
            View::Scroll { page } => {
                let mut fresh = ScrollPage::new(slides, self.viewport_height, self.reduced_motion, now);
                fresh.scroll_to_slide(start, now);
                *page = fresh;
            }
        }
        self.meta = presentation.meta;
        self.glow = AmbientGlow::default();
        self.forward_deck_events();
        info!(slides = self.slide_count(), "reloaded {}", self.file.display());
        self.toast = Some(Toast::new("Reloaded"));
    }

    fn slide_count(&self) -> usize {
        match &self.view {
            View::Deck { deck, .. } => deck.slide_count(),
            View::Scroll { page } => page.slides().len(),
        }
    }

    /// Route navigation input to the active view.
    fn dispatch(&mut self, events: &[InputEvent], now: Duration) {
        match &mut self.view {
            View::Deck { deck, input, pump } => {
                for event in events {
                    let outcome = input.handle(event, now);
                    debug!(?event, ?outcome, "input");
                }
                pump.drain(deck, now);
            }
            View::Scroll { page } => {
                for event in events {
                    match event {
                        InputEvent::Key(key) => page.key(*key, now),
                        InputEvent::NavClick(chapter) => page.nav_click(chapter, now),
                        InputEvent::Wheel { dy, .. } => page.scroll_by(*dy),
                        InputEvent::Arrow(_) | InputEvent::TouchStart { .. } | InputEvent::TouchEnd { .. } => {}
                    }
                }
            }
        }
    }

    fn draw_deck(&self, ui: &egui::Ui, rect: egui::Rect, scale: f32, now: Duration) -> Vec<InputEvent> {
        let View::Deck { deck, .. } = &self.view else {
            return Vec::new();
        };
        let painter = ui.painter();
        let position = deck.track_position(now);
        let signals = deck.signals();
        let current_light = deck.slide(deck.current_index()).is_some_and(|s| s.light);

        let orbs: Vec<_> = (0..backdrop::orb_count())
            .map(|i| ambient::orb_transform(i, 0.0, signals.progress / 100.0))
            .collect();
        backdrop::draw_orbs(painter, rect, &self.theme, &orbs, ambient::orb_opacity(current_light));
        backdrop::draw_particles(painter, rect, &self.particles, ambient::backdrop_opacity(current_light));

        let reveal = DeckReveal { deck, now };
        for slide in deck.slides() {
            let offset = slide.index as f32 - position;
            if offset.abs() >= 1.0 {
                continue;
            }
            let slide_rect = rect.translate(egui::vec2(offset * rect.width(), 0.0));
            backdrop::draw_glow(
                painter,
                slide_rect,
                &self.theme,
                self.glow.intensity(slide.index, now),
                deck.glow_offset(slide.index, now),
            );
            render::render_slide(painter, slide, &self.theme, slide_rect, scale, 0.0, &reveal);
        }

        let chapters = deck.chapters();
        let counter = signals.counter_label();
        chrome::draw(
            ui,
            &self.theme,
            rect,
            scale,
            &chrome::Chrome {
                progress: signals.progress,
                counter: Some(counter),
                footer: self.meta.footer.as_deref(),
                chapters: &chapters,
                active_chapter: Some(signals.active_chapter.as_str()),
                nav_visible: true,
                arrows: Some((signals.prev_enabled, signals.next_enabled)),
                on_light: current_light,
            },
        )
    }

    fn draw_page(&mut self, ui: &egui::Ui, rect: egui::Rect, scale: f32, now: Duration) -> Vec<InputEvent> {
        let View::Scroll { page } = &mut self.view else {
            return Vec::new();
        };
        page.set_viewport_height(rect.height());
        let painter = ui.painter();
        let vh = page.viewport_height();
        let scroll_top = page.scroll_top();
        let in_light = page.in_light();
        let fraction = page.progress() / 100.0;

        let orbs: Vec<_> = (0..backdrop::orb_count())
            .map(|i| ambient::orb_transform(i, scroll_top, fraction))
            .collect();
        backdrop::draw_orbs(painter, rect, &self.theme, &orbs, ambient::orb_opacity(in_light));
        backdrop::draw_particles(painter, rect, &self.particles, ambient::backdrop_opacity(in_light));

        let reveal = PageReveal {
            page,
            now,
            fade: self.timing.fade,
            stagger_step: self.timing.stagger_step,
        };
        let mut measured: Vec<(usize, usize, Bounds)> = Vec::new();
        for slide in page.slides() {
            let top = slide.index as f32 * vh - scroll_top;
            if top >= vh || top + vh <= 0.0 {
                continue;
            }
            let slide_rect = egui::Rect::from_min_size(rect.left_top() + egui::vec2(0.0, top), rect.size());
            let parallax = ambient::parallax_shift(top + vh / 2.0, vh, DECORATION_PARALLAX).unwrap_or(0.0);
            let blocks = render::render_slide(painter, slide, &self.theme, slide_rect, scale, parallax, &reveal);
            for (b, block) in blocks.iter().enumerate() {
                let bounds = Bounds {
                    top: slide.index as f32 * vh + (block.top() - slide_rect.top()),
                    height: block.height(),
                };
                measured.push((slide.index, b, bounds));
            }
        }

        let chapters = deck::chapters(page.slides());
        let active = page.active_chapter().map(str::to_string);
        let events = chrome::draw(
            ui,
            &self.theme,
            rect,
            scale,
            &chrome::Chrome {
                progress: page.progress(),
                counter: None,
                footer: self.meta.footer.as_deref(),
                chapters: &chapters,
                active_chapter: active.as_deref(),
                nav_visible: page.nav_visible(),
                arrows: None,
                on_light: in_light,
            },
        );

        for (slide, block, bounds) in measured {
            page.set_block_bounds(slide, block, bounds);
        }
        events
    }

    fn is_animating(&self, now: Duration) -> bool {
        let view = match &self.view {
            View::Deck { deck, .. } => deck.is_animating(now),
            View::Scroll { page } => page.is_animating(),
        };
        view || self.particles.is_running()
    }

    fn next_wakeup(&self) -> Option<Duration> {
        match &self.view {
            View::Deck { deck, .. } => deck.next_wakeup(),
            View::Scroll { .. } => None,
        }
    }
}

impl eframe::App for ScrolldeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = self.now();

        if self.reload_rx.as_ref().is_some_and(reload_requested) {
            self.reload();
        }

        // Viewport commands go out after the input closure; sending them
        // inside ctx.input() deadlocks.
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut events: Vec<InputEvent> = Vec::new();
        let scrolling = matches!(self.view, View::Scroll { .. });

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }
            if i.key_pressed(egui::Key::Escape) {
                if self.last_esc.is_some_and(|t| t.elapsed().as_secs_f32() < 1.0) {
                    viewport_cmds.push(egui::ViewportCommand::Close);
                    return;
                }
                self.last_esc = Some(Instant::now());
                self.toast = Some(Toast::new("Press Esc again to exit"));
                return;
            }
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
            }
            if i.key_pressed(egui::Key::D) {
                self.theme = self.theme.toggled();
            }
            if i.key_pressed(egui::Key::H) {
                self.show_hud = !self.show_hud;
            }

            events.extend(map_key(i).into_iter().map(InputEvent::Key));

            if scrolling {
                let delta = i.smooth_scroll_delta;
                if delta.y != 0.0 {
                    events.push(InputEvent::Wheel { dx: 0.0, dy: -delta.y });
                }
            } else {
                let delta = i.raw_scroll_delta;
                if delta != egui::Vec2::ZERO {
                    events.push(InputEvent::Wheel {
                        dx: -delta.x,
                        dy: -delta.y,
                    });
                }
                if let Some(pos) = i.pointer.interact_pos() {
                    if i.pointer.primary_pressed() {
                        events.push(InputEvent::TouchStart { x: pos.x, y: pos.y });
                    }
                    if i.pointer.primary_released() {
                        events.push(InputEvent::TouchEnd { x: pos.x, y: pos.y });
                    }
                }
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        self.dispatch(&events, now);
        match &mut self.view {
            View::Deck { deck, .. } => deck.tick(now),
            View::Scroll { page } => page.tick(now),
        }
        self.forward_deck_events();

        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }

        let bg = self.theme.background;
        let mut chrome_events = Vec::new();
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                let scale = render::scale_for(rect.size());

                if self.particles.size() != (rect.width(), rect.height()) {
                    self.particles.resize(rect.width(), rect.height());
                }
                self.particles.step();
                if let View::Scroll { page } = &self.view {
                    self.particles.set_scroll(page.scroll_top());
                }
                self.viewport_height = rect.height();

                chrome_events = if matches!(self.view, View::Deck { .. }) {
                    self.draw_deck(ui, rect, scale, now)
                } else {
                    self.draw_page(ui, rect, scale, now)
                };

                if let Some(toast) = &self.toast {
                    draw_toast(ui, &self.theme, rect, scale, toast);
                }
                if self.show_hud {
                    draw_hud(ui, &self.theme, rect, scale);
                }
            });

        if !chrome_events.is_empty() {
            self.dispatch(&chrome_events, now);
            self.forward_deck_events();
        }

        if self.toast.is_some() || self.is_animating(now) {
            ctx.request_repaint();
        } else if let Some(due) = self.next_wakeup() {
            ctx.request_repaint_after(due.saturating_sub(now));
        }
    }

}

impl Drop for ScrolldeckApp {
    fn drop(&mut self) {
        let cancelled = self.view.teardown();
        self.particles.cancel();
        debug!(cancelled, "shutdown");
    }
}

fn draw_toast(ui: &egui::Ui, theme: &Theme, rect: egui::Rect, scale: f32, toast: &Toast) {
    let opacity = toast.opacity();
    if opacity <= 0.0 {
        return;
    }
    let color = Theme::with_opacity(theme.foreground, opacity * 0.9);
    let galley = ui.painter().layout_no_wrap(
        toast.message.clone(),
        egui::FontId::proportional(20.0 * scale.max(0.6)),
        color,
    );
    let padding = 16.0 * scale;
    let toast_rect = egui::Rect::from_center_size(
        egui::pos2(rect.center().x, rect.bottom() - 110.0 * scale),
        galley.size() + egui::vec2(padding * 2.0, padding * 2.0),
    );
    ui.painter()
        .rect_filled(toast_rect, 8.0 * scale, Theme::with_opacity(theme.muted, opacity * 0.35));
    ui.painter()
        .galley(toast_rect.min + egui::vec2(padding, padding), galley, color);
}

fn draw_hud(ui: &egui::Ui, theme: &Theme, rect: egui::Rect, scale: f32) {
    let shortcuts = [
        ("\u{2192} / \u{2193} / Space", "Next slide"),
        ("\u{2190} / \u{2191}", "Previous slide"),
        ("Home / End", "First / last slide"),
        ("Wheel / swipe", "Step through slides"),
        ("D", "Toggle theme"),
        ("F", "Toggle fullscreen"),
        ("H", "Toggle this help"),
        ("Esc \u{00d7}2 / Q", "Quit"),
    ];

    let scale = scale.max(0.6);
    let padding = 24.0 * scale;
    let line_height = 32.0 * scale;
    let hud_size = egui::vec2(
        380.0 * scale,
        shortcuts.len() as f32 * line_height + padding * 2.0 + 40.0 * scale,
    );
    let hud_rect = egui::Rect::from_center_size(rect.center(), hud_size);
    ui.painter()
        .rect_filled(hud_rect, 12.0 * scale, Theme::with_opacity(theme.background, 0.92));

    let text_color = Theme::with_opacity(theme.foreground, 0.9);
    let key_color = theme.accent;
    ui.painter().text(
        hud_rect.left_top() + egui::vec2(padding, padding),
        egui::Align2::LEFT_TOP,
        "Keyboard Shortcuts",
        egui::FontId::proportional(20.0 * scale),
        theme.heading_color,
    );

    let mut y = hud_rect.top() + padding + 40.0 * scale;
    for (key, desc) in shortcuts {
        ui.painter().text(
            egui::pos2(hud_rect.left() + padding, y),
            egui::Align2::LEFT_TOP,
            key,
            egui::FontId::monospace(15.0 * scale),
            key_color,
        );
        ui.painter().text(
            egui::pos2(hud_rect.left() + padding + 180.0 * scale, y),
            egui::Align2::LEFT_TOP,
            desc,
            egui::FontId::proportional(15.0 * scale),
            text_color,
        );
        y += line_height;
    }
}

/// Options resolved from the command line and config.
pub struct RunOptions {
    pub file: PathBuf,
    pub windowed: bool,
    /// 1-based.
    pub start_slide: Option<usize>,
    pub scroll: bool,
    pub reduced_motion: bool,
}

pub fn run(opts: RunOptions) -> anyhow::Result<()> {
    let presentation = parser::load(&opts.file)?;
    if presentation.slides.is_empty() {
        anyhow::bail!("No slides found in {}", opts.file.display());
    }

    // CLI flags override frontmatter, which overrides config
    let config = Config::load_or_default();
    let mode = if opts.scroll {
        Mode::Scroll
    } else {
        presentation.meta.mode.or(config.mode()).unwrap_or_default()
    };
    let theme_name = presentation
        .meta
        .theme
        .as_deref()
        .or(config.theme())
        .unwrap_or("dark");
    let theme = Theme::from_name(theme_name);
    let reduced_motion = opts.reduced_motion || config.reduced_motion();
    let start = opts
        .start_slide
        .map(|n| n.saturating_sub(1))
        .unwrap_or(0)
        .min(presentation.slides.len() - 1);

    let title = presentation.meta.title.clone().unwrap_or_else(|| {
        format!(
            "scrolldeck - {}",
            opts.file.file_name().unwrap_or_default().to_string_lossy()
        )
    });
    info!(slides = presentation.slides.len(), ?mode, reduced_motion, "presenting {}", opts.file.display());

    let viewport = if opts.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let timing = config.deck_timing();
    let input_settings = config.input_settings();
    let file = opts.file;
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            Ok(Box::new(ScrolldeckApp::new(
                cc,
                file,
                presentation,
                mode,
                theme,
                start,
                timing,
                input_settings,
                reduced_motion,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

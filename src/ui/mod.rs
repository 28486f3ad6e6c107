use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{
    self, Align, Align2, Color32, CornerRadius, Frame, Layout, Margin, RichText, Stroke, Vec2,
    ViewportCommand,
};
use log::{debug, error};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::config::{AppConfig, SocialLink};
use crate::engine::HomeController;
use crate::engine::launch::WindowSignal;
use crate::engine::models::{ClientConfig, CloseBehavior, InstanceStatus};
use crate::engine::news::{NewsCard, NewsCardKind, NewsFeed};
use crate::engine::state::{
    HomeUpdate, InfoText, InstanceEntry, LaunchPhase, Panel, Popup, PopupKind, UserAction,
};
use crate::host::HostBridge;
use crate::networking::NetworkClient;
use crate::process::ProcessLauncher;
use crate::storage::StorageManager;
use crate::util::{build_runtime, progress_percent};

pub mod i18n;
mod music;
use self::i18n::{I18n, Language, detect_system_language, parse_locale_token};
use self::music::MusicPlayer;

pub const APP_TITLE: &str = "Home Launcher";
const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

type AppController = HomeController<StorageManager, NetworkClient, ProcessLauncher, EguiHost>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Theme {
    Dark,
    Light,
}

impl Theme {
    fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    const fn config_value(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    const fn palette(self) -> ThemePalette {
        match self {
            Theme::Dark => ThemePalette::dark(),
            Theme::Light => ThemePalette::light(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ThemePalette {
    bg: Color32,
    panel: Color32,
    surface: Color32,
    border: Color32,
    text_primary: Color32,
    text_muted: Color32,
    accent: Color32,
    accent_soft: Color32,
    danger: Color32,
}

impl ThemePalette {
    const fn dark() -> Self {
        Self {
            bg: Color32::from_rgb(14, 16, 24),
            panel: Color32::from_rgb(20, 24, 35),
            surface: Color32::from_rgb(28, 33, 47),
            border: Color32::from_rgb(50, 58, 80),
            text_primary: Color32::from_rgb(232, 236, 246),
            text_muted: Color32::from_rgb(160, 170, 194),
            accent: Color32::from_rgb(98, 160, 255),
            accent_soft: Color32::from_rgb(52, 92, 160),
            danger: Color32::from_rgb(240, 110, 120),
        }
    }

    const fn light() -> Self {
        Self {
            bg: Color32::from_rgb(244, 246, 251),
            panel: Color32::from_rgb(230, 234, 244),
            surface: Color32::from_rgb(252, 253, 255),
            border: Color32::from_rgb(200, 206, 224),
            text_primary: Color32::from_rgb(26, 32, 48),
            text_muted: Color32::from_rgb(86, 96, 122),
            accent: Color32::from_rgb(38, 110, 214),
            accent_soft: Color32::from_rgb(172, 200, 242),
            danger: Color32::from_rgb(210, 70, 84),
        }
    }

    fn is_dark(&self) -> bool {
        self == &ThemePalette::dark()
    }
}

fn section_frame(colors: &ThemePalette) -> Frame {
    Frame::new()
        .fill(colors.surface)
        .stroke(Stroke::new(1.0, colors.border))
        .corner_radius(CornerRadius::same(14))
        .inner_margin(Margin::same(14))
}

fn primary_cta_button(
    label: impl Into<egui::WidgetText>,
    colors: &ThemePalette,
    min_width: f32,
) -> egui::Button<'_> {
    egui::Button::new(label)
        .fill(colors.accent_soft)
        .stroke(Stroke::new(1.0, colors.accent))
        .min_size(Vec2::new(min_width, 34.0))
}

fn apply_theme(ctx: &egui::Context, colors: &ThemePalette) {
    let mut visuals = if colors.is_dark() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    visuals.panel_fill = colors.bg;
    visuals.window_fill = colors.panel;
    visuals.override_text_color = Some(colors.text_primary);
    visuals.hyperlink_color = colors.accent;
    visuals.widgets.inactive.corner_radius = CornerRadius::same(10);
    visuals.widgets.hovered.corner_radius = CornerRadius::same(10);
    visuals.widgets.active.corner_radius = CornerRadius::same(10);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, colors.border);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.5, colors.accent);
    visuals.selection.bg_fill = colors.accent_soft;
    visuals.selection.stroke = Stroke::new(1.0, colors.accent);
    ctx.set_visuals(visuals);

    ctx.style_mut(|style| {
        style.spacing.item_spacing = Vec2::new(12.0, 12.0);
        style.spacing.button_padding = Vec2::new(16.0, 10.0);
    });
}

/// Window-level effects requested by the launch pipeline.
///
/// egui has no taskbar progress, so progress is mirrored in the window title.
/// Hiding minimizes the window, which keeps the event loop running so a later
/// `Show` still restores it.
pub struct EguiHost {
    ctx: egui::Context,
}

impl EguiHost {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl HostBridge for EguiHost {
    fn send(&self, signal: WindowSignal) {
        debug!("host: {signal:?}");
        for command in viewport_commands(signal) {
            self.ctx.send_viewport_cmd(command);
        }
        self.ctx.request_repaint();
    }
}

fn viewport_commands(signal: WindowSignal) -> Vec<ViewportCommand> {
    match signal {
        WindowSignal::Show => vec![ViewportCommand::Minimized(false), ViewportCommand::Focus],
        WindowSignal::Hide => vec![ViewportCommand::Minimized(true)],
        WindowSignal::ProgressLoad => vec![ViewportCommand::Title(format!("{APP_TITLE} …"))],
        WindowSignal::Progress { current, total } => {
            let pct = progress_percent(current, total);
            vec![ViewportCommand::Title(format!("{APP_TITLE} - {pct}%"))]
        }
        WindowSignal::ProgressReset => vec![ViewportCommand::Title(APP_TITLE.to_owned())],
    }
}

/// Editable copy of the client settings shown on the settings panel.
struct SettingsDraft {
    config: ClientConfig,
    java_path: String,
}

impl SettingsDraft {
    fn new(config: ClientConfig) -> Self {
        let java_path = config.java_config.java_path.clone().unwrap_or_default();
        Self { config, java_path }
    }

    fn to_config(&self, theme: Theme, language: Language) -> ClientConfig {
        let mut config = self.config.clone();
        let java_path = self.java_path.trim();
        config.java_config.java_path = (!java_path.is_empty()).then(|| java_path.to_owned());
        let memory = &mut config.java_config.java_memory;
        if memory.min > memory.max {
            memory.min = memory.max;
        }
        config.launcher_config.theme = Some(theme.config_value().to_owned());
        config.launcher_config.language = Some(language.code().to_owned());
        config
    }
}

/// Buttons of a popup and the panel each one opens.
fn popup_choices(i18n: I18n, kind: &PopupKind) -> Vec<(&'static str, Panel)> {
    match kind {
        PopupKind::LoginRequired => vec![
            (i18n.login_button(), Panel::Login),
            (i18n.offline_button(), Panel::Login),
        ],
        _ => Vec::new(),
    }
}

/// What the home screen shows, rebuilt from the controller's updates.
struct HomeView {
    language: Language,
    theme: Theme,
    panel: Panel,
    phase: LaunchPhase,
    info: InfoText,
    progress: Option<(u64, u64)>,
    estimated: Option<String>,
    speed: Option<String>,
    news: Option<NewsFeed>,
    selected_instance: Option<String>,
    instance_count: usize,
    instance_menu: Option<Vec<InstanceEntry>>,
    status: Option<InstanceStatus>,
    popup: Option<Popup>,
    settings: Option<SettingsDraft>,
}

impl HomeView {
    fn new(language: Language) -> Self {
        Self {
            language,
            theme: Theme::Dark,
            panel: Panel::Home,
            phase: LaunchPhase::Idle,
            info: InfoText::Connecting,
            progress: None,
            estimated: None,
            speed: None,
            news: None,
            selected_instance: None,
            instance_count: 0,
            instance_menu: None,
            status: None,
            popup: None,
            settings: None,
        }
    }

    fn apply(&mut self, update: HomeUpdate) {
        match update {
            HomeUpdate::Phase(phase) => self.phase = phase,
            HomeUpdate::Info(info) => self.info = info,
            HomeUpdate::Progress { current, total } => self.progress = Some((current, total)),
            HomeUpdate::ProgressHidden => {
                self.progress = None;
                self.estimated = None;
                self.speed = None;
            }
            HomeUpdate::News(feed) => self.news = Some(feed),
            HomeUpdate::Instances { selected, count } => {
                self.selected_instance = selected;
                self.instance_count = count;
            }
            HomeUpdate::InstanceMenu(entries) => self.instance_menu = Some(entries),
            HomeUpdate::InstanceMenuClosed => self.instance_menu = None,
            HomeUpdate::Status(status) => self.status = Some(status),
            HomeUpdate::Popup(popup) => self.popup = Some(popup),
            HomeUpdate::ChangePanel(panel) => {
                self.panel = panel;
                self.popup = None;
                self.instance_menu = None;
            }
            HomeUpdate::Estimated(text) => self.estimated = Some(text),
            HomeUpdate::Speed(text) => self.speed = Some(text),
            HomeUpdate::Config(config) => {
                self.theme = Theme::from_config(config.launcher_config.theme.as_deref());
                if let Some(language) = config
                    .launcher_config
                    .language
                    .as_deref()
                    .and_then(parse_locale_token)
                {
                    self.language = language;
                }
                self.settings = Some(SettingsDraft::new(config));
            }
        }
    }

    fn shows_instance_picker(&self) -> bool {
        self.instance_count > 1
    }
}

pub struct LauncherApp {
    runtime: Arc<Runtime>,
    controller: Arc<AppController>,
    updates_rx: mpsc::UnboundedReceiver<HomeUpdate>,
    view: HomeView,
    player_name: String,
    socials: Vec<SocialLink>,
    music: MusicPlayer,
}

impl LauncherApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let runtime = build_runtime();
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Arc::new(HomeController::new(
            Arc::new(StorageManager::new()),
            Arc::new(NetworkClient::new(&config.remote_url)),
            Arc::new(config.launcher()),
            Arc::new(EguiHost::new(cc.egui_ctx.clone())),
            config.game_root(),
            tx,
        ));

        let bootstrap = controller.clone();
        runtime.spawn(async move {
            if let Err(err) = bootstrap.load_config().await {
                error!("ui: unable to read client settings: {err}");
            }
            bootstrap.load_content().await;
        });

        let language = config
            .language
            .as_deref()
            .and_then(parse_locale_token)
            .unwrap_or_else(detect_system_language);

        Self {
            runtime,
            controller,
            updates_rx: rx,
            view: HomeView::new(language),
            player_name: String::new(),
            socials: config.socials,
            music: MusicPlayer::new(config.music),
        }
    }

    fn colors(&self) -> ThemePalette {
        self.view.theme.palette()
    }

    fn i18n(&self) -> I18n {
        I18n::new(self.view.language)
    }

    fn trigger_action(&self, action: UserAction) {
        let controller = self.controller.clone();
        self.runtime.spawn(async move {
            controller.handle_action(action).await;
        });
    }

    fn sync_updates(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            self.view.apply(update);
        }
    }

    fn render_socials(&self, ui: &mut egui::Ui, colors: &ThemePalette) {
        for social in &self.socials {
            let label = RichText::new(&social.label).color(colors.text_primary);
            if ui.add(primary_cta_button(label, colors, 90.0)).clicked() {
                self.trigger_action(UserAction::OpenSocial(social.url.clone()));
            }
        }
    }

    fn render_play(&mut self, ui: &mut egui::Ui, colors: &ThemePalette, i18n: I18n) {
        section_frame(colors).show(ui, |ui| {
            if let Some(status) = &self.view.status {
                ui.label(
                    RichText::new(i18n.server_status(&status.name_server, &status.ip, status.port))
                        .color(colors.text_muted),
                );
            }
            ui.horizontal(|ui| {
                let busy = self.view.phase.is_busy();
                let play_label = RichText::new(i18n.play_button()).strong();
                if ui
                    .add_enabled(!busy, primary_cta_button(play_label, colors, 140.0))
                    .clicked()
                {
                    self.trigger_action(UserAction::ClickPlay);
                }

                if self.view.shows_instance_picker() {
                    let instance_label = self
                        .view
                        .selected_instance
                        .clone()
                        .unwrap_or_else(|| i18n.no_instance_selected().to_owned());
                    let picker = egui::Button::new(format!(
                        "{} · {instance_label}",
                        i18n.pick_instance_button()
                    ));
                    if ui.add_enabled(!busy, picker).clicked() {
                        self.trigger_action(UserAction::OpenInstanceMenu);
                    }
                }
            });

            ui.label(RichText::new(i18n.info(self.view.info)).color(colors.text_muted));
            if let Some((current, total)) = self.view.progress {
                let bar = if total == 0 {
                    egui::ProgressBar::new(0.0).animate(true)
                } else {
                    let pct = progress_percent(current, total);
                    egui::ProgressBar::new(f32::from(pct) / 100.0).show_percentage()
                };
                ui.add(bar.fill(colors.accent).desired_height(18.0));
                ui.horizontal(|ui| {
                    if let Some(estimated) = &self.view.estimated {
                        ui.label(RichText::new(i18n.estimated(estimated)).small());
                    }
                    if let Some(speed) = &self.view.speed {
                        ui.label(RichText::new(speed).small());
                    }
                });
            }
            if let LaunchPhase::Errored(message) = &self.view.phase {
                ui.colored_label(colors.danger, message);
            }
        });
    }

    fn render_news_card(&self, ui: &mut egui::Ui, card: &NewsCard, colors: &ThemePalette, i18n: I18n) {
        section_frame(colors).show(ui, |ui| {
            ui.set_width(ui.available_width());
            let (title, body): (String, Vec<String>) = match card.kind {
                NewsCardKind::Article => (card.title.clone(), card.body.clone()),
                NewsCardKind::NoNews => (
                    i18n.news_empty_title().to_owned(),
                    vec![i18n.news_empty_body().to_owned()],
                ),
                NewsCardKind::FetchFailed => (
                    i18n.news_failed_title().to_owned(),
                    vec![i18n.news_failed_body().to_owned()],
                ),
            };
            ui.horizontal(|ui| {
                if let Some(date) = card.date {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(date.day.to_string()).heading().color(colors.accent));
                        ui.label(RichText::new(i18n.month_name(date.month)).small());
                    });
                }
                ui.vertical(|ui| {
                    ui.label(RichText::new(title).strong());
                    for line in &body {
                        ui.label(line);
                    }
                    if let Some(author) = &card.author {
                        ui.label(
                            RichText::new(i18n.news_author(author))
                                .small()
                                .color(colors.text_muted),
                        );
                    }
                });
            });
        });
    }

    fn render_news(&self, ui: &mut egui::Ui, colors: &ThemePalette, i18n: I18n) {
        ui.horizontal(|ui| {
            ui.heading(i18n.news_heading());
            if ui.small_button("⟳").clicked() {
                self.trigger_action(UserAction::RefreshNews);
            }
        });
        let Some(feed) = &self.view.news else {
            ui.add(egui::Spinner::new());
            return;
        };
        egui::ScrollArea::vertical().show(ui, |ui| {
            for card in &feed.cards {
                self.render_news_card(ui, card, colors, i18n);
                ui.add_space(6.0);
            }
        });
    }

    fn render_home(&mut self, ui: &mut egui::Ui, colors: &ThemePalette, i18n: I18n) {
        self.render_play(ui, colors, i18n);
        ui.add_space(12.0);
        self.render_news(ui, colors, i18n);
    }

    fn render_settings(&mut self, ui: &mut egui::Ui, colors: &ThemePalette, i18n: I18n) {
        ui.heading(i18n.settings_heading());
        let view = &mut self.view;
        let Some(draft) = view.settings.as_mut() else {
            ui.add(egui::Spinner::new());
            return;
        };

        section_frame(colors).show(ui, |ui| {
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([16.0, 10.0])
                .show(ui, |ui| {
                    let memory = &mut draft.config.java_config.java_memory;
                    ui.label(i18n.memory_min_label());
                    ui.add(egui::DragValue::new(&mut memory.min).range(0.5..=64.0).speed(0.5));
                    ui.end_row();

                    ui.label(i18n.memory_max_label());
                    ui.add(egui::DragValue::new(&mut memory.max).range(0.5..=64.0).speed(0.5));
                    ui.end_row();

                    let screen = &mut draft.config.game_config.screen_size;
                    ui.label(i18n.screen_label());
                    ui.horizontal(|ui| {
                        ui.add(egui::DragValue::new(&mut screen.width).range(320..=7680));
                        ui.label("x");
                        ui.add(egui::DragValue::new(&mut screen.height).range(240..=4320));
                    });
                    ui.end_row();

                    ui.label(i18n.java_path_label());
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.java_path)
                            .hint_text(i18n.java_path_hint()),
                    );
                    ui.end_row();

                    let close = &mut draft.config.launcher_config.close_launcher;
                    ui.label(i18n.close_behavior_label());
                    egui::ComboBox::from_id_salt("close_behavior_combo")
                        .selected_text(i18n.close_behavior_value(*close))
                        .show_ui(ui, |ui| {
                            for behavior in CloseBehavior::ALL {
                                ui.selectable_value(
                                    close,
                                    behavior,
                                    i18n.close_behavior_value(behavior),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label(i18n.language_label());
                    egui::ComboBox::from_id_salt("language_combo")
                        .selected_text(view.language.display_name())
                        .show_ui(ui, |ui| {
                            for language in Language::ALL {
                                ui.selectable_value(
                                    &mut view.language,
                                    language,
                                    language.display_name(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label(i18n.theme_label());
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut view.theme, Theme::Dark, i18n.theme_name(true));
                        ui.selectable_value(&mut view.theme, Theme::Light, i18n.theme_name(false));
                    });
                    ui.end_row();
                });
        });

        let mut saved = None;
        let mut back = false;
        ui.horizontal(|ui| {
            if ui
                .add(primary_cta_button(i18n.save_button(), colors, 120.0))
                .clicked()
            {
                saved = Some(draft.to_config(view.theme, view.language));
            }
            back = ui.button(i18n.back_button()).clicked();
        });
        if saved.is_some() || back {
            self.view.panel = Panel::Home;
        }
        if let Some(config) = saved {
            self.trigger_action(UserAction::SaveConfig(config));
        }
    }

    fn render_login(&mut self, ui: &mut egui::Ui, colors: &ThemePalette, i18n: I18n) {
        ui.heading(i18n.login_heading());
        section_frame(colors).show(ui, |ui| {
            ui.label(i18n.player_name_label());
            let response = ui.add(egui::TextEdit::singleline(&mut self.player_name).char_limit(16));
            let submitted =
                response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            ui.horizontal(|ui| {
                let add = ui.add(primary_cta_button(i18n.add_account_button(), colors, 140.0));
                if add.clicked() || submitted {
                    self.trigger_action(UserAction::AddOfflineAccount(self.player_name.clone()));
                }
                if ui.button(i18n.back_button()).clicked() {
                    self.view.panel = Panel::Home;
                }
            });
        });
    }

    fn render_instance_menu(&mut self, ctx: &egui::Context, i18n: I18n) {
        let Some(entries) = &self.view.instance_menu else {
            return;
        };
        let mut picked = None;
        let mut close_requested = false;
        egui::Window::new(i18n.instance_menu_title())
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                for entry in entries {
                    if ui.selectable_label(entry.active, &entry.name).clicked() {
                        picked = Some(entry.name.clone());
                    }
                }
                ui.separator();
                if ui.button(i18n.close_button()).clicked() {
                    close_requested = true;
                }
            });
        if let Some(name) = picked {
            self.trigger_action(UserAction::SelectInstance(name));
        } else if close_requested {
            self.trigger_action(UserAction::CloseInstanceMenu);
        }
    }

    fn render_popup(&mut self, ctx: &egui::Context, colors: &ThemePalette, i18n: I18n) {
        let Some(popup) = &self.view.popup else {
            return;
        };
        let mut dismissed = false;
        let mut choice = None;
        egui::Window::new(i18n.popup_title(&popup.kind))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let body = i18n.popup_body(&popup.kind);
                match popup.kind {
                    PopupKind::LaunchFailed(_) => ui.colored_label(colors.danger, body),
                    _ => ui.label(body),
                };
                ui.add_space(8.0);
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    for (label, panel) in popup_choices(i18n, &popup.kind) {
                        if ui.add(primary_cta_button(label, colors, 160.0)).clicked() {
                            choice = Some(panel);
                        }
                    }
                    if popup.dismissible && ui.button(i18n.close_button()).clicked() {
                        dismissed = true;
                    }
                });
            });
        if let Some(panel) = choice {
            self.trigger_action(UserAction::PopupChoice(panel));
        }
        if dismissed {
            self.view.popup = None;
        }
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_updates();
        self.music.poll(ctx);
        let colors = self.colors();
        apply_theme(ctx, &colors);
        let i18n = self.i18n();

        egui::TopBottomPanel::top("top_bar")
            .frame(
                Frame::new()
                    .fill(colors.panel)
                    .stroke(Stroke::new(1.0, colors.border))
                    .inner_margin(Margin::symmetric(16, 12)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new(i18n.heading()).color(colors.accent));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let on_home = self.view.panel == Panel::Home;
                        if ui
                            .add_enabled(on_home, egui::Button::new(i18n.settings_button()))
                            .clicked()
                        {
                            self.trigger_action(UserAction::OpenSettings);
                        }
                        self.render_socials(ui, &colors);
                    });
                });
            });

        egui::CentralPanel::default()
            .frame(
                Frame::new()
                    .fill(colors.bg)
                    .inner_margin(Margin::symmetric(14, 12)),
            )
            .show(ctx, |ui| match self.view.panel {
                Panel::Home => self.render_home(ui, &colors, i18n),
                Panel::Settings => self.render_settings(ui, &colors, i18n),
                Panel::Login => self.render_login(ui, &colors, i18n),
            });

        self.render_instance_menu(ctx, i18n);
        self.render_popup(ctx, &colors, i18n);
        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

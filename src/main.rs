use std::path::Path;
use std::time::Duration;

use iced::widget::{button, column, container, pick_list, text, Column};
use iced::{Alignment, Element, Length, Size, Subscription, Task, Theme};
use image::RgbImage;
use log::{info, trace, warn};

mod camera;
mod filters;
mod state;
mod ui;

use camera::FrameSource;
use state::action::{Action, IDLE_LABEL, SELECTOR_LABELS};

/// Default capture device
const DEVICE_INDEX: u32 = 0;

/// Display refresh cadence
const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Main application state
struct CameraApp {
    /// The capture device; `None` after a fatal open failure
    source: Option<FrameSource>,
    /// Most recent live frame, retained for the capture operation
    live: Option<RgbImage>,
    /// Texture handle for the preview widget, refreshed every tick
    preview: Option<iced::widget::image::Handle>,
    /// Label currently shown in the selection control
    selected_label: &'static str,
    /// The armed action; `None` is the idle state (no trigger visible)
    selected: Option<Action>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Display-loop timer fired; pull one frame from the device
    Tick,
    /// User picked a label in the selection control
    ActionSelected(&'static str),
    /// User pressed the visible trigger button
    RunAction(Action),
}

impl CameraApp {
    /// Create a new instance of the application.
    ///
    /// A device that fails to open is fatal: the user is notified and the
    /// application exits (there is nothing to preview or capture).
    fn new() -> (Self, Task<Message>) {
        let (source, task) = match FrameSource::open(DEVICE_INDEX) {
            Ok(source) => (Some(source), Task::none()),
            Err(err) => {
                warn!("Startup failed: {err}");
                ui::notify::error("Error", "Camera not found!");
                (None, iced::exit())
            }
        };

        let status = if source.is_some() {
            String::from("Ready. Select an action to get started.")
        } else {
            String::from("No camera available.")
        };

        (
            CameraApp {
                source,
                live: None,
                preview: None,
                selected_label: IDLE_LABEL,
                selected: None,
                status,
            },
            task,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                if let Some(source) = &mut self.source {
                    match source.read_frame() {
                        Ok(frame) => {
                            self.preview = Some(ui::preview::handle_from_frame(&frame));
                            self.live = Some(frame);
                        }
                        // A dropped frame just means no refresh this tick
                        Err(err) => trace!("Skipping tick: {err}"),
                    }
                }
                Task::none()
            }
            Message::ActionSelected(label) => {
                self.selected_label = label;
                self.selected = Action::from_label(label);
                Task::none()
            }
            Message::RunAction(action) => {
                self.run_action(action);
                Task::none()
            }
        }
    }

    /// Invoke one filter operation and report its outcome.
    ///
    /// Every outcome ends in a modal dialog plus a status-line update,
    /// except a capture attempt before the first frame has arrived, which
    /// only updates the status line (there is no file error to report).
    fn run_action(&mut self, action: Action) {
        let workdir = Path::new(".");

        let result = match action {
            Action::Capture => match self.live.as_ref() {
                Some(frame) => filters::capture(frame, workdir),
                None => {
                    warn!("Capture requested before any frame arrived");
                    self.status = String::from("No frame available to capture yet.");
                    return;
                }
            },
            Action::Grayscale => filters::grayscale(workdir),
            Action::Erode => filters::erode(workdir),
            Action::Dilate => filters::dilate(workdir),
            Action::Stack => filters::hstack(workdir),
            Action::Blur => filters::blur(workdir),
        };

        match result {
            Ok(output) => {
                let body = format!("Result saved as {}", output.display());
                info!("{action}: {body}");
                ui::notify::info(action.dialog_title(), &body);
                self.status = format!("{}. {}.", action.dialog_title(), body);
            }
            Err(err) => {
                warn!("{action} failed: {err}");
                ui::notify::error("Error", &err.to_string());
                self.status = format!("{action} failed: {err}");
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let mut content: Column<Message> = column![pick_list(
            SELECTOR_LABELS,
            Some(self.selected_label),
            Message::ActionSelected,
        )
        .padding(8)]
        .spacing(12)
        .padding(20)
        .align_x(Alignment::Center);

        // Exactly one trigger is visible: the armed action's button.
        // Idle shows none.
        if let Some(action) = self.selected {
            content = content.push(
                button(text(action.label()))
                    .on_press(Message::RunAction(action))
                    .padding(10),
            );
        }

        content = content.push(ui::preview::view(self.preview.clone()));
        content = content.push(text(&self.status).size(14));

        container(content)
            .center_x(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Drive the display loop while a device is open.
    ///
    /// The timer lives on the runtime's event queue; once the device is
    /// gone there is nothing to poll and the subscription is dropped.
    fn subscription(&self) -> Subscription<Message> {
        if self.source.is_some() {
            iced::time::every(TICK_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::init();
    info!("Starting camera-snap");

    iced::application("Camera Snap", CameraApp::update, CameraApp::view)
        .subscription(CameraApp::subscription)
        .theme(CameraApp::theme)
        .window_size(Size::new(700.0, 660.0))
        .centered()
        .run_with(CameraApp::new)
}

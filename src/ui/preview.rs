/// Live preview widget.
///
/// Renders the most recent camera frame into a fixed 640x480 area, scaled
/// to fit. Until the first frame arrives the area shows a placeholder.

use iced::widget::image as iced_image;
use iced::widget::{container, text};
use iced::{ContentFit, Element, Length};
use image::RgbImage;

/// Width of the preview surface in logical pixels
pub const PREVIEW_WIDTH: f32 = 640.0;
/// Height of the preview surface in logical pixels
pub const PREVIEW_HEIGHT: f32 = 480.0;

/// Convert an RGB frame to a texture handle the image widget can draw.
///
/// The widget wants RGBA, so this is where the channel-order conversion for
/// display happens.
pub fn handle_from_frame(frame: &RgbImage) -> iced_image::Handle {
    let (width, height) = frame.dimensions();
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for pixel in frame.pixels() {
        rgba.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 0xFF]);
    }
    iced_image::Handle::from_rgba(width, height, rgba)
}

/// Build the preview element from the latest texture handle, if any.
pub fn view<'a, Message: 'a>(handle: Option<iced_image::Handle>) -> Element<'a, Message> {
    let content: Element<'a, Message> = match handle {
        Some(handle) => iced_image(handle)
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        None => text("Waiting for camera...").size(16).into(),
    };

    container(content)
        .center_x(Length::Fixed(PREVIEW_WIDTH))
        .center_y(Length::Fixed(PREVIEW_HEIGHT))
        .into()
}

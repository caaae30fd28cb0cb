use engine::{HighlightSegment, ShortLength, StudioSnapshot, TransitionStyle};
use iced::widget::{button, column, pick_list, progress_bar, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::app::Message;

const URL_PLACEHOLDER: &str = "https://www.youtube.com/watch?v=...";

pub fn header<'a>() -> Element<'a, Message> {
    column![
        text("Shorts Studio").size(32),
        text("Turn a long video into vertical shorts in a few clicks.").size(16),
    ]
    .spacing(4)
    .into()
}

/// URL field, generate button and the inline validation message.
///
/// The button is disabled while a run is in flight.
pub fn form<'a>(url: &'a str, processing: bool, error: Option<&'a str>) -> Element<'a, Message> {
    let input = text_input(URL_PLACEHOLDER, url)
        .on_input(Message::UrlChanged)
        .on_submit(Message::GeneratePressed)
        .padding(10)
        .width(Length::Fill);

    let label = if processing { "Generating..." } else { "Generate" };
    let generate = button(text(label))
        .padding([10, 18])
        .style(button::primary)
        .on_press_maybe((!processing).then_some(Message::GeneratePressed));

    let mut content = column![row![input, generate].spacing(12).align_y(Alignment::Center)].spacing(6);
    if let Some(message) = error {
        content = content.push(text(message).style(text::danger));
    }
    content.into()
}

pub fn options(snapshot: &StudioSnapshot) -> Element<'_, Message> {
    let length = column![
        text("Short length").size(14),
        pick_list(
            ShortLength::ALL,
            Some(snapshot.short_length),
            Message::ShortLengthSelected
        ),
    ]
    .spacing(6);

    let transition = column![
        text("Transition").size(14),
        pick_list(
            TransitionStyle::ALL,
            Some(snapshot.transition),
            Message::TransitionSelected
        ),
    ]
    .spacing(6);

    row![length, transition].spacing(24).into()
}

/// Toggle chips for the detected highlight segments.
pub fn highlights(snapshot: &StudioSnapshot) -> Element<'_, Message> {
    let chips = snapshot
        .highlights
        .iter()
        .fold(row![].spacing(10), |chips, segment| chips.push(highlight_chip(segment)));

    column![
        text(format!(
            "Highlights ({} selected)",
            snapshot.selected_count
        ))
        .size(14),
        chips.wrap(),
    ]
    .spacing(8)
    .into()
}

fn highlight_chip(segment: &HighlightSegment) -> Element<'_, Message> {
    let content = column![
        text(format!("{} - {}", segment.start, segment.end)).size(13),
        text(&segment.description).size(14),
        text(format!("{}% confidence", segment.confidence_percent())).size(12),
    ]
    .spacing(2)
    .width(Length::Fixed(200.0));

    let style = if segment.selected {
        button::primary
    } else {
        button::secondary
    };

    button(content)
        .padding(10)
        .style(style)
        .on_press(Message::HighlightToggled(segment.id.clone()))
        .into()
}

pub fn progress(snapshot: &StudioSnapshot) -> Element<'_, Message> {
    row![
        progress_bar(0.0..=100.0, snapshot.progress as f32)
            .height(Length::Fixed(10.0))
            .width(Length::Fill),
        text(format!(
            "{} {}%",
            snapshot.status_label,
            snapshot.progress_percent()
        ))
        .size(14),
    ]
    .spacing(12)
    .align_y(Alignment::Center)
    .into()
}

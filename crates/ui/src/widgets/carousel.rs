use engine::{
    ClipSummary, EditingUpdate, MAX_SOUND_LEVEL, SOUND_LEVEL_STEP, ShareTarget, StudioSnapshot,
    TRIM_STEP_SECS,
};
use iced::gradient::Linear;
use iced::widget::{button, column, container, mouse_area, row, slider, text, text_input};
use iced::{Alignment, Background, Border, Color, Degrees, Element, Length, Theme};

use crate::app::Message;

const THUMBNAIL_WIDTH: f32 = 220.0;
const THUMBNAIL_HEIGHT: f32 = 390.0;

/// Angle and colour stops of a thumbnail gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailGradient {
    pub angle_deg: f32,
    pub stops: Vec<Color>,
}

/// Parses the `linear-gradient(<angle>deg, rgba(..), ...)` strings carried by
/// generated shorts.
///
/// Returns `None` for anything else so the card falls back to a flat fill.
pub fn parse_gradient(css: &str) -> Option<ThumbnailGradient> {
    let body = css
        .trim()
        .strip_prefix("linear-gradient(")?
        .strip_suffix(')')?;
    let (angle, mut rest) = body.split_once(',')?;
    let angle_deg = angle.trim().strip_suffix("deg")?.trim().parse::<f32>().ok()?;

    let mut stops = Vec::new();
    while let Some(start) = rest.find("rgba(") {
        let after = &rest[start + "rgba(".len()..];
        let end = after.find(')')?;
        stops.push(parse_rgba(&after[..end])?);
        rest = &after[end + 1..];
    }

    (stops.len() >= 2).then_some(ThumbnailGradient { angle_deg, stops })
}

fn parse_rgba(components: &str) -> Option<Color> {
    let mut parts = components.split(',').map(str::trim);
    let r = parts.next()?.parse::<u8>().ok()?;
    let g = parts.next()?.parse::<u8>().ok()?;
    let b = parts.next()?.parse::<u8>().ok()?;
    let a = parts.next()?.parse::<f32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Color::from_rgba8(r, g, b, a.clamp(0.0, 1.0)))
}

/// Parses `#RRGGBB` accents.
pub fn parse_accent(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some(Color::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn thumbnail_background(css: &str) -> Background {
    match parse_gradient(css) {
        Some(gradient) => {
            let last = (gradient.stops.len() - 1) as f32;
            let linear = gradient
                .stops
                .iter()
                .enumerate()
                .fold(Linear::new(Degrees(gradient.angle_deg)), |linear, (index, color)| {
                    linear.add_stop(index as f32 / last, *color)
                });
            Background::Gradient(linear.into())
        }
        None => Background::Color(Color::from_rgb8(58, 12, 163)),
    }
}

/// Prev/next stay enabled whenever any clip exists, even a single one.
fn can_navigate(snapshot: &StudioSnapshot) -> bool {
    !snapshot.clips.is_empty()
}

/// Renders the clip carousel with its editing panel and share row.
///
/// Pressing anywhere on the carousel gives it keyboard focus for arrow-key
/// navigation.
pub fn view(snapshot: &StudioSnapshot, focused: bool) -> Element<'_, Message> {
    let Some(clip) = snapshot.active_clip() else {
        return placeholder();
    };

    let navigable = can_navigate(snapshot);
    let nav = row![
        button(text("<"))
            .style(button::secondary)
            .on_press_maybe(navigable.then_some(Message::PreviousPressed)),
        text(format!(
            "{} / {}",
            snapshot.active_index + 1,
            snapshot.item_count
        )),
        button(text(">"))
            .style(button::secondary)
            .on_press_maybe(navigable.then_some(Message::NextPressed)),
        text(format!("Transition: {}", snapshot.transition_label)).size(13),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let body = row![clip_card(clip), editing_panel(clip)].spacing(24);
    let content = column![nav, body, share_row(&snapshot.share_targets)].spacing(16);

    let frame = container(content)
        .padding(16)
        .width(Length::Fill)
        .style(move |theme: &Theme| {
            let palette = theme.extended_palette();
            let border_color = if focused {
                palette.primary.strong.color
            } else {
                palette.background.strong.color
            };
            container::Style {
                border: Border {
                    color: border_color,
                    width: 1.0,
                    radius: 12.0.into(),
                },
                ..container::Style::default()
            }
        });

    mouse_area(frame).on_press(Message::CarouselFocused).into()
}

fn placeholder<'a>() -> Element<'a, Message> {
    container(text("Your shorts will appear here once generation finishes."))
        .padding(24)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
}

fn clip_card(clip: &ClipSummary) -> Element<'_, Message> {
    let background = thumbnail_background(clip.short.thumbnail_gradient);
    let thumbnail = container(
        column![
            text(&clip.short.title).size(20),
            text(format!("{}s", clip.short.duration)).size(14),
        ]
        .spacing(4),
    )
    .padding(16)
    .width(Length::Fixed(THUMBNAIL_WIDTH))
    .height(Length::Fixed(THUMBNAIL_HEIGHT))
    .align_y(Alignment::End)
    .style(move |_theme: &Theme| container::Style {
        background: Some(background),
        text_color: Some(Color::WHITE),
        border: Border {
            radius: 16.0.into(),
            ..Border::default()
        },
        ..container::Style::default()
    });

    column![
        thumbnail,
        text(&clip.short.clip_range).size(13),
        text(&clip.short.description).size(14),
    ]
    .spacing(6)
    .width(Length::Fixed(THUMBNAIL_WIDTH))
    .into()
}

fn editing_panel(clip: &ClipSummary) -> Element<'_, Message> {
    let id = clip.short.id.as_str();
    let state = &clip.editing;
    let bounds = clip.bounds;

    let trim_start = labelled_slider(
        format!("Trim start {}s", state.trim_start),
        bounds.start_min,
        bounds.start_max,
        state.trim_start,
        move |value| Message::EditingChanged(id.to_owned(), EditingUpdate::default().trim_start(value)),
    );
    let trim_end = labelled_slider(
        format!("Trim end {}s", state.trim_end),
        bounds.end_min,
        bounds.end_max,
        state.trim_end,
        move |value| Message::EditingChanged(id.to_owned(), EditingUpdate::default().trim_end(value)),
    );

    let overlay = column![
        text("Text overlay").size(13),
        text_input("Add a caption", &state.text_overlay)
            .on_input(move |value| {
                Message::EditingChanged(id.to_owned(), EditingUpdate::default().text_overlay(value))
            })
            .padding(8),
    ]
    .spacing(4);

    let sound = column![
        text(format!("Sound {}%", state.sound_level)).size(13),
        slider(0..=MAX_SOUND_LEVEL, state.sound_level, move |value: u8| {
            Message::EditingChanged(id.to_owned(), EditingUpdate::default().sound_level(value))
        })
        .step(SOUND_LEVEL_STEP),
    ]
    .spacing(4);

    column![text("Edit").size(18), trim_start, trim_end, overlay, sound]
        .spacing(14)
        .width(Length::Fill)
        .into()
}

fn labelled_slider<'a>(
    label: String,
    min: u32,
    max: u32,
    value: u32,
    on_change: impl Fn(u32) -> Message + 'a,
) -> Element<'a, Message> {
    let control: Element<'a, Message> = if min < max {
        slider(min..=max, value.clamp(min, max), on_change)
            .step(TRIM_STEP_SECS)
            .into()
    } else {
        text("No room to adjust").size(12).into()
    };
    column![text(label).size(13), control].spacing(4).into()
}

fn share_row(targets: &[ShareTarget]) -> Element<'_, Message> {
    targets
        .iter()
        .fold(row![text("Share").size(14)].spacing(10).align_y(Alignment::Center), |share, target| {
            let accent = parse_accent(target.accent);
            share.push(
                button(text(target.name))
                    .padding([6, 12])
                    .style(move |theme: &Theme, status| {
                        let mut style = button::secondary(theme, status);
                        if let Some(color) = accent {
                            style.border = Border {
                                color,
                                width: 1.0,
                                radius: 8.0.into(),
                            };
                        }
                        style
                    })
                    .on_press(Message::ShareClicked(target.destination_url)),
            )
        })
        .into()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use engine::{Command, FixedIncrements, GRADIENT_PALETTE, ManualScheduler, Studio};
    use iced::Color;

    use super::{can_navigate, parse_accent, parse_gradient};

    #[test]
    fn navigation_is_enabled_for_a_single_clip() {
        let scheduler = ManualScheduler::new();
        let mut studio = Studio::new(scheduler.clone(), FixedIncrements::new(vec![20.0]));
        assert!(!can_navigate(&studio.snapshot()));

        for segment_id in ["segment-2", "segment-4"] {
            studio
                .handle_command(Command::ToggleHighlight {
                    segment_id: segment_id.to_owned(),
                })
                .expect("toggle");
        }
        studio
            .handle_command(Command::Submit {
                url: "https://youtu.be/abc".to_owned(),
            })
            .expect("valid url");
        scheduler.advance(Duration::from_secs(3), |signal| {
            studio
                .handle_command(Command::Timer(signal))
                .expect("timer commands never fail");
        });

        let snapshot = studio.snapshot();
        assert_eq!(snapshot.clips.len(), 1);
        assert!(can_navigate(&snapshot));
    }

    #[test]
    fn parses_every_palette_gradient() {
        for css in GRADIENT_PALETTE {
            let gradient = parse_gradient(css).expect("palette gradient parses");
            assert_eq!(gradient.angle_deg, 145.0);
            assert_eq!(gradient.stops.len(), 2);
        }
    }

    #[test]
    fn gradient_stops_keep_channel_values() {
        let gradient = parse_gradient(GRADIENT_PALETTE[0]).expect("gradient");

        assert_eq!(gradient.stops[0], Color::from_rgba8(255, 64, 129, 0.85));
        assert_eq!(gradient.stops[1], Color::from_rgba8(58, 12, 163, 0.88));
    }

    #[test]
    fn rejects_non_gradient_backgrounds() {
        assert!(parse_gradient("#ff0000").is_none());
        assert!(parse_gradient("linear-gradient(145deg, rgba(1,2,3,1))").is_none());
        assert!(parse_gradient("linear-gradient(up, rgba(1,2,3,1), rgba(4,5,6,1))").is_none());
    }

    #[test]
    fn parses_share_accents() {
        assert_eq!(parse_accent("#FF0000"), Some(Color::from_rgb8(255, 0, 0)));
        assert_eq!(parse_accent("#25F4EE"), Some(Color::from_rgb8(0x25, 0xF4, 0xEE)));
        assert_eq!(parse_accent("red"), None);
    }
}

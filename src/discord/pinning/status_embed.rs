// Discord rendering of the platform-neutral status card.

use crate::core::status::{RenderedStatus, StatusColor};
use poise::serenity_prelude as serenity;

const ONLINE_COLOR: u32 = 0x3498DB; // Blue
const OFFLINE_COLOR: u32 = 0xE74C3C; // Red

pub fn status_color(color: StatusColor) -> u32 {
    match color {
        StatusColor::Online => ONLINE_COLOR,
        StatusColor::Offline => OFFLINE_COLOR,
    }
}

pub fn status_embed(status: &RenderedStatus) -> serenity::CreateEmbed {
    status.fields.iter().fold(
        serenity::CreateEmbed::new()
            .author(serenity::CreateEmbedAuthor::new(&status.author))
            .color(status_color(status.color))
            .footer(serenity::CreateEmbedFooter::new(&status.footer)),
        |embed, field| embed.field(field.name, &field.value, field.inline),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_and_offline_colors_differ() {
        assert_ne!(
            status_color(StatusColor::Online),
            status_color(StatusColor::Offline)
        );
    }
}

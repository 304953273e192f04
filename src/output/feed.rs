//! RSS 2.0 feed announcing the latest version

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::info;

use crate::config::FeedConfig;
use crate::output::write_atomic;
use crate::version::error::FeedError;

/// RFC-822 style timestamp used by RSS readers
const RFC822_GMT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub version: String,
    pub release_date: Option<NaiveDate>,
}

impl FeedItem {
    fn title(&self, channel: &FeedConfig) -> String {
        format!("{} {}", channel.product, self.version)
    }

    fn description(&self, channel: &FeedConfig) -> String {
        let mut description = format!(
            "Latest detected {} version: {}",
            channel.product, self.version
        );
        if let Some(date) = self.release_date {
            description.push_str(&format!(" (released {})", date.format("%B %-d, %Y")));
        }
        description
    }

    /// Stable per version, so readers only surface a new item on change
    fn guid(&self, channel: &FeedConfig) -> String {
        format!("{}-{}", channel.guid_prefix, self.version)
    }
}

/// Render the whole feed document with a single item
pub fn render_feed(
    channel: &FeedConfig,
    item: &FeedItem,
    now: DateTime<Utc>,
) -> Result<String, FeedError> {
    let timestamp = now.format(RFC822_GMT).to_string();
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("rss").with_attributes([("version", "2.0")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, BytesStart::new("title"), &channel.title)?;
    write_text_element(&mut writer, BytesStart::new("link"), &channel.link)?;
    write_text_element(&mut writer, BytesStart::new("description"), &channel.description)?;
    write_text_element(&mut writer, BytesStart::new("lastBuildDate"), &timestamp)?;
    write_text_element(&mut writer, BytesStart::new("pubDate"), &timestamp)?;

    writer.write_event(Event::Start(BytesStart::new("item")))?;
    write_text_element(&mut writer, BytesStart::new("title"), &item.title(channel))?;
    write_text_element(
        &mut writer,
        BytesStart::new("description"),
        &item.description(channel),
    )?;
    write_text_element(&mut writer, BytesStart::new("link"), &channel.link)?;
    write_text_element(
        &mut writer,
        BytesStart::new("guid").with_attributes([("isPermaLink", "false")]),
        &item.guid(channel),
    )?;
    write_text_element(&mut writer, BytesStart::new("pubDate"), &timestamp)?;
    writer.write_event(Event::End(BytesEnd::new("item")))?;

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut document = writer.into_inner();
    document.write_all(b"\n")?;

    Ok(String::from_utf8_lossy(&document).into_owned())
}

/// Regenerate the feed file, regardless of whether the version changed
pub fn write_feed(
    path: &Path,
    channel: &FeedConfig,
    item: &FeedItem,
    now: DateTime<Utc>,
) -> Result<(), FeedError> {
    let document = render_feed(channel, item, now)?;
    write_atomic(path, document.as_bytes())?;
    info!("Feed written to {:?}", path);
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), FeedError> {
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

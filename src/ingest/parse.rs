// src/ingest/parse.rs
//! RSS 2.0, RSS 1.0 (RDF) and Atom parsing into `RawEntry` values.
//!
//! Entries are read with a streaming walk over the item's children. The first
//! occurrence of each field wins; repeats and unknown extension elements
//! (`media:*`, `atom:link` inside RSS items, ...) are skipped.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::error::FetchError;
use crate::ingest::normalize::snippet_text;
use crate::ingest::types::RawEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedKind {
    Rss,
    Rdf,
    Atom,
}

impl FeedKind {
    fn entry_tag(self) -> &'static [u8] {
        match self {
            FeedKind::Rss | FeedKind::Rdf => b"item",
            FeedKind::Atom => b"entry",
        }
    }
}

/// Entry children we read, across all three dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Guid,
    PubDate,
    DcDate,
    Published,
    Updated,
    Description,
    Encoded,
    Summary,
    Content,
    Creator,
    Author,
}

fn field_for(name: QName<'_>, kind: FeedKind) -> Option<Field> {
    let prefix = name.prefix().map(|p| p.into_inner());
    let local = name.local_name().into_inner();

    match (prefix, local) {
        (Some(b"dc"), b"date") => Some(Field::DcDate),
        (Some(b"dc"), b"creator") => Some(Field::Creator),
        (Some(b"content"), b"encoded") => Some(Field::Encoded),
        (None, b"title") => Some(Field::Title),
        (None, b"link") => Some(Field::Link),
        (None, b"author") => Some(Field::Author),
        (None, b"guid") if kind != FeedKind::Atom => Some(Field::Guid),
        (None, b"pubDate") if kind != FeedKind::Atom => Some(Field::PubDate),
        (None, b"description") if kind != FeedKind::Atom => Some(Field::Description),
        (None | Some(b"atom"), _) if kind == FeedKind::Atom => match local {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"author" => Some(Field::Author),
            b"id" => Some(Field::Guid),
            b"published" => Some(Field::Published),
            b"updated" => Some(Field::Updated),
            b"summary" => Some(Field::Summary),
            b"content" => Some(Field::Content),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Debug, Default)]
struct EntryBuilder {
    title: Option<String>,
    link: Option<String>,
    /// Atom: first `rel="alternate"` (or rel-less) link, then any first link.
    alternate: Option<String>,
    first_link: Option<String>,
    guid: Option<String>,
    pub_date: Option<String>,
    dc_date: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    description: Option<String>,
    encoded: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    creator: Option<String>,
    author: Option<String>,
}

fn keep_first(slot: &mut Option<String>, value: String) {
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value);
    }
}

impl EntryBuilder {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Guid => &mut self.guid,
            Field::PubDate => &mut self.pub_date,
            Field::DcDate => &mut self.dc_date,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Description => &mut self.description,
            Field::Encoded => &mut self.encoded,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Creator => &mut self.creator,
            Field::Author => &mut self.author,
        }
    }

    fn set(&mut self, field: Field, value: String) {
        keep_first(self.slot(field), value);
    }

    fn atom_link(&mut self, e: &BytesStart<'_>) -> Result<(), FetchError> {
        let Some(href) = attribute(e, "href")? else {
            return Ok(());
        };
        let rel = attribute(e, "rel")?;
        if rel.as_deref().map_or(true, |r| r == "alternate") {
            keep_first(&mut self.alternate, href.clone());
        }
        keep_first(&mut self.first_link, href);
        Ok(())
    }

    fn build(self) -> RawEntry {
        let body = self
            .encoded
            .or(self.content)
            .or(self.description)
            .or(self.summary);
        RawEntry {
            title: self.title,
            link: self.link.or(self.alternate).or(self.first_link),
            guid: self.guid,
            iso_date: self.dc_date.or(self.published).or(self.updated),
            pub_date: self.pub_date,
            content_snippet: body.as_deref().and_then(snippet_text),
            creator: self.creator,
            author: self.author,
        }
    }
}

fn xml_err(e: quick_xml::Error) -> FetchError {
    FetchError::Parse(e.to_string())
}

fn truncated() -> FetchError {
    FetchError::Parse("unexpected end of document".into())
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, FetchError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| FetchError::Parse(err.to_string()))?;
    attr.map(|a| {
        a.unescape_value()
            .map(|v| v.trim().to_string())
            .map_err(xml_err)
    })
    .transpose()
}

/// Text content with XML escapes resolved; HTML-only entities are decoded too.
fn unescape_text(t: &BytesText<'_>) -> String {
    match t.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => html_escape::decode_html_entities(&String::from_utf8_lossy(t)).into_owned(),
    }
}

/// Read everything up to the end of the element just opened and return its
/// text. Nested markup (Atom `type="xhtml"`) contributes its text only.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, FetchError> {
    let mut out = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Text(t) => out.push_str(&unescape_text(&t)),
            Event::CData(c) => out.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(_) => {
                depth += 1;
                out.push(' ');
            }
            Event::Empty(_) => out.push(' '),
            Event::End(_) if depth == 0 => break,
            Event::End(_) => {
                depth -= 1;
                out.push(' ');
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
    }
    Ok(out.trim().to_string())
}

/// `<author><name>..</name>..</author>`; only the name is kept.
fn read_atom_author(reader: &mut Reader<&[u8]>) -> Result<Option<String>, FetchError> {
    let mut name = None;
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.local_name().as_ref() == b"name" => {
                let text = read_text(reader)?;
                keep_first(&mut name, text);
            }
            Event::Start(e) => {
                reader.read_to_end(e.name()).map_err(xml_err)?;
            }
            Event::End(_) => break,
            Event::Eof => return Err(truncated()),
            _ => {}
        }
    }
    Ok(name)
}

fn read_entry(reader: &mut Reader<&[u8]>, kind: FeedKind) -> Result<RawEntry, FetchError> {
    let mut b = EntryBuilder::default();
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match field_for(e.name(), kind) {
                Some(Field::Link) if kind == FeedKind::Atom => {
                    b.atom_link(&e)?;
                    reader.read_to_end(e.name()).map_err(xml_err)?;
                }
                Some(Field::Author) if kind == FeedKind::Atom => {
                    if let Some(name) = read_atom_author(reader)? {
                        keep_first(&mut b.author, name);
                    }
                }
                Some(field) => {
                    let text = read_text(reader)?;
                    b.set(field, text);
                }
                None => {
                    reader.read_to_end(e.name()).map_err(xml_err)?;
                }
            },
            Event::Empty(e) => {
                if kind == FeedKind::Atom && field_for(e.name(), kind) == Some(Field::Link) {
                    b.atom_link(&e)?;
                }
            }
            Event::End(_) => break,
            Event::Eof => return Err(truncated()),
            _ => {}
        }
    }
    Ok(b.build())
}

/// Name of the document's root element decides the dialect.
fn detect_kind(reader: &mut Reader<&[u8]>) -> Result<FeedKind, FetchError> {
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) => {
                return match e.local_name().as_ref() {
                    b"rss" => Ok(FeedKind::Rss),
                    b"RDF" => Ok(FeedKind::Rdf),
                    b"feed" => Ok(FeedKind::Atom),
                    other => Err(FetchError::Parse(format!(
                        "not an RSS or Atom document (root <{}>)",
                        String::from_utf8_lossy(other)
                    ))),
                };
            }
            Event::Eof => return Err(FetchError::Parse("empty document".into())),
            _ => continue,
        }
    }
}

/// Parse a feed document into raw entries in document order.
pub fn parse_feed(body: &str) -> Result<Vec<RawEntry>, FetchError> {
    let xml = scrub_html_entities_for_xml(body);
    let mut reader = Reader::from_str(&xml);

    let kind = detect_kind(&mut reader)?;
    let mut entries = Vec::new();
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.local_name().as_ref() == kind.entry_tag() => {
                entries.push(read_entry(&mut reader, kind)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(entries)
}

/// Feeds routinely use HTML named entities that XML does not define.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
        .replace("&pound;", "£")
        .replace("&euro;", "€")
}

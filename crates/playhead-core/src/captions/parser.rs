//! WebVTT and SRT parsing into custom caption cues
//!
//! Cue settings that have a meaning for custom captions are folded into the cue's
//! [`CaptionStyle`]: `line:` decides top/bottom placement and `align:` the text
//! alignment. Everything else in the settings list is ignored.

use crate::captions::{CaptionPosition, CaptionStyle, TextAlign};
use crate::error::{Error, Result};
use crate::types::CaptionCue;

/// WebVTT parser
pub struct WebVttParser;

impl WebVttParser {
    /// Parse a WebVTT document into cues
    pub fn parse(input: &str) -> Result<Vec<CaptionCue>> {
        let input = input.trim_start_matches('\u{feff}');
        let mut blocks = split_blocks(input);

        let header = blocks.next().unwrap_or_default();
        if !header.first().is_some_and(|line| line.starts_with("WEBVTT")) {
            return Err(Error::CaptionParse("missing WEBVTT header".to_string()));
        }

        let mut cues = Vec::new();
        for block in blocks {
            let Some(first) = block.first() else { continue };
            if first.starts_with("NOTE") || first.starts_with("STYLE") || first.starts_with("REGION") {
                continue;
            }

            // Optional identifier line before the timing line
            let timing_at = match block.iter().position(|line| line.contains("-->")) {
                Some(i) if i <= 1 => i,
                _ => continue,
            };

            let (start_time, end_time, settings) = parse_timing(block[timing_at], parse_vtt_timestamp)?;
            let text = strip_tags(&block[timing_at + 1..].join("\n"));

            let mut cue = CaptionCue::new(text, start_time, end_time);
            if let Some(style) = style_from_settings(settings) {
                cue = cue.with_style(style);
            }
            cues.push(cue);
        }

        Ok(cues)
    }
}

/// SRT (SubRip) parser
pub struct SrtParser;

impl SrtParser {
    /// Parse an SRT document into cues
    pub fn parse(input: &str) -> Result<Vec<CaptionCue>> {
        let input = input.trim_start_matches('\u{feff}');
        let mut cues = Vec::new();

        for block in split_blocks(input) {
            let timing_at = match block.iter().position(|line| line.contains("-->")) {
                Some(i) if i <= 1 => i,
                _ => continue,
            };

            let (start_time, end_time, _) = parse_timing(block[timing_at], parse_srt_timestamp)?;
            let text = strip_tags(&block[timing_at + 1..].join("\n"));
            cues.push(CaptionCue::new(text, start_time, end_time));
        }

        Ok(cues)
    }
}

/// Detect the format from the content and parse accordingly
pub fn parse_captions(input: &str) -> Result<Vec<CaptionCue>> {
    if input.trim_start_matches('\u{feff}').starts_with("WEBVTT") {
        WebVttParser::parse(input)
    } else {
        SrtParser::parse(input)
    }
}

/// Blank-line separated blocks of non-empty lines
fn split_blocks(input: &str) -> impl Iterator<Item = Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in input.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks.into_iter()
}

/// `"00:00:01.000 --> 00:00:04.000 align:start"` → (start, end, settings)
fn parse_timing<'a>(
    line: &'a str,
    timestamp: fn(&str) -> Result<f64>,
) -> Result<(f64, f64, Vec<&'a str>)> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| Error::CaptionParse(format!("invalid timing line: {}", line)))?;

    let mut rest = rest.split_whitespace();
    let end = rest
        .next()
        .ok_or_else(|| Error::CaptionParse(format!("missing end time: {}", line)))?;

    let start_time = timestamp(start.trim())?;
    let end_time = timestamp(end)?;
    if end_time < start_time {
        return Err(Error::CaptionParse(format!("cue ends before it starts: {}", line)));
    }

    Ok((start_time, end_time, rest.collect()))
}

/// `hh:mm:ss.mmm` or `mm:ss.mmm`
fn parse_vtt_timestamp(ts: &str) -> Result<f64> {
    let parts: Vec<&str> = ts.split(':').collect();
    match parts.as_slice() {
        [m, s] => Ok(parse_number(m)? * 60.0 + parse_seconds(s)?),
        [h, m, s] => Ok(parse_number(h)? * 3600.0 + parse_number(m)? * 60.0 + parse_seconds(s)?),
        _ => Err(Error::CaptionParse(format!("invalid timestamp: {}", ts))),
    }
}

/// `hh:mm:ss,mmm`
fn parse_srt_timestamp(ts: &str) -> Result<f64> {
    let parts: Vec<&str> = ts.split(':').collect();
    match parts.as_slice() {
        [h, m, s] => Ok(parse_number(h)? * 3600.0 + parse_number(m)? * 60.0 + parse_seconds(s)?),
        _ => Err(Error::CaptionParse(format!("invalid SRT timestamp: {}", ts))),
    }
}

fn parse_number(s: &str) -> Result<f64> {
    s.trim()
        .parse()
        .map_err(|_| Error::CaptionParse(format!("invalid number: {}", s)))
}

/// Seconds with either `.` or `,` as decimal separator
fn parse_seconds(s: &str) -> Result<f64> {
    parse_number(&s.replace(',', "."))
}

fn style_from_settings(settings: Vec<&str>) -> Option<CaptionStyle> {
    let mut style = CaptionStyle::default();
    let mut touched = false;

    for setting in settings {
        let Some((key, value)) = setting.split_once(':') else { continue };
        match key {
            "line" => {
                let value = value.split(',').next().unwrap_or(value);
                let top = if let Some(percent) = value.strip_suffix('%') {
                    percent.parse::<f64>().map(|p| p < 50.0).ok()
                } else {
                    value.parse::<i64>().map(|n| n >= 0).ok()
                };
                if let Some(top) = top {
                    style.position = Some(if top { CaptionPosition::Top } else { CaptionPosition::Bottom });
                    touched = true;
                }
            }
            "align" => {
                let align = match value {
                    "start" | "left" => Some(TextAlign::Left),
                    "center" | "middle" => Some(TextAlign::Center),
                    "end" | "right" => Some(TextAlign::Right),
                    _ => None,
                };
                if align.is_some() {
                    style.text_align = align;
                    touched = true;
                }
            }
            _ => {}
        }
    }

    touched.then_some(style)
}

/// Strip markup tags (`<b>`, `<v Speaker>`, `<i>`) from cue text
pub fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result
}
